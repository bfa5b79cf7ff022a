//! Access keys read from a one-line `access_key, secret_key` file.

use std::fmt;
use std::path::Path;

use crate::error::StoreError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load from `path`. The first line must hold exactly two non-empty
    /// comma-separated values.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents).map_err(|message| StoreError::Credentials {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(contents: &str) -> Result<Self, String> {
        let line = contents.lines().next().unwrap_or("").trim();
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [access, secret] if !access.is_empty() && !secret.is_empty() => {
                Ok(Self::new(*access, *secret))
            }
            _ => Err(format!(
                "expected one line 'access_key, secret_key', found {} value(s)",
                parts.iter().filter(|p| !p.is_empty()).count()
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_trimmed_values() {
        let creds = Credentials::parse("AKIAEXAMPLE ,  s3cr3t/key\n").unwrap();
        assert_eq!(creds.access_key, "AKIAEXAMPLE");
        assert_eq!(creds.secret_key, "s3cr3t/key");
    }

    #[test]
    fn only_first_line_counts() {
        let creds = Credentials::parse("a,b\nc,d\n").unwrap();
        assert_eq!(creds, Credentials::new("a", "b"));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(Credentials::parse("only-one").is_err());
        assert!(Credentials::parse("a,b,c").is_err());
        assert!(Credentials::parse("a, ").is_err());
        assert!(Credentials::parse("").is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let shown = format!("{:?}", Credentials::new("AK", "topsecret"));
        assert!(shown.contains("AK"));
        assert!(!shown.contains("topsecret"));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.txt");
        std::fs::write(&path, "just-one-value\n").unwrap();
        let err = Credentials::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Credentials { .. }));
        assert!(err.to_string().contains("creds.txt"));

        let missing = Credentials::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(missing, StoreError::Credentials { .. }));
    }
}
