//! `coresync upload`: publish local drill-core files to the object store.

mod composites;
mod readme;
mod reports;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use coresync_store::{Credentials, S3Client, DEFAULT_REGION};

use crate::exit_codes::EXIT_INPUT;
use crate::CliError;

#[derive(Subcommand)]
pub enum UploadCommands {
    /// Replace each folder's composites/ images with the local *.jpg files
    #[command(after_help = "\
Examples:
  coresync upload composites D:/JPGS
  coresync upload composites ./jpgs --creds ~/creds.txt --bucket cna-webfiles")]
    Composites {
        /// Directory whose subfolders are named after the remote drill-core folders
        local_base: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Upload *_DATA.html mineralogy reports that are not already published
    #[command(after_help = "\
Examples:
  coresync upload reports \"F:/DATA.html files\"
  coresync upload reports --scan E:/")]
    Reports {
        /// Folder holding <hole>_DATA.html files
        #[arg(required_unless_present = "scan")]
        folder: Option<PathBuf>,

        /// Search this tree for *_Mineralogy folders instead of a single folder
        #[arg(long, conflicts_with = "folder")]
        scan: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Copy one file into every drill-core folder
    #[command(after_help = "\
Examples:
  coresync upload readme README.txt
  coresync upload readme notes/readme_v2.txt --dest-name README.txt")]
    Readme {
        /// Local file to publish
        file: PathBuf,

        /// Object name inside each folder (default: the local file name)
        #[arg(long)]
        dest_name: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },
}

/// Bucket and connection options shared by every upload command.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Target bucket
    #[arg(long, env = "CORESYNC_BUCKET", default_value = "cna-webfiles")]
    pub bucket: String,

    /// Key prefix holding one folder per drill hole
    #[arg(long, default_value = "webdata/drillcore")]
    pub prefix: String,

    /// Credentials file: one line `access_key, secret_key`
    #[arg(long, default_value = "creds.txt")]
    pub creds: PathBuf,

    /// Bucket region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Endpoint URL of an S3-compatible store (default: AWS regional endpoint)
    #[arg(long, env = "CORESYNC_S3_ENDPOINT")]
    pub endpoint: Option<String>,
}

impl StoreArgs {
    fn connect(&self) -> Result<S3Client, CliError> {
        let creds = Credentials::load(&self.creds)?;
        let client = S3Client::new(creds, &self.bucket, &self.region, self.endpoint.as_deref())?;
        log::debug!("connected to bucket '{}'", client.bucket());
        Ok(client)
    }

    /// Prefix without trailing slashes; jobs append their own.
    fn base_prefix(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }
}

/// Counters printed at the end of every upload run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadStats {
    pub folders_processed: usize,
    pub folders_skipped: usize,
    pub deleted: usize,
    pub uploaded: usize,
    pub skipped_existing: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl UploadStats {
    pub fn render(&self) -> String {
        let mut out = String::from("Summary:\n");
        if self.folders_processed > 0 || self.folders_skipped > 0 {
            let _ = writeln!(out, "Folders processed: {}", self.folders_processed);
            let _ = writeln!(out, "Folders skipped: {}", self.folders_skipped);
        }
        if self.deleted > 0 {
            let _ = writeln!(out, "Objects deleted: {}", self.deleted);
        }
        let _ = writeln!(out, "Files uploaded: {}", self.uploaded);
        if self.skipped_existing > 0 {
            let _ = writeln!(out, "Already present: {}", self.skipped_existing);
        }
        if self.ignored > 0 {
            let _ = writeln!(out, "Names not matching: {}", self.ignored);
        }
        let _ = writeln!(out, "Failed: {}", self.failed);
        out
    }
}

pub fn cmd_upload(command: UploadCommands) -> Result<(), CliError> {
    let stats = match command {
        UploadCommands::Composites { local_base, store } => {
            require_dir(&local_base)?;
            let client = store.connect()?;
            composites::run(&client, store.base_prefix(), &local_base)?
        }
        UploadCommands::Reports { folder, scan, store } => {
            let source = match (folder.as_deref(), scan.as_deref()) {
                (Some(folder), None) => reports::Source::Folder(folder),
                (None, Some(root)) => reports::Source::Scan(root),
                _ => return Err(CliError::args("pass either a folder or --scan <root>")),
            };
            require_dir(source.path())?;
            let client = store.connect()?;
            reports::run(&client, store.base_prefix(), source)?
        }
        UploadCommands::Readme { file, dest_name, store } => {
            if !file.is_file() {
                return Err(CliError::new(
                    EXIT_INPUT,
                    format!("file not found: {}", file.display()),
                ));
            }
            let dest_name = match dest_name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| CliError::args("cannot derive a destination name; pass --dest-name"))?,
            };
            let client = store.connect()?;
            readme::run(&client, store.base_prefix(), &file, &dest_name)?
        }
    };

    print!("{}", stats.render());
    Ok(())
}

fn require_dir(path: &Path) -> Result<(), CliError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::new(
            EXIT_INPUT,
            format!("directory not found: {}", path.display()),
        ))
    }
}

/// In-memory store for the job tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;

    use coresync_store::{ObjectStore, StoreError};

    #[derive(Default)]
    pub struct MemoryStore {
        pub objects: RefCell<BTreeMap<String, Vec<u8>>>,
        /// Keys whose HEAD fails with a 403.
        pub forbidden: BTreeSet<String>,
        /// Prefixes whose delete fails with a 500.
        pub broken_deletes: BTreeSet<String>,
        pub fail_listing: bool,
    }

    impl MemoryStore {
        pub fn with_keys(keys: &[&str]) -> Self {
            let store = Self::default();
            for key in keys {
                store.objects.borrow_mut().insert(key.to_string(), Vec::new());
            }
            store
        }

        pub fn keys(&self) -> Vec<String> {
            self.objects.borrow().keys().cloned().collect()
        }

        pub fn body(&self, key: &str) -> Option<Vec<u8>> {
            self.objects.borrow().get(key).cloned()
        }

        fn check_listing(&self) -> Result<(), StoreError> {
            if self.fail_listing {
                return Err(StoreError::Http { status: 403, body: "AccessDenied".into() });
            }
            Ok(())
        }
    }

    impl ObjectStore for MemoryStore {
        fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            self.check_listing()?;
            let found: BTreeSet<String> = self
                .objects
                .borrow()
                .keys()
                .filter_map(|k| k.strip_prefix(prefix))
                .filter_map(|rest| rest.find('/').map(|i| format!("{prefix}{}", &rest[..=i])))
                .collect();
            Ok(found.into_iter().collect())
        }

        fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            self.check_listing()?;
            Ok(self
                .objects
                .borrow()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }

        fn head(&self, key: &str) -> Result<bool, StoreError> {
            if self.forbidden.contains(key) {
                return Err(StoreError::Http { status: 403, body: String::new() });
            }
            Ok(self.objects.borrow().contains_key(key))
        }

        fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
            if self.broken_deletes.contains(prefix) {
                return Err(StoreError::Http { status: 500, body: "InternalError".into() });
            }
            let mut objects = self.objects.borrow_mut();
            let before = objects.len();
            objects.retain(|k, _| !k.starts_with(prefix));
            Ok(before - objects.len())
        }

        fn upload(&self, path: &Path, key: &str) -> Result<(), StoreError> {
            let data = std::fs::read(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            self.objects.borrow_mut().insert(key.to_string(), data);
            Ok(())
        }
    }
}
