//! Copy one local file into every folder under the prefix.

use std::collections::BTreeSet;
use std::path::Path;

use coresync_store::ObjectStore;

use super::UploadStats;
use crate::CliError;

pub fn run(
    store: &dyn ObjectStore,
    prefix: &str,
    file: &Path,
    dest_name: &str,
) -> Result<UploadStats, CliError> {
    let base = format!("{prefix}/");
    let keys = store.list_keys(&base)?;
    log::debug!("Found {} objects under '{base}'", keys.len());

    let folders = subfolders(&keys, &base);
    log::info!("Found {} folders under '{base}'", folders.len());

    let mut stats = UploadStats::default();
    for folder in folders {
        let key = format!("{folder}{dest_name}");
        match store.upload(file, &key) {
            Ok(()) => stats.uploaded += 1,
            Err(e) => {
                log::error!("Failed to upload to {key}: {e}");
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

/// Immediate sub-folders of `prefix` (which ends in `/`) implied by `keys`,
/// sorted, each ending in `/`. Folder placeholder keys are ignored.
pub fn subfolders(keys: &[String], prefix: &str) -> Vec<String> {
    let folders: BTreeSet<String> = keys
        .iter()
        .filter(|key| !key.ends_with('/'))
        .filter_map(|key| key.strip_prefix(prefix))
        .filter_map(|rest| rest.split_once('/'))
        .filter(|(first, _)| !first.is_empty())
        .map(|(first, _)| format!("{prefix}{first}/"))
        .collect();
    folders.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::memory::MemoryStore;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_subfolders() {
        let found = subfolders(
            &keys(&[
                "webdata/drillcore/DDH-02/composites/1.jpg",
                "webdata/drillcore/DDH-01/README.txt",
                "webdata/drillcore/DDH-01/x.html",
                "webdata/drillcore/EMPTY/",
                "webdata/drillcore/loose.txt",
                "webdata/drillcore//odd.txt",
                "webdata/other/Z/a.txt",
            ]),
            "webdata/drillcore/",
        );
        assert_eq!(
            found,
            vec!["webdata/drillcore/DDH-01/", "webdata/drillcore/DDH-02/"]
        );
    }

    #[test]
    fn test_uploads_file_into_every_folder() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("README.txt");
        std::fs::write(&file, "read me").unwrap();

        let store = MemoryStore::with_keys(&[
            "webdata/drillcore/DDH-01/composites/1.jpg",
            "webdata/drillcore/DDH-02/DDH-02_DATA.html",
        ]);
        let stats = run(&store, "webdata/drillcore", &file, "README.txt").unwrap();

        assert_eq!(stats.uploaded, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(
            store.body("webdata/drillcore/DDH-02/README.txt").unwrap(),
            b"read me"
        );
        assert!(store.body("webdata/drillcore/DDH-01/README.txt").is_some());
    }

    #[test]
    fn test_unreadable_file_counts_failures() {
        let store = MemoryStore::with_keys(&["webdata/drillcore/DDH-01/a.txt"]);
        let stats = run(&store, "webdata/drillcore", Path::new("/no/such/file.txt"), "README.txt").unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.uploaded, 0);
    }
}
