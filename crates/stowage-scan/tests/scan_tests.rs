use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use stowage_scan::{
    CancellationToken, FileProbe, FileStat, FsProbe, ScanConfig, ScanError, TreeAggregator,
    WarningKind, aggregate_tree, inspect_volume_or_zeroed,
};
use tempfile::TempDir;

/// Fails for one file name, delegates everything else to the real stat.
struct LockedFileProbe {
    locked: &'static str,
}

impl FileProbe for LockedFileProbe {
    fn probe(&self, path: &Path) -> io::Result<FileStat> {
        if path.file_name().is_some_and(|n| n == self.locked) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
        }
        FsProbe::default().probe(path)
    }
}

/// Cancels the token once a number of files have been stat-ed.
struct CancellingProbe {
    token: CancellationToken,
    after: usize,
    calls: AtomicUsize,
}

impl FileProbe for CancellingProbe {
    fn probe(&self, path: &Path) -> io::Result<FileStat> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            self.token.cancel();
        }
        FsProbe::default().probe(path)
    }
}

fn write_files(root: &Path, count: usize, size: usize) {
    for i in 0..count {
        fs::write(root.join(format!("file{i}.dat")), vec![b'x'; size]).unwrap();
    }
}

#[test]
fn test_empty_directory() {
    let temp = TempDir::new().unwrap();
    let aggregate = aggregate_tree(temp.path()).unwrap();

    assert_eq!(aggregate.total_file_bytes, 0);
    assert!(aggregate.records.is_empty());
    assert!(aggregate.skipped.is_empty());
}

#[test]
fn test_missing_root_is_directory_not_found() {
    let temp = TempDir::new().unwrap();
    let err = aggregate_tree(temp.path().join("nope")).unwrap_err();
    assert!(matches!(err, ScanError::DirectoryNotFound { .. }));
}

#[test]
fn test_total_equals_sum_of_records() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    fs::create_dir_all(root.join("d")).unwrap();
    write_files(root, 3, 10);
    write_files(&root.join("a"), 2, 123);
    write_files(&root.join("a/b/c"), 5, 7);
    write_files(&root.join("d"), 1, 4096);

    let aggregate = aggregate_tree(root).unwrap();
    let sum: u64 = aggregate.records.iter().map(|r| r.size_bytes).sum();

    assert_eq!(aggregate.file_count(), 11);
    assert_eq!(aggregate.total_file_bytes, sum);
    assert_eq!(sum, 3 * 10 + 2 * 123 + 5 * 7 + 4096);
}

#[test]
fn test_each_file_recorded_once() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    write_files(temp.path(), 20, 1);
    write_files(&temp.path().join("sub"), 20, 1);

    let config = ScanConfig::builder()
        .root(temp.path())
        .threads(4usize)
        .build()
        .unwrap();
    let aggregate = TreeAggregator::new().aggregate(&config).unwrap();

    let mut paths: Vec<_> = aggregate.records.iter().map(|r| r.path.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 40);
    assert_eq!(aggregate.total_file_bytes, 40);
}

#[test]
fn test_one_unreadable_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    write_files(temp.path(), 9, 1000);
    fs::write(temp.path().join("locked.bin"), vec![0u8; 1000]).unwrap();

    let aggregator = TreeAggregator::new().with_probe(LockedFileProbe {
        locked: "locked.bin",
    });
    let aggregate = aggregator.aggregate(&ScanConfig::new(temp.path())).unwrap();

    assert_eq!(aggregate.total_file_bytes, 9000);
    assert_eq!(aggregate.records.len(), 9);
    assert_eq!(aggregate.skipped.len(), 1);
    assert_eq!(aggregate.skipped[0].kind, WarningKind::PermissionDenied);
    assert!(aggregate.skipped[0].path.ends_with("locked.bin"));
}

#[test]
fn test_cancel_mid_traversal() {
    let temp = TempDir::new().unwrap();
    for dir in 0..10 {
        let sub = temp.path().join(format!("dir{dir}"));
        fs::create_dir(&sub).unwrap();
        write_files(&sub, 20, 16);
    }

    let token = CancellationToken::new();
    let aggregator = TreeAggregator::new()
        .with_cancellation(token.clone())
        .with_probe(CancellingProbe {
            token: token.clone(),
            after: 5,
            calls: AtomicUsize::new(0),
        });

    let err = aggregator
        .aggregate(&ScanConfig::new(temp.path()))
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(token.is_cancelled());
}

#[test]
fn test_volume_of_missing_path_is_zeroed() {
    let temp = TempDir::new().unwrap();
    let (usage, err) = inspect_volume_or_zeroed(temp.path().join("missing"));

    assert_eq!((usage.total_bytes, usage.used_bytes, usage.free_bytes), (0, 0, 0));
    assert!(matches!(err, Some(ScanError::PathNotFound { .. })));
}

/// Drop every permission bit on `dir`; `false` when they are not enforced.
#[cfg(unix)]
fn lock_dir(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(dir).is_ok() {
        unlock_dir(dir);
        return false;
    }
    true
}

#[cfg(unix)]
fn unlock_dir(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(temp.path().join("ok.bin"), vec![0u8; 7]).unwrap();
    fs::write(locked.join("data.bin"), vec![0u8; 5000]).unwrap();

    if !lock_dir(&locked) {
        return;
    }
    let result = aggregate_tree(temp.path());
    unlock_dir(&locked);

    let aggregate = result.unwrap();
    assert_eq!(aggregate.total_file_bytes, 7);
    assert_eq!(aggregate.file_count(), 1);
    assert_eq!(aggregate.skipped.len(), 1);
    assert_eq!(aggregate.skipped[0].kind, WarningKind::ReadError);
    assert!(aggregate.skipped[0].path.ends_with("locked"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("locked");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("data.bin"), vec![0u8; 100]).unwrap();

    if !lock_dir(&root) {
        return;
    }
    let result = aggregate_tree(&root);
    unlock_dir(&root);

    assert!(matches!(result, Err(ScanError::PermissionDenied { .. })));
}

#[test]
fn test_mounts_are_crossed_by_default() {
    assert!(ScanConfig::new("/").cross_filesystems);
}
