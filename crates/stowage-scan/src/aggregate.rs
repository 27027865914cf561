//! JWalk-based tree aggregation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::{DirEntry, Parallelism, WalkDirGeneric};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use stowage_core::{FileRecord, ScanConfig, ScanError, ScanWarning};

use crate::inode::InodeTracker;
use crate::probe::{FileProbe, FsProbe, get_dev};
use crate::progress::ScanProgress;

/// Files between two progress broadcasts.
const PROGRESS_INTERVAL: u64 = 1000;

/// Walker client state; the entry flag marks a directory left unread
/// because it lives on another filesystem.
type WalkState = ((), bool);

/// Everything one traversal pass produced.
#[derive(Debug, Clone)]
pub struct TreeAggregate {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Sum of `size_bytes` over `records`.
    pub total_file_bytes: u64,
    /// One record per regular file that could be stat-ed, in walk order.
    pub records: Vec<FileRecord>,
    /// Entries left out because they could not be read.
    pub skipped: Vec<ScanWarning>,
    /// Directories entered, the root included.
    pub dirs_visited: u64,
    /// Wall-clock duration of the pass.
    pub duration: Duration,
}

impl TreeAggregate {
    /// Number of file records.
    pub fn file_count(&self) -> u64 {
        self.records.len() as u64
    }

    /// Check if the walk found no readable files.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walks a directory once, summing file sizes and collecting access times.
pub struct TreeAggregator {
    progress_tx: broadcast::Sender<ScanProgress>,
    probe: Option<Arc<dyn FileProbe>>,
    cancel: CancellationToken,
}

impl TreeAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            probe: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a custom metadata probe instead of the platform `stat`.
    pub fn with_probe(mut self, probe: impl FileProbe + 'static) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Stop the walk when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this aggregator's walks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root` and aggregate every regular file below it.
    ///
    /// Unreadable files and directories are skipped and reported in
    /// [`TreeAggregate::skipped`], as are mount points when
    /// `cross_filesystems` is off. Fails only when the root is invalid or
    /// unreadable, a pattern does not compile, or the walk is cancelled.
    pub fn aggregate(&self, config: &ScanConfig) -> Result<TreeAggregate, ScanError> {
        let root = resolve_root(&config.root)?;
        let filter = EntryFilter::new(config, &root, self.cancel.clone())?;
        self.walk(root, config, filter)
    }

    fn walk(
        &self,
        root: PathBuf,
        config: &ScanConfig,
        filter: EntryFilter,
    ) -> Result<TreeAggregate, ScanError> {
        let start = Instant::now();

        let probe: Arc<dyn FileProbe> = match &self.probe {
            Some(probe) => Arc::clone(probe),
            None => Arc::new(FsProbe::new(config.follow_symlinks)),
        };

        info!(root = %root.display(), "aggregating directory tree");

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDirGeneric::<WalkState>::new(&root)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                if filter.cancel.is_cancelled() {
                    children.clear();
                    return;
                }
                children.retain(|entry| entry.as_ref().map_or(true, |e| filter.keep(e)));
                for entry in children.iter_mut().flatten() {
                    if filter.on_other_device(entry) {
                        entry.read_children_path = None;
                        entry.client_state = true;
                    }
                }
            });

        let inode_tracker = InodeTracker::new();
        let mut progress = ScanProgress::new();
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut total_file_bytes: u64 = 0;

        for entry_result in walker {
            if self.cancel.is_cancelled() {
                info!(root = %root.display(), "aggregation cancelled");
                return Err(ScanError::Cancelled);
            }

            let mut entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    debug!(path = %path.display(), error = %err, "skipping unreadable entry");
                    skipped.push(ScanWarning::read_error(path, err.to_string()));
                    progress.errors_count += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let path = entry.path();
                if entry.client_state {
                    debug!(path = %path.display(), "not descending into another filesystem");
                    skipped.push(ScanWarning::other_filesystem(path));
                    progress.errors_count += 1;
                    continue;
                }
                if let Some(err) = entry.read_children_error.take() {
                    if entry.depth == 0 {
                        return Err(root_read_error(&path, err));
                    }
                    debug!(path = %path.display(), error = %err, "skipping unreadable directory");
                    let message = format!("Cannot read directory {}: {err}", path.display());
                    skipped.push(ScanWarning::read_error(path, message));
                    progress.errors_count += 1;
                    continue;
                }
                progress.dirs_scanned += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let stat = match probe.probe(&path) {
                Ok(stat) => stat,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping file that cannot be stat-ed");
                    skipped.push(ScanWarning::from_stat_error(&path, &err));
                    progress.errors_count += 1;
                    continue;
                }
            };

            // Later links to an already counted inode contribute no bytes.
            let size = match stat.inode {
                Some(inode) if config.dedupe_hardlinks && stat.nlink > 1 => {
                    if inode_tracker.track(inode) { stat.size } else { 0 }
                }
                _ => stat.size,
            };

            total_file_bytes += size;
            progress.files_scanned += 1;
            progress.bytes_scanned = total_file_bytes;
            records.push(FileRecord::new(path, size, stat.accessed));

            if progress.files_scanned % PROGRESS_INTERVAL == 0 {
                progress.elapsed = start.elapsed();
                progress.current_path = records
                    .last()
                    .map(|r| r.path.clone())
                    .unwrap_or_default();
                let _ = self.progress_tx.send(progress.clone());
            }
        }

        // A cancel that lands after the last entry still empties pending
        // directories, so the walk above may have ended early.
        if self.cancel.is_cancelled() {
            info!(root = %root.display(), "aggregation cancelled");
            return Err(ScanError::Cancelled);
        }

        let duration = start.elapsed();
        progress.elapsed = duration;
        progress.current_path = root.clone();
        let _ = self.progress_tx.send(progress.clone());

        info!(
            root = %root.display(),
            files = records.len(),
            bytes = total_file_bytes,
            skipped = skipped.len(),
            "aggregation finished"
        );

        Ok(TreeAggregate {
            root,
            total_file_bytes,
            records,
            skipped,
            dirs_visited: progress.dirs_scanned,
            duration,
        })
    }
}

impl Default for TreeAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate `root` with the default configuration.
pub fn aggregate_tree(root: impl AsRef<Path>) -> Result<TreeAggregate, ScanError> {
    TreeAggregator::new().aggregate(&ScanConfig::new(root.as_ref()))
}

/// Canonicalize a scan target and check that it is a directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved = root.canonicalize().map_err(|e| match ScanError::io(root, e) {
        ScanError::PathNotFound { path } => ScanError::DirectoryNotFound { path },
        other => other,
    })?;

    if !resolved.is_dir() {
        return Err(ScanError::DirectoryNotFound { path: resolved });
    }
    std::fs::read_dir(&resolved).map_err(|e| ScanError::io(&resolved, e))?;
    Ok(resolved)
}

/// Root listing failed after the target check passed.
fn root_read_error(root: &Path, err: jwalk::Error) -> ScanError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(source) => ScanError::io(root, source),
        None => ScanError::Other { message },
    }
}

/// Per-directory filter applied by the walker before descending.
struct EntryFilter {
    config: ScanConfig,
    ignore: GlobSet,
    root_device: Option<u64>,
    cancel: CancellationToken,
}

impl EntryFilter {
    fn new(config: &ScanConfig, root: &Path, cancel: CancellationToken) -> Result<Self, ScanError> {
        let ignore = build_ignore_set(&config.ignore_patterns)?;
        let root_device = if config.cross_filesystems {
            None
        } else {
            let metadata = std::fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
            Some(get_dev(&metadata))
        };

        Ok(Self {
            config: config.clone(),
            ignore,
            root_device,
            cancel,
        })
    }

    fn keep(&self, entry: &DirEntry<WalkState>) -> bool {
        let name = entry.file_name().to_string_lossy();
        !self.config.should_skip_hidden(&name) && !self.ignore.is_match(name.as_ref())
    }

    /// Directory whose device differs from the root's, when crossing is off.
    fn on_other_device(&self, entry: &DirEntry<WalkState>) -> bool {
        match self.root_device {
            Some(device) if entry.file_type().is_dir() => entry
                .metadata()
                .is_ok_and(|metadata| get_dev(&metadata) != device),
            _ => false,
        }
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
            message: format!("bad ignore pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanError::InvalidConfig {
        message: e.to_string(),
    })
}
