//! One-shot scan pipeline: volume, tree, ranking, report.

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use stowage_core::{ScanConfig, ScanError, ScanResult, ScanStage};
use stowage_scan::{
    CancellationToken, FileProbe, ScanProgress, TreeAggregator, inspect_volume_or_zeroed,
    resolve_root,
};

use crate::stale::rank_stale;

/// Runs a single scan from target path to assembled [`ScanResult`].
///
/// A pipeline is consumed by [`ScanPipeline::run`]; every scan starts from a
/// fresh instance with its own accumulators.
pub struct ScanPipeline {
    config: ScanConfig,
    aggregator: TreeAggregator,
    stage: ScanStage,
    stage_tx: broadcast::Sender<ScanStage>,
}

impl ScanPipeline {
    /// Create a pipeline for `config`.
    pub fn new(config: ScanConfig) -> Self {
        let (stage_tx, _) = broadcast::channel(16);
        Self {
            config,
            aggregator: TreeAggregator::new(),
            stage: ScanStage::Idle,
            stage_tx,
        }
    }

    /// Use a custom metadata probe for the tree walk.
    pub fn with_probe(mut self, probe: impl FileProbe + 'static) -> Self {
        self.aggregator = self.aggregator.with_probe(probe);
        self
    }

    /// Stop the scan when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.aggregator = self.aggregator.with_cancellation(token);
        self
    }

    /// Token that cancels this pipeline.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.aggregator.cancellation_token()
    }

    /// Subscribe to stage transitions.
    pub fn subscribe_stages(&self) -> broadcast::Receiver<ScanStage> {
        self.stage_tx.subscribe()
    }

    /// Subscribe to tree walk progress.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ScanProgress> {
        self.aggregator.subscribe()
    }

    /// Current stage.
    pub fn stage(&self) -> ScanStage {
        self.stage
    }

    /// Run every stage and hand back the report.
    ///
    /// The target is validated once up front. A volume that cannot be
    /// queried is reported as zeroed with `volume_measured == false`; a
    /// cancelled scan yields [`ScanError::Cancelled`] and no report.
    pub fn run(mut self) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let cancel = self.aggregator.cancellation_token();
        let target = resolve_root(&self.config.root)?;

        info!(target = %target.display(), "starting scan");

        let (volume, volume_error) = inspect_volume_or_zeroed(&target);
        if let Some(err) = &volume_error {
            warn!(target = %target.display(), error = %err, "volume capacity unavailable");
        }
        self.advance(ScanStage::VolumeQueried);

        let mut walk_config = self.config.clone();
        walk_config.root = target.clone();
        let aggregate = self.aggregator.aggregate(&walk_config)?;
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        self.advance(ScanStage::TreeWalked);

        let stale_candidates = rank_stale(&aggregate.records, self.config.stale_count);
        self.advance(ScanStage::Ranked);

        let file_count = aggregate.file_count();
        let files = if self.config.retain_records {
            aggregate.records
        } else {
            Vec::new()
        };

        let result = ScanResult::builder()
            .target(target)
            .volume(volume)
            .volume_measured(volume_error.is_none())
            .total_file_bytes(aggregate.total_file_bytes)
            .file_count(file_count)
            .stale_candidates(stale_candidates)
            .skipped(aggregate.skipped)
            .files(files)
            .scan_duration(start.elapsed())
            .build()?;
        self.advance(ScanStage::Assembled);

        info!(
            target = %result.target.display(),
            files = result.file_count,
            bytes = result.total_file_bytes,
            skipped = result.skipped.len(),
            "scan finished"
        );

        self.advance(ScanStage::Delivered);
        Ok(result)
    }

    fn advance(&mut self, next: ScanStage) {
        debug_assert_eq!(self.stage.next(), Some(next), "scan stages run in order");
        debug!(from = ?self.stage, to = ?next, "scan stage");
        self.stage = next;
        let _ = self.stage_tx.send(next);
    }
}

/// Run a scan with `config` and no external cancellation.
pub fn run_scan(config: ScanConfig) -> Result<ScanResult, ScanError> {
    ScanPipeline::new(config).run()
}
