//! The poll scheduler.
//!
//! A recurring tick fetches every enabled dataset kind concurrently (one
//! blocking task per kind) and applies the successes to the mission view
//! sequentially, each reconciliation running to completion before the next
//! begins. Failures are contained per kind and per cycle: the prior overlay
//! state stays in place and the next tick retries naturally.

use crate::fetch::{DatasetSource, FetchError};
use overlay::{ApplyStats, MissionView, RenderSurface};
use shared::kind::OverlayKind;
use shared::model::DataError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// What happened to one kind during one tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// Fetched and reconciled.
    Applied(ApplyStats),
    /// Fetched but rejected by the data contract; prior overlays kept.
    Rejected(DataError),
    /// Fetch did not produce a payload; prior overlays kept.
    Failed(FetchError),
}

/// Per-kind outcomes of one tick, in poll order.
#[derive(Debug, Default)]
pub struct TickReport {
    pub outcomes: Vec<(OverlayKind, TickOutcome)>,
}

impl TickReport {
    pub fn outcome(&self, kind: OverlayKind) -> Option<&TickOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }
}

/// Drives a [`MissionView`] from a [`DatasetSource`] on a fixed period.
pub struct SyncLoop<S: RenderSurface> {
    source: Arc<dyn DatasetSource>,
    view: MissionView<S>,
    poll_interval: Duration,
    kinds: Vec<OverlayKind>,
}

impl<S: RenderSurface> SyncLoop<S> {
    /// Poll every overlay kind.
    pub fn new(source: Arc<dyn DatasetSource>, view: MissionView<S>, poll_interval: Duration) -> Self {
        Self::with_kinds(source, view, poll_interval, OverlayKind::ALL.to_vec())
    }

    /// Poll a subset of kinds (e.g. simulation overlays only, before a
    /// mission has been configured).
    pub fn with_kinds(
        source: Arc<dyn DatasetSource>,
        view: MissionView<S>,
        poll_interval: Duration,
        kinds: Vec<OverlayKind>,
    ) -> Self {
        Self {
            source,
            view,
            poll_interval,
            kinds,
        }
    }

    pub fn view(&self) -> &MissionView<S> {
        &self.view
    }

    /// User-initiated toggles interleave between ticks through this.
    pub fn view_mut(&mut self) -> &mut MissionView<S> {
        &mut self.view
    }

    /// One fetch+reconcile pass over all enabled kinds.
    pub async fn tick(&mut self) -> TickReport {
        let mut tasks = Vec::with_capacity(self.kinds.len());
        for &kind in &self.kinds {
            let source = Arc::clone(&self.source);
            tasks.push((kind, task::spawn_blocking(move || source.fetch(kind))));
        }

        let mut report = TickReport::default();
        for (kind, handle) in tasks {
            let outcome = match handle.await {
                Ok(Ok(dataset)) => match self.view.apply(dataset) {
                    Ok(stats) => {
                        debug!(
                            %kind,
                            created = stats.created,
                            updated = stats.updated,
                            removed = stats.removed,
                            skipped = stats.skipped,
                            "reconciled"
                        );
                        TickOutcome::Applied(stats)
                    }
                    Err(err) => {
                        warn!(%kind, error = %err, "dataset rejected, keeping previous overlays");
                        TickOutcome::Rejected(err)
                    }
                },
                Ok(Err(err)) => {
                    warn!(%kind, error = %err, "fetch failed, keeping previous overlays");
                    TickOutcome::Failed(err)
                }
                Err(join_err) => {
                    warn!(%kind, error = %join_err, "fetch task died, keeping previous overlays");
                    TickOutcome::Failed(FetchError::Network(join_err.to_string()))
                }
            };
            report.outcomes.push((kind, outcome));
        }
        report
    }

    /// Run forever: an immediate first pass, then one per poll interval.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay::test_util::RecordingSurface;
    use shared::geo::LonLat;
    use shared::model::{Dataset, IslMarker, RegionShape, RobotState};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Scripted source with switchable per-kind failures.
    struct StubSource {
        robots: Mutex<Vec<RobotState>>,
        isl_down: AtomicBool,
        fetched: Mutex<Vec<OverlayKind>>,
    }

    impl StubSource {
        fn new(robots: Vec<RobotState>) -> Self {
            Self {
                robots: Mutex::new(robots),
                isl_down: AtomicBool::new(false),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn set_robots(&self, robots: Vec<RobotState>) {
            *self.robots.lock().unwrap() = robots;
        }
    }

    impl DatasetSource for StubSource {
        fn fetch(&self, kind: OverlayKind) -> Result<Dataset, FetchError> {
            self.fetched.lock().unwrap().push(kind);
            match kind {
                OverlayKind::Robots => Ok(Dataset::Robots(self.robots.lock().unwrap().clone())),
                OverlayKind::Isl => {
                    if self.isl_down.load(Ordering::SeqCst) {
                        Err(FetchError::Network("connection refused".to_string()))
                    } else {
                        Ok(Dataset::Isl(vec![IslMarker::new(
                            LonLat::new(-35.0, -9.0),
                            "relay",
                        )]))
                    }
                }
                OverlayKind::Particles => Ok(Dataset::Particles(vec![LonLat::new(-35.1, -9.1)])),
                OverlayKind::Region => Ok(Dataset::Region(RegionShape::new(
                    vec![
                        LonLat::new(0.0, 0.0),
                        LonLat::new(1.0, 0.0),
                        LonLat::new(1.0, 1.0),
                        LonLat::new(0.0, 0.0),
                    ],
                    Vec::new(),
                ))),
            }
        }
    }

    fn robots(positions: &[(f64, f64)]) -> Vec<RobotState> {
        positions
            .iter()
            .map(|&(lon, lat)| RobotState::new(LonLat::new(lon, lat), 0.0))
            .collect()
    }

    #[tokio::test]
    async fn test_tick_populates_every_kind() {
        let source = Arc::new(StubSource::new(robots(&[(0.0, 0.0), (1.0, 1.0)])));
        let view = MissionView::new(RecordingSurface::new());
        let mut sync = SyncLoop::new(source, view, Duration::from_millis(10));

        let report = sync.tick().await;
        assert_eq!(report.outcomes.len(), 4);
        assert!(report
            .outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, TickOutcome::Applied(_))));
        assert_eq!(sync.view().handle_count(OverlayKind::Robots), 2);
        assert_eq!(sync.view().handle_count(OverlayKind::Isl), 1);
        assert_eq!(sync.view().handle_count(OverlayKind::Particles), 1);
        assert_eq!(sync.view().handle_count(OverlayKind::Region), 1);
    }

    #[tokio::test]
    async fn test_failed_kind_does_not_block_others() {
        let source = Arc::new(StubSource::new(robots(&[(0.0, 0.0)])));
        let view = MissionView::new(RecordingSurface::new());
        let mut sync = SyncLoop::new(Arc::clone(&source) as Arc<dyn DatasetSource>, view, Duration::from_millis(10));

        sync.tick().await;
        let isl_before: Vec<_> = sync
            .view()
            .store()
            .all(OverlayKind::Isl)
            .map(|(_, h)| h.clone())
            .collect();

        // ISL goes down, robots move.
        source.isl_down.store(true, Ordering::SeqCst);
        source.set_robots(robots(&[(5.0, 5.0)]));
        let report = sync.tick().await;

        assert!(matches!(
            report.outcome(OverlayKind::Isl),
            Some(TickOutcome::Failed(FetchError::Network(_)))
        ));
        assert!(matches!(
            report.outcome(OverlayKind::Robots),
            Some(TickOutcome::Applied(_))
        ));
        // Robots updated, ISL untouched.
        assert_eq!(
            sync.view()
                .store()
                .get(OverlayKind::Robots, 0)
                .unwrap()
                .position()
                .unwrap(),
            LonLat::new(5.0, 5.0)
        );
        let isl_after: Vec<_> = sync
            .view()
            .store()
            .all(OverlayKind::Isl)
            .map(|(_, h)| h.clone())
            .collect();
        assert_eq!(isl_after, isl_before);
    }

    #[tokio::test]
    async fn test_kind_subset_limits_polling() {
        let source = Arc::new(StubSource::new(Vec::new()));
        let view = MissionView::new(RecordingSurface::new());
        let mut sync = SyncLoop::with_kinds(
            Arc::clone(&source) as Arc<dyn DatasetSource>,
            view,
            Duration::from_millis(10),
            OverlayKind::SIMULATION_ONLY.to_vec(),
        );

        sync.tick().await;
        let fetched = source.fetched.lock().unwrap().clone();
        assert_eq!(fetched.len(), 2);
        assert!(fetched.contains(&OverlayKind::Particles));
        assert!(fetched.contains(&OverlayKind::Isl));
        assert_eq!(sync.view().handle_count(OverlayKind::Robots), 0);
    }

    #[tokio::test]
    async fn test_toggle_between_ticks_preserves_data() {
        let source = Arc::new(StubSource::new(robots(&[(0.0, 0.0), (1.0, 1.0)])));
        let view = MissionView::new(RecordingSurface::new());
        let mut sync = SyncLoop::new(source, view, Duration::from_millis(10));

        sync.tick().await;
        assert_eq!(sync.view().surface().attached_markers().len(), 3);
        sync.view_mut().toggle(OverlayKind::Robots);
        // Only the ISL marker stays attached.
        assert_eq!(sync.view().surface().attached_markers().len(), 1);
        sync.view_mut().toggle(OverlayKind::Robots);
        assert_eq!(sync.view().surface().attached_markers().len(), 3);
        assert_eq!(sync.view().handle_count(OverlayKind::Robots), 2);
    }
}
