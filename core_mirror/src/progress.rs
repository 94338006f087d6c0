use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Sub-fetches of a snapshot build, used to label progress events and fetch
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotStage {
    LocalCache,
    Constants,
    WorldRadius,
    InnerRadius,
    Paused,
    HalfPrice,
    Players,
    Unions,
    TouchedPlanetIds,
    RevealedCoords,
    ClaimedCoords,
    BurnedCoords,
    KardashevCoords,
    PendingArrivals,
    Planets,
    ArtifactsOnVoyages,
    ArtifactsOnPlanets,
    OwnArtifacts,
}

impl SnapshotStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotStage::LocalCache => "local_cache",
            SnapshotStage::Constants => "constants",
            SnapshotStage::WorldRadius => "world_radius",
            SnapshotStage::InnerRadius => "inner_radius",
            SnapshotStage::Paused => "paused",
            SnapshotStage::HalfPrice => "half_price",
            SnapshotStage::Players => "players",
            SnapshotStage::Unions => "unions",
            SnapshotStage::TouchedPlanetIds => "touched_planet_ids",
            SnapshotStage::RevealedCoords => "revealed_coords",
            SnapshotStage::ClaimedCoords => "claimed_coords",
            SnapshotStage::BurnedCoords => "burned_coords",
            SnapshotStage::KardashevCoords => "kardashev_coords",
            SnapshotStage::PendingArrivals => "pending_arrivals",
            SnapshotStage::Planets => "planets",
            SnapshotStage::ArtifactsOnVoyages => "artifacts_on_voyages",
            SnapshotStage::ArtifactsOnPlanets => "artifacts_on_planets",
            SnapshotStage::OwnArtifacts => "own_artifacts",
        }
    }
}

impl fmt::Display for SnapshotStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fractional-progress notification for a single fetch. Notify-and-continue:
/// implementations must not block the fetch that reports through them.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, fraction: f32);
}

/// Per-build observer receiving progress from every stage.
pub trait SnapshotProgress: Send + Sync {
    fn stage_progress(&self, stage: SnapshotStage, fraction: f32);
}

/// Sink that discards every notification.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn notify(&self, _fraction: f32) {}
}

impl SnapshotProgress for NullProgress {
    fn stage_progress(&self, _stage: SnapshotStage, _fraction: f32) {}
}

/// Adapter binding one stage of a build to the build-wide observer.
pub(crate) struct StageProgress<'a> {
    stage: SnapshotStage,
    observer: &'a dyn SnapshotProgress,
}

impl<'a> StageProgress<'a> {
    pub(crate) fn new(stage: SnapshotStage, observer: &'a dyn SnapshotProgress) -> Self {
        Self { stage, observer }
    }
}

impl ProgressSink for StageProgress<'_> {
    fn notify(&self, fraction: f32) {
        self.observer.stage_progress(self.stage, fraction);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub stage: SnapshotStage,
    pub fraction: f32,
}

/// Observer that forwards progress events over a channel, for a UI thread to
/// drain at its own pace.
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn unbounded() -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl SnapshotProgress for ChannelProgress {
    fn stage_progress(&self, stage: SnapshotStage, fraction: f32) {
        if let Err(err) = self.sender.send(ProgressEvent { stage, fraction }) {
            log::warn!("Dropping snapshot progress event: {}", err);
        }
    }
}
