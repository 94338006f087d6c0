//! Optimistic client-side mirror of the on-chain game world.
//!
//! Two halves. A deterministic [`Simulation`] reproduces the contract's
//! economic and combat math so planet state can be advanced and arrivals
//! resolved ahead of block confirmation. A [`SnapshotBuilder`] merges the
//! local chunk cache with paginated remote reads into one consistent,
//! deduplicated world index for the rest of the client to consume.
//!
//! The mirror is deliberately optimistic: per-arrival
//! [`PlanetDiff`] triples are handed to an external reconciliation layer
//! that compares against confirmed contract receipts and rolls back on
//! mismatch.

mod config;
mod engine;
mod fixed;
mod growth;
mod progress;
mod prospect;
mod remote;
mod snapshot;
mod upgrade;

pub use config::{
    load_mirror_config_from_env, MirrorConfig, MirrorConfigError, BUILTIN_MIRROR_CONFIG,
};
pub use engine::{PlanetDiff, ResolveError, Simulation};
pub use fixed::{scaled_damage, scaled_defender_loss, CONTRACT_PRECISION};
pub use growth::{energy_at_time, silver_over_time};
pub use progress::{
    ChannelProgress, NullProgress, ProgressEvent, ProgressSink, SnapshotProgress, SnapshotStage,
};
pub use prospect::{
    blocks_left_to_prospect_expiration, is_findable, is_prospectable, prospect_expired,
    PROSPECT_EXPIRATION_BLOCKS,
};
pub use remote::{ChainQuery, ChunkStore, FetchError};
pub use snapshot::{CancelToken, SnapshotBuilder, SnapshotError};
pub use upgrade::{apply_upgrade, remove_upgrade};
