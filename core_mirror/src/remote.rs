use std::collections::HashMap;

use mirror_schema::{
    Arrival, Artifact, ArtifactId, BurnedCoords, Chunk, ClaimedCoords, ContractConstants,
    EthAddress, KardashevCoords, LocationId, Planet, Player, RevealedCoords, Union,
};
use thiserror::Error;

use crate::progress::ProgressSink;

/// Failure surfaced by a remote or cache collaborator. Retry and backoff
/// policy live with the transport, not here.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct FetchError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl FetchError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Read-only view of the game contract. Paginated collections take a cursor
/// (`since_count` entries are already held locally) and report fractional
/// progress through the supplied sink.
///
/// Implementations own batching, retries and timeouts; every method is
/// expected to block until complete or failed.
pub trait ChainQuery: Send + Sync {
    fn constants(&self) -> Result<ContractConstants, FetchError>;

    /// Address of the account this client plays as.
    fn address(&self) -> EthAddress;

    fn world_radius(&self) -> Result<f64, FetchError>;

    fn inner_radius(&self) -> Result<f64, FetchError>;

    fn is_paused(&self) -> Result<bool, FetchError>;

    fn is_half_price(&self) -> Result<bool, FetchError>;

    fn players(&self, progress: &dyn ProgressSink) -> Result<Vec<Player>, FetchError>;

    fn unions(&self, progress: &dyn ProgressSink) -> Result<Vec<Union>, FetchError>;

    fn touched_planet_ids(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<LocationId>, FetchError>;

    fn revealed_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RevealedCoords>, FetchError>;

    fn claimed_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ClaimedCoords>, FetchError>;

    fn burned_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<BurnedCoords>, FetchError>;

    fn kardashev_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<KardashevCoords>, FetchError>;

    /// Every pending voyage addressed to one of `planet_ids`.
    fn pending_arrivals(
        &self,
        planet_ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Arrival>, FetchError>;

    fn bulk_planets(
        &self,
        ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<HashMap<LocationId, Planet>, FetchError>;

    fn bulk_artifacts(
        &self,
        ids: &[ArtifactId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Artifact>, FetchError>;

    /// Artifacts held on each planet, parallel to `ids`.
    fn artifacts_on_planets(
        &self,
        ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Vec<Artifact>>, FetchError>;

    fn player_artifacts(
        &self,
        address: &EthAddress,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Artifact>, FetchError>;
}

/// Confirmed prior state persisted by an earlier session, plus the locally
/// mined map. Everything returned here is trusted as already-confirmed.
pub trait ChunkStore: Send + Sync {
    fn saved_touched_planet_ids(&self) -> Result<Vec<LocationId>, FetchError>;

    fn saved_revealed_coords(&self) -> Result<Vec<RevealedCoords>, FetchError>;

    fn saved_claimed_coords(&self) -> Result<Vec<ClaimedCoords>, FetchError>;

    fn saved_burned_coords(&self) -> Result<Vec<BurnedCoords>, FetchError>;

    fn saved_kardashev_coords(&self) -> Result<Vec<KardashevCoords>, FetchError>;

    fn all_chunks(&self) -> Result<Vec<Chunk>, FetchError>;
}
