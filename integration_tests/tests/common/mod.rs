use std::collections::HashMap;

use core_mirror::{CancelToken, ChainQuery, ChunkStore, FetchError, ProgressSink, SnapshotStage};
use mirror_schema::{
    Arrival, Artifact, ArtifactId, BurnedCoords, Chunk, ClaimedCoords, ContractConstants,
    EthAddress, KardashevCoords, LocationId, Planet, Player, RevealedCoords, Union, WorldCoords,
    WorldLocation,
};

pub fn location(tag: &str) -> LocationId {
    LocationId(format!("0x{tag}"))
}

pub fn address(tag: &str) -> EthAddress {
    EthAddress::new(format!("0x{tag:0>40}"))
}

pub fn owned_planet(tag: &str, owner: &EthAddress) -> Planet {
    Planet {
        location_id: location(tag),
        owner: owner.clone(),
        energy: 50.0,
        energy_cap: 100.0,
        silver_cap: 500.0,
        defense: 100.0,
        speed: 10.0,
        last_updated: 1_000.0,
        ..Default::default()
    }
}

pub fn revealed(tag: &str, revealer: &EthAddress) -> RevealedCoords {
    RevealedCoords {
        hash: location(tag),
        x: 1,
        y: 2,
        revealer: revealer.clone(),
    }
}

pub fn chunk_with(tags: &[&str]) -> Chunk {
    Chunk {
        locations: tags
            .iter()
            .map(|tag| WorldLocation {
                hash: location(tag),
                coords: WorldCoords { x: 0, y: 0 },
            })
            .collect(),
    }
}

/// Everything the fixture chain can serve. Paginated collections hold the
/// full on-chain list; the trait impl slices past the requested cursor.
#[derive(Default, Clone)]
pub struct FixtureWorld {
    pub constants: ContractConstants,
    pub paused: bool,
    pub half_price: bool,
    pub world_radius: f64,
    pub inner_radius: f64,
    pub own_address: EthAddress,
    pub players: Vec<Player>,
    pub unions: Vec<Union>,
    pub touched_ids: Vec<LocationId>,
    pub revealed: Vec<RevealedCoords>,
    pub claimed: Vec<ClaimedCoords>,
    pub burned: Vec<BurnedCoords>,
    pub kardashev: Vec<KardashevCoords>,
    pub arrivals: Vec<Arrival>,
    pub planets: HashMap<LocationId, Planet>,
    pub artifacts: HashMap<ArtifactId, Artifact>,
    pub artifacts_by_planet: HashMap<LocationId, Vec<Artifact>>,
    pub player_artifacts: HashMap<EthAddress, Vec<Artifact>>,
}

/// In-memory chain-query collaborator. `fail_at` turns one sub-fetch into an
/// error; `cancel_during_arrivals` flips the supplied token while the arrival
/// fetch is in flight, mimicking a user abort mid-build.
pub struct FixtureChain {
    pub world: FixtureWorld,
    pub fail_at: Option<SnapshotStage>,
    pub cancel_during_arrivals: Option<CancelToken>,
}

impl FixtureChain {
    pub fn new(world: FixtureWorld) -> Self {
        Self {
            world,
            fail_at: None,
            cancel_during_arrivals: None,
        }
    }

    fn guard(&self, stage: SnapshotStage) -> Result<(), FetchError> {
        match self.fail_at {
            Some(failing) if failing == stage => {
                Err(FetchError::msg(format!("fixture failure at {stage}")))
            }
            _ => Ok(()),
        }
    }
}

fn page<T: Clone>(full: &[T], since_count: usize, progress: &dyn ProgressSink) -> Vec<T> {
    progress.notify(1.0);
    full.get(since_count..).unwrap_or_default().to_vec()
}

impl ChainQuery for FixtureChain {
    fn constants(&self) -> Result<ContractConstants, FetchError> {
        self.guard(SnapshotStage::Constants)?;
        Ok(self.world.constants)
    }

    fn address(&self) -> EthAddress {
        self.world.own_address.clone()
    }

    fn world_radius(&self) -> Result<f64, FetchError> {
        self.guard(SnapshotStage::WorldRadius)?;
        Ok(self.world.world_radius)
    }

    fn inner_radius(&self) -> Result<f64, FetchError> {
        self.guard(SnapshotStage::InnerRadius)?;
        Ok(self.world.inner_radius)
    }

    fn is_paused(&self) -> Result<bool, FetchError> {
        self.guard(SnapshotStage::Paused)?;
        Ok(self.world.paused)
    }

    fn is_half_price(&self) -> Result<bool, FetchError> {
        self.guard(SnapshotStage::HalfPrice)?;
        Ok(self.world.half_price)
    }

    fn players(&self, progress: &dyn ProgressSink) -> Result<Vec<Player>, FetchError> {
        self.guard(SnapshotStage::Players)?;
        progress.notify(1.0);
        Ok(self.world.players.clone())
    }

    fn unions(&self, progress: &dyn ProgressSink) -> Result<Vec<Union>, FetchError> {
        self.guard(SnapshotStage::Unions)?;
        progress.notify(1.0);
        Ok(self.world.unions.clone())
    }

    fn touched_planet_ids(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<LocationId>, FetchError> {
        self.guard(SnapshotStage::TouchedPlanetIds)?;
        Ok(page(&self.world.touched_ids, since_count, progress))
    }

    fn revealed_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RevealedCoords>, FetchError> {
        self.guard(SnapshotStage::RevealedCoords)?;
        Ok(page(&self.world.revealed, since_count, progress))
    }

    fn claimed_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ClaimedCoords>, FetchError> {
        self.guard(SnapshotStage::ClaimedCoords)?;
        Ok(page(&self.world.claimed, since_count, progress))
    }

    fn burned_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<BurnedCoords>, FetchError> {
        self.guard(SnapshotStage::BurnedCoords)?;
        Ok(page(&self.world.burned, since_count, progress))
    }

    fn kardashev_coords(
        &self,
        since_count: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<KardashevCoords>, FetchError> {
        self.guard(SnapshotStage::KardashevCoords)?;
        Ok(page(&self.world.kardashev, since_count, progress))
    }

    fn pending_arrivals(
        &self,
        planet_ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Arrival>, FetchError> {
        self.guard(SnapshotStage::PendingArrivals)?;
        if let Some(token) = &self.cancel_during_arrivals {
            token.cancel();
        }
        progress.notify(1.0);
        Ok(self
            .world
            .arrivals
            .iter()
            .filter(|arrival| planet_ids.contains(&arrival.to_planet))
            .cloned()
            .collect())
    }

    fn bulk_planets(
        &self,
        ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<HashMap<LocationId, Planet>, FetchError> {
        self.guard(SnapshotStage::Planets)?;
        progress.notify(1.0);
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.world
                    .planets
                    .get(id)
                    .map(|planet| (id.clone(), planet.clone()))
            })
            .collect())
    }

    fn bulk_artifacts(
        &self,
        ids: &[ArtifactId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Artifact>, FetchError> {
        self.guard(SnapshotStage::ArtifactsOnVoyages)?;
        progress.notify(1.0);
        Ok(ids
            .iter()
            .filter_map(|id| self.world.artifacts.get(id).cloned())
            .collect())
    }

    fn artifacts_on_planets(
        &self,
        ids: &[LocationId],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Vec<Artifact>>, FetchError> {
        self.guard(SnapshotStage::ArtifactsOnPlanets)?;
        progress.notify(1.0);
        Ok(ids
            .iter()
            .map(|id| {
                self.world
                    .artifacts_by_planet
                    .get(id)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    fn player_artifacts(
        &self,
        address: &EthAddress,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Artifact>, FetchError> {
        self.guard(SnapshotStage::OwnArtifacts)?;
        progress.notify(1.0);
        Ok(self
            .world
            .player_artifacts
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory chunk store holding cached prefixes of the chain's lists plus
/// the locally mined chunks.
#[derive(Default, Clone)]
pub struct FixtureStore {
    pub touched_ids: Vec<LocationId>,
    pub revealed: Vec<RevealedCoords>,
    pub claimed: Vec<ClaimedCoords>,
    pub burned: Vec<BurnedCoords>,
    pub kardashev: Vec<KardashevCoords>,
    pub chunks: Vec<Chunk>,
}

impl ChunkStore for FixtureStore {
    fn saved_touched_planet_ids(&self) -> Result<Vec<LocationId>, FetchError> {
        Ok(self.touched_ids.clone())
    }

    fn saved_revealed_coords(&self) -> Result<Vec<RevealedCoords>, FetchError> {
        Ok(self.revealed.clone())
    }

    fn saved_claimed_coords(&self) -> Result<Vec<ClaimedCoords>, FetchError> {
        Ok(self.claimed.clone())
    }

    fn saved_burned_coords(&self) -> Result<Vec<BurnedCoords>, FetchError> {
        Ok(self.burned.clone())
    }

    fn saved_kardashev_coords(&self) -> Result<Vec<KardashevCoords>, FetchError> {
        Ok(self.kardashev.clone())
    }

    fn all_chunks(&self) -> Result<Vec<Chunk>, FetchError> {
        Ok(self.chunks.clone())
    }
}
