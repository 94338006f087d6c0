use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use mirror_schema::{
    Artifact, ArtifactId, BurnedCoords, ClaimedCoords, KardashevCoords, LocationId, RevealedCoords,
    Snapshot, VoyageId,
};
use thiserror::Error;

use crate::config::MirrorConfig;
use crate::progress::{SnapshotProgress, SnapshotStage, StageProgress};
use crate::remote::{ChainQuery, ChunkStore, FetchError};

/// Cooperative cancellation for an in-flight build. Cancelling never
/// interrupts an outstanding sub-fetch; it only discards the results once the
/// current wave completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A sub-fetch failed; the whole build fails with it. There is no
    /// partial-result fallback, the caller retries the entire build.
    #[error("snapshot fetch failed during {stage}: {source}")]
    Fetch {
        stage: SnapshotStage,
        source: FetchError,
    },
    #[error("snapshot build aborted")]
    Aborted,
}

fn fetched<T>(stage: SnapshotStage, result: Result<T, FetchError>) -> Result<T, SnapshotError> {
    result.map_err(|source| SnapshotError::Fetch { stage, source })
}

/// Merges the local chunk store with paginated remote reads into one
/// consistent, deduplicated [`Snapshot`] of world state.
pub struct SnapshotBuilder<'a> {
    remote: &'a dyn ChainQuery,
    cache: &'a dyn ChunkStore,
    config: MirrorConfig,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(remote: &'a dyn ChainQuery, cache: &'a dyn ChunkStore, config: MirrorConfig) -> Self {
        Self {
            remote,
            cache,
            config,
        }
    }

    /// Runs the full build. Independent sub-fetches run concurrently;
    /// arrivals gate the hydrate set and planet hydration gates the
    /// artifact/voyage indices. Building twice against unchanged remote and
    /// local state yields an identical snapshot.
    pub fn build(
        &self,
        observer: &dyn SnapshotProgress,
        cancel: &CancelToken,
    ) -> Result<Snapshot, SnapshotError> {
        tracing::debug!(target: "chain_mirror::snapshot", "snapshot.build.started");

        // Cached prior confirmed state. Redeployments can leave ids of old
        // universes behind; `ignore_cached_world` starts those lists empty.
        let cache = SnapshotStage::LocalCache;
        let stored_touched = if self.config.ignore_cached_world {
            Vec::new()
        } else {
            fetched(cache, self.cache.saved_touched_planet_ids())?
        };
        let stored_revealed = if self.config.ignore_cached_world {
            Vec::new()
        } else {
            fetched(cache, self.cache.saved_revealed_coords())?
        };
        let stored_claimed = fetched(cache, self.cache.saved_claimed_coords())?;
        let stored_burned = fetched(cache, self.cache.saved_burned_coords())?;
        let stored_kardashev = fetched(cache, self.cache.saved_kardashev_coords())?;
        let mined_ids: HashSet<LocationId> = fetched(cache, self.cache.all_chunks())?
            .into_iter()
            .flat_map(|chunk| chunk.locations)
            .map(|location| location.hash)
            .collect();

        if cancel.is_cancelled() {
            return Err(SnapshotError::Aborted);
        }

        // First remote wave: everything that only depends on cached cursors.
        let remote = self.remote;
        let fetch_burned = self.config.fetch_burned_coords;
        let fetch_kardashev = self.config.fetch_kardashev_coords;
        let touched_cursor = stored_touched.len();
        let revealed_cursor = stored_revealed.len();
        let claimed_cursor = stored_claimed.len();
        let burned_cursor = stored_burned.len();
        let kardashev_cursor = stored_kardashev.len();

        let (
            constants,
            world_radius,
            inner_radius,
            paused,
            half_price,
            players,
            unions,
            loaded_touched,
            loaded_revealed,
            loaded_claimed,
            loaded_burned,
            loaded_kardashev,
        ) = thread::scope(|scope| {
            let constants = scope.spawn(move || remote.constants());
            let world_radius = scope.spawn(move || remote.world_radius());
            let inner_radius = scope.spawn(move || remote.inner_radius());
            let paused = scope.spawn(move || remote.is_paused());
            let half_price = scope.spawn(move || remote.is_half_price());
            let players = scope.spawn(move || {
                remote.players(&StageProgress::new(SnapshotStage::Players, observer))
            });
            let unions = scope.spawn(move || {
                remote.unions(&StageProgress::new(SnapshotStage::Unions, observer))
            });
            let loaded_touched = scope.spawn(move || {
                remote.touched_planet_ids(
                    touched_cursor,
                    &StageProgress::new(SnapshotStage::TouchedPlanetIds, observer),
                )
            });
            let loaded_revealed = scope.spawn(move || {
                remote.revealed_coords(
                    revealed_cursor,
                    &StageProgress::new(SnapshotStage::RevealedCoords, observer),
                )
            });
            let loaded_claimed = scope.spawn(move || {
                remote.claimed_coords(
                    claimed_cursor,
                    &StageProgress::new(SnapshotStage::ClaimedCoords, observer),
                )
            });
            let loaded_burned = scope.spawn(move || {
                if fetch_burned {
                    remote.burned_coords(
                        burned_cursor,
                        &StageProgress::new(SnapshotStage::BurnedCoords, observer),
                    )
                } else {
                    Ok(Vec::new())
                }
            });
            let loaded_kardashev = scope.spawn(move || {
                if fetch_kardashev {
                    remote.kardashev_coords(
                        kardashev_cursor,
                        &StageProgress::new(SnapshotStage::KardashevCoords, observer),
                    )
                } else {
                    Ok(Vec::new())
                }
            });

            (
                constants.join().expect("constants fetch panicked"),
                world_radius.join().expect("world radius fetch panicked"),
                inner_radius.join().expect("inner radius fetch panicked"),
                paused.join().expect("paused fetch panicked"),
                half_price.join().expect("half price fetch panicked"),
                players.join().expect("players fetch panicked"),
                unions.join().expect("unions fetch panicked"),
                loaded_touched.join().expect("touched ids fetch panicked"),
                loaded_revealed.join().expect("revealed coords fetch panicked"),
                loaded_claimed.join().expect("claimed coords fetch panicked"),
                loaded_burned.join().expect("burned coords fetch panicked"),
                loaded_kardashev
                    .join()
                    .expect("kardashev coords fetch panicked"),
            )
        });

        if cancel.is_cancelled() {
            return Err(SnapshotError::Aborted);
        }

        let constants = fetched(SnapshotStage::Constants, constants)?;
        let world_radius = fetched(SnapshotStage::WorldRadius, world_radius)?;
        let inner_radius = fetched(SnapshotStage::InnerRadius, inner_radius)?;
        let paused = fetched(SnapshotStage::Paused, paused)?;
        let half_price = fetched(SnapshotStage::HalfPrice, half_price)?;
        let players = fetched(SnapshotStage::Players, players)?;
        let unions = fetched(SnapshotStage::Unions, unions)?;
        let loaded_touched = fetched(SnapshotStage::TouchedPlanetIds, loaded_touched)?;
        let loaded_revealed = fetched(SnapshotStage::RevealedCoords, loaded_revealed)?;
        let loaded_claimed = fetched(SnapshotStage::ClaimedCoords, loaded_claimed)?;
        let loaded_burned = fetched(SnapshotStage::BurnedCoords, loaded_burned)?;
        let loaded_kardashev = fetched(SnapshotStage::KardashevCoords, loaded_kardashev)?;

        // Concatenate cached + remote, then index each reveal kind by hash.
        // Reveals are immutable once surfaced, so no conflict resolution.
        let mut touched_planet_ids = stored_touched;
        touched_planet_ids.extend(loaded_touched);

        let revealed_coords = coords_by_hash(stored_revealed, loaded_revealed, |c: &RevealedCoords| c.hash.clone());
        let claimed_coords = coords_by_hash(stored_claimed, loaded_claimed, |c: &ClaimedCoords| c.hash.clone());
        let burned_coords = coords_by_hash(stored_burned, loaded_burned, |c: &BurnedCoords| c.hash.clone());
        let kardashev_coords =
            coords_by_hash(stored_kardashev, loaded_kardashev, |c: &KardashevCoords| c.hash.clone());

        // Hydrate only planets the client can do something with: locally
        // mined, or located through some reveal. Touched-but-unlocated
        // planets stay id-only.
        let mut hydrate_ids: Vec<LocationId> = touched_planet_ids
            .iter()
            .filter(|id| {
                mined_ids.contains(id)
                    || revealed_coords.contains_key(id)
                    || claimed_coords.contains_key(id)
                    || burned_coords.contains_key(id)
                    || kardashev_coords.contains_key(id)
            })
            .cloned()
            .collect();

        let pending_arrivals = fetched(
            SnapshotStage::PendingArrivals,
            remote.pending_arrivals(
                &hydrate_ids,
                &StageProgress::new(SnapshotStage::PendingArrivals, observer),
            ),
        )?;

        // Origin planets are needed to render where a voyage departs from.
        // One pass only: origins are not re-scanned for further arrivals.
        for arrival in &pending_arrivals {
            hydrate_ids.push(arrival.from_planet.clone());
        }
        let hydrate_ids = dedupe_preserving_order(hydrate_ids);

        if cancel.is_cancelled() {
            return Err(SnapshotError::Aborted);
        }

        let planets = fetched(
            SnapshotStage::Planets,
            remote.bulk_planets(
                &hydrate_ids,
                &StageProgress::new(SnapshotStage::Planets, observer),
            ),
        )?;

        // Voyage index per hydrated planet; arrivals addressed elsewhere stay
        // reachable through the global index only.
        let mut planet_voyages: HashMap<LocationId, Vec<VoyageId>> =
            planets.keys().map(|id| (id.clone(), Vec::new())).collect();
        let mut arrivals = HashMap::with_capacity(pending_arrivals.len());
        for arrival in &pending_arrivals {
            if let Some(voyages) = planet_voyages.get_mut(&arrival.to_planet) {
                voyages.push(arrival.event_id);
            }
            arrivals.insert(arrival.event_id, arrival.clone());
        }

        let artifact_ids_on_voyages: Vec<ArtifactId> = pending_arrivals
            .iter()
            .filter_map(|arrival| arrival.artifact_id.clone())
            .collect();

        // Second remote wave: artifact state, independent of one another.
        let own_address = remote.address();
        let (artifacts_on_voyages, held_artifacts, my_artifacts) = thread::scope(|scope| {
            let voyage_ids = &artifact_ids_on_voyages;
            let hydrated = &hydrate_ids;
            let address = &own_address;
            let on_voyages = scope.spawn(move || {
                remote.bulk_artifacts(
                    voyage_ids,
                    &StageProgress::new(SnapshotStage::ArtifactsOnVoyages, observer),
                )
            });
            let held = scope.spawn(move || {
                remote.artifacts_on_planets(
                    hydrated,
                    &StageProgress::new(SnapshotStage::ArtifactsOnPlanets, observer),
                )
            });
            let mine = scope.spawn(move || {
                remote.player_artifacts(
                    address,
                    &StageProgress::new(SnapshotStage::OwnArtifacts, observer),
                )
            });

            (
                on_voyages.join().expect("voyage artifacts fetch panicked"),
                held.join().expect("held artifacts fetch panicked"),
                mine.join().expect("own artifacts fetch panicked"),
            )
        });

        if cancel.is_cancelled() {
            return Err(SnapshotError::Aborted);
        }

        let artifacts_on_voyages = fetched(SnapshotStage::ArtifactsOnVoyages, artifacts_on_voyages)?;
        let held_artifacts = fetched(SnapshotStage::ArtifactsOnPlanets, held_artifacts)?;
        let my_artifacts = fetched(SnapshotStage::OwnArtifacts, my_artifacts)?;

        let artifacts_on_planets: HashMap<LocationId, Vec<Artifact>> = hydrate_ids
            .iter()
            .cloned()
            .zip(held_artifacts)
            .collect();

        let snapshot = Snapshot {
            constants,
            paused,
            half_price,
            world_radius,
            inner_radius,
            players: players
                .into_iter()
                .map(|player| (player.address.clone(), player))
                .collect(),
            unions: unions
                .into_iter()
                .map(|union| (union.union_id, union))
                .collect(),
            touched_planet_ids,
            revealed_coords,
            claimed_coords,
            burned_coords,
            kardashev_coords,
            planets,
            loaded_planet_ids: hydrate_ids,
            planet_voyages,
            arrivals,
            pending_arrivals,
            artifacts_on_voyages,
            artifacts_on_planets,
            my_artifacts,
        };

        tracing::info!(
            target: "chain_mirror::snapshot",
            touched = snapshot.touched_planet_ids.len(),
            hydrated = snapshot.loaded_planet_ids.len(),
            pending = snapshot.pending_arrivals.len(),
            players = snapshot.players.len(),
            "snapshot.build.completed"
        );

        Ok(snapshot)
    }
}

fn coords_by_hash<T>(
    stored: Vec<T>,
    loaded: Vec<T>,
    hash: impl Fn(&T) -> LocationId,
) -> HashMap<LocationId, T> {
    stored
        .into_iter()
        .chain(loaded)
        .map(|coords| (hash(&coords), coords))
        .collect()
}

fn dedupe_preserving_order(ids: Vec<LocationId>) -> Vec<LocationId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
