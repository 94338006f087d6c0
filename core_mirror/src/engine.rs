use mirror_schema::{
    Arrival, ArrivalType, Artifact, ArtifactType, ContractConstants, LocationId, Planet,
    PlanetType,
};
use thiserror::Error;

use crate::fixed::{scaled_damage, scaled_defender_loss};
use crate::growth::{energy_at_time, silver_over_time};
use crate::upgrade::apply_upgrade;

/// State transition produced by resolving one arrival, kept for optimistic
/// display and later reconciliation against the confirmed receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetDiff {
    pub previous: Planet,
    pub current: Planet,
    pub arrival: Arrival,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("arrival addressed to planet {expected} applied to planet {actual}")]
    IdentityMismatch {
        expected: LocationId,
        actual: LocationId,
    },
}

/// Deterministic replica of the contract's planet economy and combat.
///
/// Methods mutate the passed planet in place; the caller decides whether that
/// planet is a private copy (speculative preview) or the shared live entry.
/// No state is kept here beyond the contract constants, so calls are safe to
/// repeat or replay.
#[derive(Debug, Clone)]
pub struct Simulation {
    constants: ContractConstants,
}

impl Simulation {
    pub fn new(constants: ContractConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &ContractConstants {
        &self.constants
    }

    /// Advances `planet` to instant `at` (unix seconds).
    ///
    /// Stale reads are a no-op: a target time before `last_updated` leaves
    /// the planet untouched. While any pauser is present growth is frozen and
    /// only `last_updated` moves. An armed PhotoidCannon whose activation
    /// delay has elapsed lands its upgrade exactly once, recorded in
    /// `local_photoid_upgrade` so repeated calls stay idempotent.
    pub fn advance_planet(&self, planet: &mut Planet, artifacts_on_planet: &[Artifact], at: f64) {
        if at < planet.last_updated {
            return;
        }

        if planet.pausers == 0 {
            planet.silver = silver_over_time(planet, planet.last_updated, at);
            planet.energy = energy_at_time(planet, at);
        }

        planet.last_updated = at;

        let photoid_delay = self.constants.photoid_activation_delay as f64;
        let armed_cannon = artifacts_on_planet.iter().find(|artifact| {
            artifact.artifact_type == ArtifactType::PhotoidCannon
                && artifact.is_activated()
                && at - artifact.last_activated as f64 >= photoid_delay
        });

        if let Some(cannon) = armed_cannon {
            if planet.local_photoid_upgrade.is_none() {
                planet.local_photoid_upgrade = Some(cannon.time_delayed_upgrade.clone());
                apply_upgrade(planet, &cannon.time_delayed_upgrade);
            }
        }
    }

    /// Optimistically resolves one arrival against `to_planet`, mutating it
    /// in place and returning the `{previous, current, arrival}` diff.
    ///
    /// The only failure is [`ResolveError::IdentityMismatch`] (arrival
    /// addressed to a different planet); every numeric edge case saturates or
    /// clamps instead of erroring. Callers must apply arrivals for a given
    /// planet in non-decreasing `arrival_time` order. `defense > 0` is an
    /// upstream invariant and is not guarded.
    pub fn resolve_arrival(
        &self,
        to_planet: &mut Planet,
        artifacts_on_planet: &[Artifact],
        arrival: &Arrival,
        arriving_artifact: Option<&mut Artifact>,
    ) -> Result<PlanetDiff, ResolveError> {
        if to_planet.location_id != arrival.to_planet {
            return Err(ResolveError::IdentityMismatch {
                expected: arrival.to_planet.clone(),
                actual: to_planet.location_id.clone(),
            });
        }

        // Bring energy and silver current as of the arrival instant.
        self.advance_planet(to_planet, artifacts_on_planet, arrival.arrival_time as f64);

        let previous = to_planet.clone();

        let defender_in_members = arrival
            .members
            .iter()
            .any(|member| *member == to_planet.owner);
        let active_artifact = artifacts_on_planet
            .iter()
            .find(|artifact| artifact.is_activated());

        if arrival.player == to_planet.owner
            || (!arrival.union_id.is_zero() && defender_in_members)
        {
            // Moving between own planets or between union members.
            to_planet.energy += arrival.energy_arriving;
        } else if arrival.arrival_type == ArrivalType::Wormhole {
            // A wormhole arrival at a planet the sender does not own moves no
            // energy in either direction.
        } else if let Some(shield) = blocking_shield(active_artifact, arrival, &self.constants) {
            // The shield absorbs the strike and is spent.
            let shield_id = shield.id.clone();
            to_planet.held_artifact_ids.retain(|id| *id != shield_id);
            tracing::debug!(
                target: "chain_mirror::arrival",
                planet = %to_planet.location_id,
                voyage = %arrival.event_id,
                "arrival.shield_absorbed"
            );
        } else {
            let damage = scaled_damage(arrival.energy_arriving, to_planet.defense);
            if to_planet.energy > damage {
                // Garrison holds; the planet keeps its owner.
                to_planet.energy -= damage;
            } else {
                to_planet.owner = arrival.player.clone();
                to_planet.energy = arrival.energy_arriving
                    - scaled_defender_loss(to_planet.energy, to_planet.defense);
                tracing::debug!(
                    target: "chain_mirror::arrival",
                    planet = %to_planet.location_id,
                    owner = %to_planet.owner,
                    voyage = %arrival.event_id,
                    "arrival.captured"
                );
            }
        }

        if to_planet.planet_type == PlanetType::SilverBank || to_planet.pausers != 0 {
            if to_planet.energy > to_planet.energy_cap {
                to_planet.energy = to_planet.energy_cap;
            }
        }

        if to_planet.silver + arrival.silver_moved > to_planet.silver_cap - to_planet.loot_silver {
            to_planet.silver = to_planet.silver_cap - to_planet.loot_silver;
        } else {
            to_planet.silver += arrival.silver_moved;
        }

        if let Some(artifact_id) = &arrival.artifact_id {
            to_planet.held_artifact_ids.push(artifact_id.clone());
        }

        if let Some(artifact) = arriving_artifact {
            match artifact.artifact_type {
                ArtifactType::Mothership => {
                    if to_planet.energy_gro_doublers == 0 {
                        to_planet.energy_growth *= 2.0;
                    }
                    to_planet.energy_gro_doublers += 1;
                }
                ArtifactType::Whale => {
                    if to_planet.silver_gro_doublers == 0 {
                        to_planet.silver_growth *= 2.0;
                    }
                    to_planet.silver_gro_doublers += 1;
                }
                ArtifactType::Titan => to_planet.pausers += 1,
                _ => {}
            }
            artifact.on_planet_id = Some(to_planet.location_id.clone());
        }

        Ok(PlanetDiff {
            previous,
            current: to_planet.clone(),
            arrival: arrival.clone(),
        })
    }
}

/// The defender's active StellarShield, when it covers a Photoid strike at
/// the arrival instant.
fn blocking_shield<'a>(
    active_artifact: Option<&'a Artifact>,
    arrival: &Arrival,
    constants: &ContractConstants,
) -> Option<&'a Artifact> {
    let artifact = active_artifact?;
    let covered = arrival.arrival_type == ArrivalType::Photoid
        && artifact.artifact_type == ArtifactType::StellarShield
        && arrival.arrival_time as f64
            >= artifact.last_activated as f64 + constants.stellar_activation_delay as f64;
    covered.then_some(artifact)
}
