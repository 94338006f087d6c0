use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// Location hash of a planet, 0x-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token id of an artifact, 0x-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ArtifactId(pub String);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique event id of a voyage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct VoyageId(pub u64);

impl fmt::Display for VoyageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a player alliance. Zero means "no union".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UnionId(pub u64);

impl UnionId {
    /// Zero is the "no union" sentinel and never grants friendly-fire
    /// immunity.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UnionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const EMPTY_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Ethereum address, stored lowercase so equality checks against chain data
/// never depend on checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EthAddress(String);

impl EthAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_lowercase())
    }

    /// The zero address, used as the owner of unowned planets.
    pub fn empty() -> Self {
        Self(EMPTY_ADDRESS.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EthAddress {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum PlanetType {
    #[default]
    Planet = 0,
    SilverMine = 1,
    Ruins = 2,
    TradingPost = 3,
    SilverBank = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ArtifactType {
    #[default]
    Monolith = 0,
    Colossus = 1,
    Pyramid = 2,
    Wormhole = 3,
    PlanetaryShield = 4,
    PhotoidCannon = 5,
    BloomFilter = 6,
    StellarShield = 7,
    Mothership = 8,
    Whale = 9,
    Titan = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ArrivalType {
    #[default]
    Unknown = 0,
    Normal = 1,
    Photoid = 2,
    Wormhole = 3,
}

bitflags::bitflags! {
    /// Planet conditions imposed by external events. The mirror core treats
    /// these as read-only inputs; it never sets or clears them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PlanetFlags: u8 {
        const DESTROYED = 1 << 0;
        const FROZEN = 1 << 1;
    }
}

impl Default for PlanetFlags {
    fn default() -> Self {
        PlanetFlags::empty()
    }
}

/// Percentage-scaled stat multipliers (100 = identity), applied or removed
/// atomically as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub energy_cap_multiplier: f64,
    pub energy_gro_multiplier: f64,
    pub range_multiplier: f64,
    pub speed_multiplier: f64,
    pub def_multiplier: f64,
}

impl Default for Upgrade {
    fn default() -> Self {
        Self {
            energy_cap_multiplier: 100.0,
            energy_gro_multiplier: 100.0,
            range_multiplier: 100.0,
            speed_multiplier: 100.0,
            def_multiplier: 100.0,
        }
    }
}

/// Mirror-side record of a planet.
///
/// `last_updated` is fractional unix seconds: advancing the simulation to an
/// arbitrary instant leaves a fractional timestamp behind. Chain-sourced
/// instants elsewhere in the model are integer seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub location_id: LocationId,
    pub owner: EthAddress,
    pub energy: f64,
    pub energy_cap: f64,
    pub energy_growth: f64,
    pub silver: f64,
    pub silver_cap: f64,
    pub silver_growth: f64,
    pub loot_silver: f64,
    pub defense: f64,
    pub range: f64,
    pub speed: f64,
    pub planet_type: PlanetType,
    pub pausers: u32,
    pub energy_gro_doublers: u32,
    pub silver_gro_doublers: u32,
    pub held_artifact_ids: Vec<ArtifactId>,
    pub last_updated: f64,
    pub local_photoid_upgrade: Option<Upgrade>,
    pub flags: PlanetFlags,
    pub prospected_block_number: Option<u64>,
    pub has_tried_finding_artifact: bool,
}

impl Planet {
    /// A planet is owned once any non-zero address holds it.
    pub fn is_owned(&self) -> bool {
        !self.owner.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags.contains(PlanetFlags::DESTROYED)
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.contains(PlanetFlags::FROZEN)
    }
}

impl Default for Planet {
    fn default() -> Self {
        Self {
            location_id: LocationId::default(),
            owner: EthAddress::empty(),
            energy: 0.0,
            energy_cap: 0.0,
            energy_growth: 0.0,
            silver: 0.0,
            silver_cap: 0.0,
            silver_growth: 0.0,
            loot_silver: 0.0,
            defense: 100.0,
            range: 0.0,
            speed: 0.0,
            planet_type: PlanetType::Planet,
            pausers: 0,
            energy_gro_doublers: 0,
            silver_gro_doublers: 0,
            held_artifact_ids: Vec::new(),
            last_updated: 0.0,
            local_photoid_upgrade: None,
            flags: PlanetFlags::empty(),
            prospected_block_number: None,
            has_tried_finding_artifact: false,
        }
    }
}

/// Mirror-side record of an artifact, on a planet or in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Artifact {
    pub id: ArtifactId,
    pub artifact_type: ArtifactType,
    pub last_activated: u64,
    pub last_deactivated: u64,
    /// Upgrade granted after the activation delay elapses. Only meaningful
    /// for the PhotoidCannon type.
    pub time_delayed_upgrade: Upgrade,
    pub on_planet_id: Option<LocationId>,
    pub on_voyage_id: Option<VoyageId>,
}

impl Artifact {
    /// An artifact counts as active while its latest activation postdates its
    /// latest deactivation.
    pub fn is_activated(&self) -> bool {
        self.last_activated > self.last_deactivated
    }
}

/// An in-flight transfer of energy/silver (and optionally one artifact)
/// between two planets, resolved at a fixed timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Arrival {
    pub event_id: VoyageId,
    pub from_planet: LocationId,
    pub to_planet: LocationId,
    pub player: EthAddress,
    pub union_id: UnionId,
    /// Addresses sharing friendly-fire immunity with the sender.
    pub members: Vec<EthAddress>,
    pub energy_arriving: f64,
    pub silver_moved: f64,
    pub arrival_type: ArrivalType,
    pub arrival_time: u64,
    pub artifact_id: Option<ArtifactId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Player {
    pub address: EthAddress,
    pub home_planet_id: Option<LocationId>,
    pub init_timestamp: u64,
    pub last_reveal_timestamp: u64,
    pub score: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Union {
    pub union_id: UnionId,
    pub name: String,
    pub leader: EthAddress,
    pub members: Vec<EthAddress>,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldCoords {
    pub x: i64,
    pub y: i64,
}

/// A planet location surfaced by local mining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldLocation {
    pub hash: LocationId,
    pub coords: WorldCoords,
}

/// A locally mined region of the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Chunk {
    pub locations: Vec<WorldLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RevealedCoords {
    pub hash: LocationId,
    pub x: i64,
    pub y: i64,
    pub revealer: EthAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClaimedCoords {
    pub hash: LocationId,
    pub x: i64,
    pub y: i64,
    pub claimer: EthAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BurnedCoords {
    pub hash: LocationId,
    pub x: i64,
    pub y: i64,
    pub operator: EthAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KardashevCoords {
    pub hash: LocationId,
    pub x: i64,
    pub y: i64,
    pub operator: EthAddress,
}

/// Contract parameters the simulation needs, fetched once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContractConstants {
    /// Seconds between a PhotoidCannon activation and its upgrade landing.
    pub photoid_activation_delay: u64,
    /// Seconds between a StellarShield activation and it becoming able to
    /// absorb a Photoid strike.
    pub stellar_activation_delay: u64,
}

/// The assembled world index a freshly started client runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub constants: ContractConstants,
    pub paused: bool,
    pub half_price: bool,
    pub world_radius: f64,
    pub inner_radius: f64,
    pub players: HashMap<EthAddress, Player>,
    pub unions: HashMap<UnionId, Union>,
    pub touched_planet_ids: Vec<LocationId>,
    pub revealed_coords: HashMap<LocationId, RevealedCoords>,
    pub claimed_coords: HashMap<LocationId, ClaimedCoords>,
    pub burned_coords: HashMap<LocationId, BurnedCoords>,
    pub kardashev_coords: HashMap<LocationId, KardashevCoords>,
    /// Full records for every hydrated planet.
    pub planets: HashMap<LocationId, Planet>,
    /// Hydrate set in first-seen order.
    pub loaded_planet_ids: Vec<LocationId>,
    /// Voyages addressed to each hydrated planet. Arrivals to un-hydrated
    /// planets are absent here but still present in `arrivals`.
    pub planet_voyages: HashMap<LocationId, Vec<VoyageId>>,
    pub arrivals: HashMap<VoyageId, Arrival>,
    pub pending_arrivals: Vec<Arrival>,
    pub artifacts_on_voyages: Vec<Artifact>,
    pub artifacts_on_planets: HashMap<LocationId, Vec<Artifact>>,
    pub my_artifacts: Vec<Artifact>,
}

/// Key-sorted projection of a [`Snapshot`]. Map iteration order is not
/// deterministic, so hashing goes through this form.
#[derive(Serialize)]
struct CanonicalSnapshot<'a> {
    constants: &'a ContractConstants,
    paused: bool,
    half_price: bool,
    world_radius: f64,
    inner_radius: f64,
    players: Vec<(&'a EthAddress, &'a Player)>,
    unions: Vec<(&'a UnionId, &'a Union)>,
    touched_planet_ids: &'a [LocationId],
    revealed_coords: Vec<(&'a LocationId, &'a RevealedCoords)>,
    claimed_coords: Vec<(&'a LocationId, &'a ClaimedCoords)>,
    burned_coords: Vec<(&'a LocationId, &'a BurnedCoords)>,
    kardashev_coords: Vec<(&'a LocationId, &'a KardashevCoords)>,
    planets: Vec<(&'a LocationId, &'a Planet)>,
    loaded_planet_ids: &'a [LocationId],
    planet_voyages: Vec<(&'a LocationId, &'a Vec<VoyageId>)>,
    arrivals: Vec<(&'a VoyageId, &'a Arrival)>,
    pending_arrivals: &'a [Arrival],
    artifacts_on_voyages: &'a [Artifact],
    artifacts_on_planets: Vec<(&'a LocationId, &'a Vec<Artifact>)>,
    my_artifacts: &'a [Artifact],
}

fn sorted_entries<K: Ord, V>(map: &HashMap<K, V>) -> Vec<(&K, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(key, _)| *key);
    entries
}

impl<'a> CanonicalSnapshot<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            constants: &snapshot.constants,
            paused: snapshot.paused,
            half_price: snapshot.half_price,
            world_radius: snapshot.world_radius,
            inner_radius: snapshot.inner_radius,
            players: sorted_entries(&snapshot.players),
            unions: sorted_entries(&snapshot.unions),
            touched_planet_ids: &snapshot.touched_planet_ids,
            revealed_coords: sorted_entries(&snapshot.revealed_coords),
            claimed_coords: sorted_entries(&snapshot.claimed_coords),
            burned_coords: sorted_entries(&snapshot.burned_coords),
            kardashev_coords: sorted_entries(&snapshot.kardashev_coords),
            planets: sorted_entries(&snapshot.planets),
            loaded_planet_ids: &snapshot.loaded_planet_ids,
            planet_voyages: sorted_entries(&snapshot.planet_voyages),
            arrivals: sorted_entries(&snapshot.arrivals),
            pending_arrivals: &snapshot.pending_arrivals,
            artifacts_on_voyages: &snapshot.artifacts_on_voyages,
            artifacts_on_planets: sorted_entries(&snapshot.artifacts_on_planets),
            my_artifacts: &snapshot.my_artifacts,
        }
    }
}

/// Content hash over the canonical projection; equal world state hashes
/// equal regardless of map iteration order or the run that produced it.
pub fn hash_snapshot(snapshot: &Snapshot) -> u64 {
    let encoded = bincode::serialize(&CanonicalSnapshot::new(snapshot))
        .expect("snapshot serialization for hashing");
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}

pub fn encode_snapshot(snapshot: &Snapshot) -> bincode::Result<Vec<u8>> {
    bincode::serialize(snapshot)
}

pub fn decode_snapshot(data: &[u8]) -> bincode::Result<Snapshot> {
    bincode::deserialize(data)
}

pub fn encode_snapshot_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

pub fn decode_snapshot_json(data: &str) -> serde_json::Result<Snapshot> {
    serde_json::from_str(data)
}
