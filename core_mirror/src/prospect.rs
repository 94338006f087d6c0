use mirror_schema::{Planet, PlanetType};

/// Blocks an artifact foundry stays prospectable after prospecting. Past this
/// window the find is lost.
pub const PROSPECT_EXPIRATION_BLOCKS: u64 = 255;

pub fn blocks_left_to_prospect_expiration(
    current_block_number: u64,
    prospected_block_number: Option<u64>,
) -> i64 {
    prospected_block_number.unwrap_or(0) as i64 + PROSPECT_EXPIRATION_BLOCKS as i64
        - current_block_number as i64
}

pub fn prospect_expired(current_block_number: u64, prospected_block_number: u64) -> bool {
    blocks_left_to_prospect_expiration(current_block_number, Some(prospected_block_number)) <= 0
}

/// A foundry that has never been prospected can be.
pub fn is_prospectable(planet: &Planet) -> bool {
    planet.planet_type == PlanetType::Ruins && planet.prospected_block_number.is_none()
}

/// A prospected foundry still inside its window and not yet searched.
pub fn is_findable(planet: &Planet, current_block_number: Option<u64>) -> bool {
    let Some(current_block_number) = current_block_number else {
        return false;
    };
    planet.planet_type == PlanetType::Ruins
        && planet.prospected_block_number.is_some_and(|prospected| {
            !planet.has_tried_finding_artifact && !prospect_expired(current_block_number, prospected)
        })
}
