use mirror_schema::{Planet, PlanetType};

/// Silver held by `planet` after growing linearly from `start` to `end`
/// (unix seconds). Unowned planets do not grow; owned planets saturate at
/// `silver_cap - loot_silver`.
pub fn silver_over_time(planet: &Planet, start: f64, end: f64) -> f64 {
    if !planet.is_owned() {
        return planet.silver;
    }

    let ceiling = planet.silver_cap - planet.loot_silver;
    if planet.silver > ceiling {
        return ceiling;
    }
    let elapsed = end - start;

    (elapsed * planet.silver_growth + planet.silver).min(ceiling)
}

/// Energy held by `planet` at instant `at` (unix seconds), following the
/// logistic growth curve from `last_updated`.
///
/// Zero energy is a fixed point: a planet drained to exactly zero cannot
/// regrow on its own and stays at zero until an external event resets it.
pub fn energy_at_time(planet: &Planet, at: f64) -> f64 {
    if planet.energy == 0.0 {
        return 0.0;
    }
    if !planet.is_owned() {
        return planet.energy;
    }

    // Silver banks never grow past cap on their own, but deposited energy
    // can put the stored value above it.
    if planet.planet_type == PlanetType::SilverBank && planet.energy > planet.energy_cap {
        return planet.energy_cap;
    }

    let elapsed = at - planet.last_updated;
    let denominator = f64::exp(-4.0 * planet.energy_growth * elapsed / planet.energy_cap)
        * (planet.energy_cap / planet.energy - 1.0)
        + 1.0;
    planet.energy_cap / denominator
}
