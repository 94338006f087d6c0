use mirror_schema::{Planet, Upgrade};

/// Applies `upgrade` to `planet`, scaling each affected stat by
/// `multiplier / 100`. Multiplier range is an upstream invariant and is not
/// validated here.
///
/// The cap multiplier lands on `speed`; `energy_cap` itself is never scaled.
pub fn apply_upgrade(planet: &mut Planet, upgrade: &Upgrade) {
    planet.speed *= upgrade.energy_cap_multiplier / 100.0;
    planet.energy_growth *= upgrade.energy_gro_multiplier / 100.0;
    planet.range *= upgrade.range_multiplier / 100.0;
    planet.speed *= upgrade.speed_multiplier / 100.0;
    planet.defense *= upgrade.def_multiplier / 100.0;
}

/// Inverse of [`apply_upgrade`] up to floating tolerance.
pub fn remove_upgrade(planet: &mut Planet, upgrade: &Upgrade) {
    planet.speed /= upgrade.energy_cap_multiplier / 100.0;
    planet.energy_growth /= upgrade.energy_gro_multiplier / 100.0;
    planet.range /= upgrade.range_multiplier / 100.0;
    planet.speed /= upgrade.speed_multiplier / 100.0;
    planet.defense /= upgrade.def_multiplier / 100.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn base_planet() -> Planet {
        Planet {
            energy_cap: 1_000.0,
            energy_growth: 5.0,
            range: 30.0,
            speed: 20.0,
            defense: 150.0,
            ..Default::default()
        }
    }

    fn sample_upgrade() -> Upgrade {
        Upgrade {
            energy_cap_multiplier: 120.0,
            energy_gro_multiplier: 110.0,
            range_multiplier: 125.0,
            speed_multiplier: 175.0,
            def_multiplier: 80.0,
        }
    }

    #[test]
    fn apply_then_remove_restores_stats() {
        let original = base_planet();
        let upgrade = sample_upgrade();
        let mut planet = original.clone();

        apply_upgrade(&mut planet, &upgrade);
        remove_upgrade(&mut planet, &upgrade);

        assert!((planet.speed - original.speed).abs() < EPSILON);
        assert!((planet.energy_growth - original.energy_growth).abs() < EPSILON);
        assert!((planet.range - original.range).abs() < EPSILON);
        assert!((planet.defense - original.defense).abs() < EPSILON);
        assert!((planet.energy_cap - original.energy_cap).abs() < EPSILON);
    }

    #[test]
    fn speed_takes_both_cap_and_speed_multipliers() {
        let mut planet = base_planet();
        apply_upgrade(&mut planet, &sample_upgrade());

        // 20 * 1.2 * 1.75
        assert!((planet.speed - 42.0).abs() < EPSILON);
        // energy_cap is left untouched by upgrades.
        assert_eq!(planet.energy_cap, 1_000.0);
    }

    #[test]
    fn identity_upgrade_is_a_no_op() {
        let original = base_planet();
        let mut planet = original.clone();
        apply_upgrade(&mut planet, &Upgrade::default());
        assert_eq!(planet, original);
    }
}
