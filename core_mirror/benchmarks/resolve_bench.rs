use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use core_mirror::Simulation;
use mirror_schema::{Arrival, ContractConstants, EthAddress, LocationId, Planet, VoyageId};

fn seeded_planets(count: usize) -> Vec<Planet> {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    (0..count)
        .map(|index| {
            let energy_cap = rng.gen_range(500.0..5_000.0);
            Planet {
                location_id: LocationId(format!("0x{index:064x}")),
                owner: EthAddress::new(format!("0x{:040x}", index % 7)),
                energy: rng.gen_range(1.0..energy_cap),
                energy_cap,
                energy_growth: rng.gen_range(0.5..20.0),
                silver_cap: rng.gen_range(100.0..10_000.0),
                silver_growth: rng.gen_range(0.0..10.0),
                defense: rng.gen_range(50.0..300.0),
                range: rng.gen_range(10.0..60.0),
                speed: rng.gen_range(5.0..40.0),
                last_updated: 1_000.0,
                ..Default::default()
            }
        })
        .collect()
}

fn arrival_for(planet: &Planet, index: usize) -> Arrival {
    Arrival {
        event_id: VoyageId(index as u64),
        from_planet: LocationId("0xsource".to_string()),
        to_planet: planet.location_id.clone(),
        player: EthAddress::new("0x00000000000000000000000000000000000000ff"),
        energy_arriving: 100.0 + index as f64,
        silver_moved: 5.0,
        arrival_time: 1_600,
        ..Default::default()
    }
}

fn resolve_throughput(c: &mut Criterion) {
    let sim = Simulation::new(ContractConstants {
        photoid_activation_delay: 600,
        stellar_activation_delay: 300,
    });
    let planets = seeded_planets(512);
    let arrivals: Vec<Arrival> = planets
        .iter()
        .enumerate()
        .map(|(index, planet)| arrival_for(planet, index))
        .collect();

    c.bench_function("resolve_512_arrivals", |b| {
        b.iter(|| {
            let mut scratch = planets.clone();
            for (planet, arrival) in scratch.iter_mut().zip(&arrivals) {
                let diff = sim
                    .resolve_arrival(planet, &[], arrival, None)
                    .expect("arrival addressed to its planet");
                black_box(diff);
            }
        })
    });
}

criterion_group!(benches, resolve_throughput);
criterion_main!(benches);
