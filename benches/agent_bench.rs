use criterion::{black_box, criterion_group, criterion_main, Criterion};

use armada::config::AgentConfig;
use armada::intel::{CircleEncoder, IntelEncoder};
use armada::orchestrator::Orchestrator;
use armada::world::{MapInfo, Point2, Snapshot, Unit, UnitKind};

/// A mid-game snapshot: two bases, a fleet, and a visible enemy army.
fn midgame() -> Snapshot {
    let home = Point2::new(30.0, 30.0);
    let enemy = Point2::new(170.0, 146.0);
    let mut snap = Snapshot {
        game_loop: 22 * 60 * 8,
        minerals: 800,
        vespene: 400,
        supply_used: 90,
        supply_cap: 120,
        map: MapInfo {
            width: 200,
            height: 176,
            start_location: home,
            enemy_start_locations: vec![enemy],
            expansion_sites: vec![home, Point2::new(60.0, 30.0), Point2::new(100.0, 90.0), enemy],
        },
        ..Default::default()
    };

    let mut tag = 1;
    let mut next = || {
        tag += 1;
        tag
    };
    for (kind, x, y) in [
        (UnitKind::Nexus, 30.0, 30.0),
        (UnitKind::Nexus, 60.0, 30.0),
        (UnitKind::Pylon, 36.0, 36.0),
        (UnitKind::Pylon, 40.0, 36.0),
        (UnitKind::Gateway, 38.0, 40.0),
        (UnitKind::CyberneticsCore, 42.0, 40.0),
        (UnitKind::RoboticsFacility, 44.0, 36.0),
        (UnitKind::Stargate, 46.0, 40.0),
        (UnitKind::Stargate, 48.0, 36.0),
    ] {
        snap.structures.push(Unit::new(next(), kind, Point2::new(x, y)).busy());
    }
    for i in 0..40 {
        let at = Point2::new(28.0 + (i % 8) as f32, 34.0 + (i / 8) as f32);
        snap.units.push(Unit::new(next(), UnitKind::Probe, at).collecting());
    }
    for i in 0..10 {
        let at = Point2::new(70.0 + i as f32, 50.0);
        snap.units.push(Unit::new(next(), UnitKind::VoidRay, at));
    }
    for i in 0..20 {
        let at = Point2::new(120.0 + i as f32, 110.0);
        snap.enemy_units.push(Unit::new(next(), UnitKind::Unknown, at));
    }
    snap.enemy_structures.push(Unit::new(next(), UnitKind::Nexus, enemy));
    snap
}

fn bench_encode(c: &mut Criterion) {
    let snap = midgame();
    let encoder = CircleEncoder::new(UnitKind::VoidRay);
    c.bench_function("encode_intel_midgame", |b| {
        b.iter(|| encoder.encode(black_box(&snap)))
    });
}

fn bench_tick(c: &mut Criterion) {
    let snap = midgame();
    let mut cfg = AgentConfig::default();
    cfg.player.seed = 1;
    let mut agent = Orchestrator::new(cfg).unwrap();
    agent.new_game();
    c.bench_function("orchestrator_tick_midgame", |b| {
        b.iter(|| agent.tick(black_box(&snap)))
    });
}

criterion_group!(benches, bench_encode, bench_tick);
criterion_main!(benches);
