use criterion::{criterion_group, criterion_main, Criterion};
use phenotype::Topology;
use physics::{Vec3, World};
use rl::{AgentConfig, Env, Mode, RagdollEnv};

fn chair_env(mode: Mode) -> RagdollEnv {
    let topology = Topology::chair().unwrap();
    let world = World::new(topology.build_registry().unwrap(), 0.02).unwrap();
    RagdollEnv::new(&topology, world, AgentConfig::new(mode, 30.0), Vec3::new(0.0, 1.0, 20.0)).unwrap()
}

fn bench_tick(c: &mut Criterion) {
    for (name, mode) in [("tick_walk", Mode::Walk), ("tick_climb", Mode::Climb)] {
        let mut env = chair_env(mode);
        env.reset().unwrap();
        let action = vec![0.5; env.action_size()];
        c.bench_function(name, |b| {
            b.iter(|| {
                let (_, _, done) = env.step(&action).unwrap();
                if done {
                    env.reset().unwrap();
                }
            });
        });
    }
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
