use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sphere_scene::{
    frame::FrameContext,
    params::SimulationParams,
    scene::{GridConfig, Scene, SceneBuilder},
    stepper::SceneStepper,
};

fn run_frames(mut scene: Scene, frames: usize) -> Scene {
    let mut stepper = SceneStepper::new(SimulationParams::default());
    let mut ctx = FrameContext::new();
    ctx.request_begin();
    for frame in 0..frames {
        ctx.advance(frame as f32 / 60.0);
        stepper.step(&mut scene, &ctx);
    }
    scene
}

fn benchmark_default_scene(c: &mut Criterion) {
    let scene = SceneBuilder::default_scene().unwrap();
    c.bench_function("default_scene_600_frames", |b| {
        b.iter(|| black_box(run_frames(scene.clone(), 600)));
    });
}

fn benchmark_sphere_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere_grid_60_frames");
    for grid_size in [4usize, 8, 16] {
        let scene = SceneBuilder::create_sphere_grid(GridConfig {
            grid_size,
            ..GridConfig::default()
        })
        .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size * grid_size),
            &scene,
            |b, scene| {
                b.iter(|| black_box(run_frames(scene.clone(), 60)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_default_scene, benchmark_sphere_grid);
criterion_main!(benches);
