//! Headless runner for the sphere scene.
//!
//! Drives the frame loop with a fixed-rate clock instead of a window:
//! - the begin signal (the interactive build's `B` key) fires at `--begin-at`
//! - the finish signal fires at `--finish-at`, if given
//! - per-frame body state can be written to an `.npy` trace with `--record`
//! - `--replay` summarises a recorded trace instead of running the scene
//!
//! Set `RUST_LOG=debug` to see every contact as it is resolved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Mat4, Vec3};
use sphere_scene::{
    frame::FixedStepClock,
    frame_loop::{FrameLoop, FrameSink},
    params::SimulationParams,
    scene::{Scene, SceneBuilder},
    stepper::RunState,
    trace::{TraceRecorder, TraceRun},
};

#[derive(Parser, Debug)]
#[command(name = "scene_runner")]
#[command(about = "Steps the floor-and-spheres collision scene without a window")]
struct Args {
    /// Number of frames to run
    #[arg(long, default_value = "600")]
    frames: u64,

    /// Frames per second of the simulated clock
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Time in seconds at which the scene is started
    #[arg(long, default_value = "0")]
    begin_at: f32,

    /// Time in seconds at which the scene is stopped for good
    #[arg(long)]
    finish_at: Option<f32>,

    /// Vertical gravity in m/s^2
    #[arg(long, default_value = "-9.81", allow_hyphen_values = true)]
    gravity: f32,

    /// Fraction of vertical speed kept after a floor bounce
    #[arg(long, default_value = "0.8")]
    ground_restitution: f32,

    /// Fraction of normal speed kept after a sphere-sphere collision
    #[arg(long, default_value = "1.0")]
    sphere_restitution: f32,

    /// Path to save the per-frame body trace (e.g., run.npy)
    #[arg(long)]
    record: Option<PathBuf>,

    /// Log sphere positions every N frames (0 disables)
    #[arg(long, default_value = "60")]
    report_every: u64,

    /// Summarise a trace written by --record and exit
    #[arg(long, conflicts_with = "record")]
    replay: Option<PathBuf>,
}

/// Forwards frames to the trace recorder when recording is enabled.
struct RunSink {
    recorder: Option<TraceRecorder>,
}

impl FrameSink for RunSink {
    fn present(&mut self, view_projection: Mat4, scene: &Scene) -> Result<()> {
        match self.recorder.as_mut() {
            Some(recorder) => recorder.present(view_projection, scene),
            None => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.replay.as_ref() {
        return replay(path, args.fps);
    }

    let params = SimulationParams::default()
        .with_gravity(Vec3::new(0.0, args.gravity, 0.0))
        .with_ground_restitution(args.ground_restitution)
        .with_sphere_restitution(args.sphere_restitution);
    let scene = SceneBuilder::default_scene().context("failed to build the demo scene")?;

    let mut clock = FixedStepClock::from_fps(args.fps);
    let mut frame_loop = FrameLoop::new(scene, params);
    let mut sink = RunSink {
        recorder: args.record.as_ref().map(|_| TraceRecorder::new()),
    };

    println!("Scene begins at t={:.2}s", args.begin_at);

    let mut contact_count = 0usize;
    for frame in 0..args.frames {
        schedule_signals(&args, &mut frame_loop, frame as f32 * clock.step());

        let report = frame_loop.run_frame(&mut clock, &mut sink)?;
        contact_count += report.contacts.len();

        if args.report_every > 0 && frame % args.report_every == 0 {
            report_positions(&frame_loop, frame);
        }
        if report.state == RunState::Done {
            println!("Scene finished at frame {}", frame);
            break;
        }
    }

    print_summary(&frame_loop, contact_count);

    if let (Some(path), Some(recorder)) = (args.record.as_ref(), sink.recorder.as_ref()) {
        recorder.save(path)?;
        println!("Trace saved to {}", path.display());
    }

    Ok(())
}

fn schedule_signals(args: &Args, frame_loop: &mut FrameLoop, now: f32) {
    let ctx = frame_loop.context_mut();
    if now >= args.begin_at {
        ctx.request_begin();
    }
    if args.finish_at.map_or(false, |finish_at| now >= finish_at) {
        ctx.request_finish();
    }
}

fn report_positions(frame_loop: &FrameLoop, frame: u64) {
    log::info!("frame {} ({:?})", frame, frame_loop.state());
    for (i, sphere) in frame_loop.scene().spheres.iter().enumerate() {
        let p = sphere.position();
        let v = sphere.velocity();
        log::info!(
            "  sphere {}: pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
            i,
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z
        );
    }
}

fn print_summary(frame_loop: &FrameLoop, contact_count: usize) {
    let params = frame_loop.params();
    println!("Frames run: {}", frame_loop.frame_index());
    println!("Final state: {:?}", frame_loop.state());
    println!(
        "Gravity: {:.2} m/s^2, restitution: ground {:.2}, spheres {:.2}",
        params.gravity.y,
        params.ground_restitution,
        params.sphere_restitution
    );
    println!("Contacts resolved: {}", contact_count);
    for (i, sphere) in frame_loop.scene().spheres.iter().enumerate() {
        let p = sphere.position();
        println!(
            "  Sphere {}: y = {:.2} m, vy = {:.2} m/s (x={:.2}, z={:.2})",
            i,
            p.y,
            sphere.velocity().y,
            p.x,
            p.z
        );
    }
}

fn replay(path: &Path, fps: u32) -> Result<()> {
    let run = TraceRun::load(path)?;
    println!("Trace: {}", run.path().display());
    println!(
        "Frames: {} ({:.2} s at {} fps), bodies: {}",
        run.num_frames(),
        run.duration_seconds(fps),
        fps,
        run.num_bodies()
    );

    // Lowest point any dynamic body reached relative to the floor.
    let mut lowest: Option<(usize, f32)> = None;
    for (frame, bodies) in run.frames().enumerate() {
        let Some((floor, spheres)) = bodies.split_first() else {
            continue;
        };
        for sphere in spheres.iter().filter(|b| b.is_dynamic()) {
            let height = sphere.position[1] - sphere.radius - floor.position[1];
            if lowest.map_or(true, |(_, h)| height < h) {
                lowest = Some((frame, height));
            }
        }
    }
    if let Some((frame, height)) = lowest {
        println!(
            "Lowest sphere bottom: {:.3} m above the floor at frame {}",
            height, frame
        );
    }

    let last = run.frame(run.num_frames().saturating_sub(1))?;
    for (i, body) in last.iter().enumerate().skip(1) {
        println!(
            "  Sphere {}: pos=({:.2}, {:.2}, {:.2})",
            i - 1,
            body.position[0],
            body.position[1],
            body.position[2]
        );
    }
    Ok(())
}
