//! Per-frame body state traces stored as `.npy` files.
//!
//! A trace is a 2-D `f32` array of shape `(frames, bodies * 13)`. Each body
//! contributes position (3), velocity (3), orientation quaternion xyzw (4),
//! radius, scale and a dynamic flag (1.0 or 0.0), in scene order: floor
//! first, then the spheres.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use npyz::WriterBuilder;

use crate::{body::Body, frame_loop::FrameSink, scene::Scene};

pub const FLOATS_PER_BODY: usize = 13;

/// Flat, `f32`-only snapshot of one body.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BodyRecord {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub orientation: [f32; 4],
    pub radius: f32,
    pub scale: f32,
    pub dynamic_flag: f32,
}

const _: () = assert!(std::mem::size_of::<BodyRecord>() == FLOATS_PER_BODY * 4);

impl BodyRecord {
    pub fn is_dynamic(&self) -> bool {
        self.dynamic_flag != 0.0
    }
}

impl From<&Body> for BodyRecord {
    fn from(body: &Body) -> Self {
        Self {
            position: body.position().to_array(),
            velocity: body.velocity().to_array(),
            orientation: body.orientation().to_array(),
            radius: body.radius(),
            scale: body.scale(),
            dynamic_flag: if body.is_dynamic() { 1.0 } else { 0.0 },
        }
    }
}

/// Collects one row of records per presented frame.
#[derive(Default)]
pub struct TraceRecorder {
    records: Vec<BodyRecord>,
    bodies_per_frame: Option<usize>,
    num_frames: usize,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame<'a>(&mut self, bodies: impl Iterator<Item = &'a Body>) -> Result<()> {
        let start = self.records.len();
        self.records.extend(bodies.map(BodyRecord::from));
        let count = self.records.len() - start;

        match self.bodies_per_frame {
            Some(expected) if expected != count => {
                self.records.truncate(start);
                bail!(
                    "frame {} has {} bodies, earlier frames had {}",
                    self.num_frames,
                    count,
                    expected
                );
            }
            Some(_) => {}
            None => self.bodies_per_frame = Some(count),
        }

        self.num_frames += 1;
        Ok(())
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies_per_frame.unwrap_or(0)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if self.num_frames == 0 {
            bail!("no frames recorded, nothing to write to {}", path.display());
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create trace file {}", path.display()))?;
        let row_len = self.num_bodies() * FLOATS_PER_BODY;

        let mut writer = npyz::WriteOptions::<f32>::new()
            .default_dtype()
            .shape(&[self.num_frames as u64, row_len as u64])
            .writer(BufWriter::new(file))
            .begin_nd()?;
        let values: &[f32] = bytemuck::cast_slice(&self.records);
        writer.extend(values.iter().copied())?;
        writer.finish()?;

        log::info!(
            "Saved trace: {} frames, {} bodies to {}",
            self.num_frames,
            self.num_bodies(),
            path.display()
        );
        Ok(())
    }
}

impl FrameSink for TraceRecorder {
    fn present(&mut self, _view_projection: Mat4, scene: &Scene) -> Result<()> {
        self.record_frame(scene.bodies())
    }
}

/// A trace read back from disk, one row of [`BodyRecord`]s per frame.
#[derive(Debug)]
pub struct TraceRun {
    path: PathBuf,
    num_frames: usize,
    num_bodies: usize,
    data: Vec<f32>,
}

impl TraceRun {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read trace file {}", path.display()))?;
        let npy = npyz::NpyFile::new(&bytes[..])
            .with_context(|| format!("{} is not an npy file", path.display()))?;

        let (num_frames, row_len) = match *npy.shape() {
            [frames, row_len] => (frames as usize, row_len as usize),
            ref shape => bail!("expected shape (frames, bodies * 13), got {:?}", shape),
        };
        if row_len == 0 || row_len % FLOATS_PER_BODY != 0 {
            bail!(
                "row length {} is not a whole number of {}-float bodies",
                row_len,
                FLOATS_PER_BODY
            );
        }

        let data: Vec<f32> = npy.into_vec().context("trace data must be f32")?;
        let run = Self::from_parts(path, num_frames, row_len / FLOATS_PER_BODY, data)?;
        log::info!(
            "Loaded trace {}: {} frames, {} bodies",
            path.display(),
            run.num_frames,
            run.num_bodies
        );
        Ok(run)
    }

    fn from_parts(
        path: &Path,
        num_frames: usize,
        num_bodies: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        let expected = num_frames * num_bodies * FLOATS_PER_BODY;
        if data.len() != expected {
            bail!(
                "trace holds {} floats, its shape needs {}",
                data.len(),
                expected
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
            num_frames,
            num_bodies,
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_bodies(&self) -> usize {
        self.num_bodies
    }

    /// Bodies of one frame, floor first.
    pub fn frame(&self, index: usize) -> Result<&[BodyRecord]> {
        if index >= self.num_frames {
            bail!(
                "frame {} out of range, trace has {} frames",
                index,
                self.num_frames
            );
        }
        let row_len = self.num_bodies * FLOATS_PER_BODY;
        let row = &self.data[index * row_len..(index + 1) * row_len];
        bytemuck::try_cast_slice(row)
            .map_err(|e| anyhow!("malformed frame {}: {:?}", index, e))
    }

    pub fn frames(&self) -> impl Iterator<Item = &[BodyRecord]> + '_ {
        (0..self.num_frames).filter_map(move |index| self.frame(index).ok())
    }

    pub fn duration_seconds(&self, fps: u32) -> f32 {
        self.num_frames as f32 / fps.max(1) as f32
    }
}
