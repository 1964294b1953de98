//! Voxel density files.
//!
//! A density file is a `sx × sy × sz` grid of unsigned 8, 16 or 32-bit samples
//! preceded by a six byte big-endian header:
//!
//! ```text
//! [u16 sx][u16 sy][u16 sz][samples, Z-major then Y then X]
//! ```
//!
//! The grid covers the unit cube; [`DensityFile::sample`] returns 0 outside it.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Interpolation between voxel centers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DensityInterpolation {
    #[default]
    Nearest,
    Trilinear,
    Tricubic,
}

#[derive(Debug, Clone)]
enum Samples {
    U8(Arc<[u8]>),
    U16(Arc<[u16]>),
    U32(Arc<[u32]>),
}

impl Samples {
    #[inline]
    fn get(&self, index: usize) -> f64 {
        match self {
            Samples::U8(s) => f64::from(s[index]) / f64::from(u8::MAX),
            Samples::U16(s) => f64::from(s[index]) / f64::from(u16::MAX),
            Samples::U32(s) => f64::from(s[index]) / f64::from(u32::MAX),
        }
    }

    fn width(&self) -> usize {
        match self {
            Samples::U8(_) => 1,
            Samples::U16(_) => 2,
            Samples::U32(_) => 4,
        }
    }
}

/// Immutable voxel grid; clones share the samples.
#[derive(Debug, Clone)]
pub struct DensityFile {
    size: [usize; 3],
    samples: Samples,
    interpolation: DensityInterpolation,
}

impl DensityFile {
    /// Parses a density file from memory.
    ///
    /// The sample width is inferred from the payload length, which must be exactly
    /// one, two or four bytes per voxel.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 6 {
            return Err(Error::DensityFileSize {
                size_x: 0,
                size_y: 0,
                size_z: 0,
                payload: 0,
            });
        }
        let size = [
            usize::from(BigEndian::read_u16(&bytes[0..2])),
            usize::from(BigEndian::read_u16(&bytes[2..4])),
            usize::from(BigEndian::read_u16(&bytes[4..6])),
        ];
        let payload = &bytes[6..];
        let voxels = size[0] * size[1] * size[2];
        let size_error = || Error::DensityFileSize {
            size_x: size[0],
            size_y: size[1],
            size_z: size[2],
            payload: payload.len(),
        };
        if voxels == 0 {
            return Err(size_error());
        }

        let samples = if payload.len() == voxels * 4 {
            let mut out = vec![0u32; voxels];
            BigEndian::read_u32_into(payload, &mut out);
            Samples::U32(out.into())
        } else if payload.len() == voxels * 2 {
            let mut out = vec![0u16; voxels];
            BigEndian::read_u16_into(payload, &mut out);
            Samples::U16(out.into())
        } else if payload.len() == voxels {
            Samples::U8(payload.into())
        } else {
            return Err(size_error());
        };

        Ok(Self {
            size,
            samples,
            interpolation: DensityInterpolation::default(),
        })
    }

    /// Reads a whole density file from `reader`.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let sx = reader.read_u16::<BigEndian>()?;
        let sy = reader.read_u16::<BigEndian>()?;
        let sz = reader.read_u16::<BigEndian>()?;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&sx.to_be_bytes());
        bytes.extend_from_slice(&sy.to_be_bytes());
        bytes.extend_from_slice(&sz.to_be_bytes());
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Loads a density file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "Loaded density file '{}': {}x{}x{} voxels, {} byte samples.",
            path.display(),
            file.size[0],
            file.size[1],
            file.size[2],
            file.samples.width()
        );
        Ok(file)
    }

    pub fn with_interpolation(mut self, interpolation: DensityInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn interpolation(&self) -> DensityInterpolation {
        self.interpolation
    }

    /// Grid dimensions `[sx, sy, sz]`.
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Bytes per sample: 1, 2 or 4.
    pub fn sample_width(&self) -> usize {
        self.samples.width()
    }

    /// Normalized value of one voxel.
    #[inline]
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> f64 {
        let [sx, sy, _] = self.size;
        self.samples.get(z * sy * sx + y * sx + x)
    }

    /// Density at `p`, 0 outside the unit cube.
    pub fn sample(&self, p: DVec3) -> f64 {
        if p.cmplt(DVec3::ZERO).any() || p.cmpge(DVec3::ONE).any() {
            return 0.0;
        }
        let density = match self.interpolation {
            DensityInterpolation::Nearest => self.nearest(p),
            DensityInterpolation::Trilinear => self.trilinear(p),
            DensityInterpolation::Tricubic => self.tricubic(p),
        };
        density.max(0.0)
    }

    fn nearest(&self, p: DVec3) -> f64 {
        let [sx, sy, sz] = self.size;
        let x = (p.x * sx as f64) as usize;
        let y = (p.y * sy as f64) as usize;
        let z = (p.z * sz as f64) as usize;
        if x >= sx || y >= sy || z >= sz {
            return 0.0;
        }
        self.voxel(x, y, z)
    }

    fn trilinear(&self, p: DVec3) -> f64 {
        let [sx, sy, sz] = self.size;
        let scaled = p * DVec3::new(sx as f64, sy as f64, sz as f64);
        let x1 = (scaled.x as usize).min(sx - 1);
        let y1 = (scaled.y as usize).min(sy - 1);
        let z1 = (scaled.z as usize).min(sz - 1);
        let (x2, y2, z2) = ((x1 + 1) % sx, (y1 + 1) % sy, (z1 + 1) % sz);
        let t = scaled - scaled.floor();
        let (xi, yi) = (1.0 - t.x, 1.0 - t.y);

        let near = (self.voxel(x1, y1, z1) * xi + self.voxel(x2, y1, z1) * t.x) * yi
            + (self.voxel(x1, y2, z1) * xi + self.voxel(x2, y2, z1) * t.x) * t.y;
        let far = (self.voxel(x1, y1, z2) * xi + self.voxel(x2, y1, z2) * t.x) * yi
            + (self.voxel(x1, y2, z2) * xi + self.voxel(x2, y2, z2) * t.x) * t.y;
        near * (1.0 - t.z) + far * t.z
    }

    /// Cubic interpolation over the 4x4x4 neighborhood, reducing Z, then Y, then X.
    fn tricubic(&self, p: DVec3) -> f64 {
        let [sx, sy, sz] = self.size;
        let scaled = p * DVec3::new(sx as f64, sy as f64, sz as f64);
        let base = [
            (scaled.x as usize).min(sx - 1) as isize,
            (scaled.y as usize).min(sy - 1) as isize,
            (scaled.z as usize).min(sz - 1) as isize,
        ];
        let t = scaled - scaled.floor();

        let k: [usize; 4] = std::array::from_fn(|n| wrap_index(base[2] + n as isize - 1, sz));
        let mut columns = [[0.0; 4]; 4];
        for (i, column) in columns.iter_mut().enumerate() {
            let ii = wrap_index(base[0] + i as isize - 1, sx);
            for (j, value) in column.iter_mut().enumerate() {
                let jj = wrap_index(base[1] + j as isize - 1, sy);
                *value = intp3(
                    t.z,
                    self.voxel(ii, jj, k[0]),
                    self.voxel(ii, jj, k[1]),
                    self.voxel(ii, jj, k[2]),
                    self.voxel(ii, jj, k[3]),
                );
            }
        }
        let rows: [f64; 4] =
            std::array::from_fn(|i| intp3(t.y, columns[i][0], columns[i][1], columns[i][2], columns[i][3]));
        intp3(t.x, rows[0], rows[1], rows[2], rows[3])
    }
}

/// Wraps `i` into `0..size`; `-1` maps to the last index.
#[inline]
fn wrap_index(i: isize, size: usize) -> usize {
    if i < 0 {
        size - 1
    } else {
        i as usize % size
    }
}

/// Cubic through `fb` at `t = 0` and `fc` at `t = 1` with central-difference tangents.
#[inline]
fn intp3(t: f64, fa: f64, fb: f64, fc: f64, fd: f64) -> f64 {
    let b = (fc - fa) * 0.5;
    let d = (fd - fb) * 0.5;
    let e = 2.0 * (fb - fc) + b + d;
    let f = -3.0 * (fb - fc) - 2.0 * b - d;
    ((e * t + f) * t + b) * t + fb
}
