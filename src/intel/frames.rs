//! PNG frame dumps of the intel tensor, for watching what the agent sees.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use super::encoding::IntelTensor;

/// Errors raised while writing intel frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to create frame directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("tensor of shape {0:?} is not a valid image")]
    Shape((usize, usize, usize)),
    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),
}

/// Writes every `every`-th tensor to `dir` as `frame_<tick>.png`.
#[derive(Debug, Clone)]
pub struct FrameDumper {
    dir: PathBuf,
    every: u64,
    created: bool,
}

impl FrameDumper {
    pub fn new(dir: impl Into<PathBuf>, every: u64) -> Self {
        FrameDumper {
            dir: dir.into(),
            every: every.max(1),
            created: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the frame if `tick` falls on the dump interval.
    pub fn maybe_write(
        &mut self,
        tick: u64,
        tensor: &IntelTensor,
    ) -> Result<Option<PathBuf>, FrameError> {
        if tick % self.every != 0 {
            return Ok(None);
        }
        if !self.created {
            fs::create_dir_all(&self.dir).map_err(|source| FrameError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
            self.created = true;
        }
        let (h, w, _) = tensor.shape();
        let img = RgbImage::from_raw(w as u32, h as u32, tensor.as_bytes())
            .ok_or(FrameError::Shape(tensor.shape()))?;
        let path = self.dir.join(format!("frame_{:06}.png", tick));
        img.save(&path)?;
        Ok(Some(path))
    }
}
