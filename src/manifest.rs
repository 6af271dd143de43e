//! JSON description of a stack: pixel format, optional fixed size, and ordered layers that point at
//! raw pixel files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::canvas::dynamic::DynamicCanvas;
use crate::canvas::fixed::FixedCanvas;
use crate::encode::task::{EncodeQueue, Encoded, TaskHandle};
use crate::foundation::error::{StackError, StackResult};
use crate::pixel::format::PixelFormat;

/// Fixed canvas size. When absent the stack uses a bounding-box canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Canvas width in pixels.
    pub width: i32,
    /// Canvas height in pixels.
    pub height: i32,
}

/// One raw pixel file and its placement.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerSpec {
    /// Raw pixel file, relative to the manifest's directory unless absolute.
    pub path: PathBuf,
    /// Left edge on the canvas.
    pub x: i32,
    /// Top edge on the canvas.
    pub y: i32,
    /// Layer width in pixels.
    pub width: i32,
    /// Layer height in pixels.
    pub height: i32,
}

/// Top-level manifest document.
///
/// ```json
/// { "format": "rgba", "canvas": { "width": 4, "height": 4 },
///   "layers": [{ "path": "a.raw", "x": 0, "y": 0, "width": 2, "height": 2 }] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackManifest {
    /// Format shared by the canvas and every layer file.
    pub format: PixelFormat,
    /// Fixed canvas size; `None` selects a dynamic canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasSize>,
    /// Layers in compositing order.
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

impl StackManifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> StackResult<Self> {
        let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
        let manifest = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse manifest JSON '{}'", path.display()))?;
        Ok(manifest)
    }

    /// Read every layer from disk (relative to `root`) and push it in manifest order.
    pub fn build(&self, root: &Path) -> StackResult<Stack> {
        let mut stack = match self.canvas {
            Some(size) => Stack::Fixed(FixedCanvas::new(size.width, size.height, self.format)?),
            None => Stack::Dynamic(DynamicCanvas::new(self.format)?),
        };

        for (i, layer) in self.layers.iter().enumerate() {
            let path = root.join(&layer.path);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read layer {i} '{}'", path.display()))?;
            stack
                .push(&bytes, layer.x, layer.y, layer.width, layer.height)
                .map_err(|e| match e {
                    StackError::InvalidArgument(m) => {
                        StackError::invalid_argument(format!("layer {i}: {m}"))
                    }
                    StackError::OutOfBounds(m) => {
                        StackError::out_of_bounds(format!("layer {i}: {m}"))
                    }
                    other => other,
                })?;
        }
        Ok(stack)
    }
}

/// Either canvas kind behind one interface.
#[derive(Clone, Debug)]
pub enum Stack {
    /// Manifest declared a canvas size.
    Fixed(FixedCanvas),
    /// Manifest had no canvas size.
    Dynamic(DynamicCanvas),
}

impl Stack {
    /// Push onto the underlying canvas.
    pub fn push(&mut self, bytes: &[u8], x: i32, y: i32, w: i32, h: i32) -> StackResult<()> {
        match self {
            Stack::Fixed(c) => c.push(bytes, x, y, w, h),
            Stack::Dynamic(c) => c.push(bytes, x, y, w, h),
        }
    }

    /// Encode on the calling thread. `dimensions` is only set for dynamic stacks.
    pub fn encode_sync(&self) -> StackResult<Encoded> {
        match self {
            Stack::Fixed(c) => Ok(Encoded {
                bytes: c.encode_sync()?,
                dimensions: None,
            }),
            Stack::Dynamic(c) => c.encode_sync(),
        }
    }

    /// Schedule an encode of the current state on `queue`.
    pub fn encode_async<C>(&self, queue: &mut EncodeQueue, callback: C) -> TaskHandle
    where
        C: FnOnce(StackResult<Encoded>) + 'static,
    {
        match self {
            Stack::Fixed(c) => c.encode_async(queue, callback),
            Stack::Dynamic(c) => c.encode_async(queue, callback),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/manifest.rs"]
mod tests;
