use std::borrow::Cow;
use std::fmt;

use image::{ExtendedColorType, ImageEncoder as _};

use crate::foundation::core::raster_len;
use crate::foundation::error::{StackError, StackResult};
use crate::pixel::format::PixelFormat;

/// Borrowed raw raster handed to an [`Encoder`].
#[derive(Clone, Copy, Debug)]
pub struct RasterRef<'a> {
    /// Row-major pixel bytes, `format.channels()` per pixel.
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl RasterRef<'_> {
    /// Check that `data` holds exactly `width * height * channels` bytes of a non-empty raster.
    pub fn validate(&self) -> StackResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StackError::encode(format!(
                "cannot encode an empty {}x{} raster",
                self.width, self.height
            )));
        }
        let expected = raster_len(self.width, self.height, self.format.channels())?;
        if self.data.len() != expected {
            return Err(StackError::encode(format!(
                "{}x{} {} raster needs {expected} bytes, got {}",
                self.width,
                self.height,
                self.format,
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// Owned raw raster, e.g. the output of compositing a dynamic canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Row-major pixel bytes, `format.channels()` per pixel.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl Raster {
    /// Borrow as a [`RasterRef`].
    pub fn view(&self) -> RasterRef<'_> {
        RasterRef {
            data: &self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

/// Produces an encoded image from a raw raster.
///
/// Canvases call this from worker threads, so implementations must be `Send + Sync`.
pub trait Encoder: Send + Sync + fmt::Debug {
    /// Encode `raster`. Failures should be reported as [`StackError::Encode`].
    fn encode(&self, raster: RasterRef<'_>) -> StackResult<Vec<u8>>;
}

/// 8-bit PNG output via the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEncoder;

impl Encoder for PngEncoder {
    fn encode(&self, raster: RasterRef<'_>) -> StackResult<Vec<u8>> {
        raster.validate()?;

        let (pixels, color): (Cow<'_, [u8]>, ExtendedColorType) = match raster.format {
            PixelFormat::Rgb => (Cow::Borrowed(raster.data), ExtendedColorType::Rgb8),
            PixelFormat::Rgba => (Cow::Borrowed(raster.data), ExtendedColorType::Rgba8),
            PixelFormat::Gray => (Cow::Borrowed(raster.data), ExtendedColorType::L8),
            PixelFormat::Bgr => {
                (Cow::Owned(swap_red_blue(raster.data, 3)), ExtendedColorType::Rgb8)
            }
            PixelFormat::Bgra => {
                (Cow::Owned(swap_red_blue(raster.data, 4)), ExtendedColorType::Rgba8)
            }
        };

        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(&pixels, raster.width, raster.height, color)
            .map_err(|e| StackError::encode(format!("png: {e}")))?;
        Ok(out)
    }
}

fn swap_red_blue(data: &[u8], channels: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    for px in out.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
