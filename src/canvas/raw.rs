use std::sync::Arc;

use crate::encode::encoder::{Encoder, PngEncoder, RasterRef};
use crate::encode::task::{EncodeQueue, Encoded, TaskHandle};
use crate::foundation::core::{non_negative, raster_len};
use crate::foundation::error::{StackError, StackResult};
use crate::pixel::format::PixelFormat;

/// A single caller buffer encoded as-is, without compositing.
///
/// Unlike the canvases this accepts every [`PixelFormat`], including `Gray`, and hands the
/// buffer to the encoder in its original layout.
#[derive(Clone, Debug)]
pub struct RawImage {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
    format: PixelFormat,
    encoder: Arc<dyn Encoder>,
}

impl RawImage {
    /// Copy the first `width * height * channels` bytes of `bytes`, encoding to PNG.
    pub fn new(bytes: &[u8], width: i32, height: i32, format: PixelFormat) -> StackResult<Self> {
        Self::with_encoder(bytes, width, height, format, Arc::new(PngEncoder))
    }

    /// Like [`RawImage::new`] but with a caller-chosen encoder.
    pub fn with_encoder(
        bytes: &[u8],
        width: i32,
        height: i32,
        format: PixelFormat,
        encoder: Arc<dyn Encoder>,
    ) -> StackResult<Self> {
        let width = non_negative(width, "width")?;
        let height = non_negative(height, "height")?;
        let len = raster_len(width, height, format.channels())?;
        let data = bytes.get(..len).ok_or_else(|| {
            StackError::invalid_argument(format!(
                "buffer holds {} bytes, but a {width}x{height} {format} image needs {len}",
                bytes.len()
            ))
        })?;

        Ok(Self {
            data: Arc::from(data),
            width,
            height,
            format,
            encoder,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format the caller declared.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn raster(&self) -> RasterRef<'_> {
        RasterRef {
            data: &self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Encode on the calling thread.
    #[tracing::instrument(
        skip(self),
        fields(width = self.width, height = self.height, format = %self.format)
    )]
    pub fn encode_sync(&self) -> StackResult<Vec<u8>> {
        self.encoder.encode(self.raster())
    }

    /// Schedule an encode on `queue`. The image is shared with the task, not copied.
    pub fn encode_async<C>(&self, queue: &mut EncodeQueue, callback: C) -> TaskHandle
    where
        C: FnOnce(StackResult<Encoded>) + 'static,
    {
        let image = self.clone();
        queue.schedule(
            move || {
                Ok(Encoded {
                    bytes: image.encode_sync()?,
                    dimensions: None,
                })
            },
            callback,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/raw.rs"]
mod tests;
