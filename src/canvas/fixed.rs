use std::sync::Arc;

use crate::canvas::sub_image::SubImage;
use crate::composite::blit::{CANVAS_CHANNELS, FILL_BYTE, blit};
use crate::encode::encoder::{Encoder, PngEncoder, RasterRef};
use crate::encode::task::{EncodeQueue, Encoded, TaskHandle};
use crate::foundation::core::{Rect, filled_buffer, non_negative, raster_len};
use crate::foundation::error::{StackError, StackResult};
use crate::pixel::format::{ByteOrder, PixelFormat};

/// Canvas with pre-declared dimensions. Pushes composite straight into its buffer.
///
/// The buffer is shared with in-flight async encodes and copied on the first push after one was
/// scheduled, so pushes never race with a background read.
#[derive(Clone, Debug)]
pub struct FixedCanvas {
    width: u32,
    height: u32,
    format: PixelFormat,
    order: ByteOrder,
    pixels: Arc<Vec<u8>>,
    encoder: Arc<dyn Encoder>,
}

impl FixedCanvas {
    /// Create a `width x height` canvas filled with opaque white, encoding to PNG.
    pub fn new(width: i32, height: i32, format: PixelFormat) -> StackResult<Self> {
        Self::with_encoder(width, height, format, Arc::new(PngEncoder))
    }

    /// Like [`FixedCanvas::new`] but with a caller-chosen encoder.
    pub fn with_encoder(
        width: i32,
        height: i32,
        format: PixelFormat,
        encoder: Arc<dyn Encoder>,
    ) -> StackResult<Self> {
        let width = non_negative(width, "width")?;
        let height = non_negative(height, "height")?;
        let order = format.canvas_order()?;
        let len = raster_len(width, height, CANVAS_CHANNELS)?;
        let pixels = filled_buffer(len, FILL_BYTE)?;
        tracing::debug!(width, height, %format, "fixed canvas created");

        Ok(Self {
            width,
            height,
            format,
            order,
            pixels: Arc::new(pixels),
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

    /// Current 4-channel raster, row-major, in the canvas's [`ByteOrder`].
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Composite a `w x h` patch with its top-left corner at `(x, y)`.
    ///
    /// Every check runs before the buffer is touched; a rejected push leaves it unchanged.
    pub fn push(&mut self, bytes: &[u8], x: i32, y: i32, w: i32, h: i32) -> StackResult<()> {
        let rect = Rect::from_signed(x, y, w, h)?;
        self.check_bounds(rect)?;
        let sub = SubImage::copy_from(bytes, rect, self.format)?;

        let pixels: &mut Vec<u8> = Arc::make_mut(&mut self.pixels);
        blit(pixels, self.width, &sub, rect.x, rect.y)?;
        tracing::debug!(x, y, w, h, "pushed onto fixed canvas");
        Ok(())
    }

    fn check_bounds(&self, r: Rect) -> StackResult<()> {
        if r.x >= self.width {
            return Err(StackError::out_of_bounds(format!(
                "coordinate x {} exceeds canvas width {}",
                r.x, self.width
            )));
        }
        if r.y >= self.height {
            return Err(StackError::out_of_bounds(format!(
                "coordinate y {} exceeds canvas height {}",
                r.y, self.height
            )));
        }
        if r.right() > u64::from(self.width) {
            return Err(StackError::out_of_bounds(format!(
                "pushed image spans to x={} past canvas width {}",
                r.right(),
                self.width
            )));
        }
        if r.bottom() > u64::from(self.height) {
            return Err(StackError::out_of_bounds(format!(
                "pushed image spans to y={} past canvas height {}",
                r.bottom(),
                self.height
            )));
        }
        Ok(())
    }

    fn raster(&self) -> RasterRef<'_> {
        RasterRef {
            data: &self.pixels,
            width: self.width,
            height: self.height,
            format: self.order.pixel_format(),
        }
    }

    /// Encode the current buffer on the calling thread.
    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn encode_sync(&self) -> StackResult<Vec<u8>> {
        self.encoder.encode(self.raster())
    }

    /// Schedule an encode of the buffer as it is right now.
    ///
    /// Later pushes do not affect the result. `callback` runs on the thread that drives `queue`.
    pub fn encode_async<C>(&self, queue: &mut EncodeQueue, callback: C) -> TaskHandle
    where
        C: FnOnce(StackResult<Encoded>) + 'static,
    {
        let pixels = Arc::clone(&self.pixels);
        let encoder = Arc::clone(&self.encoder);
        let (width, height, format) = (self.width, self.height, self.order.pixel_format());

        queue.schedule(
            move || {
                let bytes = encoder.encode(RasterRef {
                    data: &pixels,
                    width,
                    height,
                    format,
                })?;
                Ok(Encoded {
                    bytes,
                    dimensions: None,
                })
            },
            callback,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/fixed.rs"]
mod tests;
