use std::sync::Arc;

use crate::canvas::sub_image::SubImage;
use crate::composite::blit::{CANVAS_CHANNELS, FILL_BYTE, blit};
use crate::composite::bounds::bounding_box;
use crate::encode::encoder::{Encoder, PngEncoder, Raster};
use crate::encode::task::{EncodeQueue, Encoded, TaskHandle};
use crate::foundation::core::{Dimensions, Rect, filled_buffer, raster_len};
use crate::foundation::error::StackResult;
use crate::pixel::format::{ByteOrder, PixelFormat};

/// Unbounded canvas: sub-images are stored on push and composited into a buffer sized to their
/// bounding box at encode time.
///
/// Nothing is cached; every encode recomputes the box and re-composites in push order.
#[derive(Clone, Debug)]
pub struct DynamicCanvas {
    format: PixelFormat,
    order: ByteOrder,
    sub_images: Vec<Arc<SubImage>>,
    encoder: Arc<dyn Encoder>,
}

impl DynamicCanvas {
    /// Create an empty canvas whose pushes use `format`, encoding to PNG.
    pub fn new(format: PixelFormat) -> StackResult<Self> {
        Self::with_encoder(format, Arc::new(PngEncoder))
    }

    /// Like [`DynamicCanvas::new`] but with a caller-chosen encoder.
    pub fn with_encoder(format: PixelFormat, encoder: Arc<dyn Encoder>) -> StackResult<Self> {
        let order = format.canvas_order()?;
        Ok(Self {
            format,
            order,
            sub_images: Vec::new(),
            encoder,
        })
    }

    /// Format the caller declared.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of sub-images pushed so far.
    pub fn len(&self) -> usize {
        self.sub_images.len()
    }

    /// `true` before the first push.
    pub fn is_empty(&self) -> bool {
        self.sub_images.is_empty()
    }

    /// Store a copy of a `w x h` patch placed at `(x, y)`. Any non-negative placement is accepted.
    pub fn push(&mut self, bytes: &[u8], x: i32, y: i32, w: i32, h: i32) -> StackResult<()> {
        let rect = Rect::from_signed(x, y, w, h)?;
        let sub = SubImage::copy_from(bytes, rect, self.format)?;
        self.sub_images.push(Arc::new(sub));
        tracing::debug!(x, y, w, h, count = self.sub_images.len(), "pushed onto dynamic canvas");
        Ok(())
    }

    /// Offset and size of the bounding box over every pushed sub-image.
    pub fn dimensions(&self) -> StackResult<Dimensions> {
        bounding_box(self.sub_images.iter().map(|s| s.rect())).map(Dimensions::from)
    }

    /// Composite every sub-image into a fresh white buffer without encoding it.
    pub fn composite(&self) -> StackResult<(Raster, Dimensions)> {
        composite_layers(&self.sub_images, self.order)
    }

    /// Composite and encode on the calling thread. The result carries the bounding box.
    #[tracing::instrument(skip(self), fields(layers = self.sub_images.len()))]
    pub fn encode_sync(&self) -> StackResult<Encoded> {
        encode_layers(&self.sub_images, self.order, self.encoder.as_ref())
    }

    /// Schedule composite + encode of the sub-images pushed so far.
    ///
    /// The task holds its own list of the (immutable) sub-images, so pushes made afterwards are not
    /// part of its output. The callback's [`Encoded::dimensions`] is always `Some`.
    pub fn encode_async<C>(&self, queue: &mut EncodeQueue, callback: C) -> TaskHandle
    where
        C: FnOnce(StackResult<Encoded>) + 'static,
    {
        let layers = self.sub_images.clone();
        let encoder = Arc::clone(&self.encoder);
        let order = self.order;
        queue.schedule(
            move || encode_layers(&layers, order, encoder.as_ref()),
            callback,
        )
    }
}

fn encode_layers(
    layers: &[Arc<SubImage>],
    order: ByteOrder,
    encoder: &dyn Encoder,
) -> StackResult<Encoded> {
    let (raster, dims) = composite_layers(layers, order)?;
    let bytes = encoder.encode(raster.view())?;
    Ok(Encoded {
        bytes,
        dimensions: Some(dims),
    })
}

fn composite_layers(
    layers: &[Arc<SubImage>],
    order: ByteOrder,
) -> StackResult<(Raster, Dimensions)> {
    let bbox = bounding_box(layers.iter().map(|s| s.rect()))?;
    tracing::debug!(
        x = bbox.x,
        y = bbox.y,
        width = bbox.w,
        height = bbox.h,
        "dynamic canvas bounding box"
    );

    let len = raster_len(bbox.w, bbox.h, CANVAS_CHANNELS)?;
    let mut data = filled_buffer(len, FILL_BYTE)?;
    for sub in layers {
        let r = sub.rect();
        blit(&mut data, bbox.w, sub, r.x - bbox.x, r.y - bbox.y)?;
    }

    let raster = Raster {
        data,
        width: bbox.w,
        height: bbox.h,
        format: order.pixel_format(),
    };
    Ok((raster, Dimensions::from(bbox)))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/dynamic.rs"]
mod tests;
