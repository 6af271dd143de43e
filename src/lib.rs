//! pngstack composites raw pixel patches onto a canvas and encodes the result (PNG by default).
//!
//! # Canvases
//!
//! - [`FixedCanvas`]: declared up front as `width x height`; each push is composited in place and
//!   rejected if it does not fit.
//! - [`DynamicCanvas`]: accepts any non-negative placement; at encode time the bounding box of all
//!   pushes is computed and the patches are composited, in push order, into a buffer of that size.
//! - [`RawImage`]: a single buffer encoded as-is (also supports grayscale).
//!
//! Canvas storage is always 4 bytes per pixel, initialised to opaque white. Colour bytes are copied
//! verbatim. 4-channel sources keep their alpha, 3-channel sources write alpha `0`.
//!
//! # Encoding
//!
//! `encode_sync` runs on the calling thread. `encode_async` snapshots the canvas, runs composite +
//! encode on an [`EncodeQueue`] worker, and later invokes the callback exactly once on the thread
//! that drives the queue ([`EncodeQueue::poll`] / [`EncodeQueue::run_until_idle`]).
//!
//! ```no_run
//! use pngstack::{DynamicCanvas, EncodeQueue, EncodeQueueOpts, PixelFormat};
//!
//! # fn main() -> pngstack::StackResult<()> {
//! let mut canvas = DynamicCanvas::new(PixelFormat::Rgba)?;
//! canvas.push(&[255u8, 0, 0, 255].repeat(4), 0, 0, 2, 2)?;
//! canvas.push(&[0u8, 0, 255, 255].repeat(6), 3, 1, 2, 3)?;
//!
//! let mut queue = EncodeQueue::new(EncodeQueueOpts::default())?;
//! canvas.encode_async(&mut queue, |res| match res {
//!     Ok(out) => println!("{} bytes, {:?}", out.bytes.len(), out.dimensions),
//!     Err(e) => eprintln!("{e}"),
//! });
//! queue.run_until_idle()?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod canvas;
mod composite;
mod encode;
mod foundation;
mod pixel;

pub mod manifest;

pub use canvas::dynamic::DynamicCanvas;
pub use canvas::fixed::FixedCanvas;
pub use canvas::raw::RawImage;
pub use canvas::sub_image::SubImage;
pub use composite::blit::{CANVAS_CHANNELS, FILL_BYTE, MISSING_ALPHA, blit};
pub use composite::bounds::bounding_box;
pub use encode::encoder::{Encoder, PngEncoder, Raster, RasterRef};
pub use encode::task::{
    EncodeQueue, EncodeQueueOpts, Encoded, TaskHandle, TaskId, TaskState,
};
pub use foundation::core::{Dimensions, Rect};
pub use foundation::error::{StackError, StackResult};
pub use manifest::{CanvasSize, LayerSpec, Stack, StackManifest};
pub use pixel::format::{ByteOrder, PixelFormat};
