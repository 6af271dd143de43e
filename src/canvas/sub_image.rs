use crate::foundation::core::{Rect, raster_len};
use crate::foundation::error::{StackError, StackResult};
use crate::pixel::format::PixelFormat;

/// Owned copy of a caller-supplied rectangular pixel patch.
///
/// Invariant: `data.len() == rect.w * rect.h * format.channels()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubImage {
    data: Vec<u8>,
    rect: Rect,
    format: PixelFormat,
}

impl SubImage {
    /// Deep-copy the first `w * h * channels` bytes of `bytes`.
    ///
    /// Longer buffers are accepted and truncated; shorter ones are rejected.
    pub fn copy_from(bytes: &[u8], rect: Rect, format: PixelFormat) -> StackResult<Self> {
        if !matches!(format.channels(), 3 | 4) {
            return Err(StackError::invalid_argument(format!(
                "sub-images must be 3- or 4-channel, got '{format}'"
            )));
        }
        let len = raster_len(rect.w, rect.h, format.channels())?;
        let Some(src) = bytes.get(..len) else {
            return Err(StackError::invalid_argument(format!(
                "buffer holds {} bytes, but a {}x{} {format} patch needs {len}",
                bytes.len(),
                rect.w,
                rect.h
            )));
        };

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            StackError::allocation(format!("failed to copy {len}-byte sub-image: {e}"))
        })?;
        data.extend_from_slice(src);
        Ok(Self { data, rect, format })
    }

    /// Copied pixel bytes in the source format.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Placement on the canvas.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Format the caller declared.
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/sub_image.rs"]
mod tests;
