use crate::foundation::error::{StackError, StackResult};

/// Axis-aligned rectangle in canvas pixel space.
///
/// Coordinates are unsigned: negative input is rejected at the API boundary by
/// [`Rect::from_signed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Rect {
    /// Rect with top-left `(x, y)` and size `w x h`.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Validate a caller-supplied placement. Every component must be `>= 0`.
    pub fn from_signed(x: i32, y: i32, w: i32, h: i32) -> StackResult<Self> {
        Ok(Self {
            x: non_negative(x, "coordinate x")?,
            y: non_negative(y, "coordinate y")?,
            w: non_negative(w, "width")?,
            h: non_negative(h, "height")?,
        })
    }

    /// Exclusive right edge. Cannot overflow for rects built from `i32` input.
    pub fn right(self) -> u64 {
        u64::from(self.x) + u64::from(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u64 {
        u64::from(self.y) + u64::from(self.h)
    }

    /// Pixel count. Zero when either side is zero.
    pub fn area(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
}

/// Placement and size of a composited raster.
///
/// For a dynamic canvas `(x, y)` is the bounding box's top-left corner in push coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl From<Rect> for Dimensions {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.w,
            height: r.h,
        }
    }
}

pub(crate) fn non_negative(v: i32, what: &str) -> StackResult<u32> {
    u32::try_from(v)
        .map_err(|_| StackError::invalid_argument(format!("{what} smaller than 0 (got {v})")))
}

/// Byte length of a `width x height` raster with `channels` bytes per pixel, as a `usize`.
pub(crate) fn raster_len(width: u32, height: u32, channels: usize) -> StackResult<usize> {
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|px| px.checked_mul(channels as u64))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            StackError::allocation(format!(
                "raster {width}x{height}x{channels} exceeds addressable memory"
            ))
        })
}

/// Allocate `len` bytes set to `fill`, surfacing allocator failure instead of aborting.
pub(crate) fn filled_buffer(len: usize, fill: u8) -> StackResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| StackError::allocation(format!("failed to allocate {len} bytes: {e}")))?;
    buf.resize(len, fill);
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
