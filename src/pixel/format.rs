use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{StackError, StackResult};

/// Channel layout of a caller-supplied pixel buffer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 3 bytes per pixel, red first.
    #[default]
    Rgb,
    /// 3 bytes per pixel, blue first.
    Bgr,
    /// 4 bytes per pixel, red first, straight alpha last.
    Rgba,
    /// 4 bytes per pixel, blue first, straight alpha last.
    Bgra,
    /// Single-channel luminance. Only valid for [`crate::RawImage`].
    Gray,
}

/// Colour order of the 4-byte-per-pixel canvas storage handed to an encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `R G B A`
    Rgba,
    /// `B G R A`
    Bgra,
}

impl PixelFormat {
    /// Every format, in declaration order.
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Gray,
    ];

    /// Bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
            PixelFormat::Gray => 1,
        }
    }

    /// `true` for the 4-channel formats.
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba | PixelFormat::Bgra)
    }

    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "rgb",
            PixelFormat::Bgr => "bgr",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Bgra => "bgra",
            PixelFormat::Gray => "gray",
        }
    }

    /// Canonical 4-channel byte order for canvases declared with this format.
    ///
    /// Fails for [`PixelFormat::Gray`], which cannot be stacked.
    pub fn canvas_order(self) -> StackResult<ByteOrder> {
        match self {
            PixelFormat::Rgb | PixelFormat::Rgba => Ok(ByteOrder::Rgba),
            PixelFormat::Bgr | PixelFormat::Bgra => Ok(ByteOrder::Bgra),
            PixelFormat::Gray => Err(StackError::invalid_argument(
                "canvas format must be 'rgb', 'bgr', 'rgba' or 'bgra' (gray cannot be stacked)",
            )),
        }
    }
}

impl ByteOrder {
    /// The 4-channel [`PixelFormat`] describing rasters stored in this order.
    pub fn pixel_format(self) -> PixelFormat {
        match self {
            ByteOrder::Rgba => PixelFormat::Rgba,
            ByteOrder::Bgra => PixelFormat::Bgra,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                StackError::invalid_argument(format!(
                    "unrecognized pixel format '{s}' (expected 'gray', 'rgb', 'bgr', 'rgba' or 'bgra')"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/format.rs"]
mod tests;
