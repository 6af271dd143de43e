use crate::canvas::sub_image::SubImage;
use crate::foundation::error::{StackError, StackResult};

/// Bytes per pixel of every canvas raster.
pub const CANVAS_CHANNELS: usize = 4;
/// Initial value of every canvas byte (opaque white).
pub const FILL_BYTE: u8 = 0xFF;
/// Alpha written for 3-channel sources.
///
/// Zero even though the canvas is filled opaque; stacked RGB patches come out fully transparent.
pub const MISSING_ALPHA: u8 = 0x00;

/// Copy `sub` into a 4-channel raster `dst` of width `dst_width`, with its top-left pixel at
/// `(dst_x, dst_y)`.
///
/// Colour bytes are copied verbatim in the order supplied (no RGB/BGR swap). Alpha comes from the
/// source when it has one, otherwise it is [`MISSING_ALPHA`]. Fails without touching `dst` if the
/// patch does not fit.
pub fn blit(
    dst: &mut [u8],
    dst_width: u32,
    sub: &SubImage,
    dst_x: u32,
    dst_y: u32,
) -> StackResult<()> {
    let rect = sub.rect();
    if rect.w == 0 || rect.h == 0 {
        return Ok(());
    }

    let (w, h) = (rect.w as usize, rect.h as usize);
    let (x, y) = (dst_x as usize, dst_y as usize);
    let dst_stride = dst_width as usize * CANVAS_CHANNELS;
    let fits = x + w <= dst_width as usize
        && (y + h)
            .checked_mul(dst_stride)
            .is_some_and(|end| end <= dst.len());
    if !fits {
        return Err(StackError::out_of_bounds(format!(
            "{}x{} patch at ({dst_x},{dst_y}) does not fit a {dst_width}-wide raster of {} bytes",
            rect.w,
            rect.h,
            dst.len()
        )));
    }

    let src_stride = w * sub.format().channels();
    let span = x * CANVAS_CHANNELS..(x + w) * CANVAS_CHANNELS;
    let src_rows = sub.data().chunks_exact(src_stride);
    let dst_rows = dst.chunks_exact_mut(dst_stride).skip(y).take(h);

    if sub.format().has_alpha() {
        for (src, row) in src_rows.zip(dst_rows) {
            row[span.clone()].copy_from_slice(src);
        }
    } else {
        for (src, row) in src_rows.zip(dst_rows) {
            expand_row(src, &mut row[span.clone()]);
        }
    }
    Ok(())
}

fn expand_row(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(CANVAS_CHANNELS).zip(src.chunks_exact(3)) {
        d[..3].copy_from_slice(s);
        d[3] = MISSING_ALPHA;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blit.rs"]
mod tests;
