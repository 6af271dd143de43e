use crate::foundation::core::Rect;
use crate::foundation::error::{StackError, StackResult};

/// Minimal rectangle enclosing every rect in `rects`.
///
/// `top = (min x, min y)`, `bottom = (max x+w, max y+h)`. Zero-sized rects still contribute their
/// position.
pub fn bounding_box<I>(rects: I) -> StackResult<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    let mut it = rects.into_iter();
    let first = it
        .next()
        .ok_or_else(|| StackError::empty_canvas("no sub-images have been pushed"))?;

    let (mut left, mut top) = (first.x, first.y);
    let (mut right, mut bottom) = (first.right(), first.bottom());
    for r in it {
        left = left.min(r.x);
        top = top.min(r.y);
        right = right.max(r.right());
        bottom = bottom.max(r.bottom());
    }

    let span = |lo: u32, hi: u64, axis: &str| {
        u32::try_from(hi - u64::from(lo)).map_err(|_| {
            StackError::allocation(format!("bounding box {axis} exceeds {}", u32::MAX))
        })
    };
    Ok(Rect {
        x: left,
        y: top,
        w: span(left, right, "width")?,
        h: span(top, bottom, "height")?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/composite/bounds.rs"]
mod tests;
