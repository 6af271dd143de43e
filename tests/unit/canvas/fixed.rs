use std::sync::Mutex;

use super::*;
use crate::encode::task::EncodeQueueOpts;

fn px(c: &FixedCanvas, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * c.width() + x) * 4) as usize;
    let p = c.pixels();
    [p[i], p[i + 1], p[i + 2], p[i + 3]]
}

#[derive(Debug, Default)]
struct RecordingEncoder {
    seen: Mutex<Vec<(u32, u32, PixelFormat, Vec<u8>)>>,
}

impl Encoder for RecordingEncoder {
    fn encode(&self, raster: RasterRef<'_>) -> StackResult<Vec<u8>> {
        self.seen.lock().unwrap().push((
            raster.width,
            raster.height,
            raster.format,
            raster.data.to_vec(),
        ));
        Ok(raster.data.to_vec())
    }
}

#[test]
fn starts_opaque_white() {
    let c = FixedCanvas::new(3, 2, PixelFormat::Rgba).unwrap();
    assert_eq!(c.pixels().len(), 3 * 2 * 4);
    assert!(c.pixels().iter().all(|&b| b == 0xFF));
}

#[test]
fn rgb_push_forces_zero_alpha() {
    let mut c = FixedCanvas::new(4, 4, PixelFormat::Rgb).unwrap();
    let red = [255u8, 0, 0].repeat(4);
    c.push(&red, 0, 0, 2, 2).unwrap();

    assert_eq!(px(&c, 0, 0), [255, 0, 0, 0]);
    assert_eq!(px(&c, 1, 1), [255, 0, 0, 0]);
    assert_eq!(px(&c, 3, 3), [255, 255, 255, 255]);
    assert_eq!(px(&c, 2, 0), [255, 255, 255, 255]);
}

#[test]
fn later_push_wins_in_overlap() {
    let mut c = FixedCanvas::new(3, 1, PixelFormat::Rgba).unwrap();
    c.push(&[1u8; 8], 0, 0, 2, 1).unwrap();
    c.push(&[2u8; 8], 1, 0, 2, 1).unwrap();
    assert_eq!(px(&c, 0, 0), [1; 4]);
    assert_eq!(px(&c, 1, 0), [2; 4]);
    assert_eq!(px(&c, 2, 0), [2; 4]);
}

#[test]
fn out_of_bounds_push_leaves_buffer_unchanged() {
    let mut c = FixedCanvas::new(4, 4, PixelFormat::Rgba).unwrap();
    c.push(&[9u8; 4], 1, 1, 1, 1).unwrap();
    let before = c.pixels().to_vec();

    for (x, y, w, h) in [(4, 0, 0, 0), (0, 4, 0, 0), (3, 0, 2, 1), (0, 3, 1, 2)] {
        let bytes = vec![0u8; (w * h * 4) as usize];
        let err = c.push(&bytes, x, y, w, h).unwrap_err();
        assert!(matches!(err, StackError::OutOfBounds(_)), "{err}");
    }
    assert_eq!(c.pixels(), before.as_slice());
}

#[test]
fn negative_arguments_are_invalid() {
    assert!(matches!(
        FixedCanvas::new(-1, 4, PixelFormat::Rgb).unwrap_err(),
        StackError::InvalidArgument(_)
    ));
    assert!(matches!(
        FixedCanvas::new(4, -4, PixelFormat::Rgb).unwrap_err(),
        StackError::InvalidArgument(_)
    ));

    let mut c = FixedCanvas::new(4, 4, PixelFormat::Rgb).unwrap();
    let err = c.push(&[], -1, 0, 0, 0).unwrap_err();
    assert!(matches!(err, StackError::InvalidArgument(_)));
    let err = c.push(&[], 0, 0, 0, -3).unwrap_err();
    assert!(matches!(err, StackError::InvalidArgument(_)));
}

#[test]
fn gray_canvas_is_rejected() {
    let err = FixedCanvas::new(2, 2, PixelFormat::Gray).unwrap_err();
    assert!(matches!(err, StackError::InvalidArgument(_)));
}

#[test]
fn short_buffer_is_rejected_before_mutation() {
    let mut c = FixedCanvas::new(2, 2, PixelFormat::Rgb).unwrap();
    let err = c.push(&[0u8; 11], 0, 0, 2, 2).unwrap_err();
    assert!(matches!(err, StackError::InvalidArgument(_)));
    assert!(c.pixels().iter().all(|&b| b == 0xFF));
}

#[test]
fn bgr_canvas_hands_bgra_raster_to_encoder() {
    let enc = Arc::new(RecordingEncoder::default());
    let mut c = FixedCanvas::with_encoder(1, 1, PixelFormat::Bgr, enc.clone()).unwrap();
    c.push(&[1, 2, 3], 0, 0, 1, 1).unwrap();

    let out = c.encode_sync().unwrap();
    assert_eq!(out, vec![1, 2, 3, 0]);
    let seen = enc.seen.lock().unwrap();
    assert_eq!(seen[0].0, 1);
    assert_eq!(seen[0].1, 1);
    assert_eq!(seen[0].2, PixelFormat::Bgra);
}

#[test]
fn async_encode_sees_snapshot_not_later_pushes() {
    let enc = Arc::new(RecordingEncoder::default());
    let mut c = FixedCanvas::with_encoder(2, 1, PixelFormat::Rgba, enc).unwrap();
    c.push(&[5u8; 4], 0, 0, 1, 1).unwrap();
    let expected = c.pixels().to_vec();

    let mut q = EncodeQueue::new(EncodeQueueOpts { threads: Some(1) }).unwrap();
    let got = std::rc::Rc::new(std::cell::RefCell::new(None));
    let slot = got.clone();
    c.encode_async(&mut q, move |res| *slot.borrow_mut() = Some(res));

    c.push(&[7u8; 4], 1, 0, 1, 1).unwrap();
    q.run_until_idle().unwrap();

    let encoded = got.borrow_mut().take().unwrap().unwrap();
    assert_eq!(encoded.bytes, expected);
    assert_eq!(encoded.dimensions, None);
    assert_eq!(px(&c, 1, 0), [7; 4]);
}

#[test]
fn zero_sized_canvas_rejects_every_push() {
    let mut c = FixedCanvas::new(0, 0, PixelFormat::Rgba).unwrap();
    let err = c.push(&[], 0, 0, 0, 0).unwrap_err();
    assert!(matches!(err, StackError::OutOfBounds(_)));
}

#[test]
fn unallocatable_canvas_is_an_allocation_error() {
    let err = FixedCanvas::new(i32::MAX, i32::MAX, PixelFormat::Rgb).unwrap_err();
    assert!(matches!(err, StackError::Allocation(_)), "{err}");
    assert!(err.to_string().starts_with("allocation error:"));
}
