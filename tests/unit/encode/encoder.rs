use super::*;

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn decode_rgba(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[test]
fn rgba_roundtrips_through_png() {
    let data = vec![10u8, 20, 30, 40, 50, 60, 70, 80];
    let png = PngEncoder
        .encode(RasterRef {
            data: &data,
            width: 2,
            height: 1,
            format: PixelFormat::Rgba,
        })
        .unwrap();
    assert_eq!(&png[..8], &PNG_MAGIC);
    assert_eq!(decode_rgba(&png).into_raw(), data);
}

#[test]
fn bgra_is_stored_as_rgba() {
    let png = PngEncoder
        .encode(RasterRef {
            data: &[1, 2, 3, 4],
            width: 1,
            height: 1,
            format: PixelFormat::Bgra,
        })
        .unwrap();
    assert_eq!(decode_rgba(&png).into_raw(), vec![3, 2, 1, 4]);
}

#[test]
fn gray_and_bgr_encode() {
    let png = PngEncoder
        .encode(RasterRef {
            data: &[0, 128, 255, 64],
            width: 2,
            height: 2,
            format: PixelFormat::Gray,
        })
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.color(), image::ColorType::L8);
    assert_eq!(img.to_luma8().into_raw(), vec![0, 128, 255, 64]);

    let png = PngEncoder
        .encode(RasterRef {
            data: &[9, 8, 7],
            width: 1,
            height: 1,
            format: PixelFormat::Bgr,
        })
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.to_rgb8().into_raw(), vec![7, 8, 9]);
}

#[test]
fn empty_raster_is_an_encode_error() {
    let err = PngEncoder
        .encode(RasterRef {
            data: &[],
            width: 0,
            height: 4,
            format: PixelFormat::Rgba,
        })
        .unwrap_err();
    assert!(matches!(err, StackError::Encode(_)));
}

#[test]
fn length_mismatch_is_an_encode_error() {
    let err = PngEncoder
        .encode(RasterRef {
            data: &[0; 7],
            width: 1,
            height: 2,
            format: PixelFormat::Rgba,
        })
        .unwrap_err();
    assert!(err.to_string().contains("needs 8 bytes, got 7"));
}
