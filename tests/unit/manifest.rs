use std::path::PathBuf;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "pngstack_manifest_{name}_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn parses_dynamic_manifest_without_canvas() {
    let m: StackManifest = serde_json::from_str(
        r#"{"format":"rgba","layers":[{"path":"a.raw","x":1,"y":2,"width":3,"height":4}]}"#,
    )
    .unwrap();
    assert_eq!(m.format, PixelFormat::Rgba);
    assert_eq!(m.canvas, None);
    assert_eq!(m.layers[0].path, PathBuf::from("a.raw"));
    assert_eq!((m.layers[0].x, m.layers[0].height), (1, 4));
}

#[test]
fn unknown_format_and_fields_fail_to_parse() {
    assert!(serde_json::from_str::<StackManifest>(r#"{"format":"cmyk"}"#).is_err());
    assert!(serde_json::from_str::<StackManifest>(r#"{"format":"rgb","depth":16}"#).is_err());
}

#[test]
fn build_reads_layers_relative_to_root() {
    let dir = scratch_dir("build");
    std::fs::write(dir.join("red.raw"), [255u8, 0, 0].repeat(4)).unwrap();
    std::fs::write(dir.join("blue.raw"), [0u8, 0, 255].repeat(2)).unwrap();

    let m = StackManifest {
        format: PixelFormat::Rgb,
        canvas: None,
        layers: vec![
            LayerSpec {
                path: "red.raw".into(),
                x: 2,
                y: 2,
                width: 2,
                height: 2,
            },
            LayerSpec {
                path: "blue.raw".into(),
                x: 5,
                y: 2,
                width: 1,
                height: 2,
            },
        ],
    };

    let stack = m.build(&dir).unwrap();
    let Stack::Dynamic(canvas) = &stack else {
        panic!("expected a dynamic stack");
    };
    let d = canvas.dimensions().unwrap();
    assert_eq!((d.x, d.y, d.width, d.height), (2, 2, 4, 2));

    let encoded = stack.encode_sync().unwrap();
    assert_eq!(encoded.dimensions, Some(d));
}

#[test]
fn fixed_build_reports_failing_layer() {
    let dir = scratch_dir("oob");
    std::fs::write(dir.join("p.raw"), [0u8; 16]).unwrap();

    let m = StackManifest {
        format: PixelFormat::Rgba,
        canvas: Some(CanvasSize {
            width: 2,
            height: 2,
        }),
        layers: vec![LayerSpec {
            path: "p.raw".into(),
            x: 1,
            y: 0,
            width: 2,
            height: 2,
        }],
    };
    let err = m.build(&dir).unwrap_err();
    assert!(matches!(err, StackError::OutOfBounds(_)));
    assert!(err.to_string().contains("layer 0"));
}

#[test]
fn missing_layer_file_is_wrapped_io_error() {
    let dir = scratch_dir("missing");
    let m = StackManifest {
        format: PixelFormat::Rgb,
        canvas: None,
        layers: vec![LayerSpec {
            path: "nope.raw".into(),
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }],
    };
    let err = m.build(&dir).unwrap_err();
    assert!(matches!(err, StackError::Other(_)));
    assert!(err.to_string().contains("nope.raw"));
}
