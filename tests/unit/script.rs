use image::{Delay, Frame as ImageFrame, Rgba, RgbaImage, codecs::gif::GifEncoder};

use super::*;
use crate::foundation::core::{Canvas, Rgba8};

const SCRIPT: &str = r##"{
  "ops": [
    { "op": "crop", "left": 1, "top": 1, "width": 4, "height": 3 },
    { "op": "grayscale" },
    { "op": "text", "content": "HI", "position": { "x": 0, "y": 0 }, "font_size": 8, "color": "#f00" }
  ],
  "export": { "workers": 3 }
}"##;

fn session_with_gif() -> EditorSession {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        enc.encode_frame(ImageFrame::from_parts(
            RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 255])),
            0,
            0,
            Delay::from_numer_denom_ms(100, 1),
        ))
        .unwrap();
    }
    let mut s = EditorSession::new();
    s.load_bytes("image/gif", &buf).unwrap();
    s
}

#[test]
fn parses_ops_in_order_with_defaults() {
    let script = EditScript::from_json_str(SCRIPT).unwrap();
    assert_eq!(script.ops.len(), 3);
    assert_eq!(
        script.ops[0],
        EditOp::Crop(CropRect::new(1.0, 1.0, 4.0, 3.0))
    );
    assert_eq!(script.ops[1], EditOp::Grayscale);
    let EditOp::Text(t) = &script.ops[2] else {
        panic!("expected text op");
    };
    assert_eq!(t.color, Rgba8::rgb(255, 0, 0));
    assert_eq!(t.font_family, "sans-serif");

    let opts = script.encode_options();
    assert_eq!(opts.workers, 3);
    assert_eq!(opts.quality, 10);
}

#[test]
fn empty_script_is_valid() {
    let script = EditScript::from_json_str("{}").unwrap();
    assert!(script.ops.is_empty());
    assert_eq!(script.encode_options(), EncodeOptions::default());
}

#[test]
fn bad_json_is_a_serde_error() {
    for bad in [
        "{",
        r#"{ "ops": [ { "op": "blur" } ] }"#,
        r#"{ "opz": [] }"#,
        r##"{ "ops": [ { "op": "text", "content": "x", "position": { "x": 0, "y": 0 }, "font_size": 8, "color": "#zz" } ] }"##,
    ] {
        assert!(
            matches!(EditScript::from_json_str(bad), Err(MemfyError::Serde(_))),
            "accepted {bad}"
        );
    }
}

#[test]
fn apply_runs_ops_against_session() {
    let mut s = session_with_gif();
    EditScript::from_json_str(SCRIPT)
        .unwrap()
        .apply(&mut s)
        .unwrap();

    let store = s.store().unwrap();
    assert_eq!(store.canvas(), Canvas::new(4, 3));
    let px = store.frame(0).unwrap().raster.get_pixel(0, 0).0;
    assert_eq!(px[0], px[1]);
    assert_eq!(s.overlays().len(), 1);
}

#[test]
fn apply_on_unloaded_session_fails() {
    let script = EditScript::from_json_str(r#"{ "ops": [ { "op": "grayscale" } ] }"#).unwrap();
    let err = script.apply(&mut EditorSession::new()).unwrap_err();
    assert!(matches!(err, MemfyError::InvalidState(_)));
}
