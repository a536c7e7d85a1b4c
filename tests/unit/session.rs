use image::{Delay, Frame as ImageFrame, Rgba, codecs::gif::GifEncoder};

use super::*;
use crate::foundation::core::{Canvas, Point};

fn gif_bytes(colors: &[[u8; 4]], w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        for &px in colors {
            enc.encode_frame(ImageFrame::from_parts(
                RgbaImage::from_pixel(w, h, Rgba(px)),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            ))
            .unwrap();
        }
    }
    buf
}

fn loaded(w: u32, h: u32) -> EditorSession {
    let mut s = EditorSession::new();
    s.load_bytes("image/gif", &gif_bytes(&[[255, 0, 0, 255], [0, 0, 255, 255]], w, h))
        .unwrap();
    s
}

#[test]
fn unloaded_session_refuses_edits() {
    let mut s = EditorSession::new();
    assert!(matches!(
        s.apply_grayscale().unwrap_err(),
        MemfyError::InvalidState(_)
    ));
    assert!(matches!(
        s.export(&EncodeOptions::default()).unwrap_err(),
        MemfyError::InvalidState(_)
    ));
    assert!(matches!(
        s.add_placeholder_text().unwrap_err(),
        MemfyError::InvalidState(_)
    ));
    assert!(s.begin_crop().is_err());
    assert_eq!(s.revision(), 0);
}

#[test]
fn non_gif_media_type_is_rejected_before_decode() {
    let mut s = EditorSession::new();
    let err = s.load_bytes("image/png", b"not even an image").unwrap_err();
    assert!(matches!(err, MemfyError::InputRejected(_)));
    assert!(!s.is_loaded());
}

#[test]
fn failed_load_keeps_previous_frames() {
    let mut s = loaded(4, 4);
    let before = s.store().cloned();
    let rev = s.revision();

    assert!(matches!(
        s.load_bytes("image/gif", b"GIF89a garbage").unwrap_err(),
        MemfyError::Decode(_)
    ));
    assert_eq!(s.store().cloned(), before);
    assert_eq!(s.revision(), rev);
}

#[test]
fn pending_crop_flow() {
    let mut s = loaded(300, 250);
    assert!(matches!(
        s.apply_crop().unwrap_err(),
        MemfyError::InvalidState(_)
    ));

    let rect = s.begin_crop().unwrap();
    assert_eq!(*rect, CropRect::default());
    rect.left = 10.0;
    s.crop_rect_mut().unwrap().scale_x = 0.5;

    s.apply_crop().unwrap();
    assert_eq!(s.store().unwrap().canvas(), Canvas::new(100, 150));
    assert!(s.crop_rect_mut().is_none());
}

#[test]
fn loading_discards_crop_but_keeps_overlays() {
    let mut s = loaded(8, 8);
    s.add_text(TextOverlay::new("hello", Point::new(1.0, 1.0), 12.0))
        .unwrap();
    s.begin_crop().unwrap();

    s.load_bytes("image/gif", &gif_bytes(&[[0, 255, 0, 255]], 5, 5))
        .unwrap();
    assert!(s.crop_rect_mut().is_none());
    assert_eq!(s.overlays().len(), 1);
    assert_eq!(s.store().unwrap().len(), 1);
}

#[test]
fn grayscale_then_preview() {
    let mut s = loaded(3, 3);
    s.apply_grayscale().unwrap();
    let px = s.preview(0).unwrap().get_pixel(1, 1).0;
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert!(matches!(
        s.preview(9).unwrap_err(),
        MemfyError::Validation(_)
    ));
}

#[test]
fn mutations_bump_revision() {
    let mut s = loaded(4, 4);
    let r0 = s.revision();
    s.add_placeholder_text().unwrap();
    s.apply_grayscale().unwrap();
    assert_eq!(s.revision(), r0 + 2);
}

#[test]
fn background_export_matches_foreground() {
    let s = loaded(6, 6);
    let opts = EncodeOptions::default();
    let fg = s.export(&opts).unwrap();

    let job = s.export_in_background(opts).unwrap();
    assert_eq!(job.revision(), s.revision());
    let bg = job.wait().unwrap();
    assert_eq!(bg.bytes(), fg.bytes());
}

#[test]
fn preview_and_export_share_font_dir() {
    let s = EditorSession::new();
    assert_eq!(s.asset_dir(), EncodeOptions::default().asset_path.as_path());
    assert_eq!(s.encode_options(), EncodeOptions::default());

    let s = EditorSession::new().with_asset_dir("fonts");
    assert_eq!(s.asset_dir(), std::path::Path::new("fonts"));
    let opts = s.encode_options();
    assert_eq!(opts.asset_path, std::path::PathBuf::from("fonts"));
    assert_eq!(opts.workers, EncodeOptions::default().workers);
}
