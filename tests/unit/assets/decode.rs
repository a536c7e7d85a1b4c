use image::{Delay, Frame as ImageFrame, Rgba, codecs::gif::GifEncoder};

use super::*;

fn gif_bytes(frames: &[([u8; 4], u32)], w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        for &(px, delay_ms) in frames {
            let img = RgbaImage::from_pixel(w, h, Rgba(px));
            enc.encode_frame(ImageFrame::from_parts(
                img,
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            ))
            .unwrap();
        }
    }
    buf
}

#[test]
fn delay_units_convert_to_ms_with_floor() {
    assert_eq!(duration_ms_from_delay_units(0), 100);
    assert_eq!(duration_ms_from_delay_units(5), 50);
    assert_eq!(duration_ms_from_delay_units(250), 2500);
}

#[test]
fn decodes_frames_in_order_with_durations() {
    let bytes = gif_bytes(
        &[
            ([255, 0, 0, 255], 0),
            ([0, 255, 0, 255], 50),
            ([0, 0, 255, 255], 2500),
        ],
        4,
        3,
    );
    let store = decode_gif(&bytes).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.canvas(), Canvas::new(4, 3));
    assert_eq!(store.durations_ms(), vec![100, 50, 2500]);
    assert_eq!(store.frames()[0].raster.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(store.frames()[1].raster.get_pixel(3, 2).0, [0, 255, 0, 255]);
    assert_eq!(store.frames()[2].raster.get_pixel(1, 1).0, [0, 0, 255, 255]);
}

#[test]
fn garbage_bytes_fail_with_decode_error() {
    let err = decode_gif(b"definitely not a gif").unwrap_err();
    assert!(matches!(err, MemfyError::Decode(_)));
}

#[test]
fn truncated_gif_fails_with_decode_error() {
    let bytes = gif_bytes(&[([10, 20, 30, 255], 100)], 8, 8);
    let err = decode_gif(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, MemfyError::Decode(_)));
}

#[test]
fn smaller_frame_is_placed_at_offset_on_canvas() {
    let small = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
    let out = normalize_to_canvas(small, 1, 1, Canvas::new(4, 4));
    assert_eq!(out.dimensions(), (4, 4));
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(out.get_pixel(1, 1).0, [9, 9, 9, 255]);
    assert_eq!(out.get_pixel(2, 2).0, [9, 9, 9, 255]);
    assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0, 0]);
}

#[test]
fn oversized_frame_is_clipped_to_canvas() {
    let big = RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 255]));
    let out = normalize_to_canvas(big, 0, 0, Canvas::new(3, 2));
    assert_eq!(out.dimensions(), (3, 2));
    assert!(out.pixels().all(|p| p.0 == [1, 2, 3, 255]));
}
