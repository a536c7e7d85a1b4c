use image::Rgba;

use super::*;
use crate::frames::store::Frame;

#[test]
fn gray_level_rounds_mean() {
    assert_eq!(gray_level(0, 0, 0), 0);
    assert_eq!(gray_level(255, 255, 255), 255);
    // 1/3 -> 0, 2/3 -> 1
    assert_eq!(gray_level(1, 0, 0), 0);
    assert_eq!(gray_level(1, 1, 0), 1);
    assert_eq!(gray_level(255, 0, 0), 85);
    assert_eq!(gray_level(10, 20, 31), 20);
}

#[test]
fn alpha_is_untouched() {
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([90, 30, 60, 77]));
    grayscale_in_place(&mut img);
    assert_eq!(img.get_pixel(0, 0).0, [60, 60, 60, 77]);
}

#[test]
fn grayscale_is_idempotent() {
    let raster = RgbaImage::from_fn(8, 8, |x, y| {
        Rgba([(x * 31) as u8, (y * 17) as u8, ((x + y) * 13) as u8, 255])
    });
    let mut store = FrameStore::new(vec![
        Frame::new(raster.clone(), 40).unwrap(),
        Frame::new(raster, 70).unwrap(),
    ])
    .unwrap();

    grayscale_frames(&mut store);
    let once = store.clone();
    grayscale_frames(&mut store);
    assert_eq!(store, once);
    assert_eq!(store.durations_ms(), vec![40, 70]);
    for f in store.frames() {
        assert!(f.raster.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }
}

#[test]
fn empty_store_is_a_noop() {
    let mut store = FrameStore::empty();
    grayscale_frames(&mut store);
    assert!(store.is_empty());
}
