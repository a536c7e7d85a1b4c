use image::{Rgba, RgbaImage};

use super::*;
use crate::{encode::sink::InMemorySink, frames::store::Frame};

fn numbered_store(durations: &[u32]) -> FrameStore {
    let frames = durations
        .iter()
        .enumerate()
        .map(|(i, &d)| Frame::new(RgbaImage::from_pixel(6, 4, Rgba([i as u8, 0, 0, 255])), d).unwrap())
        .collect();
    FrameStore::new(frames).unwrap()
}

#[test]
fn frames_reach_sink_in_order_with_durations() {
    let durations: Vec<u32> = (1..=17).map(|i| i * 10).collect();
    let store = numbered_store(&durations);
    let mut sink = InMemorySink::new();

    export_frames(&store, &OverlayModel::new(), 4, None, &mut sink).unwrap();

    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 6,
            height: 4,
            frame_count: 17
        })
    );
    let got: Vec<(u8, u32)> = sink
        .frames()
        .iter()
        .map(|f| (f.image.get_pixel(0, 0).0[0], f.duration_ms))
        .collect();
    let want: Vec<(u8, u32)> = durations
        .iter()
        .enumerate()
        .map(|(i, &d)| (i as u8, d))
        .collect();
    assert_eq!(got, want);
}

#[test]
fn single_worker_matches_many_workers() {
    let store = numbered_store(&[100, 50, 2500, 70]);

    let mut a = InMemorySink::new();
    export_frames(&store, &OverlayModel::new(), 1, None, &mut a).unwrap();
    let mut b = InMemorySink::new();
    export_frames(&store, &OverlayModel::new(), 8, None, &mut b).unwrap();

    assert_eq!(a.frames(), b.frames());
}

#[test]
fn zero_workers_is_rejected() {
    let store = numbered_store(&[100]);
    let mut sink = InMemorySink::new();
    let err = export_frames(&store, &OverlayModel::new(), 0, None, &mut sink).unwrap_err();
    assert!(matches!(err, MemfyError::Validation(_)));
    assert!(!sink.is_finished());
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> MemfyResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, _frame: ExportFrame) -> MemfyResult<()> {
        Err(MemfyError::encode(format!("sink refused frame {idx}")))
    }

    fn end(&mut self) -> MemfyResult<()> {
        Ok(())
    }
}

#[test]
fn sink_error_is_reported_over_channel_error() {
    let store = numbered_store(&[10; 32]);
    let err = export_frames(&store, &OverlayModel::new(), 2, None, &mut FailingSink).unwrap_err();
    assert_eq!(err.to_string(), "encode error: sink refused frame 0");
}
