use std::io::Cursor;

use image::{AnimationDecoder, Delay, RgbaImage, codecs::gif::GifDecoder};

use crate::{
    foundation::{
        core::Canvas,
        error::{MemfyError, MemfyResult},
    },
    frames::store::{Frame, FrameStore},
};

/// Duration used for frames that declare no (or a zero) delay.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Convert a GIF delay in 1/100 s units to a display duration in milliseconds.
///
/// A zero delay becomes [`DEFAULT_FRAME_DURATION_MS`]; frames are never shown for 0 ms.
pub fn duration_ms_from_delay_units(units: u16) -> u32 {
    match u32::from(units) * 10 {
        0 => DEFAULT_FRAME_DURATION_MS,
        ms => ms,
    }
}

fn duration_ms_from_delay(delay: Delay) -> u32 {
    let (numer, denom) = delay.numer_denom_ms();
    let ms = if denom == 0 { 0 } else { numer / denom };
    if ms == 0 {
        DEFAULT_FRAME_DURATION_MS
    } else {
        ms
    }
}

/// Decode GIF bytes into a [`FrameStore`] in playback order.
///
/// The canvas size is frame 0's size. A later frame with a different size is placed at its
/// declared offset on a transparent canvas of that size, clipping whatever falls outside.
/// Either every frame decodes or an error is returned; no partial store is produced.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_gif(bytes: &[u8]) -> MemfyResult<FrameStore> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| MemfyError::decode(format!("read gif header: {e}")))?;

    let mut canvas: Option<Canvas> = None;
    let mut frames = Vec::new();
    for (i, frame) in decoder.into_frames().enumerate() {
        let frame = frame.map_err(|e| MemfyError::decode(format!("frame {i}: {e}")))?;
        let duration_ms = duration_ms_from_delay(frame.delay());
        let (left, top) = (frame.left(), frame.top());
        let buffer = frame.into_buffer();

        let canvas = *canvas.get_or_insert_with(|| Canvas::new(buffer.width(), buffer.height()));
        if canvas.is_empty() {
            return Err(MemfyError::decode("gif has a zero-sized canvas"));
        }

        frames.push(Frame {
            raster: normalize_to_canvas(buffer, left, top, canvas),
            duration_ms,
        });
    }

    if frames.is_empty() {
        return Err(MemfyError::decode("gif contains no frames"));
    }

    let store = FrameStore::new(frames)?;
    tracing::debug!(
        frames = store.len(),
        width = store.canvas().width,
        height = store.canvas().height,
        total_ms = store.total_duration_ms(),
        "decoded gif"
    );
    Ok(store)
}

fn normalize_to_canvas(buffer: RgbaImage, left: u32, top: u32, canvas: Canvas) -> RgbaImage {
    if buffer.dimensions() == (canvas.width, canvas.height) && left == 0 && top == 0 {
        return buffer;
    }

    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        left,
        top,
        "normalizing frame onto canvas"
    );
    let mut out = RgbaImage::new(canvas.width, canvas.height);
    image::imageops::replace(&mut out, &buffer, i64::from(left), i64::from(top));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
