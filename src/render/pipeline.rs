use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use rayon::prelude::*;

use crate::{
    encode::sink::{ExportFrame, FrameSink, SinkConfig},
    foundation::error::{MemfyError, MemfyResult},
    frames::store::FrameStore,
    overlay::model::OverlayModel,
    render::cpu::FrameCompositor,
};

/// Composite `overlays` onto every frame of `store` and push the results into `sink`.
///
/// Compositing runs on a dedicated rayon pool of `workers` threads. A scoped encoder thread
/// reorders finished frames so the sink always sees indices `0..len` in playback order.
#[tracing::instrument(skip_all, fields(frames = store.len(), workers = workers))]
pub fn export_frames(
    store: &FrameStore,
    overlays: &OverlayModel,
    workers: usize,
    asset_dir: Option<&Path>,
    sink: &mut dyn FrameSink,
) -> MemfyResult<()> {
    let pool = build_thread_pool(workers)?;
    let canvas = store.canvas();
    let cfg = SinkConfig {
        width: canvas.width,
        height: canvas.height,
        frame_count: store.len(),
    };
    let total = store.len();
    let cap = workers.saturating_mul(2).max(1);
    // One contiguous run per worker keeps compositor (and font scan) setup to once per thread.
    let min_len = total.div_ceil(workers).max(1);
    let sink_failed = AtomicBool::new(false);

    std::thread::scope(|scope| -> MemfyResult<()> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
        let sink_failed = &sink_failed;

        let enc = scope.spawn(move || -> MemfyResult<()> {
            let mark = |r: MemfyResult<()>| {
                if r.is_err() {
                    sink_failed.store(true, Ordering::Relaxed);
                }
                r
            };

            mark(sink.begin(cfg))?;

            let mut next = 0usize;
            let mut pending = HashMap::<usize, ExportFrame>::new();
            while next < total {
                if let Some(frame) = pending.remove(&next) {
                    mark(sink.push_frame(next, frame))?;
                    next += 1;
                    continue;
                }

                let msg = rx.recv().map_err(|_| {
                    MemfyError::encode("encoder channel disconnected unexpectedly")
                })?;
                pending.insert(msg.idx, msg.frame);
            }

            mark(sink.end())
        });

        let produce_res = pool.install(|| {
            store
                .frames()
                .par_iter()
                .enumerate()
                .with_min_len(min_len)
                .try_for_each_init(
                    || FrameCompositor::new(asset_dir),
                    |compositor, (idx, frame)| -> MemfyResult<()> {
                        let image = compositor.composite(frame, overlays)?;
                        tx.send(FrameMsg {
                            idx,
                            frame: ExportFrame {
                                image,
                                duration_ms: frame.duration_ms,
                            },
                        })
                        .map_err(|_| MemfyError::encode("encoder thread is not accepting frames"))
                    },
                )
        });

        drop(tx);
        let enc_res = enc
            .join()
            .map_err(|_| MemfyError::encode("encoder thread panicked"))?;

        // A failing sink disconnects the channel, so the producer error is only a symptom.
        if sink_failed.load(Ordering::Relaxed) {
            return enc_res;
        }
        produce_res?;
        enc_res
    })?;

    tracing::debug!(frames = total, "exported frames");
    Ok(())
}

#[derive(Debug)]
struct FrameMsg {
    idx: usize,
    frame: ExportFrame,
}

pub(crate) fn build_thread_pool(workers: usize) -> MemfyResult<rayon::ThreadPool> {
    if workers == 0 {
        return Err(MemfyError::validation("encode workers must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| MemfyError::encode(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
