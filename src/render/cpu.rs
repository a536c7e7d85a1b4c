use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;

use crate::{
    foundation::error::{MemfyError, MemfyResult},
    frames::store::Frame,
    overlay::model::{Overlay, OverlayModel, TextOverlay},
    render::text::{TextBrushRgba8, TextLayoutEngine},
};

/// Draws a frame raster plus every overlay onto a working surface.
///
/// Owns Parley and font caches, so each worker thread builds its own. The text engine (and its
/// system font scan) is only created once a text overlay is drawn.
pub struct FrameCompositor {
    asset_dir: Option<PathBuf>,
    text: Option<TextLayoutEngine>,
    font_cache: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FrameCompositor {
    /// Build a compositor; fonts inside `asset_dir` are registered for text overlays.
    pub fn new(asset_dir: Option<&Path>) -> Self {
        Self {
            asset_dir: asset_dir.map(Path::to_path_buf),
            text: None,
            font_cache: HashMap::new(),
        }
    }

    fn text_engine(&mut self) -> &mut TextLayoutEngine {
        let asset_dir = self.asset_dir.as_deref();
        self.text.get_or_insert_with(|| {
            let mut engine = TextLayoutEngine::new();
            if let Some(dir) = asset_dir {
                let loaded = engine.register_font_dir(dir);
                tracing::debug!(dir = %dir.display(), loaded, "loaded overlay fonts");
            }
            engine
        })
    }

    /// Composite `overlays` over `frame` and return straight-alpha RGBA8 of the frame's size.
    ///
    /// Without overlays the raster is returned unchanged.
    pub fn composite(&mut self, frame: &Frame, overlays: &OverlayModel) -> MemfyResult<RgbaImage> {
        if overlays.is_empty() {
            return Ok(frame.raster.clone());
        }

        let w: u16 = frame
            .width()
            .try_into()
            .map_err(|_| MemfyError::encode("frame width exceeds u16"))?;
        let h: u16 = frame
            .height()
            .try_into()
            .map_err(|_| MemfyError::encode("frame height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(raster_to_image_paint(&frame.raster, w, h));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        for overlay in overlays {
            match overlay {
                Overlay::Text(t) => self.draw_text(&mut ctx, t)?,
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        pixmap_to_rgba_image(&pixmap, frame.width(), frame.height())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        t: &TextOverlay,
    ) -> MemfyResult<()> {
        let layout = self.text_engine().layout_plain(
            &t.content,
            &t.font_family,
            t.font_size,
            TextBrushRgba8::from(t.color),
        )?;
        let Some(first_baseline) = layout.lines().next().map(|l| l.metrics().baseline) else {
            return Ok(());
        };

        // Layout space puts the first baseline at `first_baseline`; move it to the overlay's.
        let dy = t.baseline_y() - f64::from(first_baseline);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((t.position.x, dy)));

        let mut drew = false;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let font = self.font_data_for(run.run().font());
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                // Positioned glyphs carry the run offset and line baseline.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
                drew = true;
            }
        }

        if !drew && !t.content.trim().is_empty() {
            tracing::warn!(
                family = %t.font_family,
                content = %t.content,
                "no font available for text overlay; skipped"
            );
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn font_data_for(&mut self, font: &parley::FontData) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry((font.data.id(), font.index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                    font.index,
                )
            })
            .clone()
    }
}

fn raster_to_image_paint(raster: &RgbaImage, w: u16, h: u16) -> vello_cpu::Image {
    let mut may_have_opacities = false;
    let pixels = raster
        .pixels()
        .map(|p| {
            let [r, g, b, a] = premultiply(p.0);
            may_have_opacities |= a != 255;
            vello_cpu::peniko::color::PremulRgba8 { r, g, b, a }
        })
        .collect();

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn pixmap_to_rgba_image(
    pixmap: &vello_cpu::Pixmap,
    width: u32,
    height: u32,
) -> MemfyResult<RgbaImage> {
    let mut data = pixmap.data_as_u8_slice().to_vec();
    for px in data.chunks_exact_mut(4) {
        let out = unpremultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| MemfyError::encode("composited surface size mismatch"))
}

fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let a16 = u16::from(a);
    let mul = |c: u8| ((u16::from(c) * a16 + 127) / 255) as u8;
    [mul(r), mul(g), mul(b), a]
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return [r, g, b, a];
    }
    let a32 = u32::from(a);
    let div = |c: u8| ((u32::from(c) * 255 + a32 / 2) / a32).min(255) as u8;
    [div(r), div(g), div(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
