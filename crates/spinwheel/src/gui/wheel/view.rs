use super::model::{Viewport, WheelGeometry};
use super::{
    ELLIPSIS, HUB_RADIUS, LABEL_FONT_SIZE, LABEL_MAX_WIDTH_FACTOR, LABEL_RADIUS_FACTOR,
    OUTLINE_WIDTH, PLACEHOLDER_TEXT, POINTER_DEPTH, POINTER_HALF_HEIGHT, POINTER_OFFSET,
    RENDER_SCALE,
};
use crate::gui::theme;
use cairo::{Context, Filter, FontFace, FontSlant, FontWeight, Format, ImageSurface};
use palette::Srgb;
use std::f64::consts::PI;
use std::iter::zip;
use wheelkit::model::Entry;
use wheelkit::select::{self, FULL_TURN, Slice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Rotates the pre-downsampled image; used for animation frames.
    Fast,
    /// Rotates the supersampled image, then downsamples.
    #[default]
    High,
}

impl Quality {
    fn filter(self) -> Filter {
        match self {
            Self::Fast => Filter::Bilinear,
            Self::High => Filter::Best,
        }
    }
}

/// Selects `family`, or cairo's default face if it cannot be created.
pub fn select_font(cr: &Context, family: &str, weight: FontWeight, size: f64) {
    match FontFace::toy_create(family, FontSlant::Normal, weight) {
        Ok(face) => cr.set_font_face(&face),
        Err(e) => {
            log::warn!("Font '{}' unavailable ({}), using default", family, e);
            cr.select_font_face("", FontSlant::Normal, weight);
        }
    }
    cr.set_font_size(size);
}

/// Shortens `text` until it fits `max_width`, ending it with an ellipsis.
/// The width is measured with the ellipsis attached at every step. Returns
/// an empty string when not even the ellipsis fits.
pub fn fit_label(cr: &Context, text: &str, max_width: f64) -> Result<String, cairo::Error> {
    let width = |s: &str| cr.text_extents(s).map(|e| e.x_advance());

    if width(text)? <= max_width {
        return Ok(text.to_string());
    }

    let cuts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    for &end in cuts.iter().rev() {
        let candidate = format!("{}{}", text[..end].trim_end(), ELLIPSIS);
        if width(&candidate)? <= max_width {
            return Ok(candidate);
        }
    }
    Ok(String::new())
}

fn rotate_about_center(cr: &Context, width: f64, height: f64, angle: f64) {
    cr.translate(width / 2.0, height / 2.0);
    // Positive angles turn the wheel counter-clockwise on screen.
    cr.rotate(-angle.to_radians());
    cr.translate(-width / 2.0, -height / 2.0);
}

fn new_surface(viewport: Viewport) -> Result<ImageSurface, cairo::Error> {
    ImageSurface::create(Format::ARgb32, viewport.width, viewport.height)
}

struct SliceRenderer<'a> {
    entry: &'a Entry,
    slice: Slice,
    color: Srgb<u8>,
    geometry: &'a WheelGeometry,
}

impl<'a> SliceRenderer<'a> {
    fn draw(&self, cr: &Context) -> Result<(), cairo::Error> {
        if self.slice.sweep <= 0.0 {
            return Ok(());
        }
        self.draw_wedge(cr)?;
        self.draw_label(cr)
    }

    fn draw_wedge(&self, cr: &Context) -> Result<(), cairo::Error> {
        let g = self.geometry;
        cr.new_path();
        if self.slice.sweep >= FULL_TURN {
            cr.arc(g.cx, g.cy, g.radius, 0.0, 2.0 * PI);
        } else {
            cr.move_to(g.cx, g.cy);
            cr.arc(
                g.cx,
                g.cy,
                g.radius,
                self.slice.start.to_radians(),
                self.slice.end().to_radians(),
            );
        }
        cr.close_path();

        theme::set_source(cr, self.color);
        cr.fill_preserve()?;
        theme::set_source(cr, theme::OUTLINE);
        cr.set_line_width(OUTLINE_WIDTH * g.scale);
        cr.stroke()
    }

    fn draw_label(&self, cr: &Context) -> Result<(), cairo::Error> {
        let g = self.geometry;
        let text = fit_label(cr, &self.entry.label, g.radius * LABEL_MAX_WIDTH_FACTOR)?;
        if text.is_empty() {
            return Ok(());
        }

        let advance = cr.text_extents(&text)?.x_advance();
        let font = cr.font_extents()?;
        let (tx, ty) = g.point_at(self.slice.mid(), LABEL_RADIUS_FACTOR);

        cr.save()?;
        cr.translate(tx, ty);
        // text runs outward along the mid-slice ray
        cr.rotate(self.slice.mid().to_radians());
        cr.move_to(-advance / 2.0, (font.ascent() - font.descent()) / 2.0);
        theme::set_source(cr, theme::LABEL_TEXT);
        cr.show_text(&text)?;
        cr.restore()
    }
}

/// Unrotated wheel at `RENDER_SCALE` times the viewport size.
fn render_base(
    entries: &[Entry],
    viewport: Viewport,
    font_family: &str,
) -> Result<ImageSurface, cairo::Error> {
    let surface = new_surface(viewport.scaled(RENDER_SCALE))?;
    {
        let cr = Context::new(&surface)?;
        let geometry = WheelGeometry::new(viewport, RENDER_SCALE);
        select_font(&cr, font_family, FontWeight::Bold, LABEL_FONT_SIZE * RENDER_SCALE);

        for (i, (entry, slice)) in zip(entries, select::slices(entries)).enumerate() {
            SliceRenderer {
                entry,
                slice,
                color: theme::slice_color(entry, i),
                geometry: &geometry,
            }
            .draw(&cr)?;
        }
    }
    surface.flush();
    Ok(surface)
}

fn downsample(full: &ImageSurface, viewport: Viewport) -> Result<ImageSurface, cairo::Error> {
    let surface = new_surface(viewport)?;
    {
        let cr = Context::new(&surface)?;
        cr.scale(
            viewport.width as f64 / full.width() as f64,
            viewport.height as f64 / full.height() as f64,
        );
        cr.set_source_surface(full, 0.0, 0.0)?;
        cr.source().set_filter(Filter::Best);
        cr.paint()?;
    }
    surface.flush();
    Ok(surface)
}

struct BaseImages {
    full: ImageSurface,
    reduced: ImageSurface,
}

impl BaseImages {
    fn render(entries: &[Entry], viewport: Viewport, font_family: &str) -> Result<Self, cairo::Error> {
        let full = render_base(entries, viewport, font_family)?;
        let reduced = downsample(&full, viewport)?;
        Ok(Self { full, reduced })
    }

    fn paint_rotated(
        &self,
        cr: &Context,
        viewport: Viewport,
        angle: f64,
        quality: Quality,
    ) -> Result<(), cairo::Error> {
        let (w, h) = (viewport.width as f64, viewport.height as f64);
        cr.save()?;
        match quality {
            Quality::Fast => {
                rotate_about_center(cr, w, h, angle);
                cr.set_source_surface(&self.reduced, 0.0, 0.0)?;
            }
            Quality::High => {
                let (fw, fh) = (self.full.width(), self.full.height());
                let rotated = ImageSurface::create(Format::ARgb32, fw, fh)?;
                {
                    let rc = Context::new(&rotated)?;
                    rotate_about_center(&rc, fw as f64, fh as f64, angle);
                    rc.set_source_surface(&self.full, 0.0, 0.0)?;
                    rc.source().set_filter(quality.filter());
                    rc.paint()?;
                }
                rotated.flush();
                cr.scale(w / fw as f64, h / fh as f64);
                cr.set_source_surface(&rotated, 0.0, 0.0)?;
            }
        }
        cr.source().set_filter(quality.filter());
        cr.paint()?;
        cr.restore()
    }
}

/// Wheel image cache. The base images are regenerated only by
/// [`WheelRenderer::rebuild`]; each frame just rotates one of them.
pub struct WheelRenderer {
    viewport: Viewport,
    font_family: String,
    base: Option<BaseImages>,
}

impl WheelRenderer {
    pub fn new(viewport: Viewport, font_family: impl Into<String>) -> Self {
        Self {
            viewport,
            font_family: font_family.into(),
            base: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Regenerates the base images. Without any weighted entries only the
    /// placeholder is drawn.
    pub fn rebuild(&mut self, entries: &[Entry], viewport: Viewport) -> Result<(), cairo::Error> {
        self.viewport = viewport;
        self.base = None;
        if select::total_weight(entries) > 0.0 {
            self.base = Some(BaseImages::render(entries, viewport, &self.font_family)?);
        }
        Ok(())
    }

    pub fn paint(&self, cr: &Context, angle: f64, quality: Quality) -> Result<(), cairo::Error> {
        let geometry = WheelGeometry::new(self.viewport, 1.0);
        match &self.base {
            None => draw_placeholder(cr, &geometry, &self.font_family),
            Some(base) => {
                base.paint_rotated(cr, self.viewport, angle, quality)?;
                draw_pointer(cr, &geometry)?;
                draw_hub(cr, &geometry)
            }
        }
    }

    pub fn compose(&self, angle: f64, quality: Quality) -> Result<ImageSurface, cairo::Error> {
        let surface = new_surface(self.viewport)?;
        {
            let cr = Context::new(&surface)?;
            self.paint(&cr, angle, quality)?;
        }
        surface.flush();
        Ok(surface)
    }
}

fn draw_pointer(cr: &Context, g: &WheelGeometry) -> Result<(), cairo::Error> {
    let px = g.cx + g.radius + POINTER_OFFSET;
    cr.new_path();
    cr.move_to(px, g.cy - POINTER_HALF_HEIGHT);
    cr.line_to(px, g.cy + POINTER_HALF_HEIGHT);
    cr.line_to(px - POINTER_DEPTH, g.cy);
    cr.close_path();

    theme::set_source(cr, theme::DARK);
    cr.fill_preserve()?;
    theme::set_source(cr, theme::OUTLINE);
    cr.set_line_width(OUTLINE_WIDTH);
    cr.stroke()
}

fn draw_hub(cr: &Context, g: &WheelGeometry) -> Result<(), cairo::Error> {
    cr.new_path();
    cr.arc(g.cx, g.cy, HUB_RADIUS, 0.0, 2.0 * PI);
    theme::set_source(cr, theme::OUTLINE);
    cr.fill_preserve()?;
    theme::set_source(cr, theme::DARK);
    cr.set_line_width(1.0);
    cr.stroke()
}

fn draw_placeholder(cr: &Context, g: &WheelGeometry, font_family: &str) -> Result<(), cairo::Error> {
    cr.new_path();
    cr.arc(g.cx, g.cy, g.radius, 0.0, 2.0 * PI);
    theme::set_source(cr, theme::PLACEHOLDER_FILL);
    cr.fill_preserve()?;
    theme::set_source(cr, theme::DARK);
    cr.set_line_width(1.0);
    cr.stroke()?;

    select_font(cr, font_family, FontWeight::Normal, LABEL_FONT_SIZE);
    draw_centered_lines(cr, PLACEHOLDER_TEXT, g.cx, g.cy)
}

/// Draws newline-separated `text` as a block centered on `(cx, cy)` with
/// the current font and source.
pub fn draw_centered_lines(cr: &Context, text: &str, cx: f64, cy: f64) -> Result<(), cairo::Error> {
    let font = cr.font_extents()?;
    let lines: Vec<&str> = text.lines().collect();
    let line_height = font.height();
    let top = cy - line_height * lines.len() as f64 / 2.0;

    for (i, line) in lines.iter().enumerate() {
        let advance = cr.text_extents(line)?.x_advance();
        let baseline = top + line_height * i as f64 + (line_height + font.ascent() - font.descent()) / 2.0;
        cr.move_to(cx - advance / 2.0, baseline);
        cr.show_text(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelkit::model::HexColor;

    const RED: Srgb<u8> = Srgb::new(0xFF, 0x00, 0x00);
    const GREEN: Srgb<u8> = Srgb::new(0x00, 0xFF, 0x00);
    const BLUE: Srgb<u8> = Srgb::new(0x00, 0x00, 0xFF);

    fn entry(label: &str, weight: f64, color: Srgb<u8>) -> Entry {
        Entry::new(label, weight).with_color(HexColor::from_srgb(color))
    }

    fn rgb_entries() -> Vec<Entry> {
        vec![
            entry("A", 1.0, RED),
            entry("B", 1.0, GREEN),
            entry("C", 2.0, BLUE),
        ]
    }

    fn renderer(entries: &[Entry]) -> WheelRenderer {
        let viewport = Viewport::new(400, 400);
        let mut r = WheelRenderer::new(viewport, "Sans");
        r.rebuild(entries, viewport).unwrap();
        r
    }

    fn pixel(surface: &ImageSurface, x: f64, y: f64) -> Srgb<u8> {
        let (x, y) = (x.round() as usize, y.round() as usize);
        let stride = surface.stride() as usize;
        let mut px = [0u8; 4];
        surface
            .with_data(|data| {
                let at = y * stride + x * 4;
                px.copy_from_slice(&data[at..at + 4]);
            })
            .unwrap();
        let argb = u32::from_ne_bytes(px);
        Srgb::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
    }

    fn close(a: Srgb<u8>, b: Srgb<u8>) -> bool {
        a.red.abs_diff(b.red) <= 3 && a.green.abs_diff(b.green) <= 3 && a.blue.abs_diff(b.blue) <= 3
    }

    fn surface_bytes(surface: &ImageSurface) -> Vec<u8> {
        let mut bytes = Vec::new();
        surface.with_data(|d| bytes.extend_from_slice(d)).unwrap();
        bytes
    }

    fn near_boundary(entries: &[Entry], angle: f64, tolerance: f64) -> bool {
        select::slices(entries).iter().any(|s| {
            let d = (angle - s.start).rem_euclid(FULL_TURN);
            d < tolerance || d > FULL_TURN - tolerance
        })
    }

    #[test]
    fn test_pointer_shows_selected_slice() {
        let entries = rgb_entries();
        let r = renderer(&entries);
        let g = WheelGeometry::new(r.viewport(), 1.0);
        let (sx, sy) = g.point_at(0.0, 0.8);

        for quality in [Quality::High, Quality::Fast] {
            for step in 0..72 {
                let angle = step as f64 * 5.0 + 2.5;
                if near_boundary(&entries, angle, 4.0) {
                    continue;
                }
                let image = r.compose(angle, quality).unwrap();
                let winner = select::compute_winner(&entries, angle).unwrap();
                let expected = winner.color.as_ref().and_then(HexColor::to_srgb).unwrap();
                let seen = pixel(&image, sx, sy);
                assert!(
                    close(seen, expected),
                    "{quality:?} at {angle}: pointer sees {seen:?}, selector chose {}",
                    winner.label
                );
            }
        }
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let entries = rgb_entries();
        let a = renderer(&entries);
        let b = renderer(&entries);

        for quality in [Quality::High, Quality::Fast] {
            let first = surface_bytes(&a.compose(123.4, quality).unwrap());
            let again = surface_bytes(&a.compose(123.4, quality).unwrap());
            let fresh = surface_bytes(&b.compose(123.4, quality).unwrap());
            assert_eq!(first, again);
            assert_eq!(first, fresh);
        }
    }

    #[test]
    fn test_pointer_and_hub_ignore_rotation() {
        let r = renderer(&rgb_entries());
        let g = WheelGeometry::new(r.viewport(), 1.0);
        let pointer = (g.cx + g.radius + POINTER_OFFSET - 5.0, g.cy);

        for angle in [0.0, 45.0, 137.0, 300.0] {
            let image = r.compose(angle, Quality::High).unwrap();
            assert!(close(pixel(&image, pointer.0, pointer.1), theme::DARK));
            assert!(close(pixel(&image, g.cx, g.cy), theme::OUTLINE));
        }
    }

    #[test]
    fn test_placeholder_without_entries() {
        for entries in [Vec::new(), vec![Entry::new("zero", 0.0)]] {
            let r = renderer(&entries);
            let g = WheelGeometry::new(r.viewport(), 1.0);
            let image = r.compose(90.0, Quality::High).unwrap();
            let (x, y) = g.point_at(270.0, 0.8);
            assert!(close(pixel(&image, x, y), theme::PLACEHOLDER_FILL));
        }
    }

    #[test]
    fn test_palette_used_without_override() {
        let entries = vec![Entry::new("A", 1.0), Entry::new("B", 1.0)];
        let r = renderer(&entries);
        let g = WheelGeometry::new(r.viewport(), 1.0);
        let (x, y) = g.point_at(0.0, 0.8);

        let image = r.compose(270.0, Quality::High).unwrap();
        assert!(close(pixel(&image, x, y), theme::WHEEL_PALETTE[1]));
    }

    #[test]
    fn test_fit_label() {
        let surface = ImageSurface::create(Format::ARgb32, 8, 8).unwrap();
        let cr = Context::new(&surface).unwrap();
        select_font(&cr, "Sans", FontWeight::Bold, 28.0);
        let width = |s: &str| cr.text_extents(s).unwrap().x_advance();

        assert_eq!(fit_label(&cr, "Tacos", 500.0).unwrap(), "Tacos");

        let long = "The Extraordinarily Long Restaurant Name";
        let max = width(long) / 2.0;
        let fitted = fit_label(&cr, long, max).unwrap();
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(fitted.len() < long.len());
        assert!(width(&fitted) <= max, "'{fitted}' is wider than {max}");
        assert!(long.starts_with(fitted.trim_end_matches(ELLIPSIS)));

        assert!(!fit_label(&cr, "Ünïcödé wörds everywhere", 60.0).unwrap().is_empty());
        assert_eq!(fit_label(&cr, long, 1.0).unwrap(), "");
    }

    #[test]
    fn test_unknown_font_still_renders() {
        let viewport = Viewport::new(200, 200);
        let mut r = WheelRenderer::new(viewport, "No Such Typeface 4711");
        r.rebuild(&rgb_entries(), viewport).unwrap();
        assert!(r.compose(10.0, Quality::High).is_ok());
    }
}
