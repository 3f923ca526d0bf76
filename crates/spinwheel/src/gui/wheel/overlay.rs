use super::model::Viewport;
use super::view::{draw_centered_lines, fit_label, select_font};
use crate::gui::theme::{self, ThemeColors};
use cairo::{Context, FontWeight};
use palette::Srgb;
use std::f64::consts::PI;

const CARD_WIDTH: f64 = 300.0;
const CARD_HEIGHT: f64 = 116.0;
const CARD_RADIUS: f64 = 20.0;
const CARD_PADDING: f64 = 20.0;
const BORDER_WIDTH: f64 = 3.0;
const DISMISS_HINT: &str = "(Click to dismiss)";

/// Transient card drawn over the wheel until the next click on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub title: String,
    pub message: String,
    pub color: Srgb<u8>,
}

impl ResultCard {
    pub fn new(title: impl Into<String>, message: impl Into<String>, color: Srgb<u8>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            color,
        }
    }

    pub fn draw(
        &self,
        cr: &Context,
        viewport: Viewport,
        colors: &ThemeColors,
        font_family: &str,
    ) -> Result<(), cairo::Error> {
        let x = (viewport.width as f64 - CARD_WIDTH) / 2.0;
        let y = (viewport.height as f64 - CARD_HEIGHT) / 2.0;
        let cx = x + CARD_WIDTH / 2.0;

        cr.save()?;
        rounded_rect(cr, x, y, CARD_WIDTH, CARD_HEIGHT, CARD_RADIUS);
        theme::set_source(cr, colors.card);
        cr.fill_preserve()?;
        theme::set_source(cr, self.color);
        cr.set_line_width(BORDER_WIDTH);
        cr.stroke()?;

        select_font(cr, font_family, FontWeight::Bold, 20.0);
        draw_centered_lines(cr, &self.title, cx, y + 20.0)?;

        let lines: Vec<&str> = self.message.lines().collect();
        let size = if lines.len() > 1 { 18.0 } else { 26.0 };
        select_font(cr, font_family, FontWeight::Bold, size);
        let max_width = CARD_WIDTH - 2.0 * CARD_PADDING;
        let fitted = lines
            .iter()
            .map(|line| fit_label(cr, line, max_width))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");
        theme::set_source(cr, theme::LABEL_TEXT);
        draw_centered_lines(cr, &fitted, cx, y + 60.0)?;

        select_font(cr, font_family, FontWeight::Normal, 12.0);
        theme::set_source(cr, theme::HINT_TEXT);
        draw_centered_lines(cr, DISMISS_HINT, cx, y + 100.0)?;
        cr.restore()
    }
}

fn rounded_rect(cr: &Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    cr.new_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
    cr.close_path();
}
