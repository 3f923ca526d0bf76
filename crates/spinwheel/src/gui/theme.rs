use cairo::Context;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgb;
use wheelkit::model::Entry;

/// Slice colors, assigned by `index % len` unless an entry overrides it.
pub const WHEEL_PALETTE: [Srgb<u8>; 8] = [
    Srgb::new(0xFF, 0x6B, 0x6B),
    Srgb::new(0x4E, 0xCD, 0xC4),
    Srgb::new(0x45, 0xB7, 0xD1),
    Srgb::new(0x96, 0xCE, 0xB4),
    Srgb::new(0xFF, 0xEE, 0xAD),
    Srgb::new(0xD4, 0xA5, 0xA5),
    Srgb::new(0x9B, 0x59, 0xB6),
    Srgb::new(0x34, 0x98, 0xDB),
];

pub const OUTLINE: Srgb<u8> = Srgb::new(0xFF, 0xFF, 0xFF);
pub const LABEL_TEXT: Srgb<u8> = Srgb::new(0xFF, 0xFF, 0xFF);
pub const DARK: Srgb<u8> = Srgb::new(0x33, 0x33, 0x33);
pub const PLACEHOLDER_FILL: Srgb<u8> = Srgb::new(0xE0, 0xE0, 0xE0);
pub const HINT_TEXT: Srgb<u8> = Srgb::new(0xAA, 0xAA, 0xAA);
pub const ACCENT: Srgb<u8> = Srgb::new(0x3B, 0x8E, 0xD0);
pub const SUCCESS: Srgb<u8> = Srgb::new(0x2C, 0xC9, 0x85);

pub fn palette_color(index: usize) -> Srgb<u8> {
    WHEEL_PALETTE[index % WHEEL_PALETTE.len()]
}

/// The entry's own color if it parses, otherwise its palette slot.
pub fn slice_color(entry: &Entry, index: usize) -> Srgb<u8> {
    entry
        .color
        .as_ref()
        .and_then(|c| {
            let rgb = c.to_srgb();
            if rgb.is_none() {
                log::warn!("Ignoring unparsable color '{}' on '{}'", c, entry.label);
            }
            rgb
        })
        .unwrap_or_else(|| palette_color(index))
}

pub fn set_source(cr: &Context, color: Srgb<u8>) {
    let c: Srgb<f64> = color.into_format();
    cr.set_source_rgb(c.red, c.green, c.blue);
}

pub fn to_rgba(color: Srgb<u8>) -> gdk::RGBA {
    let c: Srgb<f32> = color.into_format();
    gdk::RGBA::new(c.red, c.green, c.blue, 1.0)
}

pub fn from_rgba(rgba: &gdk::RGBA) -> Srgb<u8> {
    Srgb::new(rgba.red(), rgba.green(), rgba.blue()).into_format()
}

pub struct ThemeColors {
    pub background: Srgb<u8>,
    pub card: Srgb<u8>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Srgb::new(0x2B, 0x2B, 0x2B),
            card: DARK,
        }
    }
}

impl ThemeColors {
    #[allow(deprecated)]
    pub fn from_widget(widget: &impl IsA<gtk::Widget>) -> Self {
        let context = widget.style_context();
        let fallback = Self::default();
        Self {
            background: Self::lookup_color(&context, "theme_bg_color", fallback.background),
            card: Self::lookup_color(&context, "theme_base_color", fallback.card),
        }
    }

    #[allow(deprecated)]
    fn lookup_color(context: &gtk::StyleContext, name: &str, fallback: Srgb<u8>) -> Srgb<u8> {
        context
            .lookup_color(name)
            .map(|c| from_rgba(&c))
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.spin-button {
    font-weight: bold;
    font-size: 16px;
    min-height: 50px;
}

.result-label {
    font-weight: bold;
    font-size: 24px;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
