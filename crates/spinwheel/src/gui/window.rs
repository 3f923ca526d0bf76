use crate::config::WindowConfig;
use gtk::prelude::*;
use gtk4 as gtk;

const MIN_WIDTH: i32 = 640;
const MIN_HEIGHT: i32 = 480;

pub fn init_window(window: &gtk::ApplicationWindow, cfg: &WindowConfig) {
    window.set_default_size(cfg.width.max(MIN_WIDTH), cfg.height.max(MIN_HEIGHT));
    prefer_dark_theme();
}

pub fn prefer_dark_theme() {
    if let Some(settings) = gtk::Settings::default() {
        settings.set_gtk_application_prefer_dark_theme(true);
    }
}
