use super::app::{AppModel, AppMsg};
use super::theme;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgb;
use relm4::ComponentSender;
use std::f64::consts::PI;
use wheelkit::model::Entry;

const SWATCH_SIZE: i32 = 14;

fn clear(list: &gtk::ListBox) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
}

fn button(
    label: &str,
    css_class: Option<&str>,
    sender: &ComponentSender<AppModel>,
    msg: impl Fn() -> AppMsg + 'static,
) -> gtk::Button {
    let button = gtk::Button::with_label(label);
    if let Some(class) = css_class {
        button.add_css_class(class);
    }
    let sender = sender.clone();
    button.connect_clicked(move |_| sender.input(msg()));
    button
}

fn swatch(color: Srgb<u8>) -> gtk::DrawingArea {
    let area = gtk::DrawingArea::builder()
        .content_width(SWATCH_SIZE)
        .content_height(SWATCH_SIZE)
        .valign(gtk::Align::Center)
        .build();
    area.set_draw_func(move |_, cr, w, h| {
        let (w, h) = (w as f64, h as f64);
        cr.arc(w / 2.0, h / 2.0, w.min(h) / 2.0, 0.0, 2.0 * PI);
        theme::set_source(cr, color);
        if let Err(e) = cr.fill() {
            log::error!("Drawing error: {}", e);
        }
    });
    area
}

fn format_weight(weight: f64) -> String {
    format!("x{}", weight)
}

fn entry_row(index: usize, entry: &Entry, sender: &ComponentSender<AppModel>) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    row.set_margin_start(4);
    row.set_margin_end(4);

    let label = gtk::Label::builder()
        .label(format!("{} ({})", entry.label, format_weight(entry.weight)))
        .xalign(0.0)
        .hexpand(true)
        .ellipsize(gtk::pango::EllipsizeMode::End)
        .build();

    row.append(&swatch(theme::slice_color(entry, index)));
    row.append(&label);
    row.append(&button("Edit", None, sender, move || AppMsg::EditEntry(index)));
    row.append(&button("X", Some("destructive-action"), sender, move || {
        AppMsg::RemoveEntry(index)
    }));
    row
}

pub fn rebuild_entry_rows(
    list: &gtk::ListBox,
    entries: &[Entry],
    sender: &ComponentSender<AppModel>,
) {
    clear(list);
    for (i, entry) in entries.iter().enumerate() {
        list.append(&entry_row(i, entry, sender));
    }
}

fn preset_row(name: &str, sender: &ComponentSender<AppModel>) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 5);
    row.set_margin_top(5);
    row.set_margin_bottom(5);
    row.set_margin_start(10);
    row.set_margin_end(5);

    let label = gtk::Label::builder()
        .label(name)
        .xalign(0.0)
        .hexpand(true)
        .ellipsize(gtk::pango::EllipsizeMode::End)
        .build();
    row.append(&label);

    let (load, rename, delete) = (name.to_string(), name.to_string(), name.to_string());
    row.append(&button("Load", Some("suggested-action"), sender, move || {
        AppMsg::LoadPreset(load.clone())
    }));
    row.append(&button("Rename", None, sender, move || {
        AppMsg::RenamePreset(rename.clone())
    }));
    row.append(&button("Delete", Some("destructive-action"), sender, move || {
        AppMsg::DeletePreset(delete.clone())
    }));
    row
}

pub fn rebuild_preset_rows(
    list: &gtk::ListBox,
    names: &[String],
    sender: &ComponentSender<AppModel>,
) {
    clear(list);
    if names.is_empty() {
        let empty = gtk::Label::builder()
            .label("No saved configurations yet")
            .margin_top(12)
            .margin_bottom(12)
            .build();
        empty.add_css_class("dim-label");
        list.append(&empty);
        return;
    }
    for name in names {
        list.append(&preset_row(name, sender));
    }
}
