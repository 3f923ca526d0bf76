use crate::config::Config;
use crate::events::AppEvent;
use crate::gui::dialogs;
use crate::gui::rows;
use crate::gui::theme;
use crate::gui::wheel::{SpinSettings, WheelWidget};
use crate::gui::window;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use strum::AsRefStr;
use palette::Srgb;
use wheelkit::model::{Entry, EntryError, HexColor};
use wheelkit::select;
use wheelkit::store::PresetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Page {
    Spinner,
    Configurations,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Spinner => "Spinner",
            Page::Configurations => "Configurations",
        }
    }
}

pub struct AppInit {
    pub config: Config,
    pub store: PresetStore,
    pub events: async_channel::Receiver<AppEvent>,
}

/// Inputs that describe one entry. The picked color only overrides the
/// palette while `custom_color` is checked.
pub struct EntryForm {
    pub label: gtk::Entry,
    pub weight: gtk::Entry,
    pub color: gtk::ColorDialogButton,
    pub custom_color: gtk::CheckButton,
}

impl EntryForm {
    fn new() -> Self {
        let dialog = gtk::ColorDialog::builder()
            .title("Slice color")
            .with_alpha(false)
            .build();
        let form = Self {
            label: gtk::Entry::builder()
                .hexpand(true)
                .placeholder_text("Entry Name")
                .build(),
            weight: gtk::Entry::builder()
                .width_chars(8)
                .placeholder_text("Weight")
                .build(),
            color: gtk::ColorDialogButton::new(Some(dialog)),
            custom_color: gtk::CheckButton::with_label("Custom color"),
        };

        // picking a color implies wanting it
        let custom = form.custom_color.clone();
        form.color.connect_rgba_notify(move |_| custom.set_active(true));
        form
    }

    fn color_text(&self) -> String {
        if self.custom_color.is_active() {
            HexColor::from_srgb(theme::from_rgba(&self.color.rgba())).to_string()
        } else {
            String::new()
        }
    }

    fn read(&self) -> Result<Option<Entry>, EntryError> {
        Entry::from_input(&self.label.text(), &self.weight.text(), &self.color_text())
    }

    /// Loads an entry for editing, showing the color its slice is drawn in.
    fn fill(&self, entry: &Entry, index: usize) {
        self.label.set_text(&entry.label);
        self.weight.set_text(&entry.weight.to_string());
        self.show_color(theme::slice_color(entry, index), entry.color.is_some());
    }

    /// Resets the inputs; the picker shows the palette color the next entry
    /// would get.
    fn clear(&self, next_index: usize) {
        self.label.set_text("");
        self.weight.set_text("");
        self.show_color(theme::palette_color(next_index), false);
    }

    fn show_color(&self, color: Srgb<u8>, custom: bool) {
        // set_rgba checks the box through the notify handler
        self.color.set_rgba(&theme::to_rgba(color));
        self.custom_color.set_active(custom);
    }
}

pub struct AppModel {
    entries: Vec<Entry>,
    editing: Option<usize>,
    current_preset: Option<String>,
    spinning: bool,
    result: String,
    store: PresetStore,
    wheel: WheelWidget,
    form: EntryForm,
    root: gtk::ApplicationWindow,
    stack: gtk::Stack,
    entry_list: gtk::ListBox,
    preset_list: gtk::ListBox,
    preset_name: gtk::Entry,
    rename_to: gtk::Entry,
}

#[derive(Debug)]
pub enum AppMsg {
    SubmitEntry,
    EditEntry(usize),
    CancelEdit,
    RemoveEntry(usize),
    Spin,
    SpinFinished(Entry),
    SavePreset,
    LoadPreset(String),
    RenamePreset(String),
    DeletePreset(String),
    ConfirmDelete(String),
    RefreshPresets,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::PresetsChanged => AppMsg::RefreshPresets,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Random Wheel Spinner"),

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 6,
                set_margin_all: 12,

                #[name = "switcher"]
                gtk::StackSwitcher {
                    set_halign: gtk::Align::Center,
                },

                #[name = "stack"]
                gtk::Stack {
                    set_vexpand: true,
                    set_transition_type: gtk::StackTransitionType::SlideLeftRight,

                    add_titled[Some(Page::Spinner.as_ref()), Page::Spinner.title()] = &gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 10,

                        gtk::Box {
                            set_orientation: gtk::Orientation::Horizontal,
                            set_spacing: 12,
                            set_vexpand: true,

                            #[local_ref]
                            wheel_area -> gtk::DrawingArea {
                                set_hexpand: true,
                                set_vexpand: true,
                            },

                            gtk::Box {
                                set_orientation: gtk::Orientation::Vertical,
                                set_spacing: 10,
                                set_width_request: 300,

                                gtk::Box {
                                    set_orientation: gtk::Orientation::Horizontal,
                                    set_spacing: 5,

                                    #[local_ref]
                                    label_input -> gtk::Entry {
                                        connect_activate[sender] => move |_| {
                                            sender.input(AppMsg::SubmitEntry);
                                        },
                                    },

                                    #[local_ref]
                                    weight_input -> gtk::Entry {
                                        connect_activate[sender] => move |_| {
                                            sender.input(AppMsg::SubmitEntry);
                                        },
                                    },
                                },

                                gtk::Box {
                                    set_orientation: gtk::Orientation::Horizontal,
                                    set_spacing: 5,

                                    #[local_ref]
                                    color_button -> gtk::ColorDialogButton {
                                        set_tooltip_text: Some("Slice color"),
                                    },

                                    #[local_ref]
                                    custom_color -> gtk::CheckButton {
                                        set_hexpand: true,
                                    },

                                    gtk::Button {
                                        add_css_class: "suggested-action",
                                        #[watch]
                                        set_label: if model.editing.is_some() { "Update" } else { "+" },
                                        connect_clicked[sender] => move |_| {
                                            sender.input(AppMsg::SubmitEntry);
                                        },
                                    },

                                    gtk::Button {
                                        set_label: "Cancel",
                                        #[watch]
                                        set_visible: model.editing.is_some(),
                                        connect_clicked[sender] => move |_| {
                                            sender.input(AppMsg::CancelEdit);
                                        },
                                    },
                                },

                                gtk::Button {
                                    set_label: "SPIN THE WHEEL!",
                                    add_css_class: "spin-button",
                                    #[watch]
                                    set_sensitive: model.can_spin(),
                                    connect_clicked[sender] => move |_| {
                                        sender.input(AppMsg::Spin);
                                    },
                                },

                                gtk::Frame {
                                    set_label: Some("Entries"),
                                    set_vexpand: true,

                                    gtk::ScrolledWindow {
                                        set_hscrollbar_policy: gtk::PolicyType::Never,

                                        #[name = "entry_list"]
                                        gtk::ListBox {
                                            set_selection_mode: gtk::SelectionMode::None,
                                        },
                                    },
                                },

                                gtk::Box {
                                    set_orientation: gtk::Orientation::Horizontal,
                                    set_spacing: 5,

                                    #[name = "preset_name"]
                                    gtk::Entry {
                                        set_hexpand: true,
                                        set_placeholder_text: Some("Configuration name"),
                                        connect_activate[sender] => move |_| {
                                            sender.input(AppMsg::SavePreset);
                                        },
                                    },

                                    gtk::Button {
                                        set_label: "Save Configuration",
                                        connect_clicked[sender] => move |_| {
                                            sender.input(AppMsg::SavePreset);
                                        },
                                    },
                                },
                            },
                        },

                        gtk::Label {
                            add_css_class: "result-label",
                            #[watch]
                            set_label: &model.result,
                        },
                    },

                    add_titled[Some(Page::Configurations.as_ref()), Page::Configurations.title()] = &gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 10,

                        gtk::Frame {
                            set_label: Some("Saved Configurations"),
                            set_vexpand: true,

                            gtk::ScrolledWindow {
                                set_hscrollbar_policy: gtk::PolicyType::Never,

                                #[name = "preset_list"]
                                gtk::ListBox {
                                    set_selection_mode: gtk::SelectionMode::None,
                                },
                            },
                        },

                        gtk::Box {
                            set_orientation: gtk::Orientation::Horizontal,
                            set_spacing: 5,

                            #[name = "rename_to"]
                            gtk::Entry {
                                set_hexpand: true,
                                set_placeholder_text: Some("New name for Rename"),
                            },

                            gtk::Button {
                                set_label: "Refresh",
                                connect_clicked[sender] => move |_| {
                                    sender.input(AppMsg::RefreshPresets);
                                },
                            },
                        },
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            config,
            store,
            events,
        } = init;

        theme::load_css();
        window::init_window(&root, &config.window);

        let wheel = WheelWidget::new(
            SpinSettings::from_config(&config.spin),
            &config.wheel.font_family,
        );
        let entries = store.load_autosave();
        wheel.set_entries(entries.clone());

        let model = AppModel {
            entries,
            editing: None,
            current_preset: None,
            spinning: false,
            result: String::new(),
            store,
            wheel,
            form: EntryForm::new(),
            root: root.clone(),
            stack: gtk::Stack::default(),
            entry_list: gtk::ListBox::default(),
            preset_list: gtk::ListBox::default(),
            preset_name: gtk::Entry::default(),
            rename_to: gtk::Entry::default(),
        };

        let wheel_area = model.wheel.widget();
        let label_input = &model.form.label;
        let weight_input = &model.form.weight;
        let color_button = &model.form.color;
        let custom_color = &model.form.custom_color;
        let widgets = view_output!();

        let mut model = model;
        model.stack = widgets.stack.clone();
        model.entry_list = widgets.entry_list.clone();
        model.preset_list = widgets.preset_list.clone();
        model.preset_name = widgets.preset_name.clone();
        model.rename_to = widgets.rename_to.clone();

        widgets.switcher.set_stack(Some(&widgets.stack));

        model.form.clear(model.entries.len());
        model.refresh_entry_rows(&sender);
        model.refresh_presets(&sender);

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = events.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::SubmitEntry => {
                if self.spinning {
                    return;
                }
                match self.form.read() {
                    Ok(Some(entry)) => {
                        match self.editing.take() {
                            Some(i) if i < self.entries.len() => self.entries[i] = entry,
                            _ => self.entries.push(entry),
                        }
                        self.form.clear(self.entries.len());
                        self.entries_changed(&sender);
                    }
                    Ok(None) => {}
                    Err(e) => dialogs::show_error(&self.root, "Invalid entry", &e.to_string()),
                }
            }
            AppMsg::EditEntry(index) => {
                if self.spinning {
                    return;
                }
                if let Some(entry) = self.entries.get(index) {
                    self.form.fill(entry, index);
                    self.editing = Some(index);
                }
            }
            AppMsg::CancelEdit => {
                self.editing = None;
                self.form.clear(self.entries.len());
            }
            AppMsg::RemoveEntry(index) => {
                if self.spinning || index >= self.entries.len() {
                    return;
                }
                self.entries.remove(index);
                match self.editing {
                    Some(i) if i == index => {
                        self.editing = None;
                        self.form.clear(self.entries.len());
                    }
                    Some(i) if i > index => self.editing = Some(i - 1),
                    _ => {}
                }
                self.entries_changed(&sender);
            }
            AppMsg::Spin => {
                if !self.can_spin() {
                    return;
                }
                let sender = sender.clone();
                let started = self
                    .wheel
                    .spin(move |winner| sender.input(AppMsg::SpinFinished(winner)));
                if started {
                    self.spinning = true;
                    self.result = "Spinning...".to_string();
                }
            }
            AppMsg::SpinFinished(winner) => {
                self.spinning = false;
                self.result = format!("Winner: {}!", winner.label);
                self.wheel
                    .show_result_overlay("WINNER!", &winner.label, theme::ACCENT);
            }
            AppMsg::SavePreset => {
                let name = self.preset_name.text().trim().to_string();
                if name.is_empty() {
                    return;
                }
                if self.entries.is_empty() {
                    dialogs::show_error(
                        &self.root,
                        "Nothing to save",
                        "Add some entries before saving a configuration.",
                    );
                    return;
                }
                match self.store.save(&name, &self.entries) {
                    Ok(()) => {
                        self.current_preset = Some(name.clone());
                        self.refresh_presets(&sender);
                        self.wheel.show_result_overlay(
                            "Saved!",
                            &format!("Configuration '{}'\nsaved successfully!", name),
                            theme::SUCCESS,
                        );
                    }
                    Err(e) => dialogs::show_error(
                        &self.root,
                        "Could not save configuration",
                        &e.to_string(),
                    ),
                }
            }
            AppMsg::LoadPreset(name) => {
                if self.spinning {
                    return;
                }
                let Some(preset) = self.store.load(&name) else {
                    dialogs::show_error(
                        &self.root,
                        "Could not load configuration",
                        &format!("'{}' is missing or unreadable.", name),
                    );
                    return;
                };
                self.entries = preset.entries;
                self.editing = None;
                self.form.clear(self.entries.len());
                self.preset_name.set_text(&preset.name);
                self.result = format!("Loaded: {}", preset.name);
                self.current_preset = Some(preset.name);
                self.entries_changed(&sender);
                self.show_page(Page::Spinner);
            }
            AppMsg::RenamePreset(old_name) => {
                let new_name = self.rename_to.text().trim().to_string();
                if new_name.is_empty() {
                    dialogs::show_error(
                        &self.root,
                        "No new name",
                        "Type the new name in the field below the list first.",
                    );
                    return;
                }
                if new_name == old_name {
                    return;
                }
                match self.store.rename(&old_name, &new_name) {
                    Ok(()) => {
                        if self.current_preset.as_deref() == Some(old_name.as_str()) {
                            self.preset_name.set_text(&new_name);
                            self.current_preset = Some(new_name);
                        }
                        self.rename_to.set_text("");
                        self.refresh_presets(&sender);
                    }
                    Err(e) => dialogs::show_error(
                        &self.root,
                        "Could not rename configuration",
                        &e.to_string(),
                    ),
                }
            }
            AppMsg::DeletePreset(name) => {
                let sender = sender.clone();
                let message = format!("Delete '{}'?", name);
                dialogs::confirm(
                    &self.root,
                    &message,
                    "This cannot be undone.",
                    "Delete",
                    move || sender.input(AppMsg::ConfirmDelete(name)),
                );
            }
            AppMsg::ConfirmDelete(name) => match self.store.delete(&name) {
                Ok(()) => {
                    if self.current_preset.as_deref() == Some(name.as_str()) {
                        self.current_preset = None;
                    }
                    self.refresh_presets(&sender);
                }
                Err(e) => dialogs::show_error(
                    &self.root,
                    "Could not delete configuration",
                    &e.to_string(),
                ),
            },
            AppMsg::RefreshPresets => self.refresh_presets(&sender),
        }
    }
}

impl AppModel {
    fn can_spin(&self) -> bool {
        !self.spinning && select::total_weight(&self.entries) > 0.0
    }

    fn entries_changed(&self, sender: &ComponentSender<Self>) {
        self.wheel.hide_result_overlay();
        self.wheel.set_entries(self.entries.clone());
        self.refresh_entry_rows(sender);
        if let Err(e) = self.store.save_autosave(&self.entries) {
            log::error!("Failed to autosave entries: {}", e);
        }
    }

    fn refresh_entry_rows(&self, sender: &ComponentSender<Self>) {
        rows::rebuild_entry_rows(&self.entry_list, &self.entries, sender);
    }

    fn refresh_presets(&self, sender: &ComponentSender<Self>) {
        rows::rebuild_preset_rows(&self.preset_list, &self.store.list(), sender);
    }

    fn show_page(&self, page: Page) {
        self.stack.set_visible_child_name(page.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_names_are_lowercase() {
        assert_eq!(Page::Spinner.as_ref(), "spinner");
        assert_eq!(Page::Configurations.as_ref(), "configurations");
        assert_eq!(Page::Configurations.title(), "Configurations");
    }
}
