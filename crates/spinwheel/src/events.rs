#[derive(Debug, Clone)]
pub enum AppEvent {
    PresetsChanged,
}
