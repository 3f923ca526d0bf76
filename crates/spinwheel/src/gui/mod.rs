pub mod app;
pub mod dialogs;
pub mod rows;
pub mod theme;
pub mod wheel;
pub mod window;
