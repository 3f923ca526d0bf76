pub mod animation;
pub mod model;
pub mod overlay;
pub mod view;
pub mod widget;

pub use animation::{Animator, SpinFrame, SpinPlan, SpinSettings};
pub use model::{Viewport, WheelGeometry, WheelState};
pub use overlay::ResultCard;
pub use view::{Quality, WheelRenderer, fit_label};
pub use widget::WheelWidget;

pub const RENDER_SCALE: f64 = 2.0; // supersampling factor of the base image
pub const MARGIN: f64 = 20.0;
pub const DEFAULT_SIZE: i32 = 400;
pub const LABEL_FONT_SIZE: f64 = 14.0;
pub const LABEL_RADIUS_FACTOR: f64 = 0.65; // label center, along the mid-slice ray
pub const LABEL_MAX_WIDTH_FACTOR: f64 = 0.7;
pub const OUTLINE_WIDTH: f64 = 2.0;
pub const POINTER_OFFSET: f64 = 15.0; // base of the pointer, outside the rim
pub const POINTER_HALF_HEIGHT: f64 = 10.0;
pub const POINTER_DEPTH: f64 = 25.0;
pub const HUB_RADIUS: f64 = 10.0;
pub const ELLIPSIS: &str = "...";
pub const PLACEHOLDER_TEXT: &str = "Add entries\nto spin!";
