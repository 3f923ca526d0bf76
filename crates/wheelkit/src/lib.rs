pub mod macros;
pub mod model;
pub mod select;
pub mod store;
