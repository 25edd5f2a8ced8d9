// ui/mod.rs

mod component;
mod constants;
pub mod courtroom;
pub mod side_select;
pub mod spinner;
mod utils;

pub use component::Component;
pub use courtroom::Courtroom;
pub use side_select::SideSelect;

pub const MIN_WIDTH: u16 = 90;
pub const MIN_HEIGHT: u16 = 30;
