pub mod app;
pub mod board;
pub mod confirm;
pub mod detail;
pub mod render;
pub mod text_input;
pub mod theme;

pub use app::run;
