pub mod chat;
pub mod common;
pub mod image;
pub mod text;

pub use chat::*;
pub use common::*;
pub use image::*;
pub use text::*;
