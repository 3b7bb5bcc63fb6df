//! Custom widgets

pub mod ascii_image;

pub use ascii_image::{fit_image, AsciiImage};
