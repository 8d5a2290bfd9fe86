//! Drawing laid-out timelines: colours, label text, SVG output and hit testing.

pub mod hit;
pub mod palette;
pub mod svg;
pub mod text;

pub use hit::hit_test;
pub use svg::{RenderOptions, render_svg};
