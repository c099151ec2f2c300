//! HTML rendering of the reconstructed timeline.

pub mod html;

pub use html::{RenderOptions, render_html_report};
