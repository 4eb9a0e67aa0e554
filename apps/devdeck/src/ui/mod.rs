//! Terminal presentation: wrap layout primitives and the command tree renderer.

pub mod layout;
pub mod render;

pub use render::{preview, render_tree};
