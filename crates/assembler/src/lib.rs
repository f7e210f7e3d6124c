//! Context assembly: turning ranked hits into citable evidence windows.

pub mod format;
pub mod windows;

pub use format::render_context;
pub use windows::{AssemblerConfig, assemble};
