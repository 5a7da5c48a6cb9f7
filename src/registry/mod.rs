//! Registry module — mask registry and per-mask sample buffers.

pub mod masks;
pub mod samples;

pub use masks::{MaskEntry, MaskRegistry};
pub use samples::{Appended, SampleStore};
