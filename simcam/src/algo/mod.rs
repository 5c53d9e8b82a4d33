//! Generic numerical routines used by the optimizers

pub mod golden;
pub mod misc;

pub use golden::{golden_section_search, SearchError, GOLDEN_RATIO};
pub use misc::find_nearest;
