//! Output generation for the published snapshot.
//!
//! # Submodules
//!
//! - [`json`]: writes and reads the store document consumed by the viewer
//! - [`markdown`]: renders a published store as a Markdown digest
//!
//! # Output Structure
//!
//! ```text
//! data/
//! └── news_data.json   # replaced on every run that produced results
//! ```

pub mod json;
pub mod markdown;
