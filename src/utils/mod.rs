//! Shared helpers with no knowledge of tasks or the pipeline.

pub mod exec;
pub mod html;
pub mod mime;
pub mod path;
