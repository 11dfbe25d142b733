//! Data models for the attendance backend.
//!
//! These types are plain structured data: the HTTP boundary serializes them
//! directly, with no database handles leaking out of the repositories.

mod attendance;
mod audit;
mod catalog;
mod student;

pub use attendance::*;
pub use audit::*;
pub use catalog::*;
pub use student::*;
