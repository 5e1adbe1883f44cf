//! Wire models for the announcement service.

mod announcement;

pub use announcement::*;
