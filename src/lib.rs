//! Weekly school timetable generation.
//!
//! Given teachers, subjects, courses and the daily grid of time slots, the
//! engine validates routing, expands course requirements into one-hour units,
//! places them best-effort under teacher availability, restriction, daily
//! load and spread constraints, fills leftover cells with pedagogical hours,
//! and returns mirrored course and teacher schedules.

pub mod config;
pub mod data;
pub mod error;
pub mod fill;
pub mod pool;
pub mod restriction;
pub mod schedule;
pub mod server;
pub mod solver;
pub mod store;
pub mod validation;

pub use config::{GenerationConfig, ServerConfig};
pub use data::{GenerationInput, GenerationOutput};
pub use error::GenerationError;
pub use solver::{CancelToken, Generator, Progress, solve};
