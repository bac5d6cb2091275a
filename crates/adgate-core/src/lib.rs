//! Core utilities and types shared across all Adgate crates

pub mod error_builder;
pub mod problemdetails;

pub use error_builder::*;
pub use problemdetails::{Problem, ProblemDetails};
