//! Core business logic for photogram.

pub mod services;

pub use services::*;
