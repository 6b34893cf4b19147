//! Domain models
//!
//! This module contains all domain models used throughout the ranker.

pub mod ranking;
pub mod trial;

pub use ranking::*;
pub use trial::*;
