//! Common utilities module
//!
//! This module contains shared types used across the shear pipeline.

pub mod error;
pub mod types;

pub use error::{ErrorKind, Result, ShearError};
pub use types::{Centroid, Roi, ShearVector};
