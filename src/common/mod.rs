//! Common types, traits, and error definitions for primitive_search
//!
//! This module provides the foundational building blocks shared by the
//! metric evaluation, blending and search modules.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
