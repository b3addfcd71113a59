//! # LinguaShift Common Library
//!
//! Shared code for the LinguaShift service crates:
//! - Error and result types
//! - TOML bootstrap configuration and path resolution
//! - Detection/rewrite request and response types

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    DetectionResponse, DetectionResult, JargonTerm, OverallScore, RewriteResponse, ShapeMismatch, UnparsedDetection,
};
