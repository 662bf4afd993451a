//! # FI-Admin Common Library
//!
//! Shared code for the FI-Admin services including:
//! - Database schema, record models and queries
//! - Configuration loading
//! - Legacy ISIS field-tag map

pub mod config;
pub mod db;
pub mod error;
pub mod field_tags;

pub use error::{Error, Result};
pub use field_tags::FieldTagMap;
