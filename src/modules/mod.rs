//! Modules layer - Infrastructure components for local integrations
//!
//! Contains adapters for platform capabilities like saving files.

pub mod storage;
