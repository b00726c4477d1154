//! Common types and utilities for the tscc TypeScript-to-C++ compiler.
//!
//! This crate provides foundational types used across all tscc crates:
//! - Diagnostics for recoverable problems (`Diagnostic`, `DiagnosticCategory`)
//! - Fatal generation errors (`CodegenError`)
//! - Generator configuration (`CodegenOptions`)

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes};

pub mod error;
pub use error::{CodegenError, CodegenResult};

pub mod options;
pub use options::{CodegenOptions, DEFAULT_NAMESPACE};
