//! Native CLI support for the tscc binary.
//!
//! The binary reads analyzed units (JSON produced by the front-end), resolves
//! the generator options from `tscc.json` and flags, and writes a
//! `<basename>.h`/`<basename>.cc` pair per unit.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
