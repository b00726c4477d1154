//! C++ code generation for the tscc TypeScript-to-C++ compiler.
//!
//! One compilation unit becomes two artifacts:
//! - the declaration artifact (`<basename>.h`): include guard, runtime header,
//!   namespaces, class and interface shapes, accessor and method signatures
//! - the definition artifact (`<basename>.cc`): closure functions, accessor and
//!   method bodies, constructors
//!
//! Both emitters are single-use and own their [`SourceWriter`]. Fatal type
//! errors abort the unit; unsupported syntax is copied through and reported.

use tracing::debug;
use tscc_ast::{SourceUnit, TypeFacade};
use tscc_common::{CodegenOptions, CodegenResult, Diagnostic};

// Indentation-aware output sink
pub mod source_writer;
pub use source_writer::SourceWriter;

// Type to ownership-wrapper mapping
pub mod ownership;
pub use ownership::{Ownership, OwnershipClassifier, PrimitiveMapping, TypeUse, needs_unwrap};

// Function literal capture analysis
pub mod closure;
pub use closure::{Capture, ClosureInfo, ClosurePass, ClosureTable, closure_name};

// Expression and statement translation
pub mod translator;
pub use translator::{BodyContext, ClosureSignature, Translator, quote_string};

// `.h` emission
pub mod declaration_emitter;
pub use declaration_emitter::{DeclarationEmitter, include_guard, setter_name};

// `.cc` emission
pub mod definition_emitter;
pub use definition_emitter::DefinitionEmitter;

/// Both artifacts of one unit plus its recoverable diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedUnit {
    pub header: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate the declaration and definition artifacts of one unit.
///
/// Runs to completion or stops at the first fatal error; no partial output is
/// returned for a failed unit.
pub fn generate_unit(
    unit: &SourceUnit,
    facade: &dyn TypeFacade,
    options: &CodegenOptions,
) -> CodegenResult<GeneratedUnit> {
    debug!(file = %unit.file_name, "generating unit");

    let mut declarations = DeclarationEmitter::new(options, &unit.file_name);
    declarations.emit_unit(unit)?;
    let (header, mut diagnostics) = declarations.finish();

    let mut definitions = DefinitionEmitter::new(unit, facade, options);
    definitions.emit_unit(unit)?;
    let (source, source_diagnostics) = definitions.finish();
    diagnostics.extend(source_diagnostics);

    debug!(
        file = %unit.file_name,
        header_len = header.len(),
        source_len = source.len(),
        diagnostics = diagnostics.len(),
        "generated unit"
    );
    Ok(GeneratedUnit {
        header,
        source,
        diagnostics,
    })
}

#[cfg(test)]
#[path = "../tests/generate.rs"]
mod tests;
