//! Diagnostic types and message lookup for the code generator.
//!
//! Recoverable problems found while generating a unit are collected as
//! [`Diagnostic`] values and reported after the unit finishes. They never
//! stop the unit from producing its artifacts.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A generator diagnostic anchored to a span of the input unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    #[must_use]
    pub const fn warning(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Warning,
            code,
        }
    }

    /// Build a diagnostic from a registered message and its arguments.
    #[must_use]
    pub fn from_code(file: &str, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (category, template) = get_diagnostic_message(code)
            .map(|m| (m.category, m.message))
            .unwrap_or((DiagnosticCategory::Warning, "{0}"));
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: format_message(template, args),
            category,
            code,
        }
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNSUPPORTED_EXPRESSION: u32 = 9001;
    pub const UNSUPPORTED_STATEMENT: u32 = 9002;
    pub const OBJECT_LITERAL_FOR_NON_OBJECT: u32 = 9003;
    pub const THIS_IN_FUNCTION_LITERAL: u32 = 9004;
    pub const INDEX_SIGNATURE_WITHOUT_KEY: u32 = 9005;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_EXPRESSION,
        category: DiagnosticCategory::Warning,
        message: "Unsupported expression '{0}' was copied to the output unchanged.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_STATEMENT,
        category: DiagnosticCategory::Warning,
        message: "Unsupported statement '{0}' was copied to the output unchanged.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::OBJECT_LITERAL_FOR_NON_OBJECT,
        category: DiagnosticCategory::Warning,
        message: "Object literal cannot initialize property '{0}' of non-object type; using its zero value.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::THIS_IN_FUNCTION_LITERAL,
        category: DiagnosticCategory::Warning,
        message: "'this' inside a function literal is not captured.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::INDEX_SIGNATURE_WITHOUT_KEY,
        category: DiagnosticCategory::Warning,
        message: "Index signature of interface '{0}' has no key parameter; emitting it as a plain interface.",
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
