use thiserror::Error;

/// Fatal generation errors.
///
/// Any of these aborts the current unit: no artifact is written for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A type descriptor matched no ownership classification rule.
    #[error("[TYPE] unsupported type '{type_text}' in {context}")]
    UnsupportedType { context: String, type_text: String },

    /// A function-valued type carried no call signature.
    #[error("[TYPE] function type '{type_text}' has no call signature")]
    MissingSignature { type_text: String },
}

impl CodegenError {
    pub fn unsupported(context: impl Into<String>, type_text: impl Into<String>) -> Self {
        CodegenError::UnsupportedType {
            context: context.into(),
            type_text: type_text.into(),
        }
    }

    /// Replace the context of an unsupported-type error with a more precise one.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            CodegenError::UnsupportedType { type_text, .. } => CodegenError::UnsupportedType {
                context: context.into(),
                type_text,
            },
            other => other,
        }
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;

#[cfg(test)]
#[path = "../tests/error.rs"]
mod tests;
