use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Namespace alias used when nothing else is configured.
pub const DEFAULT_NAMESPACE: &str = "kk";

/// Configuration consumed by the code generator.
///
/// `namespace` prefixes every runtime-support type the generated code names
/// (`kk::String`, `kk::Strong<..>`, `kk::Closure<..>`, ...) and also selects
/// the runtime header (`<kk/kk.h>`). `out_dir` overrides the directory the
/// driver writes a unit's artifacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenOptions {
    #[serde(default = "default_namespace", rename = "kk")]
    pub namespace: String,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            namespace: default_namespace(),
            out_dir: None,
        }
    }
}

impl CodegenOptions {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        CodegenOptions {
            namespace: namespace.into(),
            out_dir: None,
        }
    }

    /// Qualify a runtime-support name: `String` -> `kk::String`.
    pub fn runtime(&self, name: &str) -> String {
        format!("{}::{}", self.namespace, name)
    }

    /// Path of the runtime-support header, relative to an include root.
    pub fn runtime_header(&self) -> String {
        format!("{0}/{0}.h", self.namespace)
    }
}
