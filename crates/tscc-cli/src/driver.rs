//! Per-unit generation driver.
//!
//! Each input is generated to completion on its own: a unit that fails is
//! recorded and the driver moves on to the next one. A failed unit writes
//! nothing.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tscc_ast::{SourceUnit, UnitInput};
use tscc_common::{CodegenOptions, Diagnostic};
use tscc_emitter::generate_unit;

use crate::args::CliArgs;
use crate::config::{ResolvedProject, resolve_project};

/// A unit that produced no artifacts.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub input: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CompilationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub emitted_files: Vec<PathBuf>,
    pub failures: Vec<UnitFailure>,
    /// Source text of each unit that shipped one, keyed by unit file name.
    pub sources: HashMap<String, String>,
}

impl CompilationResult {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn compile(args: &CliArgs, cwd: &Path) -> Result<CompilationResult> {
    let project = resolve_project(args, cwd)?;
    Ok(compile_project(&project))
}

pub fn compile_project(project: &ResolvedProject) -> CompilationResult {
    let mut result = CompilationResult::default();
    for input in &project.files {
        match compile_file(input, &project.options, &mut result) {
            Ok(()) => {}
            Err(err) => {
                let message = format!("{err:#}");
                warn!(input = %input.display(), error = %message, "unit failed");
                result.failures.push(UnitFailure {
                    input: input.clone(),
                    message,
                });
            }
        }
    }
    debug!(
        units = project.files.len(),
        failed = result.failures.len(),
        emitted = result.emitted_files.len(),
        "compilation finished"
    );
    result
}

fn compile_file(input: &Path, options: &CodegenOptions, result: &mut CompilationResult) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read unit: {}", input.display()))?;
    let UnitInput { unit, semantics } = UnitInput::from_json(&text)
        .with_context(|| format!("failed to parse unit: {}", input.display()))?;

    let generated = generate_unit(&unit, &semantics, options)
        .with_context(|| format!("failed to generate {}", unit.file_name))?;

    let (header_path, source_path) = artifact_paths(input, &unit, options);
    if let Some(dir) = header_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }
    std::fs::write(&header_path, &generated.header)
        .with_context(|| format!("failed to write {}", header_path.display()))?;
    std::fs::write(&source_path, &generated.source)
        .with_context(|| format!("failed to write {}", source_path.display()))?;
    debug!(
        header = %header_path.display(),
        source = %source_path.display(),
        "wrote unit"
    );

    if let Some(source_text) = unit.arena.source_text {
        result.sources.insert(unit.file_name, source_text);
    }
    result.diagnostics.extend(generated.diagnostics);
    result.emitted_files.push(header_path);
    result.emitted_files.push(source_path);
    Ok(())
}

/// `<dir>/<basename>.h` and `<dir>/<basename>.cc`, where `dir` is the
/// configured output directory or the directory of the input file.
pub fn artifact_paths(input: &Path, unit: &SourceUnit, options: &CodegenOptions) -> (PathBuf, PathBuf) {
    let dir = options
        .out_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let basename = unit.basename();
    (
        dir.join(format!("{basename}.h")),
        dir.join(format!("{basename}.cc")),
    )
}

#[cfg(test)]
#[path = "../tests/driver.rs"]
mod tests;
