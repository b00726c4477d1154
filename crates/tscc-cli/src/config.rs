//! `tscc.json` project files and option resolution.
//!
//! Options resolve in increasing precedence: built-in defaults, the project
//! file's `compilerOptions`, then command-line flags.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tscc_common::CodegenOptions;

use crate::args::CliArgs;

pub const CONFIG_FILE_NAME: &str = "tscc.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub compiler_options: Option<ProjectOptions>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOptions {
    #[serde(default)]
    pub kk: Option<String>,
    #[serde(default)]
    pub out_dir: Option<String>,
}

/// Options and inputs for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    pub options: CodegenOptions,
    pub files: Vec<PathBuf>,
    /// The project file that contributed, if any.
    pub config_path: Option<PathBuf>,
}

pub fn parse_project_config(source: &str) -> Result<ProjectConfig> {
    let config = serde_json::from_str(source).context("failed to parse tscc.json")?;
    Ok(config)
}

pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    parse_project_config(&source)
        .with_context(|| format!("failed to parse project file: {}", path.display()))
}

pub(crate) fn find_project_config(cwd: &Path) -> Option<PathBuf> {
    let candidate = cwd.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Locate the project file named by `--project`, or `tscc.json` in `cwd`.
pub(crate) fn resolve_project_path(cwd: &Path, project: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(project) = project else {
        return Ok(find_project_config(cwd));
    };

    let mut candidate = if project.is_absolute() {
        project.to_path_buf()
    } else {
        cwd.join(project)
    };

    if candidate.is_dir() {
        candidate = candidate.join(CONFIG_FILE_NAME);
    }

    if !candidate.is_file() {
        bail!("project file not found at {}", candidate.display());
    }
    Ok(Some(candidate))
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Merge defaults, the project file and flags into generator options.
///
/// Paths from the project file are relative to the file's directory; paths
/// from flags are relative to `cwd`.
pub fn resolve_options(
    config: Option<&ProjectConfig>,
    config_dir: &Path,
    args: &CliArgs,
    cwd: &Path,
) -> CodegenOptions {
    let mut options = CodegenOptions::default();

    if let Some(compiler_options) = config.and_then(|c| c.compiler_options.as_ref()) {
        if let Some(kk) = &compiler_options.kk {
            options.namespace = kk.clone();
        }
        if let Some(out_dir) = &compiler_options.out_dir {
            options.out_dir = Some(resolve_against(config_dir, Path::new(out_dir)));
        }
    }

    if let Some(kk) = &args.kk {
        options.namespace = kk.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        options.out_dir = Some(resolve_against(cwd, out_dir));
    }
    options
}

/// Resolve the options and input list for an invocation.
///
/// Positional inputs win over the project file's `files` list. Without
/// either there is nothing to do and resolution fails.
pub fn resolve_project(args: &CliArgs, cwd: &Path) -> Result<ResolvedProject> {
    // Explicit inputs skip the implicit project lookup.
    let config_path = if args.files.is_empty() || args.project.is_some() {
        resolve_project_path(cwd, args.project.as_deref())?
    } else {
        None
    };

    let config = config_path
        .as_deref()
        .map(load_project_config)
        .transpose()?;
    let config_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(cwd)
        .to_path_buf();

    let options = resolve_options(config.as_ref(), &config_dir, args, cwd);

    let files: Vec<PathBuf> = if !args.files.is_empty() {
        args.files.iter().map(|f| resolve_against(cwd, f)).collect()
    } else {
        config
            .as_ref()
            .and_then(|c| c.files.as_ref())
            .map(|files| {
                files
                    .iter()
                    .map(|f| resolve_against(&config_dir, Path::new(f)))
                    .collect()
            })
            .unwrap_or_default()
    };

    if files.is_empty() {
        match &config_path {
            Some(path) => bail!("no input files listed in {}", path.display()),
            None => bail!("no input files; pass unit files or a project with -p"),
        }
    }

    debug!(
        config = ?config_path,
        namespace = %options.namespace,
        out_dir = ?options.out_dir,
        files = files.len(),
        "resolved project"
    );
    Ok(ResolvedProject {
        options,
        files,
        config_path,
    })
}

#[cfg(test)]
#[path = "../tests/config.rs"]
mod tests;
