use colored::Colorize;
use std::collections::HashMap;

use tscc_common::{Diagnostic, DiagnosticCategory};

use crate::driver::UnitFailure;

pub struct Reporter {
    color: bool,
    sources: HashMap<String, String>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: HashMap::new(),
        }
    }

    /// Register the source text a unit's diagnostic spans point into.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(file.into(), text.into());
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = match self.position_for(&diagnostic.file, diagnostic.start) {
            Some((line, column)) => format!("{}:{}:{}", diagnostic.file, line, column),
            None if !diagnostic.file.is_empty() => diagnostic.file.clone(),
            None => "<unknown>".to_string(),
        };

        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    pub fn format_failure(&self, failure: &UnitFailure) -> String {
        let label = if self.color {
            "error".red().bold().to_string()
        } else {
            "error".to_string()
        };
        format!("{} - {}: {}", failure.input.display(), label, failure.message)
    }

    /// Source line with a `~` underline under the span, like:
    ///   2   for (const k in items) {}
    ///       ~~~~~~~~~~~~~~~~~~~~~~~~~
    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let (line_num, column) = self.position_for(file, start)?;
        let source = self.sources.get(file)?;
        let line_text = source.lines().nth((line_num - 1) as usize)?;

        let lead = (column - 1) as usize;
        let mut underline: String = line_text
            .chars()
            .take(lead)
            .map(|ch| if ch == '\t' { "    " } else { " " })
            .collect();
        let width = line_text
            .chars()
            .skip(lead)
            .take(length as usize)
            .map(|ch| if ch == '\t' { 4 } else { 1 })
            .sum::<usize>()
            .max(1);
        let tildes = "~".repeat(width);
        if self.color {
            underline.push_str(&tildes.red().to_string());
        } else {
            underline.push_str(&tildes);
        }

        Some(format!(
            "\n  {:>3}   {}\n        {}",
            line_num,
            line_text.replace('\t', "    "),
            underline
        ))
    }

    /// One-based line and column of a byte offset.
    fn position_for(&self, file: &str, offset: u32) -> Option<(u32, u32)> {
        let source = self.sources.get(file)?;
        let offset = offset as usize;
        if offset > source.len() || !source.is_char_boundary(offset) {
            return None;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = source[line_start..offset].chars().count() as u32 + 1;
        Some((line, column))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("TSCC{}", code);
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[cfg(test)]
#[path = "../tests/reporter.rs"]
mod tests;
