//! Indentation-aware text sink.
//!
//! Each emitter owns one writer for one artifact. The writer tracks the
//! indentation level and whether the last write ended a line, which decides
//! whether a block opens on a fresh indented line or after a statement head
//! such as `if(x) `.

const INDENT: &str = "\t";

#[derive(Debug)]
pub struct SourceWriter {
    output: String,
    indent_level: u32,
    is_new_line: bool,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceWriter {
    pub fn new() -> Self {
        SourceWriter {
            output: String::with_capacity(4096),
            indent_level: 0,
            is_new_line: true,
        }
    }

    /// Write text to output.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.output.push_str(text);
        self.is_new_line = text.ends_with('\n');
    }

    /// Write a newline.
    pub fn write_line(&mut self) {
        self.write("\n");
    }

    /// Write the indentation of the current level.
    pub fn write_indent(&mut self) {
        self.write_indent_offset(0);
    }

    /// Write indentation one or more levels away from the current one.
    /// Visibility labels sit one level out from the members they precede.
    pub fn write_indent_offset(&mut self, offset: i32) {
        let level = (self.indent_level as i32 + offset).max(0) as usize;
        if level == 0 {
            return;
        }
        for _ in 0..level {
            self.output.push_str(INDENT);
        }
        self.is_new_line = false;
    }

    /// Write `text` on its own line at the current indentation.
    pub fn write_indented_line(&mut self, text: &str) {
        self.write_indent();
        self.write(text);
        self.write_line();
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub const fn indent_level(&self) -> u32 {
        self.indent_level
    }

    /// Whether the last write ended a line.
    pub const fn is_new_line(&self) -> bool {
        self.is_new_line
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
#[path = "../tests/source_writer.rs"]
mod tests;
