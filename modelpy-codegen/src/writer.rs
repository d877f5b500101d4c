//! Indentation-aware Python text writer.

/// Accumulates generated Python with strict four-space indentation.
#[derive(Debug, Default)]
pub struct PyWriter {
    buf: String,
    level: usize,
}

const INDENT: &str = "    ";

impl PyWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases the indentation level by one.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decreases the indentation level by one, to a minimum of zero.
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Appends text directly, without indentation or newline.
    pub fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Appends a single line at the current indentation level.
    pub fn push_line(&mut self, line: &str) {
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    /// Appends a multi-line block, re-indenting each line to the current
    /// level. Empty input appends nothing.
    pub fn push_block(&mut self, block: &str) {
        if block.is_empty() {
            return;
        }
        for line in block.lines() {
            self.push_line(line);
        }
    }

    /// Appends a bare newline, without indentation.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer and returns the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

impl std::fmt::Display for PyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_line_indents() {
        let mut w = PyWriter::new();
        w.push_line("class Foo:");
        w.indent();
        w.push_line("pass");
        w.unindent();
        assert_eq!(w.finish(), "class Foo:\n    pass\n");
    }

    #[test]
    fn test_push_block_reindents() {
        let mut w = PyWriter::new();
        w.indent();
        w.push_block("a = 1\nb = 2");
        assert_eq!(w.finish(), "    a = 1\n    b = 2\n");
    }

    #[test]
    fn test_unindent_saturates() {
        let mut w = PyWriter::new();
        w.unindent();
        w.push_line("x");
        assert_eq!(w.finish(), "x\n");
    }

    #[test]
    fn test_blank_has_no_indent() {
        let mut w = PyWriter::new();
        w.indent();
        w.blank();
        assert_eq!(w.finish(), "\n");
    }
}
