//! Docstring rendering.

use textwrap::{Options, WordSeparator, WordSplitter};

/// Renders docstrings wrapped at a fixed column.
#[derive(Debug, Clone, Copy)]
pub struct DocWriter {
    width: usize,
}

impl DocWriter {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Wraps one paragraph, prefixing every line with `indent`.
    pub fn wrap(&self, indent: &str, text: &str) -> Vec<String> {
        let options = Options::new(self.width)
            .initial_indent(indent)
            .subsequent_indent(indent)
            .break_words(false)
            .word_separator(WordSeparator::AsciiSpace)
            .word_splitter(WordSplitter::NoHyphenation);
        textwrap::wrap(&escape(text), options)
            .into_iter()
            .map(|line| line.trim_end().to_string())
            .collect()
    }

    /// Class docstring: description paragraphs, the subclass list and the
    /// documentation back-reference.
    pub fn class_docstring(
        &self,
        indent: &str,
        paragraphs: &[String],
        subclasses: &[String],
        link: &str,
    ) -> Vec<String> {
        let mut blocks: Vec<Vec<String>> = paragraphs
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| self.wrap(indent, p))
            .collect();

        if !subclasses.is_empty() {
            let mut block = vec![format!("{indent}Subclasses:"), String::new()];
            block.extend(subclasses.iter().map(|name| format!("{indent}- {name}")));
            blocks.push(block);
        }
        blocks.push(vec![format!("{indent}{link}")]);

        let mut lines = vec![format!("{indent}\"\"\"")];
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(block);
        }
        lines.push(format!("{indent}\"\"\""));
        lines
    }

    /// Field docstring placed right after the field declaration.
    ///
    /// Short text stays on one line; longer text becomes a wrapped block.
    /// Empty text yields no docstring.
    pub fn field_docstring(&self, indent: &str, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let single = format!("{indent}\"\"\"{}\"\"\"", escape(text));
        if single.chars().count() <= self.width {
            return vec![single];
        }

        let mut lines = vec![format!("{indent}\"\"\"")];
        lines.extend(self.wrap(indent, text));
        lines.push(format!("{indent}\"\"\""));
        lines
    }
}

/// Escapes text for a triple-quoted string literal.
fn escape(text: &str) -> String {
    let mut escaped = text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    if escaped.ends_with('"') && !escaped.ends_with("\\\"") {
        escaped.pop();
        escaped.push_str("\\\"");
    }
    escaped
}
