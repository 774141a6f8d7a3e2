//! Section accumulator for one generated module.
//!
//! Renderers append lines to named sections in whatever order is convenient;
//! [`SourceBuilder::build`] always concatenates them as
//! imports, declaration, fields, methods.

/// The four sections of a generated module, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Imports,
    Declaration,
    Fields,
    Methods,
}

/// Builds the text of one generated module.
///
/// ## Examples
///
/// ```
/// use cleangram_gen::codegen::SourceBuilder;
///
/// let mut source = SourceBuilder::new();
/// source.field("    id: int");
/// source.declaration("class User(TelegramObject):");
/// source.import("from ..base import TelegramObject");
///
/// assert_eq!(
///     source.build(),
///     "from ..base import TelegramObject\n\n\nclass User(TelegramObject):\n\n    id: int\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SourceBuilder {
    imports: Vec<String>,
    declaration: Vec<String>,
    fields: Vec<String>,
    methods: Vec<String>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line to `section`.
    pub fn push(&mut self, section: Section, line: impl Into<String>) -> &mut Self {
        let lines = match section {
            Section::Imports => &mut self.imports,
            Section::Declaration => &mut self.declaration,
            Section::Fields => &mut self.fields,
            Section::Methods => &mut self.methods,
        };
        lines.push(line.into());
        self
    }

    pub fn import(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(Section::Imports, line)
    }

    pub fn declaration(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(Section::Declaration, line)
    }

    pub fn field(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(Section::Fields, line)
    }

    pub fn method(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(Section::Methods, line)
    }

    /// Appends several lines to `section`.
    pub fn extend<I, S>(&mut self, section: Section, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(section, line);
        }
        self
    }

    /// Concatenates the sections in fixed order.
    ///
    /// Imports are separated from the declaration by two blank lines; the
    /// class body sections by one. The result ends with a single newline.
    pub fn build(&self) -> String {
        let mut out = String::new();
        let mut append = |lines: &[String], separator: &str| {
            if lines.is_empty() {
                return;
            }
            if !out.is_empty() {
                out.push_str(separator);
            }
            out.push_str(&lines.join("\n"));
        };

        append(&self.imports, "");
        append(&self.declaration, "\n\n\n");
        append(&self.fields, "\n\n");
        append(&self.methods, "\n\n");

        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_keep_fixed_order_regardless_of_call_order() {
        let mut source = SourceBuilder::new();
        source.method("    def __call__(self, bot): ...");
        source.field("    text: str");
        source.declaration("class SendMessage(TelegramPath[Message]):");
        source.import("import abc");

        let text = source.build();
        let positions: Vec<_> = ["import abc", "class SendMessage", "text: str", "__call__"]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_sections_add_no_blank_lines() {
        let mut source = SourceBuilder::new();
        source.declaration("class InputFile(TelegramObject):");
        source.declaration("    \"\"\"Upload.\"\"\"");
        assert_eq!(
            source.build(),
            "class InputFile(TelegramObject):\n    \"\"\"Upload.\"\"\"\n"
        );
    }

    #[test]
    fn extend_appends_in_order() {
        let mut source = SourceBuilder::new();
        source.extend(Section::Fields, ["    a: int", "    b: str"]);
        assert_eq!(source.build(), "    a: int\n    b: str\n");
    }
}
