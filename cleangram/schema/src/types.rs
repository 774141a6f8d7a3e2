//! Type resolution: table rows to arguments, arguments to annotations.
//!
//! The extractor hands this module markup-free [`RawRow`]s and paragraphs
//! ([`RawCell`]s) so every rule here is a pure function that can be tested
//! without a document.
//!
//! ## Row Rules
//!
//! | Attribute         | Source                                                  |
//! |-------------------|---------------------------------------------------------|
//! | `name`            | first cell, verbatim                                    |
//! | `array_depth`     | occurrences of `Array of` in the type cell              |
//! | `optional`        | the word `Optional` in any cell after the type cell     |
//! | `primitive_types` | whole words of the type cell, through [`PRIMITIVE_NAMES`] |
//! | `object_types`    | every link of the type cell, through the anchor table   |
//! | `fixed_default`   | emphasized text of a required "must be" description     |
//!
//! ## Composition
//!
//! ```text
//! Integer or String            -> Union[int, str]
//! Integer or String, Optional  -> Union[int, str, None]
//! Array of PhotoSize, Optional -> Optional[List[PhotoSize]]
//! Array of Array of PhotoSize  -> List[List[PhotoSize]]
//! ```

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::errors::SchemaError;
use crate::model::{AnchorTable, Argument, Category, Primitive};
use crate::names::is_reserved;

/// Marker counted to find the list nesting depth.
pub const ARRAY_MARKER: &str = "Array of";

/// Word marking an argument as optional.
pub const OPTIONAL_MARKER: &str = "Optional";

/// Phrase marking a description that names a constant value.
pub const FIXED_DEFAULT_MARKER: &str = "must be";

/// Deepest supported list nesting.
pub const MAX_ARRAY_DEPTH: u8 = 2;

/// Source-document type words and the primitives they map to.
pub const PRIMITIVE_NAMES: &[(&str, Primitive)] = &[
    ("True", Primitive::Bool),
    ("Boolean", Primitive::Bool),
    ("String", Primitive::Str),
    ("Int", Primitive::Int),
    ("Integer", Primitive::Int),
    ("Float", Primitive::Float),
];

/// Looks a source-document word up in [`PRIMITIVE_NAMES`].
pub fn primitive(word: &str) -> Option<Primitive> {
    PRIMITIVE_NAMES
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, p)| *p)
}

/// Canonical source-document spelling of a primitive.
pub fn source_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Bool => "Boolean",
        Primitive::Str => "String",
        Primitive::Int => "Integer",
        Primitive::Float => "Float",
    }
}

/// One run of inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { text: String, href: String },
    Emphasis(String),
}

/// Inline content of one table cell or paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    pub inlines: Vec<Inline>,
}

impl RawCell {
    /// A cell holding plain text only.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Text(text.into())],
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.inlines.push(Inline::Text(text.into()));
        self
    }

    pub fn link(mut self, text: impl Into<String>, href: impl Into<String>) -> Self {
        self.inlines.push(Inline::Link {
            text: text.into(),
            href: href.into(),
        });
        self
    }

    pub fn emphasis(mut self, text: impl Into<String>) -> Self {
        self.inlines.push(Inline::Emphasis(text.into()));
        self
    }

    /// Full text content with whitespace runs collapsed.
    pub fn content(&self) -> String {
        let raw: String = self
            .inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text(text) | Inline::Emphasis(text) => text.as_str(),
                Inline::Link { text, .. } => text.as_str(),
            })
            .collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Targets of every link, in order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Link { href, .. } => Some(href.as_str()),
            _ => None,
        })
    }

    /// Text of every emphasized run, in order.
    pub fn emphasized(&self) -> impl Iterator<Item = &str> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Emphasis(text) => Some(text.trim()),
            _ => None,
        })
    }

    /// Words outside links.
    fn unlinked_words(&self) -> impl Iterator<Item = &str> {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text(text) | Inline::Emphasis(text) => Some(text.as_str()),
                Inline::Link { .. } => None,
            })
            .flat_map(words)
    }

    fn has_word(&self, word: &str) -> bool {
        words(&self.content()).any(|w| w == word)
    }
}

/// One table row, split into cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// A resolved type expression in the target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    Primitive(Primitive),
    Object(String),
    None,
    Union(Vec<Annotation>),
    List(Box<Annotation>),
    Optional(Box<Annotation>),
}

impl Annotation {
    /// `typing` names the rendered expression refers to.
    pub fn typing_names(&self) -> BTreeSet<&'static str> {
        let mut names = BTreeSet::new();
        self.collect_typing(&mut names);
        names
    }

    fn collect_typing(&self, names: &mut BTreeSet<&'static str>) {
        match self {
            Self::Union(members) => {
                names.insert("Union");
                for member in members {
                    member.collect_typing(names);
                }
            }
            Self::List(inner) => {
                names.insert("List");
                inner.collect_typing(names);
            }
            Self::Optional(inner) => {
                names.insert("Optional");
                inner.collect_typing(names);
            }
            Self::Primitive(_) | Self::Object(_) | Self::None => {}
        }
    }

    /// Component names the expression refers to.
    pub fn object_names(&self) -> BTreeSet<&str> {
        match self {
            Self::Object(name) => BTreeSet::from([name.as_str()]),
            Self::Union(members) => members.iter().flat_map(Self::object_names).collect(),
            Self::List(inner) | Self::Optional(inner) => inner.object_names(),
            Self::Primitive(_) | Self::None => BTreeSet::new(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Object(name) => write!(f, "{name}"),
            Self::None => write!(f, "None"),
            Self::Union(members) => {
                write!(f, "Union[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, "]")
            }
            Self::List(inner) => write!(f, "List[{inner}]"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
        }
    }
}

/// A default-value expression for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    /// Maps a reserved identifier back to its wire name, keeping the default
    /// the other rules would have chosen.
    Alias {
        wire: String,
        default: Option<Box<Initializer>>,
    },
    /// A constant literal.
    Literal(String),
    /// A fresh empty list per instance.
    EmptyList,
    /// The null literal.
    Null,
}

impl Initializer {
    /// True when rendering needs `pydantic.Field`.
    pub fn needs_field(&self) -> bool {
        matches!(self, Self::Alias { .. } | Self::EmptyList)
    }
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias { wire, default } => {
                let wire = string_literal(wire);
                match default.as_deref() {
                    None => write!(f, "Field(alias={wire})"),
                    Some(Self::EmptyList) => {
                        write!(f, "Field(default_factory=list, alias={wire})")
                    }
                    Some(other) => write!(f, "Field(default={other}, alias={wire})"),
                }
            }
            Self::Literal(value) => write!(f, "{}", string_literal(value)),
            Self::EmptyList => write!(f, "Field(default_factory=list)"),
            Self::Null => write!(f, "None"),
        }
    }
}

/// Renders `value` as a single-quoted string literal.
///
/// ## Examples
///
/// ```
/// use cleangram_schema::types::string_literal;
///
/// assert_eq!(string_literal("article"), "'article'");
/// assert_eq!(string_literal("it's"), r"'it\'s'");
/// ```
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Parses one argument-table row owned by `owner`.
///
/// ## Errors
///
/// - `SchemaError::StructuralAssumption` when the row has fewer than three
///   cells, an empty name, a list deeper than [`MAX_ARRAY_DEPTH`], or a type
///   cell that resolves to nothing.
/// - `SchemaError::UnresolvedReference` when a type link is not in `anchors`.
pub fn parse_row(
    row: &RawRow,
    owner: &str,
    anchors: &AnchorTable,
) -> Result<Argument, SchemaError> {
    let [name_cell, type_cell, flags @ .., description_cell] = row.cells.as_slice() else {
        return Err(SchemaError::structural(
            owner,
            format!("argument row has {} cells, expected at least 3", row.cells.len()),
        ));
    };

    let name = name_cell.content();
    if name.is_empty() {
        return Err(SchemaError::structural(owner, "argument row has an empty name"));
    }

    let type_text = type_cell.content();
    let array_depth = type_text.matches(ARRAY_MARKER).count();
    if array_depth > MAX_ARRAY_DEPTH as usize {
        return Err(SchemaError::structural(
            format!("{owner}.{name}"),
            format!("type '{type_text}' nests {array_depth} lists, at most {MAX_ARRAY_DEPTH} supported"),
        ));
    }

    let mut arg = Argument::new(&name, owner);
    arg.description = description_cell.content();
    arg.array_depth = array_depth as u8;
    arg.optional = flags
        .iter()
        .chain([description_cell])
        .any(|cell| cell.has_word(OPTIONAL_MARKER));
    arg.primitive_types = type_cell.unlinked_words().filter_map(primitive).collect();
    for href in type_cell.links() {
        let target = anchors.resolve(href, owner)?;
        arg.object_types.insert(target.to_string());
    }

    if arg.is_empty() {
        return Err(SchemaError::structural(
            format!("{owner}.{name}"),
            format!("type '{type_text}' resolves to no known type"),
        ));
    }

    if !arg.optional && description_cell.content().contains(FIXED_DEFAULT_MARKER) {
        arg.fixed_default = description_cell.emphasized().next().map(str::to_string);
    }

    Ok(arg)
}

/// Orders arguments for declaration: required, then optional, then those
/// carrying a fixed default. Relative document order is kept in each group.
pub fn sort_arguments(args: &mut [Argument]) {
    args.sort_by_key(|a| a.optional);
    args.sort_by_key(|a| a.fixed_default.is_some());
}

/// Builds the resolved annotation of an argument.
///
/// A union that may be absent gets a `None` member instead of an outer
/// `Optional`. Returns `None` for an empty argument.
pub fn compose_annotation(arg: &Argument) -> Option<Annotation> {
    let union = arg.is_union();
    let mut members: Vec<Annotation> = arg
        .primitive_types
        .iter()
        .copied()
        .map(Annotation::Primitive)
        .chain(arg.object_types.iter().cloned().map(Annotation::Object))
        .collect();

    let mut annotation = if union {
        if arg.optional {
            members.push(Annotation::None);
        }
        Annotation::Union(members)
    } else {
        members.into_iter().next()?
    };

    for _ in 0..arg.array_depth.min(MAX_ARRAY_DEPTH) {
        annotation = Annotation::List(Box::new(annotation));
    }

    if arg.optional && !union {
        annotation = Annotation::Optional(Box::new(annotation));
    }

    Some(annotation)
}

/// Picks the initializer of an argument.
///
/// Priority: wire alias, fixed literal, empty list for lists of objects,
/// null for optional fields, otherwise none (required).
pub fn select_initializer(arg: &Argument) -> Option<Initializer> {
    let default = if let Some(value) = &arg.fixed_default {
        Some(Initializer::Literal(value.clone()))
    } else if arg.array_depth > 0 && arg.is_object_typed() {
        Some(Initializer::EmptyList)
    } else if arg.optional {
        Some(Initializer::Null)
    } else {
        None
    };

    if is_reserved(&arg.name) {
        return Some(Initializer::Alias {
            wire: arg.name.clone(),
            default: default.map(Box::new),
        });
    }
    default
}

/// Splits a paragraph into sentences at ". " boundaries in plain text.
fn sentences(paragraph: &RawCell) -> Vec<RawCell> {
    let mut out = Vec::new();
    let mut current = RawCell::default();
    for inline in &paragraph.inlines {
        let Inline::Text(text) = inline else {
            current.inlines.push(inline.clone());
            continue;
        };
        let mut rest = text.as_str();
        while let Some(idx) = rest.find(". ") {
            current.inlines.push(Inline::Text(rest[..=idx].to_string()));
            out.push(std::mem::take(&mut current));
            rest = &rest[idx + 2..];
        }
        if !rest.is_empty() {
            current.inlines.push(Inline::Text(rest.to_string()));
        }
    }
    if !current.inlines.is_empty() {
        out.push(current);
    }
    out
}

/// Infers an operation's result from its description paragraphs.
///
/// Every sentence mentioning "return" contributes linked object components,
/// emphasized primitive words and its list depth. Links to anything other
/// than an object component are ignored. The result is never optional.
pub fn resolve_result(paragraphs: &[RawCell], owner: &str, anchors: &AnchorTable) -> Argument {
    let mut result = Argument::new("result", owner);
    for sentence in paragraphs.iter().flat_map(sentences) {
        let text = sentence.content();
        let lowered = text.to_lowercase();
        if !lowered.contains("return") {
            continue;
        }

        for href in sentence.links() {
            match anchors.get(href) {
                Some(name) if Category::of(name) == Category::Object => {
                    result.object_types.insert(name.to_string());
                }
                _ => debug!("{owner}: ignoring non-object link '{href}' in result sentence"),
            }
        }
        result
            .primitive_types
            .extend(sentence.emphasized().flat_map(words).filter_map(primitive));

        let depth = lowered.matches(&ARRAY_MARKER.to_lowercase()).count();
        result.array_depth = result
            .array_depth
            .max(depth.min(MAX_ARRAY_DEPTH as usize) as u8);
    }
    result
}

/// Renders an argument back into a raw type cell.
///
/// `anchor_of` maps a component name to its anchor. Parsing the result with
/// [`parse_row`] yields the same types and depth as `arg`.
pub fn to_raw_type(arg: &Argument, anchor_of: impl Fn(&str) -> Option<String>) -> RawCell {
    let mut cell = RawCell::plain(format!("{ARRAY_MARKER} ").repeat(arg.array_depth as usize));
    let mut first = true;
    for p in &arg.primitive_types {
        if !first {
            cell = cell.text(" or ");
        }
        cell = cell.text(source_name(*p));
        first = false;
    }
    for name in &arg.object_types {
        if !first {
            cell = cell.text(" or ");
        }
        cell = match anchor_of(name) {
            Some(anchor) => cell.link(name.as_str(), anchor),
            None => cell.text(name.as_str()),
        };
        first = false;
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anchors() -> AnchorTable {
        let mut table = AnchorTable::new();
        for name in ["PhotoSize", "Message", "User", "InputFile", "MessageEntity"] {
            table
                .insert(format!("#{}", name.to_lowercase()), name)
                .unwrap();
        }
        table.insert("#getme", "getMe").unwrap();
        table
    }

    fn row(cells: Vec<RawCell>) -> RawRow {
        RawRow::new(cells)
    }

    // =========================================================================
    // parse_row
    // =========================================================================

    #[test]
    fn chat_id_row_is_required_primitive_union() {
        let r = row(vec![
            RawCell::plain("chat_id"),
            RawCell::plain("Integer or String"),
            RawCell::plain("Yes"),
            RawCell::plain("Unique identifier"),
        ]);
        let arg = parse_row(&r, "sendMessage", &anchors()).unwrap();

        assert_eq!(arg.name, "chat_id");
        assert_eq!(
            arg.primitive_types,
            BTreeSet::from([Primitive::Int, Primitive::Str])
        );
        assert!(arg.object_types.is_empty());
        assert!(!arg.optional);
        assert!(arg.is_union());
        assert_eq!(arg.array_depth, 0);
        assert_eq!(arg.annotation().unwrap().to_string(), "Union[int, str]");
        assert_eq!(arg.initializer(), None);
    }

    #[test]
    fn photo_row_is_optional_list_of_objects() {
        let r = row(vec![
            RawCell::plain("photo"),
            RawCell::plain("Array of ").link("PhotoSize", "#photosize"),
            RawCell::plain("Optional"),
            RawCell::plain("Available sizes of the photo"),
        ]);
        let arg = parse_row(&r, "sendPhoto", &anchors()).unwrap();

        assert_eq!(arg.array_depth, 1);
        assert_eq!(arg.object_types, BTreeSet::from(["PhotoSize".to_string()]));
        assert!(arg.optional);
        assert_eq!(
            arg.annotation().unwrap().to_string(),
            "Optional[List[PhotoSize]]"
        );
        assert_eq!(arg.initializer(), Some(Initializer::EmptyList));
    }

    #[test]
    fn optional_marker_in_description_cell() {
        let r = row(vec![
            RawCell::plain("last_name"),
            RawCell::plain("String"),
            RawCell::default()
                .emphasis("Optional")
                .text(". User's or bot's last name"),
        ]);
        let arg = parse_row(&r, "User", &anchors()).unwrap();
        assert!(arg.optional);
        assert_eq!(arg.annotation().unwrap().to_string(), "Optional[str]");
        assert_eq!(arg.initializer(), Some(Initializer::Null));
    }

    #[test]
    fn optional_requires_whole_word() {
        let r = row(vec![
            RawCell::plain("text"),
            RawCell::plain("String"),
            RawCell::plain("Optionally formatted text"),
        ]);
        let arg = parse_row(&r, "Poll", &anchors()).unwrap();
        assert!(!arg.optional);
    }

    #[test]
    fn fixed_default_from_must_be_description() {
        let r = row(vec![
            RawCell::plain("type"),
            RawCell::plain("String"),
            RawCell::plain("Type of the result, must be ").emphasis("article"),
        ]);
        let arg = parse_row(&r, "InlineQueryResultArticle", &anchors()).unwrap();
        assert_eq!(arg.fixed_default.as_deref(), Some("article"));
        assert_eq!(arg.initializer().unwrap().to_string(), "'article'");
    }

    #[test]
    fn fixed_default_ignored_when_optional() {
        let r = row(vec![
            RawCell::plain("mode"),
            RawCell::plain("String"),
            RawCell::plain("Optional. If set, must be ").emphasis("fast"),
        ]);
        let arg = parse_row(&r, "Thing", &anchors()).unwrap();
        assert_eq!(arg.fixed_default, None);
    }

    #[test]
    fn nested_array_depth() {
        let r = row(vec![
            RawCell::plain("photos"),
            RawCell::plain("Array of Array of ").link("PhotoSize", "#photosize"),
            RawCell::plain("Requested profile pictures"),
        ]);
        let arg = parse_row(&r, "UserProfilePhotos", &anchors()).unwrap();
        assert_eq!(arg.array_depth, 2);
        assert_eq!(
            arg.annotation().unwrap().to_string(),
            "List[List[PhotoSize]]"
        );
        assert_eq!(arg.initializer(), Some(Initializer::EmptyList));
    }

    #[test]
    fn primitive_list_has_no_empty_list_default() {
        let r = row(vec![
            RawCell::plain("allowed_updates"),
            RawCell::plain("Array of String"),
            RawCell::plain("Optional"),
            RawCell::plain("List of update types"),
        ]);
        let arg = parse_row(&r, "getUpdates", &anchors()).unwrap();
        assert_eq!(arg.initializer(), Some(Initializer::Null));
    }

    #[test]
    fn mixed_union_of_object_and_primitive() {
        let r = row(vec![
            RawCell::plain("photo"),
            RawCell::default()
                .link("InputFile", "#inputfile")
                .text(" or String"),
            RawCell::plain("Optional"),
            RawCell::plain("Photo to send"),
        ]);
        let arg = parse_row(&r, "sendPhoto", &anchors()).unwrap();
        assert_eq!(
            arg.annotation().unwrap().to_string(),
            "Union[str, InputFile, None]"
        );
    }

    #[test]
    fn reserved_name_gets_alias_initializer() {
        let r = row(vec![
            RawCell::plain("from"),
            RawCell::default().link("User", "#user"),
            RawCell::plain("Optional. Sender"),
        ]);
        let arg = parse_row(&r, "Message", &anchors()).unwrap();
        assert_eq!(arg.identifier(), "from_");
        let init = arg.initializer().unwrap();
        assert!(init.needs_field());
        assert_eq!(init.to_string(), "Field(default=None, alias='from')");
    }

    #[test]
    fn required_reserved_name_alias_has_no_default() {
        let r = row(vec![
            RawCell::plain("from"),
            RawCell::default().link("User", "#user"),
            RawCell::plain("Sender"),
        ]);
        let arg = parse_row(&r, "CallbackQuery", &anchors()).unwrap();
        assert_eq!(arg.initializer().unwrap().to_string(), "Field(alias='from')");
    }

    #[test]
    fn short_row_is_structural_error() {
        let r = row(vec![RawCell::plain("a"), RawCell::plain("String")]);
        let err = parse_row(&r, "User", &anchors()).unwrap_err();
        assert!(matches!(err, SchemaError::StructuralAssumption { .. }));
    }

    #[test]
    fn unknown_type_is_structural_error() {
        let r = row(vec![
            RawCell::plain("blob"),
            RawCell::plain("Mystery"),
            RawCell::plain("Something"),
        ]);
        let err = parse_row(&r, "User", &anchors()).unwrap_err();
        assert!(matches!(err, SchemaError::StructuralAssumption { .. }));
    }

    #[test]
    fn unresolved_link_is_fatal() {
        let r = row(vec![
            RawCell::plain("story"),
            RawCell::default().link("Story", "#story"),
            RawCell::plain("Optional. Forwarded story"),
        ]);
        let err = parse_row(&r, "Message", &anchors()).unwrap_err();
        match err {
            SchemaError::UnresolvedReference { anchor, component } => {
                assert_eq!(anchor, "#story");
                assert_eq!(component, "Message");
            }
            other => panic!("Expected UnresolvedReference, got {:?}", other),
        }
    }

    #[test]
    fn primitive_words_inside_links_are_ignored() {
        let mut table = anchors();
        table.insert("#string", "String").unwrap();
        let r = row(vec![
            RawCell::plain("value"),
            RawCell::default().link("String", "#string"),
            RawCell::plain("Value"),
        ]);
        let arg = parse_row(&r, "Thing", &table).unwrap();
        assert!(arg.primitive_types.is_empty());
        assert_eq!(arg.object_types.len(), 1);
    }

    // =========================================================================
    // sort_arguments
    // =========================================================================

    fn flagged(name: &str, optional: bool, fixed: bool) -> Argument {
        let mut arg = Argument::new(name, "Owner");
        arg.optional = optional;
        arg.fixed_default = fixed.then(|| "x".to_string());
        arg
    }

    #[test]
    fn sort_groups_required_optional_fixed() {
        let mut args = vec![
            flagged("type", false, true),
            flagged("a", true, false),
            flagged("b", false, false),
            flagged("c", true, false),
            flagged("d", false, false),
        ];
        sort_arguments(&mut args);
        let names: Vec<_> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["b", "d", "a", "c", "type"]);
    }

    // =========================================================================
    // resolve_result
    // =========================================================================

    #[test]
    fn result_from_returns_sentence() {
        let p = RawCell::plain("A simple method for testing. Returns basic information about the bot in form of a ")
            .link("User", "#user")
            .text(" object.");
        let result = resolve_result(&[p], "getMe", &anchors());
        assert_eq!(result.object_types, BTreeSet::from(["User".to_string()]));
        assert!(!result.optional);
        assert_eq!(result.annotation().unwrap().to_string(), "User");
    }

    #[test]
    fn result_union_of_object_and_true() {
        let p = RawCell::plain("On success, if the message is not an inline message, the edited ")
            .link("Message", "#message")
            .text(" is returned, otherwise ")
            .emphasis("True")
            .text(" is returned.");
        let result = resolve_result(&[p], "editMessageText", &anchors());
        assert_eq!(
            result.annotation().unwrap().to_string(),
            "Union[bool, Message]"
        );
    }

    #[test]
    fn result_array_is_case_insensitive() {
        let p = RawCell::plain("On success, an array of ")
            .link("Messages", "#message")
            .text(" that were sent is returned.");
        let result = resolve_result(&[p], "sendMediaGroup", &anchors());
        assert_eq!(result.array_depth, 1);
        assert_eq!(result.annotation().unwrap().to_string(), "List[Message]");
    }

    #[test]
    fn result_ignores_sentences_without_return_and_non_objects() {
        let p = RawCell::plain("Use this method to send text messages. See also ")
            .link("getMe", "#getme")
            .text(". On success, the sent ")
            .link("Message", "#message")
            .text(" is returned; see ")
            .link("formatting options", "#formatting-options")
            .text(".");
        let result = resolve_result(&[p], "sendMessage", &anchors());
        assert_eq!(result.object_types, BTreeSet::from(["Message".to_string()]));
        assert!(result.primitive_types.is_empty());
    }

    #[test]
    fn result_without_returns_is_empty() {
        let p = RawCell::plain("This object represents a chat.");
        let result = resolve_result(&[p], "Chat", &anchors());
        assert!(result.is_empty());
        assert_eq!(result.annotation(), None);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn arb_argument() -> impl Strategy<Value = Argument> {
        (
            prop::collection::btree_set(
                prop::sample::select(vec![
                    Primitive::Int,
                    Primitive::Float,
                    Primitive::Str,
                    Primitive::Bool,
                ]),
                0..3,
            ),
            prop::collection::btree_set(
                prop::sample::select(vec!["PhotoSize", "Message", "User"]),
                0..3,
            ),
            0u8..=2,
            any::<bool>(),
        )
            .prop_filter("at least one type", |(p, o, _, _)| !p.is_empty() || !o.is_empty())
            .prop_map(|(primitives, objects, depth, optional)| {
                let mut arg = Argument::new("field", "Owner");
                arg.primitive_types = primitives;
                arg.object_types = objects.into_iter().map(str::to_string).collect();
                arg.array_depth = depth;
                arg.optional = optional;
                arg
            })
    }

    proptest! {
        #[test]
        fn prop_composition_is_idempotent(arg in arb_argument()) {
            let description = if arg.optional { "Optional. Field" } else { "Field" };
            let raw = row(vec![
                RawCell::plain(arg.name.clone()),
                to_raw_type(&arg, |name| Some(format!("#{}", name.to_lowercase()))),
                RawCell::plain(description),
            ]);
            let reparsed = parse_row(&raw, "Owner", &anchors()).unwrap();
            prop_assert_eq!(compose_annotation(&arg), compose_annotation(&reparsed));
        }

        #[test]
        fn prop_optional_union_has_none_member_and_no_wrapper(arg in arb_argument()) {
            if arg.is_union() && arg.optional {
                let annotation = compose_annotation(&arg).unwrap();
                prop_assert!(!matches!(annotation, Annotation::Optional(_)));
                let mut inner = &annotation;
                while let Annotation::List(next) = inner {
                    inner = next;
                }
                match inner {
                    Annotation::Union(members) => prop_assert!(members.contains(&Annotation::None)),
                    other => prop_assert!(false, "expected union, got {}", other),
                }
            }
        }

        #[test]
        fn prop_sort_respects_groups_and_is_stable(
            flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..12)
        ) {
            let mut args: Vec<Argument> = flags
                .iter()
                .enumerate()
                .map(|(i, (optional, fixed))| flagged(&format!("a{i}"), *optional, *fixed))
                .collect();
            sort_arguments(&mut args);

            let rank = |a: &Argument| (a.fixed_default.is_some(), a.optional);
            for pair in args.windows(2) {
                prop_assert!(rank(&pair[0]) <= rank(&pair[1]));
                if rank(&pair[0]) == rank(&pair[1]) {
                    let index = |a: &Argument| a.name[1..].parse::<usize>().unwrap();
                    prop_assert!(index(&pair[0]) < index(&pair[1]));
                }
            }
        }

        #[test]
        fn prop_category_is_total(name in "\\PC*") {
            let expected = name.chars().next().is_some_and(char::is_uppercase);
            prop_assert_eq!(Category::of(&name) == Category::Object, expected);
        }
    }
}
