//! The in-memory schema: [`Api`] -> [`Header`] -> [`Component`] -> [`Argument`].
//!
//! Ownership is strictly top-down. Cross-references between components
//! (argument types, result types, subclasses) are stored as component
//! names and resolved through [`Api::component`], because the reference
//! graph is cyclic (`Message.reply_to_message` is itself a `Message`).
//!
//! The two parents every component derives from live in [`Sentinels`], built
//! once before extraction and shared by `Arc` handle.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use strum::{Display, EnumIter};

use crate::errors::SchemaError;
use crate::names::{alias, is_reserved, snake, upper_first};
use crate::types::{Annotation, Initializer, compose_annotation, select_initializer};

/// OBJECT vs PATH classification, derived from name casing alone.
///
/// ## Examples
///
/// ```
/// use cleangram_schema::Category;
///
/// assert_eq!(Category::of("Message"), Category::Object);
/// assert_eq!(Category::of("sendMessage"), Category::Path);
/// assert_eq!(Category::Object.to_string(), "object");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// A data-object type (`User`, `PhotoSize`).
    Object,
    /// A callable operation (`getMe`, `sendMessage`).
    Path,
}

impl Category {
    /// Classifies a component name: uppercase first character means object.
    pub fn of(name: &str) -> Self {
        if name.chars().next().is_some_and(char::is_uppercase) {
            Self::Object
        } else {
            Self::Path
        }
    }
}

/// Scalar types of the target language.
///
/// Declaration order is the order members appear in a rendered union.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "float")]
    Float,
    #[strum(serialize = "str")]
    Str,
    #[strum(serialize = "bool")]
    Bool,
}

/// One field of a component, or the shape of an operation's result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Argument {
    /// Wire name, verbatim from the first table cell.
    pub name: String,
    /// Description text (whitespace-normalized).
    pub description: String,
    /// 0 = scalar, 1 = list, 2 = list of lists.
    pub array_depth: u8,
    /// Whether the field may be absent.
    pub optional: bool,
    /// Constant value the field always carries, if any.
    pub fixed_default: Option<String>,
    /// Name of the component this argument belongs to.
    pub owner: String,
    /// Resolved scalar types.
    pub primitive_types: BTreeSet<Primitive>,
    /// Names of referenced components.
    pub object_types: BTreeSet<String>,
}

impl Argument {
    /// Creates an empty argument with the given wire name and owner.
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    /// True when more than one type was resolved.
    pub fn is_union(&self) -> bool {
        self.primitive_types.len() + self.object_types.len() > 1
    }

    /// True when no type was resolved; an empty argument stands for "absent".
    pub fn is_empty(&self) -> bool {
        self.primitive_types.is_empty() && self.object_types.is_empty()
    }

    /// True when every resolved type is an object component.
    pub fn is_object_typed(&self) -> bool {
        self.primitive_types.is_empty()
            && !self.object_types.is_empty()
            && self
                .object_types
                .iter()
                .all(|name| Category::of(name) == Category::Object)
    }

    /// Identifier used in generated code.
    pub fn identifier(&self) -> String {
        alias(&self.name)
    }

    /// True when the identifier differs from the wire name.
    pub fn needs_wire_alias(&self) -> bool {
        is_reserved(&self.name)
    }

    /// Resolved type annotation; `None` for an empty argument.
    pub fn annotation(&self) -> Option<Annotation> {
        compose_annotation(self)
    }

    /// Default-value expression; `None` means the field is required.
    pub fn initializer(&self) -> Option<Initializer> {
        select_initializer(self)
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Argument {}

impl Hash for Argument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A data-object type or a callable operation.
///
/// Identity is the name; two components with the same name are equal even if
/// their contents differ.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Component {
    /// Unique name (`PhotoSize`, `getMe`).
    pub name: String,
    /// Document fragment identifier, including the leading `#`.
    pub anchor: String,
    /// Fields in declaration order (see [`crate::types::sort_arguments`]).
    pub args: Vec<Argument>,
    /// Return shape for operations; empty for objects.
    pub result: Argument,
    /// The sentinel this component derives from; `None` only for sentinels.
    #[serde(serialize_with = "serialize_parent")]
    pub parent: Option<Arc<Component>>,
    /// Description paragraphs.
    pub description: Vec<String>,
    /// Names of components that specialize this one.
    pub subclasses: Vec<String>,
    /// True if any argument needs a wire-name alias. The renderer imports the
    /// aliasing helper from it.
    pub has_field: bool,
    /// Module name override; the snake-cased name is used otherwise.
    pub module: Option<String>,
}

fn serialize_parent<S: Serializer>(
    parent: &Option<Arc<Component>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match parent {
        Some(parent) => serializer.serialize_some(parent.name.as_str()),
        None => serializer.serialize_none(),
    }
}

impl Component {
    /// Creates a component with no arguments.
    pub fn new(name: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: anchor.into(),
            ..Default::default()
        }
    }

    pub fn category(&self) -> Category {
        Category::of(&self.name)
    }

    pub fn is_object(&self) -> bool {
        self.category() == Category::Object
    }

    pub fn is_path(&self) -> bool {
        self.category() == Category::Path
    }

    /// Module the component is rendered into.
    pub fn module_name(&self) -> String {
        self.module.clone().unwrap_or_else(|| snake(&self.name))
    }

    /// Class name in generated code.
    pub fn display_name(&self) -> String {
        upper_first(&self.name)
    }

    /// Name of the parent sentinel, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref().map(|p| p.name.as_str())
    }

    /// Components referenced by the arguments, excluding this component.
    pub fn args_objects(&self) -> BTreeSet<&str> {
        self.args
            .iter()
            .flat_map(|a| a.object_types.iter())
            .map(String::as_str)
            .filter(|name| *name != self.name)
            .collect()
    }

    /// Components referenced by the result.
    pub fn result_objects(&self) -> BTreeSet<&str> {
        self.result.object_types.iter().map(String::as_str).collect()
    }

    /// Everything the component's module has to import.
    pub fn used_objects(&self) -> BTreeSet<&str> {
        let mut used = self.args_objects();
        used.extend(self.result_objects());
        used.remove(self.name.as_str());
        used
    }

    /// Recomputes [`Component::has_field`] from the arguments.
    pub fn refresh_has_field(&mut self) {
        self.has_field = self.args.iter().any(Argument::needs_wire_alias);
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// The two fixed base components.
///
/// Constructed once before extraction and handed to the extractor; every
/// extracted component holds an `Arc` to one of them.
#[derive(Debug, Clone)]
pub struct Sentinels {
    object: Arc<Component>,
    path: Arc<Component>,
}

impl Sentinels {
    pub const OBJECT_NAME: &'static str = "TelegramObject";
    pub const PATH_NAME: &'static str = "TelegramPath";

    pub fn new() -> Self {
        let mut object = Component::new(Self::OBJECT_NAME, "");
        object.description = vec!["Base class for every object of the Bot API.".to_string()];

        let mut path = Component::new(Self::PATH_NAME, "");
        path.description = vec![
            "Base class for every method of the Bot API. The type parameter is the result \
             the method returns on success."
                .to_string(),
        ];

        Self {
            object: Arc::new(object),
            path: Arc::new(path),
        }
    }

    /// Base of every object-category component.
    pub fn object(&self) -> &Arc<Component> {
        &self.object
    }

    /// Base of every path-category component.
    pub fn path(&self) -> &Arc<Component> {
        &self.path
    }

    /// Picks the sentinel for a component name, by casing alone.
    pub fn parent_for(&self, name: &str) -> Arc<Component> {
        match Category::of(name) {
            Category::Object => Arc::clone(&self.object),
            Category::Path => Arc::clone(&self.path),
        }
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Self::new()
    }
}

/// Global anchor -> component name lookup.
///
/// Must be fully populated before any argument is parsed, since arguments
/// may reference components that appear later in the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchorTable {
    entries: BTreeMap<String, String>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an anchor. Anchors are unique in a well-formed document.
    ///
    /// ## Errors
    ///
    /// Returns `SchemaError::StructuralAssumption` when the anchor is already
    /// registered.
    pub fn insert(
        &mut self,
        anchor: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), SchemaError> {
        let anchor = anchor.into();
        let name = name.into();
        if let Some(existing) = self.entries.get(&anchor) {
            return Err(SchemaError::structural(
                name,
                format!("anchor '{anchor}' is already used by '{existing}'"),
            ));
        }
        self.entries.insert(anchor, name);
        Ok(())
    }

    pub fn get(&self, anchor: &str) -> Option<&str> {
        self.entries.get(anchor).map(String::as_str)
    }

    /// Resolves a link found while parsing `component`.
    ///
    /// ## Errors
    ///
    /// Returns `SchemaError::UnresolvedReference` when the anchor is unknown.
    pub fn resolve(&self, anchor: &str, component: &str) -> Result<&str, SchemaError> {
        self.get(anchor)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                anchor: anchor.to_string(),
                component: component.to_string(),
            })
    }

    pub fn contains(&self, anchor: &str) -> bool {
        self.entries.contains_key(anchor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, n)| (a.as_str(), n.as_str()))
    }
}

/// A named section of the document grouping related components.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub name: String,
    pub anchor: String,
    pub components: Vec<Component>,
}

impl Header {
    pub fn new(name: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: anchor.into(),
            components: Vec::new(),
        }
    }
}

/// Root of the schema: one per generation run, identified by its version.
#[derive(Debug, Clone, Serialize)]
pub struct Api {
    pub version: String,
    pub headers: Vec<Header>,
    anchors: AnchorTable,
    #[serde(skip)]
    sentinels: Sentinels,
    #[serde(skip)]
    index: BTreeMap<String, (usize, usize)>,
}

impl Api {
    /// Assembles the root entity and its name index.
    pub fn new(
        version: impl Into<String>,
        headers: Vec<Header>,
        anchors: AnchorTable,
        sentinels: Sentinels,
    ) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .flat_map(|(h, header)| {
                header
                    .components
                    .iter()
                    .enumerate()
                    .map(move |(c, component)| (component.name.clone(), (h, c)))
            })
            .collect();

        Self {
            version: version.into(),
            headers,
            anchors,
            sentinels,
            index,
        }
    }

    /// Looks a component up by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        let (h, c) = self.index.get(name)?;
        self.headers.get(*h)?.components.get(*c)
    }

    /// Looks a component up by anchor.
    pub fn by_anchor(&self, anchor: &str) -> Option<&Component> {
        self.component(self.anchors.get(anchor)?)
    }

    /// All components in document order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.headers.iter().flat_map(|h| h.components.iter())
    }

    /// All components of one category in document order.
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &Component> {
        self.components().filter(move |c| c.category() == category)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Component> {
        self.of_category(Category::Object)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Component> {
        self.of_category(Category::Path)
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }
}

impl PartialEq for Api {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for Api {}

impl Hash for Api {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
    }
}
