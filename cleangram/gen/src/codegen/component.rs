//! Renders one component into one module of one package variant.
//!
//! ## Output Shape
//!
//! ```text
//! from __future__ import annotations          imports
//! ...
//!
//!
//! class SendMessage(TelegramPath[Message]):   declaration
//!     """..."""
//!
//!     __method__ = 'sendMessage'              fields
//!     chat_id: Union[int, str]
//!     """Unique identifier for the target chat"""
//!
//!     @abc.abstractmethod                     methods
//!     def __call__(self, bot) -> Message:
//!         ...
//! ```
//!
//! Concrete variants subclass the core class, re-annotate only the fields
//! that reference objects (so they point at the variant's own classes) and
//! implement `__call__` for operations.

use cleangram_schema::names::snake;
use cleangram_schema::types::string_literal;
use cleangram_schema::{Annotation, Api, Argument, Category, Component, Initializer, Sentinels};
use tracing::{debug, warn};

use super::docs::DocWriter;
use super::imports::{ImportSet, ReferenceGraph};
use super::sections::{Section, SourceBuilder};
use crate::config::GeneratorConfig;
use crate::variant::PackageVariant;

const INDENT: &str = "    ";

/// Alias the core module is imported under in concrete variants.
const CORE_ALIAS: &str = "_core";

/// Hand-written client module at the package root, as seen from
/// `<variant>/<category>/<module>.py`.
const BOT_MODULE: &str = "...bot";

/// Renders components for one package variant.
///
/// Holds only read-only borrows, so renders of different components share
/// no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRenderer<'a> {
    api: &'a Api,
    graph: &'a ReferenceGraph,
    config: &'a GeneratorConfig,
    variant: PackageVariant,
}

impl<'a> ComponentRenderer<'a> {
    pub fn new(
        api: &'a Api,
        graph: &'a ReferenceGraph,
        config: &'a GeneratorConfig,
        variant: PackageVariant,
    ) -> Self {
        Self {
            api,
            graph,
            config,
            variant,
        }
    }

    /// Renders the module text of `component`.
    pub fn render(&self, component: &Component) -> String {
        debug!(
            "Rendering {}/{}/{}",
            self.variant,
            component.category(),
            component.module_name()
        );

        let docs = DocWriter::new(self.config.wrap_column);
        let mut imports = ImportSet::new();
        let mut source = SourceBuilder::new();

        let result = self.result_annotation(component);
        let parent = self.parent(component, result.as_ref(), &mut imports);

        source.declaration(format!("class {}({}):", component.display_name(), parent));
        source.extend(
            Section::Declaration,
            docs.class_docstring(
                INDENT,
                &component.description,
                &component.subclasses,
                &self.config.doc_link(&component.anchor),
            ),
        );

        if component.is_path() && !self.variant.is_concrete() {
            source.field(format!(
                "{INDENT}__method__ = {}",
                string_literal(&component.name)
            ));
        }

        if component.has_field && self.fields(component).any(Argument::needs_wire_alias) {
            imports.third_party("pydantic", "Field");
        }

        for arg in self.fields(component) {
            let Some(annotation) = arg.annotation() else {
                continue;
            };
            self.use_annotation(component, &annotation, &mut imports);

            let mut line = format!("{INDENT}{}: {}", arg.identifier(), annotation);
            if let Some(initializer) = arg.initializer() {
                // aliases are covered by `has_field` above
                if initializer == Initializer::EmptyList {
                    imports.third_party("pydantic", "Field");
                }
                line.push_str(&format!(" = {initializer}"));
            }
            source.field(line);
            for doc_line in docs.field_docstring(INDENT, &arg.description) {
                source.field(doc_line);
            }
        }

        if component.is_path() {
            let returns = self.result_text(component, result.as_ref(), &mut imports);
            self.call_method(&returns, &mut imports, &mut source);
        }

        source.extend(
            Section::Imports,
            imports.lines(self.config.wrap_column),
        );
        source.build()
    }

    /// Arguments emitted as fields: all of them in core, only the
    /// object-referencing ones in concrete variants.
    fn fields<'c>(&self, component: &'c Component) -> impl Iterator<Item = &'c Argument> {
        let concrete = self.variant.is_concrete();
        component
            .args
            .iter()
            .filter(move |arg| !concrete || !arg.object_types.is_empty())
    }

    fn result_annotation(&self, component: &Component) -> Option<Annotation> {
        if !component.is_path() {
            return None;
        }
        let annotation = component.result.annotation();
        if annotation.is_none() && self.variant == PackageVariant::Core {
            warn!("{}: no result type detected, using Any", component.name);
        }
        annotation
    }

    /// Text of the result annotation, importing what it references.
    fn result_text(
        &self,
        component: &Component,
        result: Option<&Annotation>,
        imports: &mut ImportSet,
    ) -> String {
        match result {
            Some(annotation) => {
                self.use_annotation(component, annotation, imports);
                annotation.to_string()
            }
            None => {
                imports.typing("Any");
                "Any".to_string()
            }
        }
    }

    /// Base class expression, importing what it needs.
    fn parent(
        &self,
        component: &Component,
        result: Option<&Annotation>,
        imports: &mut ImportSet,
    ) -> String {
        if self.variant.is_concrete() {
            let core_package = format!("...core.{}", component.category());
            imports.local(
                &core_package,
                &format!("{} as {CORE_ALIAS}", component.module_name()),
            );
            return format!("{CORE_ALIAS}.{}", component.display_name());
        }

        match component.category() {
            Category::Object => {
                imports.local("..base", Sentinels::OBJECT_NAME);
                Sentinels::OBJECT_NAME.to_string()
            }
            Category::Path => {
                imports.local("..base", Sentinels::PATH_NAME);
                let result = self.result_text(component, result, imports);
                format!("{}[{}]", Sentinels::PATH_NAME, result)
            }
        }
    }

    fn call_method(&self, returns: &str, imports: &mut ImportSet, source: &mut SourceBuilder) {
        let prefix = self.variant.call_prefix();
        if self.variant.is_concrete() {
            imports.deferred(BOT_MODULE, "Bot");
            source.method(format!(
                "{INDENT}{prefix} __call__(self, bot: Bot) -> {returns}:"
            ));
            source.method(format!(
                "{INDENT}{INDENT}return {}",
                self.variant.call_expression()
            ));
        } else {
            imports.module("abc");
            source.method(format!("{INDENT}@abc.abstractmethod"));
            source.method(format!("{INDENT}{prefix} __call__(self, bot) -> {returns}:"));
            source.method(format!("{INDENT}{INDENT}..."));
        }
    }

    /// Records the `typing` names and component imports an annotation needs.
    fn use_annotation(&self, component: &Component, annotation: &Annotation, imports: &mut ImportSet) {
        for name in annotation.typing_names() {
            imports.typing(name);
        }
        for target in annotation.object_names() {
            if target == component.name {
                continue;
            }
            let module = self.object_module(component, target);
            if self.graph.is_deferred(&component.name, target) {
                imports.deferred(&module, target);
            } else {
                imports.local(&module, target);
            }
        }
    }

    /// Relative module of object `target` as seen from `component`'s module.
    fn object_module(&self, component: &Component, target: &str) -> String {
        let module = self
            .api
            .component(target)
            .map(Component::module_name)
            .unwrap_or_else(|| snake(target));
        match component.category() {
            Category::Object => format!(".{module}"),
            Category::Path => format!("..{}.{module}", Category::Object),
        }
    }
}
