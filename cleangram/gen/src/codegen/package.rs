//! Package-level artifacts: version, sentinel base classes and `__init__`
//! re-exports.

use std::collections::BTreeSet;

use cleangram_schema::types::string_literal;
use cleangram_schema::{Api, Category, Component, Sentinels};
use strum::IntoEnumIterator;

use super::docs::DocWriter;
use super::imports::{ImportSet, ReferenceGraph, from_import};
use super::sections::{Section, SourceBuilder};
use crate::config::GeneratorConfig;
use crate::variant::PackageVariant;

/// `_version.py`: package version from metadata and the Bot API version.
pub fn render_version(api: &Api, config: &GeneratorConfig) -> String {
    let mut source = SourceBuilder::new();
    source.import("import importlib.metadata");
    source.declaration(format!(
        "__version__ = importlib.metadata.version({})",
        string_literal(&config.package)
    ));
    source.declaration(format!("__bot_api__ = {}", string_literal(&api.version)));
    source.build()
}

/// `core/base.py`: the two sentinel classes.
pub fn render_base(api: &Api, config: &GeneratorConfig) -> String {
    let docs = DocWriter::new(config.wrap_column);
    let sentinels = api.sentinels();
    let object = sentinels.object();
    let path = sentinels.path();

    let mut imports = ImportSet::new();
    imports
        .typing("Generic")
        .typing("TypeVar")
        .third_party("pydantic", "BaseModel");

    let mut source = SourceBuilder::new();
    source.extend(Section::Imports, imports.lines(config.wrap_column));
    source.declaration("T = TypeVar('T')");
    source.declaration("");
    source.declaration("");
    source.declaration(format!("class {}(BaseModel):", object.name));
    source.extend(
        Section::Declaration,
        docs.class_docstring("    ", &object.description, &[], &config.doc_url),
    );
    source.declaration("");
    source.declaration("    class Config:");
    source.declaration("        allow_population_by_field_name = True");
    source.declaration("");
    source.declaration("");
    source.declaration(format!(
        "class {}({}, Generic[T]):",
        path.name, object.name
    ));
    source.extend(
        Section::Declaration,
        docs.class_docstring("    ", &path.description, &[], &config.doc_url),
    );
    source.field("    __method__: str");
    source.build()
}

/// True when the class has annotations that only resolve after every module
/// of its package is imported: a deferred import or a self reference.
pub fn needs_refresh(component: &Component, graph: &ReferenceGraph) -> bool {
    component
        .args
        .iter()
        .flat_map(|arg| arg.object_types.iter())
        .any(|target| *target == component.name || graph.is_deferred(&component.name, target))
}

/// `<variant>/<category>/__init__.py`: re-exports every class of the
/// package and resolves postponed annotations.
pub fn render_category_init(
    api: &Api,
    graph: &ReferenceGraph,
    config: &GeneratorConfig,
    category: Category,
) -> String {
    let mut components: Vec<&Component> = api.of_category(category).collect();
    components.sort_by_key(|c| c.module_name());

    let mut source = SourceBuilder::new();
    for component in &components {
        let names: BTreeSet<String> = [component.display_name()].into_iter().collect();
        source.extend(
            Section::Imports,
            from_import(
                &format!(".{}", component.module_name()),
                &names,
                "",
                config.wrap_column,
            ),
        );
    }

    let mut exported: Vec<String> = components.iter().map(|c| c.display_name()).collect();
    exported.sort();
    source.extend(Section::Declaration, all_tuple(&exported));

    let refresh: Vec<String> = components
        .iter()
        .filter(|c| needs_refresh(c, graph))
        .map(|c| format!("{}.update_forward_refs(**globals())", c.display_name()))
        .collect();
    source.extend(Section::Fields, refresh);
    source.build()
}

/// `<variant>/__init__.py`: re-exports both categories (and, in core, the
/// sentinels).
pub fn render_variant_init(api: &Api, config: &GeneratorConfig, variant: PackageVariant) -> String {
    let mut source = SourceBuilder::new();
    let mut exported: Vec<String> = Vec::new();

    if variant == PackageVariant::Core {
        let sentinels: BTreeSet<String> = [Sentinels::OBJECT_NAME, Sentinels::PATH_NAME]
            .iter()
            .map(|s| s.to_string())
            .collect();
        source.extend(
            Section::Imports,
            from_import(".base", &sentinels, "", config.wrap_column),
        );
        exported.extend(sentinels);
    }

    for category in Category::iter() {
        let names: BTreeSet<String> =
            api.of_category(category).map(|c| c.display_name()).collect();
        source.extend(
            Section::Imports,
            from_import(&format!(".{category}"), &names, "", config.wrap_column),
        );
        exported.extend(names);
    }

    exported.sort();
    source.extend(Section::Declaration, all_tuple(&exported));
    source.build()
}

fn all_tuple(names: &[String]) -> Vec<String> {
    let mut lines = vec!["__all__ = (".to_string()];
    lines.extend(names.iter().map(|name| format!("    {},", string_literal(name))));
    lines.push(")".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleangram_schema::{AnchorTable, Argument, Header};

    fn object(name: &str, refs: &[&str]) -> Component {
        let mut component = Component::new(name, format!("#{}", name.to_lowercase()));
        for target in refs {
            let mut arg = Argument::new(target.to_lowercase(), name);
            arg.object_types.insert(target.to_string());
            component.args.push(arg);
        }
        component
    }

    fn api() -> Api {
        let components = vec![
            object("Message", &["Chat", "Message"]),
            object("Chat", &["Message"]),
            object("User", &[]),
            Component::new("getMe", "#getme"),
        ];
        let mut anchors = AnchorTable::new();
        for c in &components {
            anchors.insert(c.anchor.clone(), c.name.clone()).unwrap();
        }
        let mut header = Header::new("Available types", "#available-types");
        header.components = components;
        Api::new("7.1", vec![header], anchors, Sentinels::new())
    }

    #[test]
    fn version_records_bot_api() {
        let text = render_version(&api(), &GeneratorConfig::default());
        assert_eq!(
            text,
            "import importlib.metadata\n\n\n\
             __version__ = importlib.metadata.version('cleangram')\n\
             __bot_api__ = '7.1'\n"
        );
    }

    #[test]
    fn base_declares_both_sentinels() {
        let text = render_base(&api(), &GeneratorConfig::default());
        assert!(text.contains("from typing import Generic, TypeVar\n"));
        assert!(text.contains("from pydantic import BaseModel\n"));
        assert!(text.contains("class TelegramObject(BaseModel):\n"));
        assert!(text.contains("class TelegramPath(TelegramObject, Generic[T]):\n"));
        assert!(text.contains("    Base class for every object of the Bot API.\n"));
    }

    #[test]
    fn refresh_covers_deferred_and_self_references() {
        let api = api();
        let graph = ReferenceGraph::new(&api);
        let needs = |name: &str| needs_refresh(api.component(name).unwrap(), &graph);
        assert!(needs("Chat"));
        assert!(needs("Message"));
        assert!(!needs("User"));
    }

    #[test]
    fn category_init_reexports_sorted_modules() {
        let api = api();
        let graph = ReferenceGraph::new(&api);
        let text = render_category_init(&api, &graph, &GeneratorConfig::default(), Category::Object);
        assert!(text.starts_with(
            "from .chat import Chat\nfrom .message import Message\nfrom .user import User\n"
        ));
        assert!(text.contains("__all__ = (\n    'Chat',\n    'Message',\n    'User',\n)\n"));
        assert!(text.contains("Chat.update_forward_refs(**globals())\n"));
        assert!(text.contains("Message.update_forward_refs(**globals())\n"));
        assert!(!text.contains("User.update_forward_refs"));
    }

    #[test]
    fn core_init_exports_sentinels() {
        let text = render_variant_init(&api(), &GeneratorConfig::default(), PackageVariant::Core);
        assert!(text.contains("from .base import TelegramObject, TelegramPath\n"));
        assert!(text.contains("from .object import Chat, Message, User\n"));
        assert!(text.contains("from .path import GetMe\n"));
        assert!(text.contains("    'TelegramPath',\n"));
    }

    #[test]
    fn concrete_init_has_no_sentinels() {
        let text = render_variant_init(&api(), &GeneratorConfig::default(), PackageVariant::Aio);
        assert!(!text.contains(".base"));
        assert!(text.contains("    'GetMe',\n"));
    }
}
