//! Import collection and cycle-safe import placement.
//!
//! Object components reference each other freely (`Message.chat` is a
//! `Chat`, `Chat.pinned_message` is a `Message`). Importing both sides at
//! runtime would create an import cycle, so [`ReferenceGraph`] decides which
//! side of every cycle is moved into an `if TYPE_CHECKING:` block.
//!
//! The rule: an edge `A -> B` between two distinct objects is deferred when
//! `B` can reach `A` again and `B` sorts after `A`. Inside every strongly
//! connected group, runtime imports therefore only point from larger to
//! smaller names, which cannot form a cycle.

use std::collections::{BTreeMap, BTreeSet};

use cleangram_schema::{Api, Category};

/// Imports of one generated module, grouped the way `isort` groups them.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    modules: BTreeSet<String>,
    stdlib: BTreeMap<String, BTreeSet<String>>,
    third_party: BTreeMap<String, BTreeSet<String>>,
    local: BTreeMap<String, BTreeSet<String>>,
    deferred: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `import <module>`
    pub fn module(&mut self, module: &str) -> &mut Self {
        self.modules.insert(module.to_string());
        self
    }

    /// `from typing import <name>`
    pub fn typing(&mut self, name: &str) -> &mut Self {
        self.stdlib
            .entry("typing".to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// `from <module> import <name>` for an installed dependency.
    pub fn third_party(&mut self, module: &str, name: &str) -> &mut Self {
        self.third_party
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// `from <module> import <name>` for a module of the generated package.
    pub fn local(&mut self, module: &str, name: &str) -> &mut Self {
        self.local
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// Like [`ImportSet::local`], but only evaluated by type checkers.
    pub fn deferred(&mut self, module: &str, name: &str) -> &mut Self {
        self.deferred
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// True when some name is imported under `TYPE_CHECKING` only.
    pub fn has_deferred(&self) -> bool {
        self.deferred
            .iter()
            .any(|(module, names)| names.iter().any(|n| !self.is_local(module, n)))
    }

    fn is_local(&self, module: &str, name: &str) -> bool {
        self.local.get(module).is_some_and(|names| names.contains(name))
    }

    /// Renders the import block, wrapping long `from` lines at `width`.
    pub fn lines(&self, width: usize) -> Vec<String> {
        let mut stdlib = self.stdlib.clone();
        if self.has_deferred() {
            stdlib
                .entry("typing".to_string())
                .or_default()
                .insert("TYPE_CHECKING".to_string());
        }

        let mut groups: Vec<Vec<String>> = vec![vec![
            "from __future__ import annotations".to_string(),
        ]];

        let mut std_group: Vec<String> = self.modules.iter().map(|m| format!("import {m}")).collect();
        for (module, names) in &stdlib {
            std_group.extend(from_import(module, names, "", width));
        }
        groups.push(std_group);

        let mut third: Vec<String> = Vec::new();
        for (module, names) in &self.third_party {
            third.extend(from_import(module, names, "", width));
        }
        groups.push(third);

        let mut local: Vec<String> = Vec::new();
        for (module, names) in &self.local {
            local.extend(from_import(module, names, "", width));
        }
        groups.push(local);

        let mut checking: Vec<String> = Vec::new();
        for (module, names) in &self.deferred {
            let names: BTreeSet<String> = names
                .iter()
                .filter(|n| !self.is_local(module, n))
                .cloned()
                .collect();
            if !names.is_empty() {
                checking.extend(from_import(module, &names, "    ", width));
            }
        }
        if !checking.is_empty() {
            checking.insert(0, "if TYPE_CHECKING:".to_string());
        }
        groups.push(checking);

        let groups: Vec<String> = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| group.join("\n"))
            .collect();
        groups
            .join("\n\n")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Sort key of an imported name, matching isort's `order_by_type`:
/// constants, then classes, then everything else, case-insensitive within
/// each group. `module as alias` sorts by the module.
fn isort_key(name: &str) -> (u8, String) {
    let name = name.split(" as ").next().unwrap_or(name);
    let kind = if name.len() > 1 && name == name.to_uppercase() {
        0
    } else if name.starts_with(char::is_uppercase) {
        1
    } else {
        2
    };
    (kind, name.to_lowercase())
}

/// Renders `from <module> import <names>`, parenthesized one name per line
/// when the single-line form would exceed `width`.
pub fn from_import(
    module: &str,
    names: &BTreeSet<String>,
    indent: &str,
    width: usize,
) -> Vec<String> {
    if names.is_empty() {
        return Vec::new();
    }
    let mut ordered: Vec<&String> = names.iter().collect();
    ordered.sort_by_cached_key(|name| isort_key(name));

    let joined = ordered
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let line = format!("{indent}from {module} import {joined}");
    if line.len() <= width {
        return vec![line];
    }

    let mut lines = vec![format!("{indent}from {module} import (")];
    lines.extend(ordered.iter().map(|name| format!("{indent}    {name},")));
    lines.push(format!("{indent})"));
    lines
}

/// Transitive reference closure of the object components of an [`Api`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    reach: BTreeMap<String, BTreeSet<String>>,
}

impl ReferenceGraph {
    /// Builds the closure from every object's argument types.
    pub fn new(api: &Api) -> Self {
        let edges: BTreeMap<&str, BTreeSet<&str>> = api
            .objects()
            .map(|component| {
                let targets = component
                    .args_objects()
                    .into_iter()
                    .filter(|name| Category::of(name) == Category::Object)
                    .collect();
                (component.name.as_str(), targets)
            })
            .collect();

        let reach = edges
            .keys()
            .map(|start| (start.to_string(), closure(&edges, start)))
            .collect();
        Self { reach }
    }

    /// True when `to` is reachable from `from` through at least one edge.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        self.reach.get(from).is_some_and(|set| set.contains(to))
    }

    /// True when the import of `to` inside `from`'s module must be deferred.
    pub fn is_deferred(&self, from: &str, to: &str) -> bool {
        from != to
            && Category::of(from) == Category::Object
            && Category::of(to) == Category::Object
            && to > from
            && self.reaches(to, from)
    }
}

fn closure(edges: &BTreeMap<&str, BTreeSet<&str>>, start: &str) -> BTreeSet<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<&str> = edges
        .get(start)
        .map(|targets| targets.iter().copied().collect())
        .unwrap_or_default();

    while let Some(node) = stack.pop() {
        if !seen.insert(node.to_string()) {
            continue;
        }
        if let Some(targets) = edges.get(node) {
            stack.extend(targets.iter().copied().filter(|t| !seen.contains(*t)));
        }
    }
    seen
}
