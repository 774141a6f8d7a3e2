//! Walks the Bot API reference page and builds the [`Api`] schema.
//!
//! The page is a flat run of sibling elements inside one content container:
//!
//! ```text
//! <h3>Getting updates</h3>          section header
//! <h4>Update</h4>                   component declaration
//! <p>This object represents...</p>  description
//! <table>...</table>                argument table
//! <h4>getUpdates</h4>
//! ...
//! ```
//!
//! Extraction runs in two passes. The first discovers headers, component
//! declarations and descriptions and fills the global [`AnchorTable`]. The
//! second parses argument tables, which may link to components declared
//! further down the page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::errors::SchemaError;
use crate::model::{AnchorTable, Api, Component, Header, Sentinels};
use crate::types::{Inline, RawCell, RawRow, parse_row, resolve_result, sort_arguments};

/// Document shape the extractor expects.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Selector for the element whose children are the page content.
    pub content_selector: String,
    /// Text of the first section header that belongs to the schema.
    pub start_marker: String,
    /// Prefix of the `<strong>` element carrying the API version.
    pub title_prefix: String,
    /// Tag of section headers.
    pub section_tag: String,
    /// Tag of component declarations.
    pub component_tag: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_selector: "div#dev_page_content".to_string(),
            start_marker: "Getting updates".to_string(),
            title_prefix: "Bot API".to_string(),
            section_tag: "h3".to_string(),
            component_tag: "h4".to_string(),
        }
    }
}

/// A component found in the first pass, with the document span that follows
/// its declaration (up to the next sub-header or section header).
struct Declaration {
    header: usize,
    component: Component,
    paragraphs: Vec<RawCell>,
    span: std::ops::Range<usize>,
}

/// Turns a parsed reference page into an [`Api`].
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    config: ExtractorConfig,
    sentinels: Sentinels,
}

impl DocumentExtractor {
    /// Creates an extractor using the default document shape.
    pub fn new(sentinels: Sentinels) -> Self {
        Self::with_config(sentinels, ExtractorConfig::default())
    }

    pub fn with_config(sentinels: Sentinels, config: ExtractorConfig) -> Self {
        Self { config, sentinels }
    }

    /// Parses `html` and extracts the schema.
    pub fn extract_html(&self, html: &str) -> Result<Api, SchemaError> {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    /// Extracts the schema from a parsed document.
    ///
    /// ## Errors
    ///
    /// - `SchemaError::StructuralAssumption` when the content container,
    ///   version title, start marker or an anchor is missing, or a table row
    ///   is malformed.
    /// - `SchemaError::UnresolvedReference` when a type links to an unknown
    ///   anchor.
    pub fn extract(&self, document: &Html) -> Result<Api, SchemaError> {
        let content_selector = selector(&self.config.content_selector)?;
        let content = document.select(&content_selector).next().ok_or_else(|| {
            SchemaError::structural(
                "document",
                format!("no element matches '{}'", self.config.content_selector),
            )
        })?;

        let version = self.parse_version(content)?;
        let nodes: Vec<ElementRef<'_>> = content.children().filter_map(ElementRef::wrap).collect();

        let mut headers = self.parse_headers(&nodes)?;
        let mut declarations = self.parse_declarations(&nodes, &headers)?;

        let mut anchors = AnchorTable::new();
        for decl in &declarations {
            anchors.insert(decl.component.anchor.clone(), decl.component.name.clone())?;
        }

        for decl in &mut declarations {
            self.populate(decl, &nodes, &anchors)?;
        }

        let component_count = declarations.len();
        for decl in declarations {
            headers[decl.header].0.components.push(decl.component);
        }
        let headers: Vec<Header> = headers.into_iter().map(|(header, _)| header).collect();

        info!(
            "Extracted Bot API {}: {} headers, {} components",
            version,
            headers.len(),
            component_count
        );

        Ok(Api::new(version, headers, anchors, self.sentinels.clone()))
    }

    /// Finds the version in the first `<strong>` starting with the title prefix.
    fn parse_version(&self, content: ElementRef<'_>) -> Result<String, SchemaError> {
        let strong = selector("strong")?;
        content
            .select(&strong)
            .map(element_text)
            .find_map(|text| {
                text.strip_prefix(self.config.title_prefix.as_str())
                    .map(|rest| rest.trim().to_string())
            })
            .ok_or_else(|| {
                SchemaError::structural(
                    "document title",
                    format!("no <strong> element starts with '{}'", self.config.title_prefix),
                )
            })
    }

    /// Returns each retained section header with the node index it sits at.
    fn parse_headers(&self, nodes: &[ElementRef<'_>]) -> Result<Vec<(Header, usize)>, SchemaError> {
        let mut started = false;
        let mut headers = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            if node.value().name() != self.config.section_tag {
                continue;
            }
            let name = element_text(*node);
            if name == self.config.start_marker {
                started = true;
            }
            if !started {
                debug!("Skipping introductory section '{}'", name);
                continue;
            }
            let anchor = anchor_of(*node, &name)?;
            headers.push((Header::new(name, anchor), idx));
        }

        if !started {
            return Err(SchemaError::structural(
                "document",
                format!("start marker '{}' not found", self.config.start_marker),
            ));
        }
        Ok(headers)
    }

    /// First pass: component declarations, descriptions and spans.
    fn parse_declarations(
        &self,
        nodes: &[ElementRef<'_>],
        headers: &[(Header, usize)],
    ) -> Result<Vec<Declaration>, SchemaError> {
        let mut declarations = Vec::new();
        for (header_idx, (_, start)) in headers.iter().enumerate() {
            let section_end = self.next_boundary(nodes, *start + 1, &[self.config.section_tag.as_str()]);
            for idx in *start + 1..section_end {
                let node = nodes[idx];
                if node.value().name() != self.config.component_tag {
                    continue;
                }
                let name = element_text(node);
                if name.is_empty() || name.contains(char::is_whitespace) {
                    continue;
                }

                let anchor = anchor_of(node, &name)?;
                let span_end = self.next_boundary(
                    nodes,
                    idx + 1,
                    &[
                        self.config.section_tag.as_str(),
                        self.config.component_tag.as_str(),
                    ],
                );
                let paragraphs: Vec<RawCell> = nodes[idx + 1..span_end]
                    .iter()
                    .take_while(|n| n.value().name() != "table")
                    .filter(|n| matches!(n.value().name(), "p" | "blockquote"))
                    .map(|n| inline_content(*n))
                    .collect();

                let mut component = Component::new(name.clone(), anchor);
                component.parent = Some(self.sentinels.parent_for(&name));
                component.description = paragraphs
                    .iter()
                    .map(RawCell::content)
                    .filter(|text| !text.is_empty())
                    .collect();

                declarations.push(Declaration {
                    header: header_idx,
                    component,
                    paragraphs,
                    span: idx + 1..span_end,
                });
            }
        }
        Ok(declarations)
    }

    /// Second pass: arguments, result and subclasses of one component.
    fn populate(
        &self,
        decl: &mut Declaration,
        nodes: &[ElementRef<'_>],
        anchors: &AnchorTable,
    ) -> Result<(), SchemaError> {
        let span = &nodes[decl.span.clone()];
        let component = &mut decl.component;

        match span.iter().find(|n| n.value().name() == "table") {
            Some(table) => {
                let rows = table_rows(*table)?;
                debug!("{}: {} argument rows", component.name, rows.len());
                component.args = rows
                    .iter()
                    .map(|row| parse_row(row, &component.name, anchors))
                    .collect::<Result<_, _>>()?;
                sort_arguments(&mut component.args);
                component.refresh_has_field();
            }
            None => {
                debug!("{}: no argument table", component.name);
                component.subclasses = subclasses(span, anchors)?;
            }
        }

        if component.is_path() {
            component.result = resolve_result(&decl.paragraphs, &component.name, anchors);
        }
        Ok(())
    }

    /// Index of the next node carrying one of `tags`, or the end.
    fn next_boundary(&self, nodes: &[ElementRef<'_>], from: usize, tags: &[&str]) -> usize {
        nodes
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, n)| tags.contains(&n.value().name()))
            .map_or(nodes.len(), |(idx, _)| idx)
    }
}

fn selector(css: &str) -> Result<Selector, SchemaError> {
    Selector::parse(css).map_err(|_| SchemaError::InvalidSelector(css.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `href` of the first link inside a header element.
fn anchor_of(element: ElementRef<'_>, context: &str) -> Result<String, SchemaError> {
    let link = selector("a")?;
    element
        .select(&link)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .ok_or_else(|| SchemaError::structural(context, "header has no anchor link"))
}

/// Flattens an element into text, link and emphasis runs.
fn inline_content(element: ElementRef<'_>) -> RawCell {
    let mut cell = RawCell::default();
    collect_inlines(element, &mut cell.inlines);
    cell
}

fn collect_inlines(element: ElementRef<'_>, out: &mut Vec<Inline>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = text;
            out.push(Inline::Text(text.to_string()));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        match child.value().name() {
            "a" => out.push(Inline::Link {
                text: child.text().collect(),
                href: child.value().attr("href").unwrap_or_default().to_string(),
            }),
            "em" => out.push(Inline::Emphasis(child.text().collect())),
            "br" => out.push(Inline::Text(" ".to_string())),
            "img" => {
                if let Some(alt) = child.value().attr("alt") {
                    out.push(Inline::Text(alt.to_string()));
                }
            }
            _ => collect_inlines(child, out),
        }
    }
}

/// Body rows of an argument table, split into cells.
fn table_rows(table: ElementRef<'_>) -> Result<Vec<RawRow>, SchemaError> {
    let tr = selector("tr")?;
    let td = selector("td")?;
    Ok(table
        .select(&tr)
        .map(|row| RawRow::new(row.select(&td).map(inline_content).collect()))
        .filter(|row| !row.cells.is_empty())
        .collect())
}

/// Subclass names from a bullet list whose every item links to a component.
fn subclasses(span: &[ElementRef<'_>], anchors: &AnchorTable) -> Result<Vec<String>, SchemaError> {
    let li = selector("li")?;
    let link = selector("a")?;
    for list in span.iter().filter(|n| n.value().name() == "ul") {
        let names: Option<Vec<String>> = list
            .select(&li)
            .map(|item| {
                item.select(&link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| anchors.get(href))
                    .map(str::to_string)
            })
            .collect();
        match names {
            Some(names) if !names.is_empty() => return Ok(names),
            _ => debug!("Skipping list that does not only link components"),
        }
    }
    Ok(Vec::new())
}
