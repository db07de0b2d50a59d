//! Daily summary parsing and hierarchical item listing.
//!
//! The summary nests items as
//! `diario/seccion[@num]/departamento[@nombre]/epigrafe[@nombre]/item`,
//! except that sections 4 and up have no epigraph level. An [`ItemFilter`]
//! is compiled into a [`SummaryQuery`] that knows which of those shapes to
//! walk, and [`list_items`] evaluates it in document order.

use roxmltree::{Document, Node};

use crate::config::validate_section;
use crate::error::Result;
use crate::types::Item;
use crate::xml::{find_child, find_children, get_tag_name, get_text};

/// First section number whose departments list items without epigraphs.
const FIRST_SECTION_WITHOUT_EPIGRAPHS: u32 = 4;

/// Caller-facing filter over the summary hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub section: Option<String>,
    pub department: Option<String>,
    pub epigraph: Option<String>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn epigraph(mut self, epigraph: impl Into<String>) -> Self {
        self.epigraph = Some(epigraph.into());
        self
    }

    /// Compile the filter into a query over the summary tree.
    ///
    /// # Examples
    /// ```
    /// use boe_harvester::summary::{EpigraphStep, ItemFilter};
    ///
    /// let query = ItemFilter::new().section("2A").epigraph("Nombramientos").compile().unwrap();
    /// assert_eq!(query.epigraph, EpigraphStep::Named("Nombramientos".to_string()));
    ///
    /// let query = ItemFilter::new().section("5A").epigraph("Nombramientos").compile().unwrap();
    /// assert_eq!(query.epigraph, EpigraphStep::Omitted);
    /// ```
    pub fn compile(&self) -> Result<SummaryQuery> {
        let section_digit = self.section.as_deref().map(validate_section).transpose()?;

        let epigraph = match (section_digit, &self.epigraph) {
            (Some(digit), _) if digit >= FIRST_SECTION_WITHOUT_EPIGRAPHS => EpigraphStep::Omitted,
            (_, Some(name)) => EpigraphStep::Named(name.clone()),
            (_, None) => EpigraphStep::Any,
        };

        Ok(SummaryQuery {
            section: self.section.clone(),
            department: self.department.as_ref().map(|d| d.to_uppercase()),
            epigraph,
        })
    }
}

/// How the epigraph level of the hierarchy is walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpigraphStep {
    /// Only `epigrafe` elements with this `nombre`.
    Named(String),

    /// Any `epigrafe` element.
    Any,

    /// No epigraph level; items hang directly off the department.
    Omitted,
}

/// Compiled path through the summary tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    /// Required `seccion/@num`, if any.
    pub section: Option<String>,

    /// Required `departamento/@nombre`, already uppercased.
    pub department: Option<String>,

    pub epigraph: EpigraphStep,
}

impl SummaryQuery {
    /// Collect the matching `item` nodes in document order.
    pub fn select<'a, 'input>(&self, summary: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        let mut nodes = Vec::new();

        for diario in summary
            .descendants()
            .filter(|n| n.is_element() && get_tag_name(*n) == "diario")
        {
            for seccion in find_children(diario, "seccion")
                .filter(|n| attribute_matches(*n, "num", self.section.as_deref()))
            {
                for departamento in find_children(seccion, "departamento")
                    .filter(|n| attribute_matches(*n, "nombre", self.department.as_deref()))
                {
                    match &self.epigraph {
                        EpigraphStep::Omitted => {
                            nodes.extend(find_children(departamento, "item"));
                        }
                        EpigraphStep::Any => {
                            for epigrafe in find_children(departamento, "epigrafe") {
                                nodes.extend(find_children(epigrafe, "item"));
                            }
                        }
                        EpigraphStep::Named(name) => {
                            for epigrafe in find_children(departamento, "epigrafe")
                                .filter(|n| n.attribute("nombre") == Some(name.as_str()))
                            {
                                nodes.extend(find_children(epigrafe, "item"));
                            }
                        }
                    }
                }
            }
        }

        nodes
    }
}

fn attribute_matches(node: Node<'_, '_>, name: &str, expected: Option<&str>) -> bool {
    expected.is_none_or(|value| node.attribute(name) == Some(value))
}

/// List the items of a summary that pass `filter`.
///
/// An empty result is normal; the bulletin simply published nothing under
/// that heading. Only an invalid filter is an error.
pub fn list_items(summary: &Document<'_>, filter: &ItemFilter) -> Result<Vec<Item>> {
    let query = filter.compile()?;
    let items = query
        .select(summary)
        .into_iter()
        .filter_map(parse_item)
        .collect();
    Ok(items)
}

fn parse_item(node: Node<'_, '_>) -> Option<Item> {
    let Some(id) = node.attribute("id") else {
        tracing::warn!("Summary item without id attribute, skipping");
        return None;
    };
    let Some(titulo) = find_child(node, "titulo") else {
        tracing::warn!(id, "Summary item without titulo, skipping");
        return None;
    };

    let text_of = |tag: &str| find_child(node, tag).map(get_text).unwrap_or_default();

    Some(Item {
        id: id.to_string(),
        title: get_text(titulo),
        url_htm: text_of("urlHtm"),
        url_xml: text_of("urlXml"),
    })
}
