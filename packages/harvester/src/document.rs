//! Per-item BOE documents.
//!
//! Only two things are read from an item document: the structured
//! `fecha_disposicion` field and the `texto/p` body paragraphs, both looked
//! up anywhere in the tree.

use roxmltree::Document;

use crate::error::Result;
use crate::http::DocumentSource;
use crate::xml::{find_children, find_descendant, get_text};

/// The parts of an item document the pipelines use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDocument {
    /// Raw `fecha_disposicion` value (YYYYMMDD), if present.
    pub fecha_disposicion: Option<String>,

    /// Text of every `texto/p` paragraph, in order.
    pub paragraphs: Vec<String>,
}

impl ItemDocument {
    /// Parse an item document from its XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;

        let fecha_disposicion = find_descendant(&doc, "fecha_disposicion")
            .map(get_text)
            .filter(|s| !s.is_empty());

        let paragraphs: Vec<String> = find_descendant(&doc, "texto")
            .map(|texto| find_children(texto, "p").map(get_text).collect())
            .unwrap_or_default();

        Ok(Self {
            fecha_disposicion,
            paragraphs,
        })
    }

    /// The `n`-th body paragraph, 1-indexed.
    ///
    /// # Examples
    /// ```
    /// use boe_harvester::document::ItemDocument;
    ///
    /// let doc = ItemDocument::parse("<documento><texto><p>uno</p><p>dos</p></texto></documento>").unwrap();
    /// assert_eq!(doc.paragraph(2), Some("dos"));
    /// assert_eq!(doc.paragraph(0), None);
    /// ```
    pub fn paragraph(&self, n: usize) -> Option<&str> {
        let index = n.checked_sub(1)?;
        self.paragraphs.get(index).map(String::as_str)
    }
}

/// Fetch and parse one item document.
pub fn fetch_item_document(source: &dyn DocumentSource, id: &str) -> Result<ItemDocument> {
    let xml = source.fetch(id)?;
    ItemDocument::parse(&xml)
}
