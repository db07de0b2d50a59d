//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::{Document, Node};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use boe_harvester::xml::get_tag_name;
///
/// let xml = r#"<diario><seccion num="2A"/></diario>"#;
/// let doc = Document::parse(xml).unwrap();
/// let seccion = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(seccion), "seccion");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name, in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use boe_harvester::xml::find_children;
///
/// let xml = r#"<epigrafe><item id="a"/><item id="b"/><otro/></epigrafe>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let items: Vec<_> = find_children(doc.root_element(), "item").collect();
/// assert_eq!(items.len(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find the first element anywhere in the document with the given tag name.
pub fn find_descendant<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.is_element() && get_tag_name(*n) == tag)
}

/// Get the full text content of a node, trimmed.
///
/// Text inside nested inline elements (e.g. `<em>`) is included, so
/// paragraphs with markup read as one string.
pub fn get_text(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}
