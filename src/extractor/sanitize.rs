use html5ever::Attribute;
use log::debug;
use scraper::node::Element;
use scraper::{Html, Node, Selector};

/// Attributes that would make a renderer fetch something or run script
fn is_risky_attribute(name: &str) -> bool {
    name.starts_with("on") || name == "src" || name == "srcset"
}

/// Remove elements that load remote resources, then strip event handlers and
/// resource references from everything left. Returns (elements, attributes) removed.
pub(crate) fn sanitize_document(document: &mut Html, risky_elements: &Selector) -> (usize, usize) {
    let removed_elements = strip_risky_elements(document, risky_elements);
    let removed_attributes = strip_risky_attributes(document);

    if removed_elements > 0 || removed_attributes > 0 {
        debug!(
            "Sanitized document: {} element(s) and {} attribute(s) removed",
            removed_elements, removed_attributes
        );
    }

    (removed_elements, removed_attributes)
}

fn strip_risky_elements(document: &mut Html, risky_elements: &Selector) -> usize {
    let ids: Vec<_> = document.select(risky_elements).map(|el| el.id()).collect();

    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }

    ids.len()
}

fn strip_risky_attributes(document: &mut Html) -> usize {
    let mut removed = 0;

    let rewrites: Vec<_> = document
        .tree
        .nodes()
        .filter_map(|node| {
            let element = node.value().as_element()?;
            let risky = element
                .attrs
                .keys()
                .filter(|name| is_risky_attribute(&name.local))
                .count();
            if risky == 0 {
                return None;
            }
            removed += risky;

            // Original qualified names keep namespaced attributes such as xlink:href intact
            let kept: Vec<Attribute> = element
                .attrs
                .iter()
                .filter(|(name, _)| !is_risky_attribute(&name.local))
                .map(|(name, value)| Attribute {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();

            Some((node.id(), Element::new(element.name.clone(), kept)))
        })
        .collect();

    for (id, element) in rewrites {
        if let Some(mut node) = document.tree.get_mut(id) {
            *node.value() = Node::Element(element);
        }
    }

    removed
}
