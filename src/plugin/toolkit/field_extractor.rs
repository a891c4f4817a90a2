//! Direct-from-plugin-code field extraction helpers (§4.2), operating on an
//! already-selected `scraper::ElementRef` via a `SelectorSegment` chain
//! (`toolkit::selector`). Grounded on the teacher's `indexer::field_extractor`,
//! trimmed from the YAML `Fields`/`TemplateContext` multi-pass machinery down
//! to plain functions: a compiled plugin already knows which field is which,
//! so there is no need for a generic named-field container or a pass-until-
//! fixed-point resolution loop.

use scraper::ElementRef;

use super::selector::{SelectorSegment, apply_selector_chain};

/// Extract the trimmed text of the first match for `chain` within `root`.
/// Missing matches are `None`, the tolerant-extraction outcome required by
/// §4.4 for optional fields.
pub fn extract_text(root: &ElementRef, chain: &[SelectorSegment]) -> Option<String> {
    let matches = apply_selector_chain(vec![*root], chain);
    matches.into_iter().next().map(|el| {
        el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    })
}

/// Extract an HTML attribute (e.g. `href`) off the first match for `chain`.
pub fn extract_attr(root: &ElementRef, chain: &[SelectorSegment], attr: &str) -> Option<String> {
    let matches = apply_selector_chain(vec![*root], chain);
    matches.into_iter().next().and_then(|el| el.value().attr(attr)).map(str::to_string)
}

/// Every match for `chain` within `root`, in document order — used for
/// iterating a row's alternate-download anchors into `download_links`.
pub fn extract_all<'a>(root: &ElementRef<'a>, chain: &[SelectorSegment]) -> Vec<ElementRef<'a>> {
    apply_selector_chain(vec![*root], chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::toolkit::selector::parse_selector_chain;
    use scraper::Html;

    #[test]
    fn extracts_text_and_attr() {
        let html = Html::parse_fragment(
            r#"<div class="row"><a class="title" href="/file/42">Ubuntu 22.04</a></div>"#,
        );
        let root = html.root_element();
        let chain = parse_selector_chain("a.title");

        assert_eq!(extract_text(&root, &chain), Some("Ubuntu 22.04".to_string()));
        assert_eq!(extract_attr(&root, &chain, "href"), Some("/file/42".to_string()));
    }

    #[test]
    fn missing_field_is_none() {
        let html = Html::parse_fragment(r#"<div class="row"></div>"#);
        let root = html.root_element();
        let chain = parse_selector_chain("a.title");
        assert_eq!(extract_text(&root, &chain), None);
    }
}
