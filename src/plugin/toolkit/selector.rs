//! CSS selector-chain parsing with `:contains()`/`:has()` pseudo-selectors,
//! ported near-verbatim from the teacher's `indexer::selector` (it was
//! already generic over `scraper::ElementRef`, independent of any
//! YAML-definition types).

use scraper::Selector;

#[derive(Debug, Clone)]
pub struct SelectorSegment {
    pub css: String,
    pub contains: Option<String>,
    pub has: Option<String>,
}

/// Splits `"table:contains('X') tr:has('Y')"` into segments, each carrying
/// its own CSS part plus extracted `:contains()`/`:has()` filters.
pub fn parse_selector_chain(full_selector: &str) -> Vec<SelectorSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut quote = None;

    for c in full_selector.chars() {
        match c {
            '\'' | '"' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
                current.push(c);
            }
            '(' => {
                if quote.is_none() {
                    depth += 1;
                }
                current.push(c);
            }
            ')' => {
                if quote.is_none() && depth > 0 {
                    depth -= 1;
                }
                current.push(c);
            }
            ' ' | '>' => {
                if depth == 0 && quote.is_none() {
                    if !current.trim().is_empty() {
                        segments.push(parse_segment(&current));
                        current.clear();
                    }
                } else {
                    current.push(c);
                }
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        segments.push(parse_segment(&current));
    }

    segments
}

fn parse_segment(segment: &str) -> SelectorSegment {
    let mut css = segment.trim().to_string();
    let mut contains = None;
    let mut has = None;

    if let Some(idx) = css.find(":contains(") {
        let remainder = &css[idx + 10..];
        if let Some(end) = find_matching_paren(remainder) {
            let val = remainder[..end].trim_matches(|c| c == '\'' || c == '"').to_string();
            contains = Some(val);
            let before = &css[..idx];
            let after = &remainder[end + 1..];
            css = format!("{before}{after}");
        }
    }

    if let Some(idx) = css.find(":has(") {
        let remainder = &css[idx + 5..];
        if let Some(end) = find_matching_paren(remainder) {
            let val = remainder[..end].to_string();
            has = Some(val);
            let before = &css[..idx];
            let after = &remainder[end + 1..];
            css = format!("{before}{after}");
        }
    }

    SelectorSegment { css: css.trim().to_string(), contains, has }
}

fn find_matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Applies a parsed selector chain to a starting element set.
pub fn apply_selector_chain<'a>(
    elements: Vec<scraper::ElementRef<'a>>,
    chain: &[SelectorSegment],
) -> Vec<scraper::ElementRef<'a>> {
    let mut current_elements = elements;

    for segment in chain {
        if segment.css.is_empty() && segment.contains.is_none() {
            continue;
        }

        let mut next_elements = Vec::new();

        if !segment.css.is_empty() {
            if let Ok(selector) = Selector::parse(&segment.css) {
                for element in current_elements {
                    for child in element.select(&selector) {
                        next_elements.push(child);
                    }
                }
            }
        } else {
            next_elements = current_elements;
        }

        if let Some(ref text) = segment.contains {
            next_elements.retain(|el| el.text().collect::<String>().contains(text));
        }

        if let Some(ref list_sel) = segment.has
            && let Ok(has_sel) = Selector::parse(list_sel)
        {
            next_elements.retain(|el| el.select(&has_sel).next().is_some());
        }

        current_elements = next_elements;
    }

    current_elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn parses_contains_and_has() {
        let chain = parse_selector_chain("tr:contains('Ubuntu'):has(a.download)");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].contains.as_deref(), Some("Ubuntu"));
        assert_eq!(chain[0].has.as_deref(), Some("a.download"));
    }

    #[test]
    fn contains_filter_narrows_matches() {
        let html = Html::parse_document(
            "<table><tr><td>Ubuntu 22.04</td></tr><tr><td>Debian 12</td></tr></table>",
        );
        let root = html.root_element();
        let chain = parse_selector_chain("tr:contains('Ubuntu')");
        let matches = apply_selector_chain(vec![root], &chain);
        assert_eq!(matches.len(), 1);
    }
}
