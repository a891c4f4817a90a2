//! `{{ .Var }}` style template substitution (§4.2), used by plugins to build
//! category names and detail-page URLs from already-extracted fields.
//! Grounded on the teacher's `indexer::template` engine, cut down to plain
//! variable substitution: plugins are compiled Rust, so conditionals and
//! loops belong in the plugin's own code, not in a string template.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*\.(\w+)\s*\}\}").unwrap());

/// Replace every `{{ .Name }}` placeholder with `context["Name"]`. Unknown
/// variables are replaced with an empty string rather than left in place,
/// matching the tolerant-extraction policy in §4.4.
pub fn render(template: &str, context: &HashMap<String, String>) -> String {
    VAR_RE
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            context.get(name).cloned().unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_variables() {
        let mut ctx = HashMap::new();
        ctx.insert("title".to_string(), "Ubuntu".to_string());
        ctx.insert("year".to_string(), "2022".to_string());
        assert_eq!(render("{{ .title }} ({{ .year }})", &ctx), "Ubuntu (2022)");
    }

    #[test]
    fn unknown_variable_becomes_empty() {
        let ctx = HashMap::new();
        assert_eq!(render("prefix-{{ .missing }}-suffix", &ctx), "prefix--suffix");
    }
}
