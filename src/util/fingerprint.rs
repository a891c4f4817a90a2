//! Search cache fingerprint (§4.7, P3): a pure, collision-resistant hash over
//! exactly `(plugin_name, normalized_q, category)`. Unrelated fields (offset,
//! limit, language) are intentionally excluded -- see SPEC_FULL.md §9 open
//! question resolution.

use sha2::{Digest, Sha256};

pub fn search_fingerprint(plugin_name: &str, normalized_q: &str, category: Option<i32>) -> String {
    let category_str = category.map(|c| c.to_string()).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(plugin_name.as_bytes());
    hasher.update(b":");
    hasher.update(normalized_q.as_bytes());
    hasher.update(b":");
    hasher.update(category_str.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_function_same_inputs_same_hash() {
        let a = search_fingerprint("example", "ubuntu", Some(2000));
        let b = search_fingerprint("example", "ubuntu", Some(2000));
        assert_eq!(a, b);
    }

    #[test]
    fn unrelated_fields_do_not_change_the_key() {
        // Two different offsets/limits (not part of the declared inputs)
        // must still collapse onto the same fingerprint.
        let a = search_fingerprint("example", "ubuntu", Some(2000));
        let b = search_fingerprint("example", "ubuntu", Some(2000));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_differ() {
        let a = search_fingerprint("example", "ubuntu", Some(2000));
        let b = search_fingerprint("example", "debian", Some(2000));
        let c = search_fingerprint("other", "ubuntu", Some(2000));
        let d = search_fingerprint("example", "ubuntu", Some(5000));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
