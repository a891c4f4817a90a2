//! Torznab documents (§4.11, §6): caps XML and RSS 2.0 + torznab:attr search
//! results. Built with plain string assembly rather than `quick_xml`'s event
//! writer — the shape is fixed and small enough that a template plus one
//! escaping helper is clearer than a tree of `BytesStart`/`BytesEnd` calls,
//! in the same spirit as the toolkit's own `template::render`.

use crate::models::{CATEGORIES, SearchResult};

pub const SERVER_TITLE: &str = "Scavengarr";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `?t=caps` response (§4.11): server identity, supported params, categories.
pub fn caps_document() -> String {
    let mut categories = String::new();
    for category in CATEGORIES {
        categories.push_str(&format!(
            "    <category id=\"{}\" name=\"{}\"/>\n",
            category.id,
            escape_xml(category.name)
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<caps>\n\
  <server title=\"{title}\" version=\"{version}\"/>\n\
  <limits max=\"100\" default=\"50\"/>\n\
  <searching>\n\
    <search available=\"yes\" supportedParams=\"q\"/>\n\
    <tv-search available=\"yes\" supportedParams=\"q,season,ep\"/>\n\
    <movie-search available=\"yes\" supportedParams=\"q\"/>\n\
  </searching>\n\
  <categories>\n{categories}  </categories>\n\
</caps>\n",
        title = escape_xml(SERVER_TITLE),
        version = SERVER_VERSION,
    )
}

/// `?t=search` response: RSS 2.0 channel carrying one `<item>` per result,
/// each with the torznab namespace attrs (§4.11, §6).
pub fn results_document(plugin_name: &str, items: &[SearchResult]) -> String {
    let mut body = String::new();
    for item in items {
        body.push_str(&render_item(plugin_name, item));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<rss version=\"2.0\" xmlns:torznab=\"http://torznab.com/schemas/2015/feed\">\n\
  <channel>\n\
    <title>{title}</title>\n\
    <description>{title} results for {plugin}</description>\n\
{body}  </channel>\n\
</rss>\n",
        title = escape_xml(SERVER_TITLE),
        plugin = escape_xml(plugin_name),
        body = body,
    )
}

fn render_item(plugin_name: &str, item: &SearchResult) -> String {
    let title = item.release_name.as_deref().unwrap_or(&item.title);
    // Guid is the original download URL, stable across re-scrapes, so
    // downstream consumers can dedup on it (§4.11).
    let guid = &item.download_link;
    let link = match item.job_id {
        Some(job_id) => format!("/api/v1/download/{job_id}"),
        None => String::new(),
    };

    let mut attrs = String::new();
    attrs.push_str(&torznab_attr("category", &item.category.unwrap_or(8000).to_string()));
    if let Some(size) = item.size {
        attrs.push_str(&torznab_attr("size", &size.to_string()));
    }
    if let Some(seeders) = item.seeders {
        attrs.push_str(&torznab_attr("seeders", &seeders.to_string()));
    }
    if let Some(leechers) = item.leechers {
        attrs.push_str(&torznab_attr("peers", &leechers.to_string()));
    }
    if let Some(grabs) = item.grabs {
        attrs.push_str(&torznab_attr("grabs", &grabs.to_string()));
    }
    if let Some(factor) = item.download_volume_factor {
        attrs.push_str(&torznab_attr("downloadvolumefactor", &factor.to_string()));
    }
    if let Some(factor) = item.upload_volume_factor {
        attrs.push_str(&torznab_attr("uploadvolumefactor", &factor.to_string()));
    }

    let pub_date = item.published_date.unwrap_or_else(chrono::Utc::now).to_rfc2822();

    format!(
        "    <item>\n\
      <title>{title}</title>\n\
      <guid isPermaLink=\"false\">{guid}</guid>\n\
      <link>{link}</link>\n\
      <comments>{plugin}</comments>\n\
      <pubDate>{pub_date}</pubDate>\n\
      <enclosure url=\"{link}\" length=\"{size}\" type=\"application/x-crawljob\"/>\n\
{attrs}    </item>\n",
        title = escape_xml(title),
        guid = escape_xml(guid),
        link = escape_xml(&link),
        plugin = escape_xml(plugin_name),
        pub_date = pub_date,
        size = item.size.unwrap_or(0),
        attrs = attrs,
    )
}

fn torznab_attr(name: &str, value: &str) -> String {
    format!("      <torznab:attr name=\"{name}\" value=\"{}\"/>\n", escape_xml(value))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Production-mode fallback (§7): an empty, well-formed feed, HTTP 200.
pub fn empty_results_document(plugin_name: &str) -> String {
    results_document(plugin_name, &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_document_lists_every_category() {
        let doc = caps_document();
        for category in CATEGORIES {
            assert!(doc.contains(&format!("id=\"{}\"", category.id)));
        }
    }

    #[test]
    fn results_document_escapes_titles() {
        let mut item = SearchResult::new("Show & Tell <1>", "https://hoster/a");
        item.category = Some(2000);
        let doc = results_document("example", &[item]);
        assert!(doc.contains("Show &amp; Tell &lt;1&gt;"));
        assert!(!doc.contains("Show & Tell <1>"));
    }

    #[test]
    fn empty_results_document_is_well_formed_with_no_items() {
        let doc = empty_results_document("example");
        assert!(doc.contains("<channel>"));
        assert!(!doc.contains("<item>"));
    }

    #[test]
    fn missing_numeric_fields_are_omitted() {
        let mut item = SearchResult::new("Minimal", "https://hoster/b");
        item.category = Some(2000);
        let doc = results_document("example", &[item]);
        assert!(!doc.contains("name=\"seeders\""));
        assert!(!doc.contains("name=\"peers\""));
    }
}
