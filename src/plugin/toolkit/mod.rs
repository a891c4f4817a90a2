//! Internal scraping toolkit shared by HTTP-mode plugins (§4.2). An
//! implementation detail of C7/C8, not part of the `Plugin` contract — a
//! plugin is free to ignore this and parse HTML directly. Grounded on the
//! teacher's `indexer::{selector, filters, template, field_extractor}`
//! modules, trimmed from a YAML-definition-driven system to a small library
//! concrete plugins call into directly.

pub mod field_extractor;
pub mod filters;
pub mod selector;
pub mod template;
