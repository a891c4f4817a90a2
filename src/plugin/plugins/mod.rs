//! Concrete plugin implementations and the compile-time manifest table
//! consulted by `PluginRegistry::new` (§4.1). A full deployment carries on
//! the order of forty of these; these two are the reference HTTP-mode and
//! headless-mode instances the rest would follow.

mod example_headless;
mod example_html;

use crate::plugin::{PluginFactory, PluginManifestEntry};

const _: PluginFactory = example_html::ExampleHtmlPlugin::factory;
const _: PluginFactory = example_headless::ExampleHeadlessPlugin::factory;

pub const PLUGIN_MANIFEST: &[PluginManifestEntry] = &[
    PluginManifestEntry { name: "example-html", factory: example_html::ExampleHtmlPlugin::factory },
    PluginManifestEntry { name: "example-headless", factory: example_headless::ExampleHeadlessPlugin::factory },
];
