//! Minimal plugin packaged by the end-to-end tests.

use flowpack_plugin_api::{Plugin, PluginInfo, export_plugin};

/// Sample connector exposing fully populated metadata.
#[derive(Default)]
pub struct SampleConnector;

impl Plugin for SampleConnector {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            description: Some(String::from("Fixture plugin for packaging tests")),
            authors: vec![String::from("Fixture Author"), String::from("Second Author")],
            tags: vec![String::from("fixture"), String::from("sample")],
            license: Some(String::from("MIT")),
            ..PluginInfo::new(
                "flowpack.sample",
                "Connector",
                "0.3.1",
                "FlowPack",
                "Testing",
                "1.0.0",
            )
        }
    }
}

export_plugin!(SampleConnector);
