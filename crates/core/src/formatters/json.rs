use crate::Result;
use crate::book::Property;
use crate::chapter::Chapter;
use crate::formatters::linkable;
use serde::Serialize;

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Book metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,
    /// Table of contents
    pub chapters: Vec<Chapter>,
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Include book properties in output
    pub include_properties: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Convert a chapter tree to JSON, leaving out chapters nothing links to
pub fn convert_to_json(chapters: &[Chapter], properties: &[Property], config: &JsonConfig) -> Result<String> {
    let output = JsonOutput {
        properties: if config.include_properties { Some(properties.to_vec()) } else { None },
        chapters: linkable(chapters),
    };

    if config.pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, chapters: &[Chapter], properties: &[Property]) -> Result<String> {
        convert_to_json(chapters, properties, &self.config)
    }
}
