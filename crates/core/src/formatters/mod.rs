use std::str::FromStr;

use crate::Result;
use crate::book::Property;
use crate::chapter::Chapter;

pub mod html;
pub mod json;
pub mod text;

pub use html::{HtmlConfig, HtmlFormatter, convert_to_html};
pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use text::{TextConfig, TextFormatter, convert_to_text};

/// Output format for a table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            _ => Err(format!("Invalid format: {}. Valid options: json, text, html", s)),
        }
    }
}

/// Renders chapters in `format` with each formatter's default settings.
pub fn render(chapters: &[Chapter], properties: &[Property], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => convert_to_json(chapters, properties, &JsonConfig { pretty: true, ..Default::default() }),
        OutputFormat::Text => Ok(convert_to_text(chapters, &TextConfig::default())),
        OutputFormat::Html => Ok(convert_to_html(chapters, &HtmlConfig::default())),
    }
}

/// Copy of the tree without chapters that are [`Chapter::empty_leaf`].
pub fn linkable(chapters: &[Chapter]) -> Vec<Chapter> {
    chapters
        .iter()
        .filter(|chapter| !chapter.empty_leaf())
        .map(|chapter| Chapter { children: linkable(&chapter.children), ..chapter.clone() })
        .collect()
}
