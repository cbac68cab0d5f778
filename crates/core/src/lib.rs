pub mod book;
pub mod chapter;
pub mod classify;
pub mod componentize;
pub mod convert;
pub mod dom_tree;
pub mod error;
#[cfg(feature = "formats")]
pub mod formats;
pub mod formatters;
pub mod metadata;
pub mod outline;
pub mod parse;
pub mod stitch;

pub use book::{Book, Property, Resource, resolve_src};
pub use chapter::{Chapter, ChapterProjector};
pub use classify::{NodeKind, classify};
pub use componentize::{Component, Componentizer, component_uri};
pub use convert::{ConvertConfig, ConvertConfigBuilder, Converter, componentize, outline};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeData};
pub use dom_tree::{NodeId, NodePath};
pub use error::{QuireError, Result};
#[cfg(feature = "formats")]
pub use formats::{BookFormat, Ochook, Zhook};
pub use formatters::{HtmlConfig, HtmlFormatter, JsonConfig, JsonFormatter, OutputFormat, TextConfig, TextFormatter};
pub use formatters::{convert_to_html, convert_to_json, convert_to_text, render};
pub use outline::{Heading, Outline, Outliner, Section, SectionId};
pub use parse::Document;
pub use stitch::stitch;
