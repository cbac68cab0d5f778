use crate::chapter::Chapter;
use crate::formatters::linkable;

/// Configuration for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Spaces of indentation per nesting level
    pub indent: usize,

    /// Show each chapter's `src` after its title
    pub include_src: bool,

    /// Prefix each line with the chapter's position
    pub numbered: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { indent: 2, include_src: false, numbered: false }
    }
}

/// Plain text formatter for tables of contents
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, chapters: &[Chapter]) -> String {
        convert_to_text(chapters, &self.config)
    }
}

/// Renders chapters one per line, children indented under their parent.
pub fn convert_to_text(chapters: &[Chapter], config: &TextConfig) -> String {
    let mut output = String::new();
    write_chapters(&linkable(chapters), 0, config, &mut output);
    output
}

fn write_chapters(chapters: &[Chapter], depth: usize, config: &TextConfig, output: &mut String) {
    for chapter in chapters {
        output.push_str(&" ".repeat(depth * config.indent));
        if config.numbered {
            output.push_str(&format!("{}. ", chapter.position));
        }
        output.push_str(chapter.title.as_deref().unwrap_or("Untitled"));
        if config.include_src
            && let Some(src) = &chapter.src
        {
            output.push_str(&format!(" ({})", src));
        }
        output.push('\n');

        write_chapters(&chapter.children, depth + 1, config, output);
    }
}
