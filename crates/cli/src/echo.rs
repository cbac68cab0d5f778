use owo_colors::OwoColorize;
use quire_core::{Book, Chapter};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Quire".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Outline, split and repackage HTML ebooks\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a summary of a loaded or converted book
pub fn print_book_details(book: &Book) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Book Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    if let Some(title) = book.property_for("title") {
        eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
    }
    eprintln!("  {} {}", "Components:".dimmed(), book.components.len().to_string().bright_white());
    eprintln!("  {} {}", "Chapters:".dimmed(), chapter_count(&book.chapters).to_string().bright_white());
    eprintln!("  {} {}", "Resources:".dimmed(), book.resources.len().to_string().bright_white());
    let bytes: usize = book.resources.iter().map(|r| r.data.len()).sum();
    eprintln!("  {} {}\n", "Resource size:".dimmed(), format_size(bytes).bright_white());
}

fn chapter_count(chapters: &[Chapter]) -> usize {
    chapters.iter().map(Chapter::count).sum()
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
