use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use quire_core::{Book, BookFormat, ConvertConfig, Converter, Ochook, OutputFormat, Zhook, render, resolve_src};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{print_banner, print_book_details, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package format written by `quire convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetFormat {
    Zhook,
    Ochook,
    Html,
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zhook" | "zip" => Ok(Self::Zhook),
            "ochook" => Ok(Self::Ochook),
            "html" => Ok(Self::Html),
            _ => Err(format!("Invalid target: {}. Valid options: zhook, ochook, html", s)),
        }
    }
}

/// Outline, split and repackage HTML-based ebooks
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author = "Quire Contributors")]
#[command(version)]
#[command(about = "Outline, split and repackage HTML-based ebooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the chapter tree of a book
    Outline {
        #[command(flatten)]
        input: InputArgs,

        /// Output format (json, text, html)
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a book into another package format
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Output path: a .zhook file, or a directory for ochook and html
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Target format (zhook, ochook, html)
        #[arg(short, long, default_value = "zhook", value_name = "FORMAT")]
        to: TargetFormat,

        /// Image to package as the book's cover
        #[arg(long, value_name = "FILE")]
        cover: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// A .zhook file, an ochook directory, or HTML files in reading order
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Split the book into one component per top-level article
    #[arg(long)]
    componentize: bool,
}

impl InputArgs {
    fn config(&self) -> ConvertConfig {
        ConvertConfig::builder().componentize(self.componentize).build()
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Outline { input, format, output } => {
            let book = load_book(&input, cli.verbose)?;
            if cli.verbose {
                print_step(3, 3, "Rendering outline");
                eprintln!("  {} {}\n", "Format:".dimmed(), format!("{:?}", format).bright_white());
            }

            let rendered = render(&book.chapters, &book.properties, format).context("Failed to render outline")?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write to file: {}", path.display()))?;
                    print_success(&format!("Outline written to {}", path.display().bright_white()));
                }
                None => print!("{}", rendered),
            }
        }
        Command::Convert { input, output, to, cover } => {
            let mut book = load_book(&input, cli.verbose)?;
            if let Some(path) = cover {
                add_cover(&mut book, &path)?;
            } else if book.cover_resource().is_none() && to != TargetFormat::Html {
                print_warning("No cover image; readers will reject the package without cover.png");
            }
            if cli.verbose {
                print_step(3, 3, &format!("Writing {:?} to {}", to, output.display().bright_white()));
            }

            write_book(&book, &output, to)?;
            print_success(&format!("Book written to {}", output.display().bright_white()));
        }
    }

    Ok(())
}

/// Reads the inputs and converts them into a book with chapters.
fn load_book(input: &InputArgs, verbose: bool) -> anyhow::Result<Book> {
    let config = input.config();
    debug!(inputs = input.inputs.len(), componentize = config.componentize, "loading book");

    let book = match input.inputs.as_slice() {
        [path] if path.extension().is_some_and(|ext| ext == "zhook") => {
            if verbose {
                print_step(1, 3, &format!("Reading zhook {}", path.display().bright_white()));
            }
            let zhook = Zhook::read(path).with_context(|| format!("Failed to read zhook: {}", path.display()))?;
            if verbose {
                print_step(2, 3, "Outlining index");
            }
            zhook.to_book(&config).context("Failed to convert zhook")?
        }
        [path] if path.is_dir() => {
            if verbose {
                print_step(1, 3, &format!("Reading ochook {}", path.display().bright_white()));
            }
            let ochook = Ochook::read(path).with_context(|| format!("Failed to read ochook: {}", path.display()))?;
            if verbose {
                print_step(2, 3, "Outlining index");
            }
            ochook.to_book(&config).context("Failed to convert ochook")?
        }
        paths => {
            if verbose {
                print_step(1, 3, &format!("Reading {} HTML file(s)", paths.len()));
            }
            let mut sources = Vec::with_capacity(paths.len());
            for path in paths {
                let html =
                    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
                sources.push((source_name(path), html));
            }
            let book = Book::from_html(sources).context("Failed to parse HTML")?;

            if verbose {
                print_step(2, 3, "Stitching and outlining");
            }
            Converter::with_config(config).convert(&book).context("Failed to convert book")?
        }
    };

    if verbose {
        print_book_details(&book);
    }
    if book.chapters.is_empty() {
        print_warning("No headings found; the book has no chapters");
    }

    Ok(book)
}

fn add_cover(book: &mut Book, path: &Path) -> anyhow::Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read cover: {}", path.display()))?;
    let src = source_name(path);
    book.resources.retain(|resource| resource.src != src);
    book.add_resource(src.as_str(), data);
    book.cover = Some(src);
    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

fn write_book(book: &Book, output: &Path, to: TargetFormat) -> anyhow::Result<()> {
    match to {
        TargetFormat::Zhook => Zhook::from_book(book)
            .and_then(|zhook| zhook.write(output))
            .with_context(|| format!("Failed to write zhook: {}", output.display())),
        TargetFormat::Ochook => Ochook::from_book(book)
            .and_then(|ochook| ochook.write(output))
            .with_context(|| format!("Failed to write ochook: {}", output.display())),
        TargetFormat::Html => write_components(book, output),
    }
}

/// Writes every component and resource as loose files under `dir`.
fn write_components(book: &Book, dir: &Path) -> anyhow::Result<()> {
    if dir.is_file() {
        bail!("Output path is a file: {}", dir.display());
    }
    let component_paths: Vec<PathBuf> =
        book.components.iter().map(|c| resolve_src(dir, &c.src)).collect::<quire_core::Result<_>>()?;
    let resource_paths: Vec<PathBuf> =
        book.resources.iter().map(|r| resolve_src(dir, &r.src)).collect::<quire_core::Result<_>>()?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    for (component, path) in book.components.iter().zip(component_paths) {
        fs::write(&path, component.to_html())
            .with_context(|| format!("Failed to write component: {}", path.display()))?;
    }

    for (resource, path) in book.resources.iter().zip(resource_paths) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, &resource.data).with_context(|| format!("Failed to write resource: {}", path.display()))?;
    }

    Ok(())
}
