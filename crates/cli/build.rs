use std::{env, fs, path::PathBuf};

fn input_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::arg!(<INPUT> ... "A .zhook file, an ochook directory, or HTML files in reading order")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(clap::arg!(--componentize "Split the book into one component per top-level article"))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let outline = input_args(clap::Command::new("outline").about("Print the chapter tree of a book"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, text, html)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["json", "text", "html"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        );

    let convert = input_args(clap::Command::new("convert").about("Convert a book into another package format"))
        .arg(
            clap::arg!(-o --output <OUTPUT> "Output path: a .zhook file, or a directory for ochook and html")
                .value_name("OUTPUT")
                .required(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-t --to <FORMAT> "Target format (zhook, ochook, html)")
                .value_name("FORMAT")
                .default_value("zhook")
                .value_parser(["zhook", "ochook", "html"]),
        )
        .arg(
            clap::arg!(--cover <FILE> "Image to package as the book's cover")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        );

    let mut cmd = clap::Command::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Quire Contributors")
        .about("Outline, split and repackage HTML-based ebooks")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand_required(true)
        .subcommand(outline)
        .subcommand(convert);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "quire", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "quire", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "quire", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "quire", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
