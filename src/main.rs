//! txtpub - convert a plain-text novel into an EPUB

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use txtpub::{Conversion, EpubConfig, Metadata};

#[derive(Parser)]
#[command(name = "txtpub")]
#[command(version, about = "Convert a plain-text novel into an EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    txtpub --name 三体 --author 刘慈欣 --output out
        Convert ./三体.txt into out/三体.epub
    txtpub --name 三体 --author 刘慈欣 --output out --input books/santi.txt --title-page")]
struct Cli {
    /// Book name; also selects the input file <NAME>.txt and the archive name
    #[arg(long, value_name = "NAME")]
    name: String,

    /// Folder where the EPUB tree and archive are written
    #[arg(long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Author of the book
    #[arg(long, value_name = "AUTHOR")]
    author: String,

    /// Read the text from this file instead of <NAME>.txt
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// dc:language of the package
    #[arg(long, default_value = txtpub::book::DEFAULT_LANGUAGE)]
    language: String,

    /// Package identifier (default: derived from name and author)
    #[arg(long)]
    identifier: Option<String>,

    /// Add a title page before the first chapter
    #[arg(long)]
    title_page: bool,

    /// Deflate level for archive entries (1-9, 0 stores them uncompressed)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: Option<u32>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match convert(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn convert(cli: Cli) -> txtpub::Result<()> {
    let mut metadata = Metadata::new(cli.name)
        .with_author(cli.author)
        .with_language(cli.language);
    if let Some(identifier) = cli.identifier {
        metadata = metadata.with_identifier(identifier);
    }

    let mut epub = EpubConfig::new().with_title_page(cli.title_page);
    if let Some(level) = cli.compression_level {
        epub = epub.with_compression_level(level);
    }

    let mut conversion = Conversion::new(metadata, cli.output).with_epub_config(epub);
    if let Some(input) = cli.input {
        conversion = conversion.with_input(input);
    }

    let report = conversion.run()?;
    tracing::info!(
        chapters = report.chapters,
        encoding = report.encoding.map_or("undetermined", |e| e.label()),
        archive = %report.archive.display(),
        "conversion finished"
    );
    Ok(())
}
