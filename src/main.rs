use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ebook_shelf_lib::parser::epub_parser::EpubContainer;
use ebook_shelf_lib::{
    extract_epub_chapters, extract_pdf_text, reader, resolve_title, BookType, Library,
    LibraryConfig, UploadHandler,
};

#[derive(Parser)]
#[command(name = "ebook-shelf")]
#[command(version)]
#[command(about = "EPUB/PDF shelf: upload, extract and list books", long_about = None)]
#[command(after_help = "The PDF library prints glyph warnings to stdout while extracting. \
Use --output to keep the result separate from them.")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the uploads directory
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,

    /// Override the books directory
    #[arg(long, global = true)]
    books: Option<PathBuf>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// List every book in both storage areas (default)
    Library,
    /// Read a book by its library path, e.g. uploads/moby.epub
    Read { path: String },
    /// Copy a local file into the uploads area
    Upload { file: PathBuf },
    /// Print the resolved title of a file
    Title { file: PathBuf },
    /// Extract chapters from an EPUB file
    Chapters { file: PathBuf },
    /// Extract text from a PDF file (see --output for warnings on stdout)
    PdfText { file: PathBuf },
}

fn book_type_of(file: &std::path::Path) -> anyhow::Result<BookType> {
    BookType::from_path(file)
        .with_context(|| format!("Unsupported file type: {}", file.display()))
}

/// 输出结果：指定了 `--output` 时写文件，否则打印到 stdout
fn emit(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, format!("{}\n", text))
            .with_context(|| format!("Error writing output: {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn emit_json<T: serde::Serialize>(output: Option<&Path>, value: &T) -> anyhow::Result<()> {
    emit(output, &serde_json::to_string_pretty(value)?)
}

fn main() -> anyhow::Result<()> {
    // stdout 只输出 JSON，日志写到 stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let output = cli.output.as_deref();

    let mut config = LibraryConfig::load(cli.config.as_deref())?;
    if let Some(uploads) = cli.uploads {
        config.uploads_dir = uploads;
    }
    if let Some(books) = cli.books {
        config.books_dir = books;
    }

    match cli.command.unwrap_or(Commands::Library) {
        Commands::Library => {
            emit_json(output, &Library::new(&config).list())?;
        }
        Commands::Read { path } => {
            let content = reader::read(&Library::new(&config), &path)
                .with_context(|| format!("Error reading book: {}", path))?;
            emit_json(output, &content)?;
        }
        Commands::Upload { file } => {
            let handler = UploadHandler::new(&config);
            let receipt = reader::ingest_file(&handler, &file)
                .with_context(|| format!("Error processing book: {}", file.display()))?;
            emit_json(output, &receipt)?;
        }
        Commands::Title { file } => {
            let book_type = book_type_of(&file)?;
            emit(output, &resolve_title(&file, book_type).into_value())?;
        }
        Commands::Chapters { file } => {
            anyhow::ensure!(book_type_of(&file)? == BookType::Epub, "Not an EPUB file: {}", file.display());
            let mut container = EpubContainer::open(&file)?;
            emit_json(output, &extract_epub_chapters(&mut container).into_value())?;
        }
        Commands::PdfText { file } => {
            anyhow::ensure!(book_type_of(&file)? == BookType::Pdf, "Not a PDF file: {}", file.display());
            emit(output, &extract_pdf_text(&file).into_value())?;
        }
    }

    Ok(())
}
