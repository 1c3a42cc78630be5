use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use verbum::config;
use verbum::import::{run_import, ImportConfig};
use verbum::resolver::{render_passage, Resolver};
use verbum::store::BibleStore;
use verbum::text::resolve_encoding;
use verbum::toc::{self, TableOfContents};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "verbum")]
#[command(about = "Extract a plain-text Bible into SQLite and look up verses")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the text and store every verse in the database
    Import(SourceArgs),
    /// Prompt for a reference and show the verse from an existing database
    Lookup(SourceArgs),
    /// Import, then prompt for a reference
    Run(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Path to the Bible text file
    #[arg(short, long, default_value = config::DEFAULT_TEXT_PATH)]
    text: PathBuf,

    /// Path to the SQLite database
    #[arg(short, long, default_value = config::DEFAULT_DB_PATH)]
    database: PathBuf,

    /// Encoding label of the text file (WHATWG labels: `latin1` means
    /// windows-1252, so bytes 0x80-0x9F decode as punctuation, not C1 controls)
    #[arg(short, long, default_value = config::DEFAULT_ENCODING)]
    encoding: String,
}

impl SourceArgs {
    fn import_config(&self) -> ImportConfig {
        ImportConfig {
            text_path: self.text.clone(),
            db_path: self.database.clone(),
            encoding: self.encoding.clone(),
        }
    }
}

fn run_import_command(args: &SourceArgs) -> Result<()> {
    let stats = run_import(&args.import_config())?;
    println!();
    print!("{}", stats.summary());
    Ok(())
}

fn run_lookup(args: &SourceArgs) -> Result<()> {
    let encoding = resolve_encoding(&args.encoding)?;
    let store = BibleStore::new(args.database.clone());
    if !args.database.exists() || !store.table_exists()? {
        anyhow::bail!(
            "Database has no verses yet: {} (run `verbum import` first)",
            args.database.display()
        );
    }

    println!("This program will take a reference and show you a verse.");
    let toc = toc::parse_book_names(&args.text, encoding, TableOfContents::for_books())?;
    let names = toc.names()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let resolved = Resolver::new(names, stdin.lock(), stdout.lock()).resolve(&store)?;
    let Some((reference, text)) = resolved else {
        info!("Input ended before a reference was resolved");
        return Ok(());
    };

    let book_name = toc.name(reference.book)?;
    let mut out = stdout.lock();
    writeln!(out)?;
    write!(out, "{}", render_passage(book_name, reference, &text, config::WRAP_WIDTH))?;
    Ok(())
}

fn farewell(database: &Path) {
    println!();
    println!("Matthew 24:35");
    println!("=============");
    println!("Heaven and earth shall pass away, but my words shall not pass away.");
    info!(database = %database.display(), "Session closed");
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match &cli.command {
        Commands::Import(args) => run_import_command(args),
        Commands::Lookup(args) => run_lookup(args),
        Commands::Run(args) => run_import_command(args)
            .and_then(|()| run_lookup(args))
            .map(|()| farewell(&args.database)),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn encoding_help_names_windows_1252() {
        let mut cmd = Cli::command();
        for name in ["import", "lookup", "run"] {
            let sub = cmd.find_subcommand_mut(name).unwrap();
            let help = sub.render_long_help().to_string();
            assert!(help.contains("windows-1252"), "{name}: {help}");
        }
    }
}
