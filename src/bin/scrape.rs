//! `petfood-scrape`: fetch a product page, extract it, optionally store it.
//!
//! ```text
//! petfood-scrape scrape https://www.chewy.com/... --store records.json --pretty
//! petfood-scrape scrape https://example.com/p --html saved.html
//! petfood-scrape list --store records.json
//! petfood-scrape delete 3 --store records.json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use petfood_extract::fetch::Fetcher;
use petfood_extract::url_utils::is_direct_image_url;
use petfood_extract::{Extractor, FetchedDocument, JsonStore, Lexicon, ProductRecord};

#[derive(Parser)]
#[command(name = "petfood-scrape", about = "Extract pet-food product attributes from a page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one page and print the record as JSON
    Scrape {
        url: String,
        /// Read markup from this file instead of fetching the URL
        #[arg(long)]
        html: Option<PathBuf>,
        /// Append the record to this JSON store
        #[arg(long)]
        store: Option<PathBuf>,
        /// Replace the built-in lexicon
        #[arg(long)]
        lexicon: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print every stored record
    List {
        #[arg(long)]
        store: PathBuf,
    },
    /// Remove a stored record by id
    Delete {
        id: u64,
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            url,
            html,
            store,
            lexicon,
            pretty,
        } => {
            let extractor = build_extractor(lexicon)?;
            let record = scrape(&extractor, &url, html)?;
            match store {
                Some(path) => {
                    let stored = JsonStore::open(path).append(record)?;
                    print_json(&stored, pretty)?;
                }
                None => print_json(&record, pretty)?,
            }
        }
        Commands::List { store } => {
            let records = JsonStore::open(store).list()?;
            print_json(&records, true)?;
        }
        Commands::Delete { id, store } => {
            if !JsonStore::open(&store).delete(id)? {
                bail!("no record with id {id} in {}", store.display());
            }
            eprintln!("Deleted record {id}");
        }
    }
    Ok(())
}

fn build_extractor(lexicon: Option<PathBuf>) -> anyhow::Result<Extractor> {
    let mut extractor = Extractor::new();
    if let Some(path) = lexicon {
        let table = Lexicon::from_path(&path)
            .with_context(|| format!("loading lexicon {}", path.display()))?;
        extractor = extractor.with_lexicon(table);
    }
    Ok(with_browser(extractor))
}

#[cfg(feature = "browser")]
fn with_browser(extractor: Extractor) -> Extractor {
    use std::sync::Arc;

    use petfood_extract::escalation::chromium::ChromiumFactory;
    use petfood_extract::{Escalator, SessionPool};

    let pool = Arc::new(SessionPool::new(ChromiumFactory::from_env()));
    extractor.with_escalator(Escalator::new(pool))
}

#[cfg(not(feature = "browser"))]
fn with_browser(extractor: Extractor) -> Extractor {
    extractor
}

fn scrape(extractor: &Extractor, url: &str, html: Option<PathBuf>) -> anyhow::Result<ProductRecord> {
    if html.is_none() && is_direct_image_url(url) {
        return Ok(extractor.extract_from_url_only(url).into());
    }

    let doc = match html {
        Some(path) => {
            let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            FetchedDocument::from_bytes(&bytes, None)
        }
        None => {
            let page = Fetcher::new()?
                .fetch(url)
                .with_context(|| format!("fetching {url}"))?;
            page.into_document()
        }
    };
    Ok(extractor.extract(&doc, url))
}

fn print_json(value: &impl Serialize, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
