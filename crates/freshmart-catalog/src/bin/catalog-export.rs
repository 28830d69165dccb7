//! # Catalog Export
//!
//! Writes the embedded FreshMart table as a JSON catalog file, as a starting
//! point for a store's own catalog.
//!
//! ## Usage
//! ```bash
//! # Whole table to stdout
//! cargo run -p freshmart-catalog --bin catalog-export
//!
//! # Selected products to a file
//! cargo run -p freshmart-catalog --bin catalog-export -- \
//!     --barcode 8903363011411 --barcode 1001972587 --output ./catalog.json
//! ```
//!
//! The scanner reads the result with `--catalog ./catalog.json`.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use freshmart_catalog::{freshmart_catalog, CatalogFile};
use freshmart_core::Catalog;

#[derive(Parser, Debug)]
#[command(
    name = "catalog-export",
    version,
    about = "Export the built-in FreshMart catalog as JSON"
)]
struct Cli {
    /// Output file (stdout when omitted)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only export these barcodes, in the order given
    #[arg(short = 'b', long = "barcode")]
    barcodes: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let catalog = freshmart_catalog()?;

    let products = if cli.barcodes.is_empty() {
        catalog.products().into_iter().cloned().collect()
    } else {
        cli.barcodes
            .iter()
            .map(|barcode| catalog.require(barcode).cloned())
            .collect::<Result<Vec<_>, _>>()?
    };
    let count = products.len();
    let json = CatalogFile::new(products).to_json_pretty()?;

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    writer.write_all(json.as_bytes())?;
    writer.flush()?;

    if let Some(path) = &cli.output {
        eprintln!("✓ Exported {} products to {}", count, path.display());
    }
    Ok(())
}
