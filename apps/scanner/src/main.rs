//! FreshMart scanner entry point.
//!
//! ```bash
//! # Camera through zbar
//! freshmart-scanner --feed-cmd "zbarcam --raw /dev/video0"
//!
//! # A named pipe written by any decoder
//! mkfifo /tmp/freshmart.scan
//! freshmart-scanner --feed /tmp/freshmart.scan --allergies nuts --limit 5
//! ```

use clap::Parser;
use tracing::info;

use freshmart_scanner::{init_tracing, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match run(cli)? {
        Some(summary) => info!(
            session_id = %summary.session_id,
            items = summary.entries.len(),
            total = %summary.total,
            "Done"
        ),
        None => eprintln!("Input closed before setup finished; no session started."),
    }
    Ok(())
}
