//! Utils

use clap::Parser;

/// Arguments for the quote demo
#[derive(Debug, Parser)]
pub struct DemoQuoteArgs {
    /// Fixture set to use for the zones, cart & address
    #[clap(short, long, default_value = "split")]
    pub fixture: String,
}
