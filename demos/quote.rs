//! Quote Demo
//!
//! Resolves shipping options for a fixture set and prints the ranked rate
//! table.
//!
//! Use `-f` to load a fixture set by name (zones, cart and address files
//! sharing that name under `fixtures/`).

use std::{io, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};

use waybill::{engine::resolve, fixtures::Fixture, report::RateTable, utils::DemoQuoteArgs};

/// Quote Demo
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoQuoteArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;

    let cart = fixture.cart()?;
    let address = fixture.address()?;

    let start = Instant::now();
    let resolution = resolve(&cart, address, fixture.zone_book())?;
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    RateTable::new(resolution.options()).write_to(&mut handle)?;

    if let Some(failure) = resolution.failure() {
        println!("\nNot shippable: {failure}");
    }

    println!("\nResolved in {}", elapsed.human(Truncate::Nano));

    Ok(())
}
