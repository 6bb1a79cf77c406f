//! Rate Table
//!
//! Caller-facing presentation of ranked shipping options. All two-decimal
//! rounding happens here, via `Money`'s `Display`; the engine itself keeps
//! exact minor units throughout.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};
use thiserror::Error;

use crate::ranking::RateOption;

/// Errors that can occur when writing a rate table.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// A printable table of ranked shipping options.
#[derive(Debug)]
pub struct RateTable<'a, 'r> {
    options: &'r [RateOption<'a>],
}

impl<'a, 'r> RateTable<'a, 'r> {
    /// Create a rate table over ranked options.
    #[must_use]
    pub fn new(options: &'r [RateOption<'a>]) -> Self {
        Self { options }
    }

    /// Write the table, followed by a one-line summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if writing to the output fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();

        builder.push_record(["#", "Option", "Delivery", "Price", "Notes"]);

        for (idx, option) in self.options.iter().enumerate() {
            builder.push_record([
                format!("{}", idx + 1),
                option.label().to_string(),
                option.estimated_delivery().to_string(),
                format!("{}", option.combination().total()),
                option_notes(option),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        match self.options.first() {
            Some(best) => writeln!(
                out,
                "\nBest option: {} at {}",
                best.label(),
                best.combination().total()
            ),
            None => writeln!(out, "\nNo shipping options available"),
        }
        .map_err(|_err| ReportError::IO)
    }
}

/// Collect the advisory notes for one option: forced fallbacks, free-shipping
/// reasons and per-package limit breaches.
fn option_notes(option: &RateOption<'_>) -> String {
    let mut notes: Vec<String> = Vec::new();

    if option.combination().forced_fallback() {
        notes.push("items forced onto a national zone".to_string());
    }

    for selection in option.combination().selections() {
        if let Some(reason) = selection.price().free_reason() {
            notes.push(reason.to_string());
        }

        for breach in selection.price().limit_breaches() {
            notes.push(breach.to_string());
        }
    }

    notes.join("\n")
}
