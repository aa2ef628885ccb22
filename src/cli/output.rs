//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout; errors are rendered as miette reports on stderr.
//! Color is only used when stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use miette::Report;
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::dsl::Controller;
use crate::runtime::CollectionKind;
use crate::{MzlError, Value};

/// One row of `mzl defs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefRow {
    pub name: String,
    pub persistent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<&'static str>,
}

/// Builder methods of a controller, in registration order.
pub fn def_rows(controller: &Controller) -> Vec<DefRow> {
    controller
        .registry()
        .iter()
        .map(|(name, def)| DefRow {
            name: name.clone(),
            persistent: def.is_persistent(),
            collection: match def.collection {
                CollectionKind::None => None,
                CollectionKind::List => Some("list"),
                CollectionKind::Map => Some("map"),
            },
        })
        .collect()
}

fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Prints a builder-method result.
pub fn print_value(value: &Value) -> io::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "{value}")?;
    out.reset()?;
    writeln!(out)
}

/// Prints the builder methods of `class` as an aligned table.
pub fn print_defs(class: &str, rows: &[DefRow]) -> io::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "{class}")?;
    out.reset()?;

    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    for row in rows {
        write!(out, "  {:<width$}  ", row.name)?;
        if row.persistent {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "persistent")?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(out, "scope")?;
        }
        out.reset()?;
        match row.collection {
            Some(kind) => writeln!(out, " ({kind})")?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}

/// Prints the builder methods as a JSON array.
pub fn print_defs_json(rows: &[DefRow]) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(rows)?;
    println!("{json}");
    Ok(())
}

/// Renders an error as a miette report on stderr.
pub fn print_error(error: MzlError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
