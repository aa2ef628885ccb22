//! Defines the command-line arguments and subcommands for the mzl CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};

use crate::Value;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "mzl",
    version,
    about = "Builds the demo classes of the mzl builder-method engine."
)]
pub struct MzlArgs {
    /// Log at debug level, ignoring RUST_LOG.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add numbers on a Calculate, then apply subtractions and an exponent.
    Calc {
        /// Numbers to add.
        #[arg(required = true, allow_negative_numbers = true)]
        nums: Vec<Number>,
        /// Subtract a number after adding (repeatable).
        #[arg(long = "sub", allow_negative_numbers = true)]
        sub: Vec<Number>,
        /// Raise the total to this power last.
        #[arg(long, allow_negative_numbers = true)]
        exp: Option<Number>,
    },
    /// Add numbers through the calculator child of a Scopes.
    Scopes {
        /// Numbers to add.
        #[arg(required = true, allow_negative_numbers = true)]
        nums: Vec<Number>,
    },
    /// List the builder methods of a demo class.
    Defs {
        #[arg(value_enum)]
        class: DemoClass,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoClass {
    Calculate,
    Scopes,
}

impl DemoClass {
    pub fn name(self) -> &'static str {
        match self {
            DemoClass::Calculate => "calculate",
            DemoClass::Scopes => "scopes",
        }
    }
}

/// Numeric command-line argument; integers stay integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl FromStr for Number {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Number::Int(n));
        }
        s.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("'{s}' is not a number"))
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(n) => Value::Int(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}
