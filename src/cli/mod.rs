//! The mzl Command-Line Interface.
//!
//! Builds the demo classes through their builder methods and prints the
//! results. Every failure is reported through [`output::print_error`] and
//! exits with status 1.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, DemoClass, MzlArgs, Number};
use crate::runtime::Instance;
use crate::{demo, err_msg, Args, MzlError, Value};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = MzlArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Calc { nums, sub, exp } => handle_calc(nums, sub, exp),
        Command::Scopes { nums } => handle_scopes(nums),
        Command::Defs { class, json } => handle_defs(class, json),
    };

    if let Err(e) = result {
        output::print_error(e);
        process::exit(1);
    }
}

/// Installs the stderr log subscriber. `verbose` forces debug level.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn to_args(nums: &[Number]) -> Args {
    Args::new(nums.iter().copied().map(Value::from).collect())
}

/// Handles the `calc` subcommand.
fn handle_calc(nums: Vec<Number>, sub: Vec<Number>, exp: Option<Number>) -> Result<(), MzlError> {
    let calculator = demo::calculate().controller().build(|calc| {
        calc.call("add", to_args(&nums))?;
        for n in &sub {
            calc.call("sub", to_args(std::slice::from_ref(n)))?;
        }
        if let Some(exp) = exp {
            calc.call("exp", to_args(&[exp]))?;
        }
        Ok(())
    })?;
    let total = calculator.call("total", Args::none())?;
    output::print_value(&total).map_err(io_error)
}

/// Handles the `scopes` subcommand.
fn handle_scopes(nums: Vec<Number>) -> Result<(), MzlError> {
    let add = |calc: &Instance| -> Result<(), MzlError> {
        calc.call("add", to_args(&nums))?;
        Ok(())
    };
    let holder = demo::scopes().controller().build(|scopes| {
        scopes.call_with("calculate", Args::none(), Some(&add))?;
        Ok(())
    })?;
    let child = holder.call("calculate", Args::none())?;
    let total = match child.as_object() {
        Some(calculator) => calculator.call("total", Args::none())?,
        None => {
            return Err(err_msg!(Internal, "calculate returned {}", child.describe()));
        }
    };
    output::print_value(&total).map_err(io_error)
}

/// Handles the `defs` subcommand.
fn handle_defs(class: DemoClass, json: bool) -> Result<(), MzlError> {
    let subject = demo::by_name(class.name())
        .ok_or_else(|| err_msg!(NotFound, "no demo class named '{}'", class.name()))?;
    let rows = output::def_rows(&subject.controller());
    if json {
        output::print_defs_json(&rows).map_err(|e| err_msg!(Internal, "{}", e))
    } else {
        output::print_defs(subject.name(), &rows).map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> MzlError {
    err_msg!(Internal, "failed to write output: {}", e)
}
