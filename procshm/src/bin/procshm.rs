// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use clap::{Parser, Subcommand};
use procshm::config::Config;
use procshm::{log, name_max_len, process, GlobalVarStore};
use std::process::ExitCode;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Whether a segment with this name exists
    Exists { name: String },
    /// Prints the stored value, or NA if the segment is missing
    Get { name: String },
    /// Creates the segment if needed and stores the value
    Set {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Removes the segment from the OS namespace
    Unset { name: String },
    /// Longest accepted variable name on this platform
    NameMaxLen,
    /// Whether the process is running
    Alive { pid: u64 },
    /// Sends an interrupt to the process
    Interrupt { pid: u64 },
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let mut store = GlobalVarStore::from_config(config);
    match command {
        Commands::Exists { name } => println!("{}", store.exists(&name)?),
        Commands::Get { name } => match store.get(&name)? {
            Some(value) => println!("{value}"),
            None => println!("NA"),
        },
        Commands::Set { name, value } => store.set(&name, value)?,
        Commands::Unset { name } => store.unset(&name)?,
        Commands::NameMaxLen => println!("{}", name_max_len()),
        Commands::Alive { pid } => println!("{}", process::is_alive(pid)?),
        Commands::Interrupt { pid } => println!("{}", process::send_interrupt(pid)),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::get();
    if let Err(e) = log::enable_logging(&config) {
        eprintln!("procshm: could not enable logging: {e}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("procshm: {e:#}");
            ExitCode::FAILURE
        }
    }
}
