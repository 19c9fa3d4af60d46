// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! The `quarry` command-line resolver.

use std::fmt::Write;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};

use quarry::cache::{AnswerCache, ReferralCache};
use quarry::resolver::Resolver;
use quarry::transport::UdpTransport;

mod args;
mod config;
mod shell;

use shell::Shell;

fn main() {
    env_logger::init_from_env(Env::new().default_filter_or("info"));

    if let Err(e) = try_running(args::parse()) {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
}

fn try_running(args: args::Args) -> Result<()> {
    info!(
        "Quarry v{}.{}.{} starting.",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
        env!("CARGO_PKG_VERSION_PATCH"),
    );

    let config = config::load(args).context("failed to load the configuration")?;
    let commands = File::open(&config.command_file)
        .with_context(|| format!("failed to open {}", config.command_file.display()))?;

    let resolver = Resolver::new(
        UdpTransport::new(),
        ReferralCache::with_root_hints(&config.root_hints),
        AnswerCache::new(),
        config.resolver,
    );
    let stdout = io::stdout();
    let mut shell = Shell::new(resolver, stdout.lock());
    shell
        .run(BufReader::new(commands))
        .context("failed to execute the commands")?;
    Ok(())
}
