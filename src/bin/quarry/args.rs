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

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Quarry, an iterative DNS resolver
///
/// Reads commands (`resolve <NAME> <TYPE>`, `print`, `quit`) from
/// COMMAND_FILE, one per line, and executes them in order.
#[derive(Debug, Parser)]
#[command(author, version)]
pub struct Args {
    /// Set the configuration file to use
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set how long to wait for each nameserver, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Set how many referrals a single descent may follow
    #[arg(long, value_name = "N")]
    pub max_referrals: Option<usize>,

    /// Set the port that nameservers are queried on
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// The file to read commands from
    #[arg(value_name = "COMMAND_FILE")]
    pub command_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "quarry",
            "--timeout",
            "5",
            "--max-referrals",
            "10",
            "--port",
            "5353",
            "commands.txt",
        ])
        .unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.timeout, Some(5));
        assert_eq!(args.max_referrals, Some(10));
        assert_eq!(args.port, Some(5353));
        assert_eq!(args.command_file, PathBuf::from("commands.txt"));
    }

    #[test]
    fn command_file_is_required() {
        assert!(Args::try_parse_from(["quarry", "--port", "53"]).is_err());
    }
}
