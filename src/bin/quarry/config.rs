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

//! Implements the configuration file and its merging with the command
//! line.

use std::fmt::{self, Write};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use quarry::cache::{RootHint, ROOT_HINTS};
use quarry::name::Name;
use quarry::resolver;

use crate::args::Args;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// The complete, merged configuration of a run.
#[derive(Debug)]
pub struct Config {
    pub resolver: resolver::Config,
    pub root_hints: Vec<RootHint>,
    pub command_file: PathBuf,
}

/// Loads the configuration. If the arguments name a configuration file,
/// it is read first; options given on the command line take precedence
/// over its contents.
pub fn load(args: Args) -> Result<Config> {
    let file = match args.config {
        Some(ref path) => load_file(path).context("failed to load the configuration file")?,
        None => ConfigFile::default(),
    };

    let defaults = resolver::Config::default();
    let timeout = match args.timeout.or(file.timeout) {
        Some(0) => return Err(anyhow!("the timeout must be at least one second")),
        Some(secs) => Duration::from_secs(secs),
        None => defaults.timeout,
    };
    let resolver = resolver::Config {
        timeout,
        port: args.port.or(file.port).unwrap_or(defaults.port),
        max_referrals: args
            .max_referrals
            .or(file.max_referrals)
            .unwrap_or(defaults.max_referrals),
        max_cname_chain: file.max_cname_chain.unwrap_or(defaults.max_cname_chain),
    };
    let root_hints = if file.root_hints.is_empty() {
        ROOT_HINTS.clone()
    } else {
        file.root_hints
            .into_iter()
            .map(|hint| RootHint {
                name: hint.name.0,
                address: hint.address,
            })
            .collect()
    };

    let config = Config {
        resolver,
        root_hints,
        command_file: args.command_file,
    };
    log_config_summary(&config);
    Ok(config)
}

/// Reads and parses the configuration file at `path`.
fn load_file(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).context("failed to parse the configuration file")
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        return;
    }

    let mut message = format!(
        "Configuration loaded:\n\
         Command file:    {}\n\
         Timeout:         {:?}\n\
         Port:            {}\n\
         Max referrals:   {}\n\
         Max CNAME chain: {}\n\
         Root hints:      {}",
        config.command_file.display(),
        config.resolver.timeout,
        config.resolver.port,
        config.resolver.max_referrals,
        config.resolver.max_cname_chain,
        config.root_hints.len(),
    );
    for hint in &config.root_hints {
        let _ = write!(message, "\n  {} {}", hint.name, hint.address);
    }
    debug!("{}", message);
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The configuration file. Every setting is optional.
///
/// ```toml
/// timeout = 3
/// port = 53
/// max_referrals = 32
/// max_cname_chain = 8
///
/// [[root_hints]]
/// name = "a.root-servers.net."
/// address = "198.41.0.4"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub timeout: Option<u64>,
    pub port: Option<u16>,
    pub max_referrals: Option<usize>,
    pub max_cname_chain: Option<usize>,
    #[serde(default)]
    pub root_hints: Vec<RootHintConfig>,
}

/// A root hint given in the configuration file. Hints given in the file
/// replace the built-in ones.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootHintConfig {
    pub name: ConfigName,
    pub address: IpAddr,
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER QUARRY TYPES FOR SERDE                               //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`quarry`], using its [`FromStr`](std::str::FromStr)
/// implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper over a [`quarry`]
        /// type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, "domain name");

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn args(config: Option<PathBuf>) -> Args {
        Args {
            config,
            timeout: None,
            max_referrals: None,
            port: None,
            command_file: PathBuf::from("commands.txt"),
        }
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = load(args(None)).unwrap();
        assert_eq!(config.resolver, resolver::Config::default());
        assert_eq!(config.root_hints, *ROOT_HINTS);
        assert_eq!(config.command_file, PathBuf::from("commands.txt"));
    }

    #[test]
    fn config_file_parses() {
        let file: ConfigFile = toml::from_str(
            "timeout = 1\n\
             max_cname_chain = 4\n\
             [[root_hints]]\n\
             name = \"ns.quarry.test\"\n\
             address = \"127.0.0.53\"\n",
        )
        .unwrap();
        assert_eq!(file.timeout, Some(1));
        assert_eq!(file.port, None);
        assert_eq!(file.max_cname_chain, Some(4));
        assert_eq!(file.root_hints.len(), 1);
        assert_eq!(file.root_hints[0].name.0, "ns.quarry.test.".parse::<Name>().unwrap());
        assert_eq!(
            file.root_hints[0].address,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 53))
        );
    }

    #[test]
    fn config_file_rejects_unknown_fields() {
        assert!(toml::from_str::<ConfigFile>("forwarders = []\n").is_err());
        assert!(toml::from_str::<ConfigFile>(
            "[[root_hints]]\nname = \"a.\"\naddress = \"192.0.2.1\"\nttl = 5\n"
        )
        .is_err());
    }

    #[test]
    fn config_file_rejects_invalid_names() {
        let result = toml::from_str::<ConfigFile>(
            "[[root_hints]]\nname = \"a..b\"\naddress = \"192.0.2.1\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn command_line_overrides_file() {
        let path = std::env::temp_dir().join(format!("quarry-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            "timeout = 9\nport = 5353\nmax_referrals = 2\n\
             [[root_hints]]\nname = \"ns.quarry.test.\"\naddress = \"127.0.0.53\"\n",
        )
        .unwrap();
        let mut args = args(Some(path.clone()));
        args.timeout = Some(1);
        let config = load(args);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.resolver.timeout, Duration::from_secs(1));
        assert_eq!(config.resolver.port, 5353);
        assert_eq!(config.resolver.max_referrals, 2);
        assert_eq!(config.resolver.max_cname_chain, 8);
        assert_eq!(
            config.root_hints,
            [RootHint {
                name: "ns.quarry.test.".parse().unwrap(),
                address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 53)),
            }]
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut zero = args(None);
        zero.timeout = Some(0);
        let err = load(zero).unwrap_err();
        assert!(err.to_string().contains("timeout"));

        let path = std::env::temp_dir().join(format!("quarry-zero-{}.toml", std::process::id()));
        fs::write(&path, "timeout = 0\n").unwrap();
        let result = load(args(Some(path.clone())));
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/quarry.toml");
        assert!(load(args(Some(path))).is_err());
    }
}
