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

//! Implements the command shell.
//!
//! Commands are read one per line. Each is echoed, executed, and
//! followed by a banner of asterisks:
//!
//! * `resolve <NAME> <TYPE>` resolves a question and prints the answer;
//! * `print` prints the contents of both caches; and
//! * `quit` stops processing.

use std::io::{self, BufRead, Write};

use quarry::cache::{AnswerCache, ReferralCache, ReferralValue};
use quarry::name::Name;
use quarry::resolver::{Resolution, Resolver};
use quarry::rr::Type;
use quarry::transport::Transport;

/// The width of the dashed and starred separators.
const SEPARATOR_WIDTH: usize = 80;

/// Whether to keep reading commands after the current one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The command shell, writing its output to `out`.
pub struct Shell<T, W> {
    resolver: Resolver<T>,
    out: W,
}

impl<T: Transport, W: Write> Shell<T, W> {
    pub fn new(resolver: Resolver<T>, out: W) -> Self {
        Self { resolver, out }
    }

    /// Executes every command from `input` until it is exhausted or a
    /// `quit` command is read.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<Flow> {
        for line in input.lines() {
            if self.execute(&line?)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Executes a single command line. Blank lines are ignored.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim_end();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }

        writeln!(self.out, "COMMAND:  {}", line)?;
        match tokens[0] {
            "resolve" => self.resolve(line, &tokens[1..])?,
            "print" => self.print_caches()?,
            "quit" => {
                writeln!(self.out, "Program terminated")?;
                return Ok(Flow::Quit);
            }
            _ => writeln!(self.out, "Unknown command: {}; Skipping it.", line)?,
        }
        writeln!(self.out, "{}\n", "*".repeat(SEPARATOR_WIDTH))?;
        Ok(Flow::Continue)
    }

    fn resolve(&mut self, line: &str, arguments: &[&str]) -> io::Result<()> {
        let (name, rr_type) = match parse_question(arguments) {
            Ok(question) => question,
            Err(reason) => {
                return writeln!(self.out, "Invalid command: {} ({}); Skipping it.", line, reason)
            }
        };

        let Resolution { outcome, latency } = self.resolver.resolve(&name, rr_type);
        let dashes = "-".repeat(SEPARATOR_WIDTH);
        writeln!(self.out, "{}", dashes)?;
        writeln!(self.out, "*** QUERY {} for RRType {}", name, rr_type)?;
        if matches!(outcome, Ok(ref answer) if answer.from_cache) {
            writeln!(self.out, "*** Answer found in cache")?;
        }
        writeln!(
            self.out,
            "*** FINAL RESPONSE found with latency {:?}\n",
            latency.as_secs_f64()
        )?;
        match outcome {
            Ok(answer) => writeln!(self.out, "{}", answer.text)?,
            Err(err) => writeln!(self.out, "*** FAILED: {}", err)?,
        }
        writeln!(self.out, "{}\n", dashes)
    }

    fn print_caches(&mut self) -> io::Result<()> {
        writeln!(self.out, "Answer cache contents:\n")?;
        print_answer_cache(&mut self.out, self.resolver.answers())?;
        writeln!(self.out, "Referral cache contents:\n")?;
        print_referral_cache(&mut self.out, self.resolver.referrals())
    }
}

/// Parses the arguments of a `resolve` command.
fn parse_question(arguments: &[&str]) -> Result<(Name, Type), String> {
    match arguments {
        [name, rr_type] => {
            let name = name.parse().map_err(|e| format!("invalid name: {}", e))?;
            let rr_type = rr_type
                .parse()
                .map_err(|_| format!("unknown record type {}", rr_type))?;
            Ok((name, rr_type))
        }
        _ => Err(String::from("expected a name and a record type")),
    }
}

////////////////////////////////////////////////////////////////////////
// CACHE PRINTING                                                     //
////////////////////////////////////////////////////////////////////////

/// Returns the indentation for nesting level `level`.
fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn print_answer_cache(out: &mut impl Write, cache: &AnswerCache) -> io::Result<()> {
    for (name, entry) in cache.iter() {
        writeln!(out, "{} :", name)?;
        for (rr_type, text) in entry {
            writeln!(out, "{}{} :", indent(1), rr_type)?;
            writeln!(out, "{}{}\n", indent(2), text)?;
        }
    }
    Ok(())
}

fn print_referral_cache(out: &mut impl Write, cache: &ReferralCache) -> io::Result<()> {
    let mut entries: Vec<_> = cache.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, entry) in entries {
        writeln!(out, "{} :", name)?;
        for (rr_type, values) in entry {
            writeln!(out, "{}{} :", indent(1), rr_type)?;
            writeln!(out, "{}{}\n", indent(2), format_list(values))?;
        }
    }
    Ok(())
}

/// Formats a list of values as `['first', 'second']`.
fn format_list(values: &[ReferralValue]) -> String {
    let values: Vec<String> = values.iter().map(|value| format!("'{}'", value)).collect();
    format!("[{}]", values.join(", "))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use quarry::cache::ROOT_HINTS;
    use quarry::message::Message;
    use quarry::resolver::Config;
    use quarry::transport;
    use std::io::Cursor;
    use std::net::SocketAddr;
    use std::time::Duration;

    /// A transport whose queries always time out.
    struct SilentTransport;

    impl Transport for SilentTransport {
        fn query(
            &mut self,
            _query: &Message,
            _server: SocketAddr,
            _timeout: Duration,
        ) -> Result<Message, transport::Error> {
            Err(transport::Error::Timeout)
        }
    }

    fn shell() -> Shell<SilentTransport, Vec<u8>> {
        let resolver = Resolver::new(
            SilentTransport,
            ReferralCache::with_root_hints(&ROOT_HINTS),
            AnswerCache::new(),
            Config::default(),
        );
        Shell::new(resolver, Vec::new())
    }

    fn output(shell: Shell<SilentTransport, Vec<u8>>) -> String {
        String::from_utf8(shell.out).unwrap()
    }

    fn stars() -> String {
        "*".repeat(80)
    }

    #[test]
    fn unknown_commands_are_skipped() {
        let mut shell = shell();
        assert_eq!(shell.execute("frobnicate now").unwrap(), Flow::Continue);
        assert_eq!(
            output(shell),
            format!(
                "COMMAND:  frobnicate now\n\
                 Unknown command: frobnicate now; Skipping it.\n\
                 {}\n\n",
                stars()
            )
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut shell = shell();
        assert_eq!(shell.execute("   ").unwrap(), Flow::Continue);
        assert_eq!(shell.execute("").unwrap(), Flow::Continue);
        assert_eq!(output(shell), "");
    }

    #[test]
    fn quit_stops_processing() {
        let mut shell = shell();
        let input = Cursor::new("\nquit\nprint\n");
        assert_eq!(shell.run(input).unwrap(), Flow::Quit);
        assert_eq!(output(shell), "COMMAND:  quit\nProgram terminated\n");
    }

    #[test]
    fn failed_resolution_is_reported() {
        let mut shell = shell();
        shell.execute("resolve www.example.com A").unwrap();
        let output = output(shell);
        assert!(output.starts_with("COMMAND:  resolve www.example.com A\n"));
        assert!(output.contains("*** QUERY www.example.com. for RRType A\n"));
        assert!(!output.contains("*** Answer found in cache"));
        assert!(output.contains("*** FAILED: SERVFAIL: no nameserver for . responded\n"));
        assert!(output.ends_with(&format!("{}\n\n", stars())));
    }

    #[test]
    fn cached_answers_are_reported() {
        let mut shell = shell();
        let name: Name = "www.example.com.".parse().unwrap();
        shell
            .resolver
            .answers_mut()
            .insert(name, Type::A, "rendered answer".into());
        shell.execute("resolve WWW.example.com. a").unwrap();
        let output = output(shell);
        assert!(output.contains(
            "*** QUERY www.example.com. for RRType A\n\
             *** Answer found in cache\n\
             *** FINAL RESPONSE found with latency 0.0\n\n\
             rendered answer\n"
        ));
    }

    #[test]
    fn malformed_resolve_commands_are_skipped() {
        let mut shell = shell();
        shell.execute("resolve www.example.com").unwrap();
        shell.execute("resolve www.example.com BOGUS").unwrap();
        let output = output(shell);
        assert!(output.contains(
            "Invalid command: resolve www.example.com (expected a name and a record type)"
        ));
        assert!(output.contains("unknown record type BOGUS"));
    }

    #[test]
    fn print_dumps_both_caches() {
        let mut shell = shell();
        let name: Name = "www.example.com.".parse().unwrap();
        shell
            .resolver
            .answers_mut()
            .insert(name, Type::A, "rendered answer".into());
        shell.execute("print").unwrap();
        assert_eq!(
            output(shell),
            format!(
                "COMMAND:  print\n\
                 Answer cache contents:\n\n\
                 www.example.com. :\n\
                 \x20 A :\n\
                 \x20   rendered answer\n\n\
                 Referral cache contents:\n\n\
                 . :\n\
                 \x20 NS :\n\
                 \x20   ['a.root-servers.net.', 'b.root-servers.net.']\n\n\
                 a.root-servers.net. :\n\
                 \x20 A :\n\
                 \x20   ['198.41.0.4']\n\n\
                 b.root-servers.net. :\n\
                 \x20 A :\n\
                 \x20   ['199.9.14.201']\n\n\
                 {}\n\n",
                stars()
            )
        );
    }
}
