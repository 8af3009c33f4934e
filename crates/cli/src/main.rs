//! IO-PMP model CLI.
//!
//! This binary drives the protection model from the command line. It performs:
//! 1. **Check:** Decide a single access against a configured table.
//! 2. **Run:** Replay a JSON scenario through a gate in front of RAM and report the outcome.
//! 3. **Dump:** Print the decoded entry table.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (e.g. `RUST_LOG=iopmp_core=debug`).

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, process};
use tracing::info;
use tracing_subscriber::EnvFilter;

use iopmp_core::common::AccessKind;
use iopmp_core::config::Config;
use iopmp_core::gate::{Gate, Response, Transaction};
use iopmp_core::pmp::{Decision, IoPmp, Verdict};
use iopmp_core::soc::Bus;

#[derive(Parser, Debug)]
#[command(
    name = "iopmp",
    author,
    version,
    about = "I/O PMP behavioural model",
    long_about = "Decide accesses against an IO-PMP table, replay transaction scenarios through a gate, or dump the decoded table.\n\nConfiguration is JSON (see iopmp_core::config::Config); without --config the built-in defaults are used (16 entries, default deny, 64 KiB RAM at 0).\n\nExamples:\n  iopmp check --config cfg.json --addr 0x40 --len 4 --access write\n  iopmp run --config cfg.json --scenario scen.json\n  iopmp dump --config cfg.json"
)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide one access and print the matched entry. Exits with 1 if denied.
    Check {
        /// Start address (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        addr: u64,

        /// Length in bytes.
        #[arg(long, default_value = "1", value_parser = parse_u64)]
        len: u64,

        /// Access kind: read, write, or execute.
        #[arg(long, default_value = "read", value_parser = parse_access)]
        access: AccessKind,
    },

    /// Replay a scenario through a gate in front of RAM.
    Run {
        /// Scenario file (JSON).
        #[arg(short, long)]
        scenario: PathBuf,

        /// Print only the statistics and mismatches.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the decoded entry table.
    Dump,
}

/// Scenario replayed by `iopmp run`.
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Memory contents written before the first transaction, bypassing the gate.
    #[serde(default)]
    preload: Vec<Preload>,
    /// Transactions, in order.
    transactions: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Preload {
    address: u64,
    data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct Step {
    address: u64,
    /// Defaults to the payload length for writes and 1 otherwise.
    #[serde(default)]
    length: Option<u64>,
    access: AccessKind,
    #[serde(default)]
    data: Vec<u8>,
    #[serde(default)]
    expect: Option<Expect>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Expect {
    Allow,
    Deny,
}

impl Step {
    fn transaction(&self) -> Transaction {
        let default_len = match self.access {
            AccessKind::Write => self.data.len() as u64,
            AccessKind::Read | AccessKind::Execute => 1,
        };
        Transaction {
            address: self.address,
            length: self.length.unwrap_or(default_len),
            access: self.access,
            data: self.data.clone(),
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Check { addr, len, access } => cmd_check(&config, addr, len, access),
        Commands::Run { scenario, quiet } => cmd_run(&config, &scenario, quiet),
        Commands::Dump => cmd_dump(&config),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = read_or_exit(path);
    Config::from_json(&text).unwrap_or_else(|e| fail(format_args!("{}: {e}", path.display())))
}

fn read_or_exit(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format_args!("cannot read {}: {e}", path.display())))
}

fn build_pmp(config: &Config) -> IoPmp {
    config
        .build_pmp()
        .unwrap_or_else(|e| fail(format_args!("invalid configuration: {e}")))
}

fn fail(msg: std::fmt::Arguments<'_>) -> ! {
    eprintln!("Error: {msg}");
    process::exit(2);
}

/// Decides one access and prints the verdict with the entry that produced it.
fn cmd_check(config: &Config, addr: u64, len: u64, access: AccessKind) {
    let pmp = build_pmp(config);
    let verdict = pmp.decide(addr, len, access);
    println!("{access} [{addr:#x}, +{len:#x}) -> {}", describe_verdict(&verdict));
    if let Some(index) = verdict.matched {
        let entry = pmp.read(index);
        println!(
            "  entry {index}: {} {} {}",
            entry.mode,
            entry.permissions,
            if entry.locked { "locked" } else { "unlocked" }
        );
    }
    if !verdict.decision.is_allowed() {
        process::exit(1);
    }
}

/// Replays a scenario and exits non-zero if any expectation was not met.
fn cmd_run(config: &Config, scenario_path: &Path, quiet: bool) {
    let text = read_or_exit(scenario_path);
    let scenario: Scenario = serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(format_args!("{}: {e}", scenario_path.display())));

    info!(
        preload = scenario.preload.len(),
        transactions = scenario.transactions.len(),
        "replaying scenario"
    );

    let pmp = build_pmp(config);
    let mut bus = config
        .build_bus()
        .unwrap_or_else(|e| fail(format_args!("invalid configuration: {e}")));
    preload(&mut bus, &scenario.preload);

    let mut gate = Gate::new(pmp, bus);
    let mut mismatches = 0usize;

    for (i, step) in scenario.transactions.iter().enumerate() {
        let txn = step.transaction();
        let completion = gate
            .process(txn.clone())
            .unwrap_or_else(|e| fail(format_args!("transaction {i}: {e}")));

        let outcome = if completion.verdict.decision.is_allowed() {
            Expect::Allow
        } else {
            Expect::Deny
        };
        let mismatch = step.expect.is_some_and(|expected| expected != outcome);
        if mismatch {
            mismatches += 1;
        }

        if !quiet || mismatch {
            println!(
                "[{i:>3}] {:<7} [{:#x}, +{:#x}) {:<28} {}{}",
                txn.access.to_string(),
                txn.address,
                txn.length,
                describe_verdict(&completion.verdict),
                describe_response(&completion.response),
                if mismatch { "  MISMATCH" } else { "" }
            );
        }
    }

    println!();
    gate.stats().print();

    if mismatches > 0 {
        eprintln!("\n[!] {mismatches} expectation(s) not met");
        process::exit(1);
    }
}

fn preload(bus: &mut Bus, blobs: &[Preload]) {
    for blob in blobs {
        if let Err(e) = bus.load_binary_at(&blob.data, blob.address) {
            fail(format_args!(
                "preload of {} bytes at {:#x}: {e}",
                blob.data.len(),
                blob.address
            ));
        }
    }
}

/// Prints every entry with its decoded region.
fn cmd_dump(config: &Config) {
    let table = build_pmp(config).snapshot();
    println!(
        "{} entries, {}-bit pmpaddr, default {:?}",
        table.len(),
        table.addr_bits(),
        config.pmp.default_policy
    );
    println!("idx  cfg   pmpaddr            mode   perm  lock  region");
    for (index, entry) in table.entries().iter().enumerate() {
        let region = table
            .region(index)
            .map_or_else(|| "-".to_owned(), |r| format!("[{:#x}, {:#x})", r.start, r.end));
        println!(
            "{index:>3}  0x{:02x}  {:#018x} {:<6} {}   {}     {region}",
            entry.cfg_byte(),
            entry.base_bits,
            entry.mode,
            entry.permissions,
            if entry.locked { "L" } else { "-" },
        );
    }
}

fn describe_verdict(verdict: &Verdict) -> String {
    let matched = verdict
        .matched
        .map_or_else(|| "no match".to_owned(), |i| format!("entry {i}"));
    match verdict.decision {
        Decision::Allow => format!("ALLOW ({matched})"),
        Decision::Deny(reason) => format!("DENY ({matched}, {reason:?})"),
    }
}

fn describe_response(response: &Response) -> String {
    match response {
        Response::ReadData(data) => format!("data {data:02x?}"),
        Response::WriteAck => "ack".to_owned(),
        Response::Error(code) => format!("error: {code}"),
    }
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number `{s}`: {e}"))
}

fn parse_access(s: &str) -> Result<AccessKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "r" | "read" => Ok(AccessKind::Read),
        "w" | "write" => Ok(AccessKind::Write),
        "x" | "exec" | "execute" | "fetch" => Ok(AccessKind::Execute),
        _ => Err(format!("unknown access kind `{s}` (expected read, write, or execute)")),
    }
}
