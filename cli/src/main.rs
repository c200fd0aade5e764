//! firesim CLI — driving adapter for the firewall simulator.
//!
//! Subcommands:
//! - `check <rules>` — parse a rules file and report each rule
//! - `eval <rules> --protocol P --src IP:PORT --dst IP:PORT [--explain]` — decide one packet
//! - `simulate <rules> [--ticks N] [--seed S] [--interval-ms MS] [--json]` — run the tick loop
//! - `defaults` — print the starter rule set
//!
//! `<rules>` is a YAML/JSON simulation config or a plain file with one rule per line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use firesim::PredicateTrace;
use firesim_firewall::{
    Firewall, Packet, PacketGenerator, Protocol, RuleSet, Simulation, SimulationConfig,
    DEFAULT_RULES,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "firesim")]
#[command(version)]
#[command(about = "Educational firewall simulator", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. `info`, `firesim_firewall=debug`)
    #[arg(long, global = true, env = "FIRESIM_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a rules file
    Check { rules: PathBuf },
    /// Evaluate a single packet
    Eval {
        rules: PathBuf,
        #[arg(long)]
        protocol: Protocol,
        /// Source as IP:PORT
        #[arg(long)]
        src: SocketArg,
        /// Destination as IP:PORT
        #[arg(long)]
        dst: SocketArg,
        /// Show every rule checked
        #[arg(long)]
        explain: bool,
    },
    /// Generate random traffic against the rules
    Simulate {
        rules: PathBuf,
        /// Number of packets; overrides the config
        #[arg(long)]
        ticks: Option<u64>,
        /// RNG seed; overrides the config
        #[arg(long)]
        seed: Option<u64>,
        /// Delay between packets; overrides the config
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Emit one JSON object per packet instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the starter rule set
    Defaults,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check { rules } => cmd_check(&rules),
        Commands::Eval {
            rules,
            protocol,
            src,
            dst,
            explain,
        } => cmd_eval(&rules, protocol, src, dst, explain),
        Commands::Simulate {
            rules,
            ticks,
            seed,
            interval_ms,
            json,
        } => cmd_simulate(&rules, ticks, seed, interval_ms, json),
        Commands::Defaults => {
            cmd_defaults();
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let raw = config.raw_rules();
    let rule_set = RuleSet::parse(&raw);

    for (index, rule) in raw.iter().enumerate() {
        let status = if rule_set.rejected().contains(&rule.id) {
            "INVALID"
        } else {
            "OK"
        };
        println!("{:>3}  {status:<7}  {}", index + 1, rule.text);
    }
    println!(
        "\n{} valid, {} invalid",
        rule_set.valid_count(),
        rule_set.invalid_count()
    );

    if rule_set.invalid_count() > 0 {
        bail!("{} invalid rule(s)", rule_set.invalid_count());
    }
    Ok(())
}

fn cmd_eval(
    path: &Path,
    protocol: Protocol,
    src: SocketArg,
    dst: SocketArg,
    explain: bool,
) -> Result<()> {
    let config = load_config(path)?;
    let rule_set = RuleSet::parse(&config.raw_rules());
    let firewall = Firewall::from(&rule_set);
    let packet = Packet::new(protocol, src.ip, src.port, dst.ip, dst.port);

    if explain {
        print_explanation(&firewall, &rule_set, &packet);
    }
    println!("{packet} => {}", firewall.evaluate(&packet));
    Ok(())
}

fn cmd_simulate(
    path: &Path,
    ticks: Option<u64>,
    seed: Option<u64>,
    interval_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(ticks) = ticks {
        config.ticks = ticks;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(interval_ms) = interval_ms {
        config.interval_ms = interval_ms;
    }

    let rule_set = RuleSet::parse(&config.raw_rules());
    let mut simulation = Simulation::with_log_capacity(rule_set, config.log_capacity);
    if !simulation.can_start() {
        bail!("{} has no rules to simulate", path.display());
    }
    tracing::info!(
        valid = simulation.rules().valid_count(),
        invalid = simulation.rules().invalid_count(),
        ticks = config.ticks,
        seed = ?config.seed,
        "simulation started"
    );

    let mut generator = match config.seed {
        Some(seed) => PacketGenerator::seeded(seed),
        None => PacketGenerator::from_entropy(),
    };
    let interval = config.interval();

    for tick in 0..config.ticks {
        if tick > 0 && interval > Duration::ZERO {
            thread::sleep(interval);
        }
        let entry = simulation.tick(&mut generator);
        if json {
            println!(
                "{}",
                serde_json::to_string(entry).context("failed to serialize log entry")?
            );
        } else {
            println!("{entry}");
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string(&simulation.stats()).context("failed to serialize stats")?
        );
    } else {
        println!("\n{}", simulation.stats());
    }
    Ok(())
}

fn cmd_defaults() {
    for rule in DEFAULT_RULES {
        println!("{rule}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &Path) -> Result<SimulationConfig> {
    SimulationConfig::load(path).with_context(|| format!("cannot load {}", path.display()))
}

fn print_explanation(firewall: &Firewall, rule_set: &RuleSet, packet: &Packet) {
    let trace = firewall.evaluate_with_trace(packet);

    for step in &trace.steps {
        let text = rule_set
            .rules()
            .get(step.index)
            .map_or_else(String::new, ToString::to_string);
        let id = firewall
            .rule_id(step.index)
            .map_or_else(String::new, ToString::to_string);
        let mark = if step.matched { "MATCH" } else { "miss" };
        println!("#{} [{id}] {mark}  {text}", step.index + 1);
        print_predicate(&step.predicate_trace, 1);
    }
    if trace.used_fallback {
        println!("no rule matched, default policy applies");
    }
}

fn print_predicate(trace: &PredicateTrace, depth: usize) {
    let indent = "  ".repeat(depth);
    match trace {
        PredicateTrace::Single {
            matched,
            input,
            data,
            matcher,
        } => {
            let mark = if *matched { "ok" } else { "no" };
            println!("{indent}{mark}  {input} = {data} vs {matcher}");
        }
        PredicateTrace::And { children, .. } if children.is_empty() => {
            println!("{indent}ok  (all wildcards)");
        }
        PredicateTrace::And { children, .. } => {
            for child in children {
                print_predicate(child, depth);
            }
        }
    }
}

/// `IP:PORT` from the command line. The port is split at the last colon and
/// must be in `1..=65535`, like every packet port.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SocketArg {
    ip: String,
    port: u16,
}

impl FromStr for SocketArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected IP:PORT, got \"{s}\""))?;
        if ip.is_empty() {
            return Err(format!("missing address in \"{s}\""));
        }
        let port = port
            .parse::<u16>()
            .ok()
            .filter(|&p| p != 0)
            .ok_or_else(|| format!("invalid port \"{port}\" (expected 1-65535)"))?;
        Ok(Self {
            ip: ip.to_string(),
            port,
        })
    }
}

impl fmt::Display for SocketArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
