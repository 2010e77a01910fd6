use crate::config::{AddressFamilyConfig, LogFormat, LogSpanEvents, Mode};
use bootrtt_core::NamedHost;
use clap::builder::Styles;
use clap::Parser;
use clap_complete::Shell;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Measure round trip times to a set of bootstrap peers
#[derive(Parser, Debug)]
#[command(name = "bootrtt", author, version, about, long_about = None, arg_required_else_help(true), styles=Styles::styled())]
pub struct Args {
    /// A space delimited list of bootstrap addresses (ip:port) to probe
    pub addresses: Vec<SocketAddr>,

    /// A named bootstrap host (host:port) used to label the addresses it resolves to
    #[arg(long, value_parser = parse_named_host)]
    pub named_address: Vec<NamedHost>,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// Output mode [default: text]
    #[arg(value_enum, short = 'm', long)]
    pub mode: Option<Mode>,

    /// The number of times each address is probed [default: 10]
    #[arg(short = 'r', long)]
    pub repeat: Option<usize>,

    /// How long to wait for each response [default: 5s]
    #[arg(short = 't', long, value_parser = parse_duration)]
    pub probe_timeout: Option<Duration>,

    /// The identifier of the first probe [default: 1]
    #[arg(long)]
    pub initial_identifier: Option<u64>,

    /// The local address to send probes from [default: 0.0.0.0:0 or [::]:0]
    #[arg(short = 'B', long)]
    pub bind_address: Option<SocketAddr>,

    /// The address family used to resolve named hosts [default: system]
    #[arg(value_enum, short = 'F', long)]
    pub addr_family: Option<AddressFamilyConfig>,

    /// Do not label addresses using reverse DNS [default: false]
    #[arg(long)]
    pub skip_reverse_dns: bool,

    /// Write the summary report to a file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub summary_file: Option<String>,

    /// Write the detail report to a file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub detail_file: Option<String>,

    /// Answer probes received on the given address instead of probing
    #[arg(long, conflicts_with = "addresses")]
    pub respond: Option<SocketAddr>,

    /// Generate shell completion
    #[arg(long)]
    pub generate: Option<Shell>,

    /// Generate ROFF man page
    #[arg(long)]
    pub generate_man: bool,

    /// Print a template toml config file and exit
    #[arg(long)]
    pub print_config_template: bool,

    /// The debug log format [default: pretty]
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: bootrtt=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}

fn parse_named_host(value: &str) -> anyhow::Result<NamedHost> {
    Ok(NamedHost::from_str(value)?)
}
