use anyhow::anyhow;
use bootrtt_core::{defaults, NamedHost};
use bootrtt_dns::IpAddrFamily;
use clap::ValueEnum;
use clap_complete::Shell;
use file::ConfigFile;
use itertools::Itertools;
use serde::Deserialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// The report mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Write the plain summary and detail reports.
    Text,
    /// Print a pretty summary table.
    Pretty,
    /// Print a markdown summary table.
    Markdown,
    /// Print a CSV summary.
    Csv,
    /// Print a JSON report of the summary and every sample.
    Json,
    /// Do not print any output.
    Silent,
}

/// The address family used when resolving named hosts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressFamilyConfig {
    /// Ipv4 only.
    Ipv4,
    /// Ipv6 only.
    Ipv6,
    /// Ipv6 with a fallback to Ipv4
    #[serde(rename = "ipv6-then-ipv4")]
    Ipv6ThenIpv4,
    /// Ipv4 with a fallback to Ipv6
    #[serde(rename = "ipv4-then-ipv6")]
    Ipv4ThenIpv6,
    /// Every address returned by the OS resolver.
    System,
}

impl From<AddressFamilyConfig> for IpAddrFamily {
    fn from(value: AddressFamilyConfig) -> Self {
        match value {
            AddressFamilyConfig::Ipv4 => Self::Ipv4Only,
            AddressFamilyConfig::Ipv6 => Self::Ipv6Only,
            AddressFamilyConfig::Ipv6ThenIpv4 => Self::Ipv6thenIpv4,
            AddressFamilyConfig::Ipv4ThenIpv6 => Self::Ipv4thenIpv6,
            AddressFamilyConfig::System => Self::System,
        }
    }
}

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// The action to perform.
#[derive(Debug, Eq, PartialEq)]
pub enum BootRttAction {
    /// Probe the configured bootstrap addresses.
    Probe(BootRttConfig),
    /// Answer probes on a local address.
    Respond(RespondConfig),
    /// Print a template toml config file and exit.
    PrintConfigTemplate,
    /// Generate shell completion and exit.
    PrintShellCompletions(Shell),
    /// Generate a man page and exit.
    PrintManPage,
}

impl BootRttAction {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        Ok(if args.print_config_template {
            Self::PrintConfigTemplate
        } else if let Some(shell) = args.generate {
            Self::PrintShellCompletions(shell)
        } else if args.generate_man {
            Self::PrintManPage
        } else if args.respond.is_some() {
            Self::Respond(RespondConfig::from(args)?)
        } else {
            Self::Probe(BootRttConfig::from(args)?)
        })
    }
}

/// Logging configuration shared by every action which runs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LogConfig {
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl LogConfig {
    fn build(args: &Args, cfg_file_bootrtt: &file::ConfigBootRtt) -> Self {
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_bootrtt.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter.clone(),
            cfg_file_bootrtt.log_filter.clone(),
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_bootrtt.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        Self {
            verbose: args.verbose,
            log_format,
            log_filter,
            log_span_events,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

/// Fully parsed and validated configuration of a probe run.
#[derive(Debug, Eq, PartialEq)]
pub struct BootRttConfig {
    pub addresses: Vec<SocketAddr>,
    pub named_addresses: Vec<NamedHost>,
    pub mode: Mode,
    pub repeat: usize,
    pub probe_timeout: Duration,
    pub initial_identifier: u64,
    pub bind_address: Option<SocketAddr>,
    pub addr_family: IpAddrFamily,
    pub skip_reverse_dns: bool,
    pub summary_file: Option<String>,
    pub detail_file: Option<String>,
    pub log: LogConfig,
}

impl BootRttConfig {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        let cfg_file = read_config_file(&args)?;
        Self::build_config(args, cfg_file)
    }

    /// The local address to send probes from.
    ///
    /// Unless configured, an IPv4 wildcard is used when every address is IPv4 and an IPv6
    /// wildcard otherwise.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address.unwrap_or_else(|| {
            if self.addresses.iter().all(SocketAddr::is_ipv4) {
                SocketAddr::from(([0, 0, 0, 0], 0))
            } else {
                SocketAddr::from(([0_u16; 8], 0))
            }
        })
    }

    fn build_config(args: Args, cfg_file: ConfigFile) -> anyhow::Result<Self> {
        let cfg_file_bootrtt = cfg_file.bootrtt.unwrap_or_default();
        let cfg_file_probe = cfg_file.probe.unwrap_or_default();
        let cfg_file_dns = cfg_file.dns.unwrap_or_default();
        let cfg_file_report = cfg_file.report.unwrap_or_default();
        let log = LogConfig::build(&args, &cfg_file_bootrtt);
        let mode = cfg_layer(args.mode, cfg_file_bootrtt.mode, constants::DEFAULT_MODE);
        let repeat = cfg_layer(
            args.repeat,
            cfg_file_probe.repeat,
            defaults::DEFAULT_REPEAT,
        );
        let probe_timeout = cfg_layer(
            args.probe_timeout,
            cfg_file_probe.probe_timeout,
            defaults::DEFAULT_PROBE_TIMEOUT,
        );
        let initial_identifier = cfg_layer(
            args.initial_identifier,
            cfg_file_probe.initial_identifier,
            defaults::DEFAULT_INITIAL_IDENTIFIER,
        );
        let bind_address = cfg_layer_opt(args.bind_address, cfg_file_probe.bind_address);
        let addr_family = cfg_layer(
            args.addr_family,
            cfg_file_dns.addr_family,
            constants::DEFAULT_ADDR_FAMILY,
        );
        let skip_reverse_dns = cfg_layer_bool_flag(
            args.skip_reverse_dns,
            cfg_file_dns.skip_reverse_dns,
            constants::DEFAULT_SKIP_REVERSE_DNS,
        );
        let named_addresses = if args.named_address.is_empty() {
            cfg_file_dns
                .named_addresses
                .unwrap_or_default()
                .iter()
                .map(|host| NamedHost::from_str(host))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            args.named_address
        };
        let summary_file = cfg_layer_opt(args.summary_file, cfg_file_report.summary_file);
        let detail_file = cfg_layer_opt(args.detail_file, cfg_file_report.detail_file);
        let addresses = args.addresses.into_iter().unique().collect_vec();
        validate_addresses(&addresses)?;
        validate_repeat(repeat)?;
        validate_probe_timeout(probe_timeout)?;
        validate_report_files(mode, summary_file.as_deref(), detail_file.as_deref())?;
        Ok(Self {
            addresses,
            named_addresses,
            mode,
            repeat,
            probe_timeout,
            initial_identifier,
            bind_address,
            addr_family: IpAddrFamily::from(addr_family),
            skip_reverse_dns,
            summary_file,
            detail_file,
            log,
        })
    }
}

impl Default for BootRttConfig {
    fn default() -> Self {
        Self {
            addresses: vec![],
            named_addresses: vec![],
            mode: constants::DEFAULT_MODE,
            repeat: defaults::DEFAULT_REPEAT,
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            initial_identifier: defaults::DEFAULT_INITIAL_IDENTIFIER,
            bind_address: None,
            addr_family: IpAddrFamily::from(constants::DEFAULT_ADDR_FAMILY),
            skip_reverse_dns: constants::DEFAULT_SKIP_REVERSE_DNS,
            summary_file: None,
            detail_file: None,
            log: LogConfig::default(),
        }
    }
}

/// Fully parsed configuration of a responder.
#[derive(Debug, Eq, PartialEq)]
pub struct RespondConfig {
    pub bind_address: SocketAddr,
    pub log: LogConfig,
}

impl RespondConfig {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        let cfg_file = read_config_file(&args)?;
        Self::build_config(args, cfg_file)
    }

    fn build_config(args: Args, cfg_file: ConfigFile) -> anyhow::Result<Self> {
        let cfg_file_bootrtt = cfg_file.bootrtt.unwrap_or_default();
        let log = LogConfig::build(&args, &cfg_file_bootrtt);
        let bind_address = args
            .respond
            .ok_or_else(|| anyhow!("missing responder address"))?;
        Ok(Self { bind_address, log })
    }
}

fn read_config_file(args: &Args) -> anyhow::Result<ConfigFile> {
    Ok(if let Some(cfg) = &args.config_file {
        file::read_config_file(cfg)?
    } else {
        file::read_default_config_file()?.unwrap_or_default()
    })
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

fn cfg_layer_opt<T>(fst: Option<T>, snd: Option<T>) -> Option<T> {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => Some(val),
        (None, None) => None,
    }
}

const fn cfg_layer_bool_flag(fst: bool, snd: Option<bool>, default: bool) -> bool {
    match (fst, snd) {
        (true, _) => true,
        (false, Some(val)) => val,
        (false, None) => default,
    }
}

/// Validate that there is something to probe.
fn validate_addresses(addresses: &[SocketAddr]) -> anyhow::Result<()> {
    if addresses.is_empty() {
        Err(anyhow!("at least one bootstrap address must be given"))
    } else {
        Ok(())
    }
}

/// Validate `repeat`.
fn validate_repeat(repeat: usize) -> anyhow::Result<()> {
    if repeat == 0 {
        Err(anyhow!("repeat ({repeat}) must be greater than zero"))
    } else {
        Ok(())
    }
}

/// Validate `probe_timeout`.
fn validate_probe_timeout(probe_timeout: Duration) -> anyhow::Result<()> {
    if probe_timeout < constants::MIN_PROBE_TIMEOUT || probe_timeout > constants::MAX_PROBE_TIMEOUT
    {
        Err(anyhow!(
            "probe-timeout ({:?}) must be between {:?} and {:?} inclusive",
            probe_timeout,
            constants::MIN_PROBE_TIMEOUT,
            constants::MAX_PROBE_TIMEOUT
        ))
    } else {
        Ok(())
    }
}

/// Report files can only be written in `text` mode.
fn validate_report_files(
    mode: Mode,
    summary_file: Option<&str>,
    detail_file: Option<&str>,
) -> anyhow::Result<()> {
    match (mode, summary_file, detail_file) {
        (Mode::Text, _, _) | (_, None, None) => Ok(()),
        (_, Some(_), _) => Err(anyhow!("summary-file is only valid in text mode")),
        (_, None, Some(_)) => Err(anyhow!("detail-file is only valid in text mode")),
    }
}
