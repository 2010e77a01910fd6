use crate::config::{AddressFamilyConfig, LogFormat, LogSpanEvents, Mode};
use anyhow::Context;
use bootrtt_core::defaults;
use encoding_rs_io::DecodeReaderBytes;
use etcetera::BaseStrategy;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "bootrtt.toml";
const DEFAULT_HIDDEN_CONFIG_FILE: &str = ".bootrtt.toml";

/// Read the config from the default location of user config for the platform.
///
/// Returns the parsed `Some(ConfigFile)` if the config file exists, `None` otherwise.
///
/// bootrtt will attempt to locate a `bootrtt.toml` or `.bootrtt.toml`
/// config file in one of the following locations:
///     - the current directory
///     - the user home directory
///     - the XDG config directory (Unix only): `$XDG_CONFIG_HOME` or `~/.config`
///     - the XDG app config directory (Unix only): `$XDG_CONFIG_HOME/bootrtt` or `~/.config/bootrtt`
///     - the Windows data directory (Windows only): `%APPDATA%`
///
/// Note that only the first config file found is used, no attempt is
/// made to merge the values from multiple files.
pub fn read_default_config_file() -> anyhow::Result<Option<ConfigFile>> {
    use etcetera::base_strategy as base;
    if let Some(file) = read_files("")? {
        Ok(Some(file))
    } else {
        let basedirs = base::choose_base_strategy()?;
        if let Some(file) = read_files(basedirs.home_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir().join("bootrtt"))? {
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }
}

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    let mut decoder = DecodeReaderBytes::new(BufReader::new(file));
    let mut dest = String::new();
    decoder.read_to_string(&mut dest)?;
    toml::from_str(&dest)
        .with_context(|| format!("invalid config file: {}", path.as_ref().display()))
}

fn read_files<P: AsRef<Path>>(dir: P) -> anyhow::Result<Option<ConfigFile>> {
    if let Some(file) = read_file(dir.as_ref(), DEFAULT_CONFIG_FILE)? {
        Ok(Some(file))
    } else if let Some(file) = read_file(dir.as_ref(), DEFAULT_HIDDEN_CONFIG_FILE)? {
        Ok(Some(file))
    } else {
        Ok(None)
    }
}

fn read_file<P: AsRef<Path>>(dir: P, file: &str) -> anyhow::Result<Option<ConfigFile>> {
    let path = dir.as_ref().join(file);
    if path.exists() {
        Ok(Some(read_config_file(path)?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub bootrtt: Option<ConfigBootRtt>,
    pub probe: Option<ConfigProbe>,
    pub dns: Option<ConfigDns>,
    pub report: Option<ConfigReport>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            bootrtt: Some(ConfigBootRtt::default()),
            probe: Some(ConfigProbe::default()),
            dns: Some(ConfigDns::default()),
            report: Some(ConfigReport::default()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigBootRtt {
    pub mode: Option<Mode>,
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigBootRtt {
    fn default() -> Self {
        Self {
            mode: Some(super::constants::DEFAULT_MODE),
            log_format: Some(super::constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(super::constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(super::constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigProbe {
    pub repeat: Option<usize>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub probe_timeout: Option<Duration>,
    pub initial_identifier: Option<u64>,
    #[serde(default)]
    #[serde(deserialize_with = "socket_addr_deser")]
    pub bind_address: Option<SocketAddr>,
}

impl Default for ConfigProbe {
    fn default() -> Self {
        Self {
            repeat: Some(defaults::DEFAULT_REPEAT),
            probe_timeout: Some(defaults::DEFAULT_PROBE_TIMEOUT),
            initial_identifier: Some(defaults::DEFAULT_INITIAL_IDENTIFIER),
            bind_address: None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigDns {
    pub addr_family: Option<AddressFamilyConfig>,
    pub skip_reverse_dns: Option<bool>,
    pub named_addresses: Option<Vec<String>>,
}

impl Default for ConfigDns {
    fn default() -> Self {
        Self {
            addr_family: Some(super::constants::DEFAULT_ADDR_FAMILY),
            skip_reverse_dns: Some(super::constants::DEFAULT_SKIP_REVERSE_DNS),
            named_addresses: Some(vec![]),
        }
    }
}

#[derive(Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigReport {
    pub summary_file: Option<String>,
    pub detail_file: Option<String>,
}

fn humantime_deser<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    humantime::parse_duration(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}

fn socket_addr_deser<'de, D>(deserializer: D) -> Result<Option<SocketAddr>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    SocketAddr::from_str(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}
