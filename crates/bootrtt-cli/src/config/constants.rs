use crate::config::{AddressFamilyConfig, LogFormat, LogSpanEvents, Mode};
use std::time::Duration;

/// The default value for `mode`.
pub const DEFAULT_MODE: Mode = Mode::Text;

/// The default value for `log-format`.
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Pretty;

/// The default value for `log-span-events`.
pub const DEFAULT_LOG_SPAN_EVENTS: LogSpanEvents = LogSpanEvents::Off;

/// The default value for `log-filter`.
pub const DEFAULT_LOG_FILTER: &str = "bootrtt=debug";

/// The default value for `addr-family`.
pub const DEFAULT_ADDR_FAMILY: AddressFamilyConfig = AddressFamilyConfig::System;

/// The default value for `skip-reverse-dns`.
pub const DEFAULT_SKIP_REVERSE_DNS: bool = false;

/// The minimum probe timeout.
pub const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(1);

/// The maximum probe timeout.
pub const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(600);
