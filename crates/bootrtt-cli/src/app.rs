use crate::config::{BootRttConfig, LogConfig, LogFormat, LogSpanEvents, Mode, RespondConfig};
use crate::report;
use bootrtt_core::{Builder, Labeller, Prober, Responder, ResultTable, TargetQueue};
use bootrtt_dns::{Config, DnsResolver};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

/// The results of a completed probe run.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub results: ResultTable,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
}

impl RunInfo {
    pub const fn new(
        results: ResultTable,
        start_timestamp: DateTime<Utc>,
        end_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            results,
            start_timestamp,
            end_timestamp,
        }
    }
}

/// Run the bootrtt prober and report the results.
pub fn run_bootrtt(cfg: &BootRttConfig) -> anyhow::Result<()> {
    configure_logging(&cfg.log);
    let queue = build_queue(cfg);
    let prober = Builder::new(queue)
        .probe_timeout(cfg.probe_timeout)
        .initial_identifier(cfg.initial_identifier)
        .build()?;
    let info = run_prober(prober, cfg.bind_address())?;
    match cfg.mode {
        Mode::Text => report::text::report(
            &info,
            cfg.summary_file.as_deref(),
            cfg.detail_file.as_deref(),
        ),
        Mode::Pretty => report::table::report_pretty(&info),
        Mode::Markdown => report::table::report_md(&info),
        Mode::Csv => report::csv::report(&info),
        Mode::Json => report::json::report(&info),
        Mode::Silent => report::silent::report(&info),
    }
}

/// Run a responder until it fails.
pub fn run_responder(cfg: &RespondConfig) -> anyhow::Result<()> {
    configure_logging(&cfg.log);
    let bind_address = cfg.bind_address;
    runtime()?.block_on(async move {
        let responder = Responder::bind(bind_address).await?;
        info!(local_addr = %responder.local_addr(), "responding to probes");
        responder.run().await
    })?;
    Ok(())
}

/// Label the configured addresses and build the queue of targets.
fn build_queue(cfg: &BootRttConfig) -> TargetQueue {
    let resolver = DnsResolver::new(Config::new(cfg.addr_family));
    let mut labeller = Labeller::new(&resolver, &cfg.named_addresses, !cfg.skip_reverse_dns);
    TargetQueue::build(&cfg.addresses, cfg.repeat, &mut labeller)
}

/// Run the prober to completion on a single threaded runtime.
fn run_prober(prober: Prober, bind_address: SocketAddr) -> anyhow::Result<RunInfo> {
    let start_timestamp = Utc::now();
    let results = runtime()?.block_on(prober.run_udp(bind_address))?;
    let end_timestamp = Utc::now();
    Ok(RunInfo::new(results, start_timestamp, end_timestamp))
}

fn runtime() -> anyhow::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Configure the logging subscriber.
///
/// Logs are written to stderr so that stdout carries only the report.
fn configure_logging(cfg: &LogConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .json()
                    .init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootrtt_core::Target;
    use std::time::Duration;

    #[test]
    fn test_build_queue_without_dns() {
        let cfg = BootRttConfig {
            addresses: vec![
                SocketAddr::from(([192, 0, 2, 1], 6421)),
                SocketAddr::from(([192, 0, 2, 2], 6421)),
            ],
            repeat: 2,
            skip_reverse_dns: true,
            ..BootRttConfig::default()
        };
        let mut queue = build_queue(&cfg);
        assert_eq!(4, queue.len());
        let first = queue.pop().unwrap();
        let second = queue.pop().unwrap();
        assert_eq!(
            Target::new("unknown-1", SocketAddr::from(([192, 0, 2, 1], 6421))),
            first
        );
        assert_eq!(
            Target::new("unknown-2", SocketAddr::from(([192, 0, 2, 2], 6421))),
            second
        );
        assert_eq!(Some(first), queue.pop());
        assert_eq!(Some(second), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn test_run_responder_and_prober() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = std::thread::spawn(move || {
            runtime().unwrap().block_on(async move {
                let responder = Responder::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
                tx.send(responder.local_addr()).unwrap();
                responder.run().await
            })
        });
        let responder_addr = rx.recv().unwrap();
        let cfg = BootRttConfig {
            addresses: vec![responder_addr],
            repeat: 2,
            probe_timeout: Duration::from_secs(2),
            bind_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
            skip_reverse_dns: true,
            ..BootRttConfig::default()
        };
        let prober = Builder::new(build_queue(&cfg))
            .probe_timeout(cfg.probe_timeout)
            .build()
            .unwrap();
        let info = run_prober(prober, cfg.bind_address()).unwrap();
        assert_eq!(2, info.results.total_attempts());
        assert_eq!(2, info.results.total_responses());
        assert!(info.start_timestamp <= info.end_timestamp);
        assert!(!handle.is_finished());
    }
}
