//! This crate provides the blocking forward and reverse DNS resolver used to
//! label probe targets.
//!
//! # Example
//!
//! The following example performs a reverse DNS lookup of a bootstrap
//! address using the OS resolver:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::IpAddr;
//! # use std::str::FromStr;
//! use bootrtt_dns::{Config, DnsEntry, DnsResolver, IpAddrFamily, Resolver};
//!
//! let resolver = DnsResolver::new(Config::new(IpAddrFamily::Ipv4Only));
//! let addr = IpAddr::from_str("130.161.119.206")?;
//! match resolver.reverse_lookup(addr) {
//!     DnsEntry::Resolved(_, hosts) => println!("{addr} resolved to {hosts:?}"),
//!     DnsEntry::NotFound(_) => println!("{addr} did not match any records"),
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod dns_resolver;
mod resolver;

pub use dns_resolver::{Config, DnsResolver, IpAddrFamily};
pub use resolver::{DnsEntry, Error, ResolvedHostnames, ResolvedIpAddrs, Resolver, Result};
