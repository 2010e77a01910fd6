use crate::resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
use itertools::{Either, Itertools};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

/// How to resolve IP addresses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IpAddrFamily {
    /// Lookup IPv4 only.
    Ipv4Only,
    /// Lookup IPv6 only.
    Ipv6Only,
    /// Lookup IPv6 with a fallback to IPv4.
    Ipv6thenIpv4,
    /// Lookup IPv4 with a fallback to IPv6.
    Ipv4thenIpv6,
    /// Use every address returned by the OS resolver.
    System,
}

impl Display for IpAddrFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ipv4Only => write!(f, "Ipv4Only"),
            Self::Ipv6Only => write!(f, "Ipv6Only"),
            Self::Ipv6thenIpv4 => write!(f, "Ipv6thenIpv4"),
            Self::Ipv4thenIpv6 => write!(f, "Ipv4thenIpv6"),
            Self::System => write!(f, "System"),
        }
    }
}

/// Configuration for the `DnsResolver`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// Which address families forward lookups return.
    pub addr_family: IpAddrFamily,
}

impl Config {
    #[must_use]
    pub const fn new(addr_family: IpAddrFamily) -> Self {
        Self { addr_family }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr_family: IpAddrFamily::System,
        }
    }
}

/// A blocking DNS resolver backed by the OS resolver.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    config: Config,
}

impl DnsResolver {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the `Config`.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl Resolver for DnsResolver {
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
        let hostname = hostname.as_ref();
        let all =
            dns_lookup::lookup_host(hostname).map_err(|err| Error::LookupFailed(Box::new(err)))?;
        let addrs = filter_family(all, self.config.addr_family);
        if addrs.is_empty() {
            Err(Error::NoAddresses(hostname.to_string()))
        } else {
            Ok(ResolvedIpAddrs(addrs))
        }
    }

    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        let addr = addr.into();
        // a missing record and a failed lookup are indistinguishable here, both are `NotFound`.
        match dns_lookup::lookup_addr(&addr) {
            Ok(name) if is_numeric_form(&name, addr) => DnsEntry::NotFound(addr),
            Ok(name) => DnsEntry::Resolved(addr, vec![name]),
            Err(_) => DnsEntry::NotFound(addr),
        }
    }
}

/// `getnameinfo` falls back to the numeric form of the address when no name exists.
fn is_numeric_form(name: &str, addr: IpAddr) -> bool {
    name.parse::<IpAddr>().is_ok_and(|parsed| parsed == addr)
}

/// Restrict a set of resolved addresses to an address family.
fn filter_family(all: Vec<IpAddr>, addr_family: IpAddrFamily) -> Vec<IpAddr> {
    fn partition(all: Vec<IpAddr>) -> (Vec<IpAddr>, Vec<IpAddr>) {
        all.into_iter().partition_map(|ip| match ip {
            IpAddr::V4(_) => Either::Left(ip),
            IpAddr::V6(_) => Either::Right(ip),
        })
    }
    match addr_family {
        IpAddrFamily::Ipv4Only => partition(all).0,
        IpAddrFamily::Ipv6Only => partition(all).1,
        IpAddrFamily::Ipv6thenIpv4 => {
            let (ipv4, ipv6) = partition(all);
            if ipv6.is_empty() {
                ipv4
            } else {
                ipv6
            }
        }
        IpAddrFamily::Ipv4thenIpv6 => {
            let (ipv4, ipv6) = partition(all);
            if ipv4.is_empty() {
                ipv6
            } else {
                ipv4
            }
        }
        IpAddrFamily::System => all,
    }
}
