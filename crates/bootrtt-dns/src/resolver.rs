use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use thiserror::Error;

/// A DNS resolver.
pub trait Resolver {
    /// Perform a blocking DNS hostname lookup and return the resolved IPv4 or IPv6 addresses.
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs>;

    /// Perform a blocking reverse DNS lookup of `IpAddr` and return a `DnsEntry`.
    #[must_use]
    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry;
}

/// A DNS resolver error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A DNS resolver error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("DNS lookup failed: {0}")]
    LookupFailed(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("no addresses found for {0}")]
    NoAddresses(String),
}

/// The output of a successful DNS lookup.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedIpAddrs(pub Vec<IpAddr>);

impl ResolvedIpAddrs {
    pub fn iter(&self) -> impl Iterator<Item = &'_ IpAddr> {
        self.0.iter()
    }
}

impl IntoIterator for ResolvedIpAddrs {
    type Item = IpAddr;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The state of reverse DNS resolution.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DnsEntry {
    /// The `IpAddr` resolved to one or more hostnames.
    Resolved(IpAddr, Vec<String>),
    /// The `IpAddr` could not be resolved.
    NotFound(IpAddr),
}

/// The resolved hostnames of a `DnsEntry`.
#[derive(Debug, Clone)]
pub struct ResolvedHostnames<'a>(std::slice::Iter<'a, String>);

impl<'a> Iterator for ResolvedHostnames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(String::as_str)
    }
}

impl DnsEntry {
    /// The resolved hostnames.
    #[must_use]
    pub fn hostnames(&self) -> ResolvedHostnames<'_> {
        match self {
            Self::Resolved(_, hosts) => ResolvedHostnames(hosts.iter()),
            Self::NotFound(_) =>
            {
                #[expect(clippy::iter_on_empty_collections)]
                ResolvedHostnames([].iter())
            }
        }
    }

    /// The address this entry is for.
    #[must_use]
    pub const fn addr(&self) -> IpAddr {
        match self {
            Self::Resolved(addr, _) | Self::NotFound(addr) => *addr,
        }
    }
}

impl Display for DnsEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(_, hosts) => write!(f, "{}", hosts.iter().join(" ")),
            Self::NotFound(ip) => write!(f, "{ip}"),
        }
    }
}
