use crate::error::Error;
use bootrtt_dns::Resolver;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// A labelled address to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub label: String,
    pub addr: SocketAddr,
}

impl Target {
    #[must_use]
    pub fn new(label: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            label: label.into(),
            addr,
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.addr)
    }
}

/// A bootstrap host known by name, used to label the addresses it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedHost {
    pub hostname: String,
    pub port: u16,
}

impl NamedHost {
    #[must_use]
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

impl FromStr for NamedHost {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hostname, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::BadConfig(format!("expected host:port, got {s}")))?;
        if hostname.is_empty() {
            return Err(Error::BadConfig(format!("missing hostname in {s}")));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::BadConfig(format!("invalid port in {s}")))?;
        Ok(Self::new(hostname, port))
    }
}

impl Display for NamedHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// Issues placeholder labels for addresses which could not be named.
///
/// Every label issued by one generator is distinct.
#[derive(Debug, Default)]
pub struct PlaceholderLabels {
    issued: usize,
}

impl PlaceholderLabels {
    #[must_use]
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    pub fn next_label(&mut self) -> String {
        self.issued += 1;
        format!("unknown-{}", self.issued)
    }
}

/// Assigns a label to each probed address.
///
/// An address is labelled, in order of preference, with:
///
/// 1 - the name of a named host which resolves to the same address and port
/// 2 - the first hostname from a reverse DNS lookup (if enabled)
/// 3 - a placeholder label
pub struct Labeller<'a, R> {
    resolver: &'a R,
    named: HashMap<SocketAddr, String>,
    reverse_dns: bool,
    placeholders: PlaceholderLabels,
}

impl<'a, R: Resolver> Labeller<'a, R> {
    /// Create a `Labeller`, resolving all named hosts up front.
    ///
    /// Named hosts which fail to resolve are logged and ignored.
    #[instrument(skip_all, level = "trace")]
    pub fn new(resolver: &'a R, named_hosts: &[NamedHost], reverse_dns: bool) -> Self {
        let mut named = HashMap::new();
        for host in named_hosts {
            match resolver.lookup(&host.hostname) {
                Ok(addrs) => {
                    for ip in addrs {
                        let addr = SocketAddr::new(ip, host.port);
                        debug!(%host, %addr, "resolved named host");
                        named.entry(addr).or_insert_with(|| host.hostname.clone());
                    }
                }
                Err(err) => warn!(%host, %err, "failed to resolve named host"),
            }
        }
        Self {
            resolver,
            named,
            reverse_dns,
            placeholders: PlaceholderLabels::new(),
        }
    }

    /// Label a single address.
    pub fn label(&mut self, addr: SocketAddr) -> String {
        if let Some(name) = self.named.get(&addr) {
            return name.clone();
        }
        if self.reverse_dns {
            if let Some(hostname) = self.resolver.reverse_lookup(addr.ip()).hostnames().next() {
                return hostname.to_string();
            }
        }
        let label = self.placeholders.next_label();
        debug!(%addr, %label, "no name found for address");
        label
    }
}

/// The queue of targets for a run.
///
/// Targets are dispatched in the order they were configured, one full pass over the configured
/// addresses per repetition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetQueue {
    // stored in reverse so that `pop` yields dispatch order
    targets: Vec<Target>,
}

impl TargetQueue {
    /// Build a queue from a set of addresses repeated `repeat` times.
    ///
    /// Duplicate addresses are probed once per repetition.
    #[instrument(skip(labeller), level = "trace")]
    pub fn build<R: Resolver>(
        addrs: &[SocketAddr],
        repeat: usize,
        labeller: &mut Labeller<'_, R>,
    ) -> Self {
        let targets = addrs
            .iter()
            .unique()
            .map(|addr| Target::new(labeller.label(*addr), *addr))
            .collect_vec();
        Self::from_targets(targets, repeat)
    }

    /// Build a queue from already labelled targets repeated `repeat` times.
    #[must_use]
    pub fn from_targets(targets: Vec<Target>, repeat: usize) -> Self {
        let mut targets = std::iter::repeat(targets)
            .take(repeat)
            .flatten()
            .collect_vec();
        targets.reverse();
        Self { targets }
    }

    /// Remove and return the next target to probe.
    pub fn pop(&mut self) -> Option<Target> {
        self.targets.pop()
    }

    /// The number of probes remaining.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootrtt_dns::{DnsEntry, ResolvedIpAddrs};
    use std::collections::HashSet;
    use std::net::IpAddr;
    use test_case::test_case;

    /// A resolver with a fixed set of forward and reverse records.
    #[derive(Default)]
    struct FakeResolver {
        forward: HashMap<String, Vec<IpAddr>>,
        reverse: HashMap<IpAddr, String>,
    }

    impl FakeResolver {
        fn with_forward(mut self, host: &str, addrs: &[IpAddr]) -> Self {
            self.forward.insert(host.to_string(), addrs.to_vec());
            self
        }

        fn with_reverse(mut self, addr: IpAddr, host: &str) -> Self {
            self.reverse.insert(addr, host.to_string());
            self
        }
    }

    impl Resolver for FakeResolver {
        fn lookup(&self, hostname: impl AsRef<str>) -> bootrtt_dns::Result<ResolvedIpAddrs> {
            self.forward
                .get(hostname.as_ref())
                .map(|addrs| ResolvedIpAddrs(addrs.clone()))
                .ok_or_else(|| bootrtt_dns::Error::NoAddresses(hostname.as_ref().to_string()))
        }

        fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
            let addr = addr.into();
            self.reverse.get(&addr).map_or(DnsEntry::NotFound(addr), |host| {
                DnsEntry::Resolved(addr, vec![host.clone()])
            })
        }
    }

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    fn drain(mut queue: TargetQueue) -> Vec<Target> {
        std::iter::from_fn(|| queue.pop()).collect()
    }

    #[test]
    fn test_label_prefers_named_host() {
        let resolver = FakeResolver::default()
            .with_forward("boot1.example", &[IpAddr::from([192, 0, 2, 1])])
            .with_reverse(IpAddr::from([192, 0, 2, 1]), "ptr.example");
        let named = [NamedHost::new("boot1.example", 6421)];
        let mut labeller = Labeller::new(&resolver, &named, true);
        assert_eq!("boot1.example", labeller.label(addr("192.0.2.1:6421")));
    }

    #[test]
    fn test_label_named_host_requires_matching_port() {
        let resolver = FakeResolver::default()
            .with_forward("boot1.example", &[IpAddr::from([192, 0, 2, 1])])
            .with_reverse(IpAddr::from([192, 0, 2, 1]), "ptr.example");
        let named = [NamedHost::new("boot1.example", 6421)];
        let mut labeller = Labeller::new(&resolver, &named, true);
        assert_eq!("ptr.example", labeller.label(addr("192.0.2.1:6422")));
    }

    #[test]
    fn test_label_skips_reverse_dns_when_disabled() {
        let resolver =
            FakeResolver::default().with_reverse(IpAddr::from([192, 0, 2, 1]), "ptr.example");
        let mut labeller = Labeller::new(&resolver, &[], false);
        assert_eq!("unknown-1", labeller.label(addr("192.0.2.1:6421")));
    }

    #[test]
    fn test_label_ignores_unresolvable_named_host() {
        let resolver = FakeResolver::default();
        let named = [NamedHost::new("missing.example", 6421)];
        let mut labeller = Labeller::new(&resolver, &named, true);
        assert_eq!("unknown-1", labeller.label(addr("192.0.2.1:6421")));
    }

    #[test]
    fn test_placeholder_labels_are_distinct() {
        let resolver = FakeResolver::default();
        let mut labeller = Labeller::new(&resolver, &[], true);
        let labels = (1..=200)
            .map(|port| labeller.label(SocketAddr::from(([192, 0, 2, 1], port))))
            .collect::<HashSet<_>>();
        assert_eq!(200, labels.len());
    }

    #[test]
    fn test_build_replicates_flat() {
        let resolver = FakeResolver::default()
            .with_reverse(IpAddr::from([192, 0, 2, 1]), "a.example")
            .with_reverse(IpAddr::from([192, 0, 2, 2]), "b.example");
        let mut labeller = Labeller::new(&resolver, &[], true);
        let queue = TargetQueue::build(
            &[addr("192.0.2.1:1234"), addr("192.0.2.2:5678")],
            2,
            &mut labeller,
        );
        assert_eq!(4, queue.len());
        let a = Target::new("a.example", addr("192.0.2.1:1234"));
        let b = Target::new("b.example", addr("192.0.2.2:5678"));
        assert_eq!(vec![a.clone(), b.clone(), a, b], drain(queue));
    }

    #[test]
    fn test_build_unresolved_labels_stable_across_repeats() {
        let resolver = FakeResolver::default();
        let mut labeller = Labeller::new(&resolver, &[], true);
        let queue = TargetQueue::build(
            &[addr("192.0.2.1:1"), addr("192.0.2.2:2"), addr("192.0.2.3:3")],
            3,
            &mut labeller,
        );
        let targets = drain(queue);
        assert_eq!(9, targets.len());
        let distinct = targets.iter().collect::<HashSet<_>>();
        assert_eq!(3, distinct.len());
        let labels = distinct.iter().map(|t| &t.label).collect::<HashSet<_>>();
        assert_eq!(3, labels.len());
    }

    #[test]
    fn test_build_removes_duplicate_addresses() {
        let resolver = FakeResolver::default();
        let mut labeller = Labeller::new(&resolver, &[], false);
        let queue = TargetQueue::build(
            &[addr("192.0.2.1:1"), addr("192.0.2.1:1"), addr("192.0.2.2:2")],
            5,
            &mut labeller,
        );
        assert_eq!(10, queue.len());
    }

    #[test_case(0, 0)]
    #[test_case(1, 2)]
    #[test_case(10, 20)]
    fn test_from_targets_len(repeat: usize, expected: usize) {
        let targets = vec![
            Target::new("a", addr("192.0.2.1:1")),
            Target::new("b", addr("192.0.2.2:2")),
        ];
        let queue = TargetQueue::from_targets(targets, repeat);
        assert_eq!(expected, queue.len());
        assert_eq!(expected == 0, queue.is_empty());
    }

    #[test]
    fn test_pop_empty() {
        let mut queue = TargetQueue::default();
        assert_eq!(None, queue.pop());
    }

    #[test_case("boot.example:6421", Some(NamedHost::new("boot.example", 6421)))]
    #[test_case("boot.example", None)]
    #[test_case(":6421", None)]
    #[test_case("boot.example:http", None)]
    #[test_case("boot.example:70000", None)]
    fn test_parse_named_host(s: &str, expected: Option<NamedHost>) {
        assert_eq!(expected, NamedHost::from_str(s).ok());
    }

    #[test]
    fn test_target_display() {
        let target = Target::new("boot1.example", addr("192.0.2.1:6421"));
        assert_eq!("boot1.example 192.0.2.1:6421", target.to_string());
    }
}
