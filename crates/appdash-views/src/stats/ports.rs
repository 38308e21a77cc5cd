//! Port extraction from the joined `ports` column

use std::cmp::Ordering;
use std::fmt;

use appdash_core::records::ApplicationRecord;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A non-negative port number of any length
///
/// Stored as its canonical decimal digits so no token is lost to overflow.
/// Ordering is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port(String);

impl Port {
    /// Parse one all-digit token; anything else is rejected
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = token.trim_start_matches('0');
        Some(Port(if digits.is_empty() { "0".into() } else { digits.into() }))
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Port {
    fn from(port: u64) -> Self {
        Port(port.to_string())
    }
}

impl PartialEq<u64> for Port {
    fn eq(&self, other: &u64) -> bool {
        self.as_u64() == Some(*other)
    }
}

impl Ord for Port {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Port {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_u64() {
            Some(port) => serializer.serialize_u64(port),
            None => serializer.serialize_str(&self.0),
        }
    }
}

/// One port exposed by one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortUsage {
    pub port: Port,
    pub instance_name: String,
    pub app_name: String,
    pub app_type: String,
    pub app_status: String,
}

/// Split a joined port list, keeping only non-negative integers
///
/// Tokens such as `"80/tcp"`, `"-1"` or `"+5"` are dropped.
pub fn parse_ports(joined: &str) -> Vec<Port> {
    joined.split(',').map(str::trim).filter_map(Port::parse).collect()
}

/// Every port of every record, in record order
pub fn port_usages<'a, I>(records: I) -> Vec<PortUsage>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records
        .into_iter()
        .flat_map(|record| {
            parse_ports(&record.ports).into_iter().map(move |port| PortUsage {
                port,
                instance_name: record.instance_name.clone(),
                app_name: record.app_name.clone(),
                app_type: record.app_type.clone(),
                app_status: record.app_status.clone(),
            })
        })
        .collect()
}

/// The `limit` most used ports; equal counts keep first-encountered order
pub fn top_ports(usages: &[PortUsage], limit: usize) -> Vec<(Port, usize)> {
    let mut counts: IndexMap<&Port, usize> = IndexMap::new();
    for usage in usages {
        *counts.entry(&usage.port).or_insert(0) += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().map(|(port, count)| (port.clone(), count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests_support::{record, with_ports};

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("80, 443"), vec![80u64, 443]);
        assert!(parse_ports("").is_empty());
        assert_eq!(parse_ports("80/tcp, -1, +5, abc, 8080"), vec![8080u64]);
        assert_eq!(parse_ports(" 22 ,,  23 "), vec![22u64, 23]);
    }

    #[test]
    fn test_oversized_port_tokens_are_kept() {
        let ports = parse_ports("80, 99999999999999999999999, 007");
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[0], 80u64);
        assert_eq!(ports[1].as_str(), "99999999999999999999999");
        assert!(ports[1].as_u64().is_none());
        assert_eq!(ports[2], 7u64);
    }

    #[test]
    fn test_port_order_is_numeric() {
        let mut ports = parse_ports("443, 99999999999999999999999, 8080, 22");
        ports.sort();
        let labels: Vec<_> = ports.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["22", "443", "8080", "99999999999999999999999"]);
        assert_eq!(
            serde_json::to_string(&ports).unwrap(),
            r#"[22,443,8080,"99999999999999999999999"]"#
        );
    }

    #[test]
    fn test_port_usages_carry_record_context() {
        let records = vec![
            with_ports(record("A", "nginx", "docker", "running"), "80, 443"),
            with_ports(record("B", "sshd", "service", "running"), ""),
        ];
        let usages = port_usages(&records);
        assert_eq!(usages.len(), 2);
        assert_eq!(usages[1].port, 443u64);
        assert_eq!(usages[1].instance_name, "A");
        assert_eq!(usages[1].app_type, "docker");
    }

    #[test]
    fn test_top_ports() {
        let records = vec![
            with_ports(record("A", "a", "docker", "running"), "443, 80"),
            with_ports(record("B", "b", "docker", "running"), "80, 22"),
        ];
        let usages = port_usages(&records);
        assert_eq!(top_ports(&usages, 2), vec![(Port::from(80), 2), (Port::from(443), 1)]);
        assert!(top_ports(&usages, 0).is_empty());
    }
}
