//! Aggregate runtime counters reported by the simulator.
//!
//! Every field is optional: `None` means the server did not compute the value
//! for this query, which is not the same as a computed zero. Snapshots are
//! immutable and fetched fresh on every call.

use super::null_as_default;
use chrono::serde::ts_seconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport endpoint activity. Each received datagram lands in `total` and in
/// at most one failure class; datagrams that parsed and authenticated are
/// counted only in `total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PacketMetrics {
    #[serde(default, with = "ts_seconds_option")]
    pub first_hit: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    pub last_hit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub parse_failures: Option<u64>,
    #[serde(default)]
    pub auth_failures: Option<u64>,
    #[serde(default)]
    pub context_failures: Option<u64>,
}

impl PacketMetrics {
    fn counters(&self) -> [Option<u64>; 4] {
        [
            self.total,
            self.parse_failures,
            self.auth_failures,
            self.context_failures,
        ]
    }

    /// Sum of the reported failure classes, `None` when none was reported.
    pub fn failures(&self) -> Option<u64> {
        let classes = [self.parse_failures, self.auth_failures, self.context_failures];
        if classes.iter().all(Option::is_none) {
            return None;
        }
        Some(classes.iter().flatten().fold(0u64, |acc, n| acc.saturating_add(*n)))
    }

    /// Packets that passed every stage, when `total` and all failure classes
    /// are present.
    pub fn successes(&self) -> Option<u64> {
        let total = self.total?;
        let failed = self
            .parse_failures?
            .saturating_add(self.auth_failures?)
            .saturating_add(self.context_failures?);
        Some(total.saturating_sub(failed))
    }

    /// The server keeps `total >= parse + auth + context failures`. Missing
    /// fields count as satisfying the check.
    pub fn failures_within_total(&self) -> bool {
        match (self.total, self.failures()) {
            (Some(total), Some(failures)) => failures <= total,
            _ => true,
        }
    }

    /// True when every counter present in both snapshots is `<=` the other's.
    /// A query narrowed by filters is bounded by the unfiltered one.
    pub fn bounded_by(&self, other: &PacketMetrics) -> bool {
        bounded(&self.counters(), &other.counters())
    }
}

/// SNMP message processing outcomes, after packets were parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageMetrics {
    #[serde(default, with = "ts_seconds_option")]
    pub first_hit: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    pub last_hit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pdus: Option<u64>,
    #[serde(default)]
    pub var_binds: Option<u64>,
    #[serde(default)]
    pub failures: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variations: Vec<Variation>,
}

impl MessageMetrics {
    fn counters(&self) -> [Option<u64>; 3] {
        [self.pdus, self.var_binds, self.failures]
    }

    pub fn bounded_by(&self, other: &MessageMetrics) -> bool {
        bounded(&self.counters(), &other.counters())
    }

    pub fn variation(&self, name: &str) -> Option<&Variation> {
        self.variations
            .iter()
            .find(|v| v.name.as_deref() == Some(name))
    }
}

/// Per variation-module counters nested under a message metrics query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "ts_seconds_option")]
    pub first_hit: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    pub last_hit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub failures: Option<u64>,
}

/// Common properties of one simulator process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessMetrics {
    #[serde(default)]
    pub cmdline: Option<String>,
    /// Seconds
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub owner: Option<String>,
    /// Bytes
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub cpu: Option<u64>,
    /// Open file descriptors
    #[serde(default)]
    pub files: Option<u64>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub lifecycle: Option<ProcessLifeCycle>,
}

/// How often a process exited and was restarted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessLifeCycle {
    #[serde(default)]
    pub exits: Option<u64>,
    #[serde(default)]
    pub restarts: Option<u64>,
}

fn bounded(lhs: &[Option<u64>], rhs: &[Option<u64>]) -> bool {
    lhs.iter().zip(rhs).all(|pair| match pair {
        (Some(a), Some(b)) => a <= b,
        _ => true,
    })
}
