//! NameDrop wire format and conversion to and from [`Record`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Record;

/// Whether outgoing records carry their TTL.
///
/// NameDrop has historically been sent records without a TTL, leaving the
/// server to apply its own default. [`TtlMode::Omit`] keeps that behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TtlMode {
    #[default]
    Omit,
    Propagate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedropRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NamedropRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<NamedropRecord>>,
}

impl<'a> NamedropRequest<'a> {
    pub fn new(domain: &'a str, token: &'a str) -> Self {
        Self {
            domain: non_empty(domain),
            host: None,
            token: non_empty(token),
            records: None,
        }
    }

    pub fn with_records(mut self, records: Vec<NamedropRecord>) -> Self {
        self.records = if records.is_empty() { None } else { Some(records) };
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedropResponse {
    #[serde(default, rename = "type")]
    pub r#type: Option<String>,
    #[serde(default)]
    pub records: Option<Vec<NamedropRecord>>,
}

/// Strips a single trailing dot from a zone name.
pub fn zone_to_domain(zone: &str) -> &str {
    zone.strip_suffix('.').unwrap_or(zone)
}

/// Converts records into their wire form, keeping order and count.
pub fn to_wire(records: &[Record], ttl: TtlMode) -> Vec<NamedropRecord> {
    records.iter()
        .map(|r| NamedropRecord {
            domain: None,
            host: non_empty(&r.name).map(ToOwned::to_owned),
            r#type: non_empty(&r.r#type).map(ToOwned::to_owned),
            value: non_empty(&r.value).map(ToOwned::to_owned),
            ttl: match ttl {
                TtlMode::Omit => None,
                TtlMode::Propagate => non_zero(i64::try_from(r.ttl.as_secs()).unwrap_or(i64::MAX)),
            },
            priority: non_zero(r.priority.into()),
        })
        .collect()
}

/// Converts wire records back into [`Record`]s, keeping order and count.
///
/// Out of range integers are clamped rather than rejected.
pub fn to_generic(records: &[NamedropRecord]) -> Vec<Record> {
    records.iter()
        .map(|r| Record {
            name: r.host.clone().unwrap_or_default(),
            r#type: r.r#type.clone().unwrap_or_default(),
            value: r.value.clone().unwrap_or_default(),
            ttl: Duration::from_secs(r.ttl.unwrap_or_default().max(0).unsigned_abs()),
            priority: clamp_u32(r.priority.unwrap_or_default()),
        })
        .collect()
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn non_zero(n: i64) -> Option<i64> {
    (n != 0).then_some(n)
}

fn clamp_u32(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}
