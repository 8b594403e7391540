use std::time::Duration;

use serde::{Serialize, Serializer};

pub mod namedrop;
pub mod wire;

/// A provider independent DNS record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub r#type: String,
    pub value: String,
    #[serde(serialize_with = "serialize_secs")]
    pub ttl: Duration,
    pub priority: u32,
}

fn serialize_secs<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(ttl.as_secs())
}

#[async_trait::async_trait]
pub trait RecordGetter: Send + Sync {
    type Error: std::error::Error + Send;

    /// Lists all the records in the zone.
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Self::Error>;
}

#[async_trait::async_trait]
pub trait RecordAppender: Send + Sync {
    type Error: std::error::Error + Send;

    /// Adds records to the zone, returning the records that were created.
    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error>;
}

#[async_trait::async_trait]
pub trait RecordSetter: Send + Sync {
    type Error: std::error::Error + Send;

    /// Creates or updates records in the zone, returning the records that were set.
    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error>;
}

#[async_trait::async_trait]
pub trait RecordDeleter: Send + Sync {
    type Error: std::error::Error + Send;

    /// Removes records from the zone, returning the records that were deleted.
    async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error>;
}
