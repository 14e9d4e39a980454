//! `Duration` as integer nanoseconds, for `#[serde(with = "...")]`

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a duration as whole nanoseconds (saturating at `u64::MAX`)
pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    serializer.serialize_u64(nanos)
}

/// Deserialize a duration from whole nanoseconds
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_nanos)
}
