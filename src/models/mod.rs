//! Wire representations for Bookshelf.
//!
//! View models are built by explicit field mapping from the storage records
//! in [`crate::db`]; inbound payloads are validated here before they reach
//! storage.

mod author;
mod book;
mod page;

pub use author::*;
pub use book::*;
pub use page::*;

use chrono::{DateTime, Utc};

/// Render a timestamp as ISO-8601 UTC with a `Z` suffix.
///
/// Fractional seconds appear (as microseconds) only when non-zero:
/// `2023-01-20T10:00:00Z`, `2023-01-20T10:00:00.250000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    if at.timestamp_subsec_micros() == 0 {
        at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_whole_seconds() {
        let at = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(&at), "2023-01-20T10:00:00Z");
    }

    #[test]
    fn test_format_timestamp_with_micros() {
        let at = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap()
            + chrono::Duration::microseconds(250_000);
        assert_eq!(format_timestamp(&at), "2023-01-20T10:00:00.250000Z");
    }
}
