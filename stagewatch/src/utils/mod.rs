//! Utility functions for event ids and timestamp handling.

mod ids;
pub mod timestamps;

pub use ids::EventIdGenerator;
pub use timestamps::{iso_timestamp, now_utc, Timestamp};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
