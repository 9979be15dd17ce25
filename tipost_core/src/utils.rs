//! Time helpers shared by the controller and the remote client.

use chrono::{SecondsFormat, Utc};

use crate::models::PostId;

/// Current UTC time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wall-clock milliseconds, used as the id of a locally created post.
pub fn next_local_id() -> PostId {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn timestamps_parse_back() {
        let stamp = now_utc_iso();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn local_ids_do_not_go_backwards() {
        let first = next_local_id();
        let second = next_local_id();
        assert!(second >= first);
    }
}
