use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Epoch-seconds timestamp shared across the workspace.
///
/// Stored as a plain `i64` so it serializes as a bare number and compares
/// cheaply; wall-clock formatting belongs to whoever renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Seconds elapsed since `earlier`. Negative if `earlier` is in the future.
    pub fn seconds_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_recent() {
        let t = Timestamp::now();
        let reference = Utc::now().timestamp();
        assert!((t.0 - reference).abs() < 2);
    }

    #[test]
    fn test_seconds_since() {
        let earlier = Timestamp(1_700_000_000);
        let later = Timestamp(1_700_000_060);
        assert_eq!(later.seconds_since(earlier), 60);
        assert_eq!(earlier.seconds_since(later), -60);
    }

    #[test]
    fn test_serde_transparent() {
        let t = Timestamp(1_700_000_000);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "1700000000");
        let rt: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(t, rt);
    }

    #[test]
    fn test_ordering() {
        assert!(Timestamp(100) < Timestamp(200));
        assert_eq!(Timestamp(100), Timestamp(100));
    }
}
