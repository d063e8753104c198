use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerRecord {
    pub owner_id: String,
    pub base_name: String,
    /// Duration text as the owner typed it.
    pub raw: String,
    pub total_minutes: i64,
    pub set_at: DateTime<Utc>,
    pub warned: bool,
    /// Bumped on every re-set; tells budget periods apart.
    pub version: i64,
}

impl PowerRecord {
    /// Whole minutes since the budget was set, floored.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.set_at).num_seconds().div_euclid(60)
    }

    /// Budget left at `now`; negative once expired.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.total_minutes.saturating_sub(self.elapsed_minutes(now))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::try_minutes(self.total_minutes)
            .and_then(|budget| self.set_at.checked_add_signed(budget))
    }
}

/// Case-insensitive key a base is stored under.
pub fn base_key(base_name: &str) -> String {
    base_name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(total_minutes: i64, set_at: DateTime<Utc>) -> PowerRecord {
        PowerRecord {
            owner_id: "1".into(),
            base_name: "Alpha".into(),
            raw: String::new(),
            total_minutes,
            set_at,
            warned: false,
            version: 1,
        }
    }

    #[test]
    fn elapsed_truncates_partial_minutes() {
        let set_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let r = record(100, set_at);
        assert_eq!(r.remaining_minutes(set_at + Duration::seconds(59)), 100);
        assert_eq!(r.remaining_minutes(set_at + Duration::seconds(60)), 99);
        assert_eq!(r.remaining_minutes(set_at + Duration::minutes(150)), -50);
        assert_eq!(r.expires_at(), Some(set_at + Duration::minutes(100)));
    }

    #[test]
    fn base_keys_ignore_case() {
        assert_eq!(base_key("Alpha"), base_key("ALPHA"));
        assert_ne!(base_key("Alpha"), base_key("Beta"));
    }
}
