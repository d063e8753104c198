use crate::power::PowerRecord;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use std::sync::Mutex;

/// Bases with this much budget left or less get their one-shot warning.
pub const WARNING_THRESHOLD_MINUTES: i64 = 1440;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub owner_id: String,
    pub base_name: String,
    pub remaining_minutes: i64,
    /// Budget period being warned about.
    pub version: i64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub warnings: Vec<Warning>,
    pub digest_due: bool,
}

/// Decides what a tick has to send. Holds no records itself, only the
/// minute the last digest went out.
pub struct ExpiryEngine {
    notify_hour: u32,
    offset: FixedOffset,
    last_digest: Mutex<Option<NaiveDateTime>>,
}

impl ExpiryEngine {
    pub fn new(notify_hour: u32, offset: FixedOffset) -> Self {
        Self {
            notify_hour,
            offset,
            last_digest: Mutex::new(None),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Warnings for unwarned records inside `(0, threshold]`, and whether the
    /// daily digest should go out at `now`. Reports the digest at most once
    /// per matching minute.
    pub fn evaluate(&self, now: DateTime<Utc>, records: &[PowerRecord]) -> Evaluation {
        let warnings = records
            .iter()
            .filter(|r| !r.warned)
            .filter_map(|r| {
                let remaining = r.remaining_minutes(now);
                (remaining > 0 && remaining <= WARNING_THRESHOLD_MINUTES).then(|| Warning {
                    owner_id: r.owner_id.clone(),
                    base_name: r.base_name.clone(),
                    remaining_minutes: remaining,
                    version: r.version,
                })
            })
            .collect();

        Evaluation {
            warnings,
            digest_due: self.claim_digest(now),
        }
    }

    fn claim_digest(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset).naive_local();
        if local.hour() != self.notify_hour || local.minute() != 0 {
            return false;
        }
        let minute = local.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(local);
        let mut last_digest = self.last_digest.lock().unwrap_or_else(|e| e.into_inner());
        if *last_digest == Some(minute) {
            return false;
        }
        *last_digest = Some(minute);
        true
    }
}
