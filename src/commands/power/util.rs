use crate::error::PowerError;
use crate::power::{format_minutes, DurationParser, PowerRecord, RecordStore};
use chrono::{DateTime, Utc};

pub const PAGE_ITEMS: usize = 8;

/// Parses the duration and stores it as the base's new budget.
pub async fn store_power(
    store: &dyn RecordStore, parser: &DurationParser, owner_id: &str, base_name: &str,
    duration: &str, now: DateTime<Utc>,
) -> Result<PowerRecord, PowerError> {
    let total_minutes = parser.parse(duration)?;
    let record = store
        .upsert(owner_id, base_name.trim(), duration.trim(), total_minutes, now)
        .await?;
    Ok(record)
}

pub fn remaining_text(record: &PowerRecord, now: DateTime<Utc>) -> String {
    format_minutes(record.remaining_minutes(now))
}

/// `Alpha: 2d 3h 4m left · set to 5d <t:..:R>`
pub fn owner_line(record: &PowerRecord, now: DateTime<Utc>) -> String {
    let remaining = record.remaining_minutes(now);
    let status = if remaining > 0 {
        format!("{} left", format_minutes(remaining))
    } else {
        "Expired".into()
    };
    format!(
        "**{}**: {status} · set to `{}` <t:{}:R>",
        record.base_name,
        record.raw,
        record.set_at.timestamp()
    )
}

/// `Alpha (<@1>): 2d 3h 4m · updated <t:..:f>`
pub fn listing_line(record: &PowerRecord, now: DateTime<Utc>) -> String {
    format!(
        "**{}** (<@{}>): {} · updated <t:{}:f>",
        record.base_name,
        record.owner_id,
        remaining_text(record, now),
        record.set_at.timestamp()
    )
}
