use crate::error::StoreError;
use crate::notify::NotificationSink;
use crate::power::{format_minutes, ExpiryEngine, PowerRecord, Warning};
use crate::util::{chunk_lines, MESSAGE_LIMIT};
use crate::Data;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub warnings_sent: usize,
    pub digest_sent: bool,
}

/// One evaluate-and-dispatch pass. Only fails when the records can't be
/// read; delivery and write-back problems are logged and skipped.
///
/// Warnings go out concurrently and the digest does not wait for them, so a
/// slow recipient holds up neither the other DMs nor the channel post.
pub async fn check_power(
    data: &Arc<Data>, sink: &Arc<dyn NotificationSink>, engine: &ExpiryEngine,
    now: DateTime<Utc>,
) -> Result<TickReport, StoreError> {
    let records = data.store.get_all().await?;
    let evaluation = engine.evaluate(now, &records);
    let mut report = TickReport::default();

    let mut sends = JoinSet::new();
    for warning in evaluation.warnings {
        let text = warning_message(&warning, now, &data.config.command_prefix);
        let data = data.clone();
        let sink = sink.clone();
        sends.spawn(async move { deliver_warning(&data, sink.as_ref(), &warning, &text).await });
    }

    if evaluation.digest_due {
        let lines = digest_lines(&records, now, engine, &data.config.command_prefix);
        let mut all_sent = true;
        for chunk in chunk_lines(&lines, MESSAGE_LIMIT) {
            if let Err(e) = sink.send_broadcast(data.config.power_channel, &chunk).await {
                warn!("could not post the daily power report: {e}");
                all_sent = false;
                break;
            }
        }
        report.digest_sent = all_sent;
    }

    while let Some(joined) = sends.join_next().await {
        match joined {
            Ok(true) => report.warnings_sent += 1,
            Ok(false) => {}
            Err(e) => error!("warning task failed: {e}"),
        }
    }

    Ok(report)
}

/// Sends one warning and marks its record. Returns whether the DM went through.
async fn deliver_warning(
    data: &Data, sink: &dyn NotificationSink, warning: &Warning, text: &str,
) -> bool {
    let delivered = match sink.send_direct(&warning.owner_id, text).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "could not warn {} about base {}: {e}",
                warning.owner_id, warning.base_name
            );
            false
        }
    };
    if !delivered && data.config.retry_failed_warnings {
        return false;
    }
    match data
        .store
        .mark_warned(&warning.owner_id, &warning.base_name, warning.version)
        .await
    {
        Ok(true) => {}
        Ok(false) => info!(
            "base {} of {} was re-set before it could be marked warned",
            warning.base_name, warning.owner_id
        ),
        Err(e) => error!(
            "failed to mark base {} of {} as warned: {e}",
            warning.base_name, warning.owner_id
        ),
    }
    delivered
}

fn warning_message(warning: &Warning, now: DateTime<Utc>, prefix: &str) -> String {
    let runs_out = now.timestamp() + warning.remaining_minutes * 60;
    format!(
        "⚠️ Your base **{0}** is running low on power: **{1}** left (runs out <t:{2}:R>).\n\
        Use `{3}setpower {0} <duration>` once you've topped it up.",
        warning.base_name,
        format_minutes(warning.remaining_minutes),
        runs_out,
        prefix
    )
}

fn digest_lines(
    records: &[PowerRecord], now: DateTime<Utc>, engine: &ExpiryEngine, prefix: &str,
) -> Vec<String> {
    let local = now.with_timezone(&engine.offset());
    let mut lines = vec![format!(
        "📅 **Daily Power Report** · {} (UTC{})",
        local.format("%Y-%m-%d"),
        engine.offset()
    )];
    if records.is_empty() {
        lines.push(format!("No power levels set yet! Use `{prefix}setpower` to add your data."));
        return lines;
    }
    lines.extend(records.iter().map(|r| {
        format!(
            "**{}** (<@{}>): {}",
            r.base_name,
            r.owner_id,
            format_minutes(r.remaining_minutes(now))
        )
    }));
    lines
}
