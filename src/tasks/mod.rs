use crate::notify::NotificationSink;
use crate::power::ExpiryEngine;
use crate::Data;
use chrono::{Timelike, Utc};
use power::check_power;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

mod power;

pub async fn task_handler(data: Arc<Data>, sink: Arc<dyn NotificationSink>) {
    let engine = ExpiryEngine::new(data.config.notify_hour, data.config.notify_offset);
    info!(
        "power checks running every minute, digest at {:02}:00 UTC{}",
        data.config.notify_hour,
        engine.offset()
    );

    // line ticks up with wall-clock minutes so the digest minute is never straddled
    let into_minute = Duration::from_secs(Utc::now().second() as u64);
    let start = Instant::now() + (Duration::from_secs(61) - into_minute);
    let mut power_interval = interval_at(start, Duration::from_secs(60));
    // a slow tick delays the next one instead of stacking up
    power_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        power_interval.tick().await;

        match check_power(&data, &sink, &engine, Utc::now()).await {
            Ok(report) => debug!(
                "power tick: {} warnings, digest {}",
                report.warnings_sent,
                if report.digest_sent { "sent" } else { "not due" }
            ),
            Err(e) => error!("power tick skipped, could not read records: {e}"),
        }
    }
}
