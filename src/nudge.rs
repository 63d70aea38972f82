// File: ./src/nudge.rs
use crate::config::ReminderConfig;
use crate::model::NudgeState;
use crate::model::item::local_to_utc;
use crate::notify::{NotificationContent, NotificationService};
use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveTime, Utc};

// Fixed identifiers: there are never more than two live nudge
// registrations system-wide.
pub const MORNING_NUDGE_ID: &str = "smart-nudge-morning";
pub const EVENING_NUDGE_ID: &str = "smart-nudge-evening";

/// Re-arms the two daily nudges from the current pending-task snapshot.
///
/// Zero pending tasks cancels both nudges and schedules none. Otherwise
/// each nudge lands on its next occurrence (09:00 / 20:00 local by
/// default) after `now`. Each registration is a one-shot: the service
/// boundary has no repeat flag, so callers re-plan whenever the snapshot
/// changes (and after a nudge fires) to arm the following day.
pub async fn plan_nudges<S: NotificationService>(
    svc: &S,
    state: &NudgeState,
    now: DateTime<Utc>,
    cfg: &ReminderConfig,
) -> Result<()> {
    if state.pending_count == 0 {
        for id in [MORNING_NUDGE_ID, EVENING_NUDGE_ID] {
            if let Err(e) = svc.cancel(id).await {
                log::warn!("Failed to cancel nudge {}: {}", id, e);
            }
        }
        return Ok(());
    }

    let summary = summarize(state);
    let nudges = [
        (
            MORNING_NUDGE_ID,
            cfg.nudge_morning_time(),
            "Good morning!",
            format!("You have {} to tackle today.", summary),
        ),
        (
            EVENING_NUDGE_ID,
            cfg.nudge_evening_time(),
            "Evening check-in",
            format!("Still on your plate: {}.", summary),
        ),
    ];

    for (id, time, title, body) in nudges {
        let Some(fire_at) = next_local_occurrence(time, now) else {
            continue;
        };
        let content = NotificationContent {
            title: title.to_string(),
            body,
            payload: None,
        };
        if let Err(e) = svc.schedule(id, content, fire_at).await {
            log::warn!("Failed to schedule nudge {}: {}", id, e);
        }
    }

    Ok(())
}

fn summarize(state: &NudgeState) -> String {
    let count = if state.pending_count == 1 {
        "1 pending task".to_string()
    } else {
        format!("{} pending tasks", state.pending_count)
    };
    if state.category_breakdown.is_empty() {
        return count;
    }
    let parts: Vec<String> = state
        .category_breakdown
        .iter()
        .map(|c| format!("{} {} ({})", c.emoji, c.name, c.count))
        .collect();
    format!("{}: {}", count, parts.join(", "))
}

fn next_local_occurrence(time: NaiveTime, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(&Local).date_naive();
    if let Some(candidate) = local_to_utc(today.and_time(time))
        && candidate > now
    {
        return Some(candidate);
    }
    local_to_utc((today + Duration::days(1)).and_time(time))
}
