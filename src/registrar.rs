// File: ./src/registrar.rs
// Reconciles planned triggers with what the notification service has
// registered. Everything here is best-effort: one failing identifier is
// logged and skipped, never fatal, so a bad id costs at most one
// reminder.
use crate::config::ReminderConfig;
use crate::model::{TaskItem, trigger_prefix};
use crate::notify::{NotificationContent, NotificationService};
use crate::planner::plan_triggers;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Replaces a task's registered triggers with a freshly planned set.
///
/// Stale identifiers under the task's prefix are cancelled first and
/// each cancellation is awaited before anything new is scheduled, so a
/// replacement can never be overtaken by its own cancellation. Calling
/// this twice with an unchanged task is a no-op after the first call:
/// identifiers are deterministic and scheduling an existing id replaces
/// it in place.
pub async fn sync_reminders<S: NotificationService>(
    svc: &S,
    task: &TaskItem,
    now: DateTime<Utc>,
    cfg: &ReminderConfig,
) -> Result<()> {
    let plan = plan_triggers(task, now, cfg);
    let prefix = format!("{}-", trigger_prefix(&task.dump_id, &task.uid));
    let keep: HashSet<&str> = plan.iter().map(|t| t.identifier.as_str()).collect();

    let pending = match svc.pending().await {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Could not list scheduled notifications: {}", e);
            Vec::new()
        }
    };

    for stale in pending
        .iter()
        .filter(|p| p.id.starts_with(&prefix) && !keep.contains(p.id.as_str()))
    {
        if let Err(e) = svc.cancel(&stale.id).await {
            log::warn!("Failed to cancel reminder {}: {}", stale.id, e);
        }
    }

    for trigger in plan.iter().filter(|t| t.fire_at > now) {
        if let Err(e) = svc
            .schedule(
                &trigger.identifier,
                NotificationContent::from(trigger),
                trigger.fire_at,
            )
            .await
        {
            log::warn!("Failed to schedule reminder {}: {}", trigger.identifier, e);
        }
    }

    Ok(())
}

/// Drops every registration for one task, e.g. on deletion.
pub async fn cancel_task_reminders<S: NotificationService>(
    svc: &S,
    dump_id: &str,
    task_uid: &str,
) -> Result<()> {
    let prefix = format!("{}-", trigger_prefix(dump_id, task_uid));
    let pending = svc.pending().await?;
    for p in pending.iter().filter(|p| p.id.starts_with(&prefix)) {
        if let Err(e) = svc.cancel(&p.id).await {
            log::warn!("Failed to cancel reminder {}: {}", p.id, e);
        }
    }
    Ok(())
}

/// Drops every registration this crate owns, e.g. on logout.
pub async fn cancel_all_reminders<S: NotificationService>(svc: &S) -> Result<()> {
    let pending = svc.pending().await?;
    for p in &pending {
        if let Err(e) = svc.cancel(&p.id).await {
            log::warn!("Failed to cancel reminder {}: {}", p.id, e);
        }
    }
    Ok(())
}
