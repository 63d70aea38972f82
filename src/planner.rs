// File: ./src/planner.rs
// Derives concrete reminder instants from a task. Pure: no clock reads,
// no registration. The registrar owns the platform lifecycle.
use crate::config::ReminderConfig;
use crate::model::item::local_to_utc;
use crate::model::{ReminderTrigger, TaskItem, TriggerPayload, trigger_prefix};
use chrono::{DateTime, Duration, Local, Utc};

/// Plans the ordered trigger list for one task.
///
/// A completed task, or one with neither a future due date nor a
/// clock-time estimate, plans nothing. Identifiers are
/// `{prefix}-{index}` with the prefix deterministic from
/// `(dump_id, uid)`, so a later pass recomputes the exact same ids.
pub fn plan_triggers(
    task: &TaskItem,
    now: DateTime<Utc>,
    cfg: &ReminderConfig,
) -> Vec<ReminderTrigger> {
    if task.completed {
        return Vec::new();
    }

    let mut slots: Vec<(DateTime<Utc>, String)> = Vec::new();

    if let Some(due) = task.due {
        if due > now {
            let due_day = due.with_timezone(&Local).date_naive();

            // Closest reminder, shortly before the due instant
            let lead = due - Duration::minutes(cfg.due_lead_mins as i64);
            if lead > now {
                slots.push((lead, due_body(lead, due)));
            }

            // The evening before, while it still precedes the deadline
            let evening =
                local_to_utc((due_day - Duration::days(1)).and_time(cfg.evening_before_time()));
            if let Some(evening) = evening
                && evening > now
                && evening < due
            {
                slots.push((evening, due_body(evening, due)));
            }

            // The morning of the due day
            let morning = local_to_utc(due_day.and_time(cfg.morning_of_time()));
            if let Some(morning) = morning
                && morning > now
                && morning < due
            {
                slots.push((morning, due_body(morning, due)));
            }
        }
    } else if let Some(t) = task.estimate_as_clock_time() {
        // No due date, but the estimate names a clock time still ahead today
        let today = now.with_timezone(&Local).date_naive();
        if let Some(start) = local_to_utc(today.and_time(t))
            && start > now
        {
            let fire = start - Duration::minutes(cfg.estimate_lead_mins as i64);
            if fire > now {
                slots.push((
                    fire,
                    format!("Starts at {}", start.with_timezone(&Local).format("%H:%M")),
                ));
            }
        }
    }

    let prefix = trigger_prefix(&task.dump_id, &task.uid);
    log::debug!("Planned {} trigger(s) for task {}", slots.len(), task.uid);

    slots
        .into_iter()
        .enumerate()
        .map(|(index, (fire_at, body))| ReminderTrigger {
            identifier: format!("{}-{}", prefix, index),
            fire_at,
            title: task.task.clone(),
            body,
            payload: TriggerPayload {
                task_uid: task.uid.clone(),
                dump_id: task.dump_id.clone(),
                category_name: task.category_name.clone(),
            },
        })
        .collect()
}

/// Phrases the body by the gap between trigger and deadline:
/// within the hour, later today, or tomorrow.
fn due_body(fire_at: DateTime<Utc>, due: DateTime<Utc>) -> String {
    let due_local = due.with_timezone(&Local);
    if due - fire_at <= Duration::minutes(60) {
        "Due within the hour".to_string()
    } else if fire_at.with_timezone(&Local).date_naive() == due_local.date_naive() {
        format!("Due today at {}", due_local.format("%H:%M"))
    } else {
        format!("Due tomorrow at {}", due_local.format("%H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParsedTask;
    use chrono::{NaiveDate, TimeZone};

    fn local_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn task_with_due(due: Option<DateTime<Utc>>) -> TaskItem {
        let mut t = TaskItem::from_parsed(
            &ParsedTask {
                clean_text: "Write report".to_string(),
                ..Default::default()
            },
            "dump-1",
            NaiveDate::from_ymd_opt(2026, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        );
        t.due = due;
        t
    }

    #[test]
    fn test_completed_task_plans_nothing() {
        let mut task = task_with_due(Some(local_utc(2026, 5, 2, 17, 0)));
        task.completed = true;
        assert!(plan_triggers(&task, local_utc(2026, 5, 1, 8, 0), &ReminderConfig::default()).is_empty());
    }

    #[test]
    fn test_all_three_slots_when_due_tomorrow_afternoon() {
        let task = task_with_due(Some(local_utc(2026, 5, 2, 17, 0)));
        let now = local_utc(2026, 5, 1, 8, 0);
        let triggers = plan_triggers(&task, now, &ReminderConfig::default());
        assert_eq!(triggers.len(), 3);
        // 30 min lead, evening before at 20:00, morning of at 09:00
        assert_eq!(triggers[0].fire_at, local_utc(2026, 5, 2, 16, 30));
        assert_eq!(triggers[1].fire_at, local_utc(2026, 5, 1, 20, 0));
        assert_eq!(triggers[2].fire_at, local_utc(2026, 5, 2, 9, 0));
        assert_eq!(triggers[0].body, "Due within the hour");
        assert_eq!(triggers[1].body, "Due tomorrow at 17:00");
        assert_eq!(triggers[2].body, "Due today at 17:00");
    }

    #[test]
    fn test_due_in_ten_minutes_plans_nothing() {
        let now = local_utc(2026, 5, 1, 12, 0);
        let task = task_with_due(Some(now + Duration::minutes(10)));
        // Lead slot is already past; evening/morning slots are not before
        // the deadline anymore.
        assert!(plan_triggers(&task, now, &ReminderConfig::default()).is_empty());
    }

    #[test]
    fn test_identifiers_are_stable_across_passes() {
        let task = task_with_due(Some(local_utc(2026, 5, 2, 17, 0)));
        let now = local_utc(2026, 5, 1, 8, 0);
        let a = plan_triggers(&task, now, &ReminderConfig::default());
        let b = plan_triggers(&task, now, &ReminderConfig::default());
        let ids_a: Vec<_> = a.iter().map(|t| t.identifier.clone()).collect();
        let ids_b: Vec<_> = b.iter().map(|t| t.identifier.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_estimate_clock_time_plans_single_lead() {
        let mut task = task_with_due(None);
        task.time_estimate = Some("16:00".to_string());
        let now = local_utc(2026, 5, 1, 12, 0);
        let triggers = plan_triggers(&task, now, &ReminderConfig::default());
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].fire_at, local_utc(2026, 5, 1, 15, 45));
        assert_eq!(triggers[0].body, "Starts at 16:00");
    }

    #[test]
    fn test_estimate_already_past_plans_nothing() {
        let mut task = task_with_due(None);
        task.time_estimate = Some("10:00".to_string());
        let now = local_utc(2026, 5, 1, 12, 0);
        assert!(plan_triggers(&task, now, &ReminderConfig::default()).is_empty());
    }

    #[test]
    fn test_duration_estimate_is_not_a_clock_time() {
        let mut task = task_with_due(None);
        task.time_estimate = Some("30 mins".to_string());
        let now = local_utc(2026, 5, 1, 12, 0);
        assert!(plan_triggers(&task, now, &ReminderConfig::default()).is_empty());
    }
}
