// Calendar import: permission handling, deduplication, conversion and
// grouping into per-calendar categories.
use anyhow::Result;
use braindump::calendar::{CalendarEvent, CalendarInfo, CalendarProvider, import_calendar};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};

struct MockProvider {
    granted: bool,
    events: Vec<CalendarEvent>,
}

impl CalendarProvider for MockProvider {
    async fn request_access(&self) -> Result<bool> {
        Ok(self.granted)
    }

    async fn calendars(&self) -> Result<Vec<CalendarInfo>> {
        Ok(Vec::new())
    }

    async fn events(
        &self,
        _calendar_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.start >= start && e.start < end)
            .cloned()
            .collect())
    }
}

fn local_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

fn now() -> DateTime<Utc> {
    local_utc(2026, 5, 1, 8, 0)
}

fn event(
    id: &str,
    title: &str,
    start: DateTime<Utc>,
    duration_mins: i64,
    all_day: bool,
    calendar_id: &str,
    calendar_title: &str,
) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        start,
        end: start + Duration::minutes(duration_mins),
        all_day,
        location: None,
        notes: None,
        calendar_id: calendar_id.to_string(),
        calendar_title: calendar_title.to_string(),
        calendar_color: Some("#3478F6".to_string()),
    }
}

#[tokio::test]
async fn test_denied_permission_imports_nothing() {
    let provider = MockProvider {
        granted: false,
        events: vec![event(
            "e1",
            "Standup",
            now() + Duration::hours(2),
            30,
            false,
            "work",
            "Work",
        )],
    };
    let categories = import_calendar(&provider, &["work".to_string()], 30, now())
        .await
        .unwrap();
    assert!(categories.is_empty());
}

#[tokio::test]
async fn test_duplicate_events_across_calendars_collapse_to_one() {
    let start = local_utc(2026, 5, 3, 10, 0);
    let provider = MockProvider {
        granted: true,
        events: vec![
            event("e1", "Team offsite", start, 60, false, "work", "Work"),
            event("e2", "Team offsite", start, 60, false, "personal", "Personal"),
        ],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    let total: usize = categories.iter().map(|c| c.tasks.len()).sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_same_title_different_start_is_kept() {
    let provider = MockProvider {
        granted: true,
        events: vec![
            event("e1", "Standup", local_utc(2026, 5, 4, 9, 30), 15, false, "work", "Work"),
            event("e2", "Standup", local_utc(2026, 5, 5, 9, 30), 15, false, "work", "Work"),
        ],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].tasks.len(), 2);
}

#[tokio::test]
async fn test_tasks_are_sorted_by_start_time() {
    let provider = MockProvider {
        granted: true,
        events: vec![
            event("e2", "Later", local_utc(2026, 5, 6, 15, 0), 30, false, "work", "Work"),
            event("e1", "Sooner", local_utc(2026, 5, 2, 9, 0), 30, false, "work", "Work"),
        ],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    let titles: Vec<&str> = categories[0].tasks.iter().map(|t| t.task.as_str()).collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
}

#[tokio::test]
async fn test_timed_event_conversion() {
    let start = local_utc(2026, 5, 3, 14, 30);
    let provider = MockProvider {
        granted: true,
        events: vec![event("e1", "Dentist", start, 90, false, "personal", "Personal")],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    let task = &categories[0].tasks[0];

    assert_eq!(task.time_estimate.as_deref(), Some("90 mins"));
    assert_eq!(task.scheduled_time.as_deref(), Some("14:30"));
    assert_eq!(task.due, Some(start));
    // Scheduled date pinned at local noon of the event's calendar day
    let pinned = task.scheduled_date.unwrap().with_timezone(&Local);
    assert_eq!(pinned.format("%Y-%m-%d %H:%M").to_string(), "2026-05-03 12:00");
}

#[tokio::test]
async fn test_all_day_event_conversion() {
    let provider = MockProvider {
        granted: true,
        events: vec![event(
            "e1",
            "Conference",
            local_utc(2026, 5, 10, 0, 0),
            24 * 60,
            true,
            "work",
            "Work",
        )],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    let task = &categories[0].tasks[0];

    assert_eq!(task.time_estimate.as_deref(), Some("All day"));
    assert!(task.scheduled_time.is_none());
    assert!(task.due.is_none());
    assert!(task.scheduled_date.is_some());
}

#[tokio::test]
async fn test_one_category_per_source_calendar() {
    let provider = MockProvider {
        granted: true,
        events: vec![
            event("e1", "Standup", local_utc(2026, 5, 4, 9, 30), 15, false, "work", "Work"),
            event("e2", "Yoga", local_utc(2026, 5, 4, 18, 0), 60, false, "personal", "Personal"),
        ],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    assert_eq!(categories.len(), 2);

    let work = categories.iter().find(|c| c.name == "Work").unwrap();
    assert_eq!(work.color.as_deref(), Some("#3478F6"));
    assert_eq!(work.tasks.len(), 1);
    assert_eq!(work.tasks[0].category_name, "Work");
}

#[tokio::test]
async fn test_window_bounds_the_fetch() {
    let provider = MockProvider {
        granted: true,
        events: vec![
            event("e1", "Soon", now() + Duration::days(3), 30, false, "work", "Work"),
            event("e2", "Far", now() + Duration::days(45), 30, false, "work", "Work"),
        ],
    };
    let categories = import_calendar(&provider, &[], 30, now()).await.unwrap();
    let total: usize = categories.iter().map(|c| c.tasks.len()).sum();
    assert_eq!(total, 1);
}
