// File: ./src/calendar.rs
// Imports external calendar events into the same task shape the capture
// parser produces, so they flow through the reminder planner unchanged.
use crate::model::item::local_to_utc;
use crate::model::{Category, TaskItem};
use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarInfo {
    pub id: String,
    pub title: String,
    pub color: Option<String>,
}

/// An event as delivered by the host calendar provider. Read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub calendar_id: String,
    pub calendar_title: String,
    pub calendar_color: Option<String>,
}

/// The host calendar provider boundary. Permission may be denied.
pub trait CalendarProvider {
    async fn request_access(&self) -> Result<bool>;
    async fn calendars(&self) -> Result<Vec<CalendarInfo>>;
    async fn events(
        &self,
        calendar_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Fetches, deduplicates and converts events in a bounded future window.
///
/// Denied calendar access imports nothing and is not an error. Events
/// sharing `(title, start, all_day)` collapse to one task; the survivors
/// are sorted by start time and grouped into one `Category` per source
/// calendar, named and colored after it.
pub async fn import_calendar<P: CalendarProvider>(
    provider: &P,
    calendar_ids: &[String],
    days_ahead: u32,
    now: DateTime<Utc>,
) -> Result<Vec<Category>> {
    match provider.request_access().await {
        Ok(true) => {}
        Ok(false) => {
            log::info!("Calendar access denied, importing nothing");
            return Ok(Vec::new());
        }
        Err(e) => {
            log::warn!("Calendar permission request failed: {}", e);
            return Ok(Vec::new());
        }
    }

    // An empty id list means every calendar the provider knows about
    let ids: Vec<String> = if calendar_ids.is_empty() {
        provider
            .calendars()
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect()
    } else {
        calendar_ids.to_vec()
    };

    let end = now + Duration::days(days_ahead as i64);
    let mut events = provider.events(&ids, now, end).await?;

    let mut seen = HashSet::new();
    events.retain(|e| seen.insert((e.title.clone(), e.start.timestamp(), e.all_day)));
    events.sort_by_key(|e| e.start);

    let mut groups: Vec<(String, Category)> = Vec::new();
    for event in &events {
        let task = task_from_event(event);
        match groups.iter_mut().find(|(id, _)| *id == event.calendar_id) {
            Some((_, category)) => category.tasks.push(task),
            None => groups.push((
                event.calendar_id.clone(),
                Category {
                    uid: Uuid::new_v4().to_string(),
                    name: event.calendar_title.clone(),
                    emoji: Some("📅".to_string()),
                    color: event.calendar_color.clone(),
                    tasks: vec![task],
                },
            )),
        }
    }

    log::debug!(
        "Imported {} event(s) into {} categorie(s)",
        events.len(),
        groups.len()
    );
    Ok(groups.into_iter().map(|(_, c)| c).collect())
}

fn task_from_event(event: &CalendarEvent) -> TaskItem {
    let local_day = event.start.with_timezone(&Local).date_naive();
    // Pinned at local noon so the calendar day survives serialization
    // across timezone boundaries.
    let scheduled_date = local_to_utc(local_day.and_hms_opt(12, 0, 0).unwrap());

    let (time_estimate, scheduled_time, due) = if event.all_day {
        (Some("All day".to_string()), None, None)
    } else {
        let mins = (event.end - event.start).num_minutes().max(0);
        (
            Some(format!("{} mins", mins)),
            Some(
                event
                    .start
                    .with_timezone(&Local)
                    .format("%H:%M")
                    .to_string(),
            ),
            Some(event.start),
        )
    };

    TaskItem {
        uid: Uuid::new_v4().to_string(),
        dump_id: format!("cal-{}", event.calendar_id),
        task: event.title.clone(),
        completed: false,
        due,
        scheduled_date,
        scheduled_time,
        time_estimate,
        priority: None,
        notes: event.notes.clone(),
        context: event.location.clone(),
        category_name: event.calendar_title.clone(),
    }
}
