// File: ./src/model/item.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_uid() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// The result of parsing one line of free-form capture text.
///
/// Produced fresh on every parse call (one per keystroke); never mutated.
/// `clean_text` is the input with every recognized fragment removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedTask {
    pub clean_text: String,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub priority: Option<Priority>,
    pub context: Option<String>,
    pub duration_mins: Option<u32>,
    pub tags: Vec<String>,
}

impl ParsedTask {
    pub fn is_empty(&self) -> bool {
        self.clean_text.is_empty()
            && self.scheduled_date.is_none()
            && self.scheduled_time.is_none()
            && self.priority.is_none()
            && self.context.is_none()
            && self.duration_mins.is_none()
            && self.tags.is_empty()
    }
}

/// A stored task. Owned by the external task store; this crate only reads
/// it and derives reminder triggers from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    #[serde(default = "default_uid")]
    pub uid: String,
    /// Id of the brain dump this task was captured in.
    pub dump_id: String,
    pub task: String,
    #[serde(default)]
    pub completed: bool,
    pub due: Option<DateTime<Utc>>,
    pub scheduled_date: Option<DateTime<Utc>>,
    /// 24-hour "HH:MM" clock string, when the task has a scheduled time.
    pub scheduled_time: Option<String>,
    /// Free-form estimate: "30 mins", "HH:MM" or "All day".
    pub time_estimate: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub category_name: String,
}

impl TaskItem {
    /// Promotes a parse result into a stored task on submit.
    /// `now` is the local wall clock of the capture moment.
    pub fn from_parsed(parsed: &ParsedTask, dump_id: &str, now: NaiveDateTime) -> Self {
        let due = match (parsed.scheduled_date, parsed.scheduled_time) {
            (Some(d), Some(t)) => local_to_utc(d.and_time(t)),
            (None, Some(t)) => local_to_utc(now.date().and_time(t)),
            _ => None,
        };
        // Date-only tasks get pinned at local noon so the calendar day
        // survives serialization across timezones.
        let scheduled_date = parsed
            .scheduled_date
            .and_then(|d| local_to_utc(d.and_hms_opt(12, 0, 0).unwrap()));

        Self {
            uid: default_uid(),
            dump_id: dump_id.to_string(),
            task: parsed.clean_text.clone(),
            completed: false,
            due,
            scheduled_date,
            scheduled_time: parsed.scheduled_time.map(|t| t.format("%H:%M").to_string()),
            time_estimate: parsed.duration_mins.map(|m| format!("{} mins", m)),
            priority: parsed.priority,
            notes: None,
            context: parsed.context.clone(),
            category_name: String::new(),
        }
    }

    /// Interprets `time_estimate` as a clock time ("HH:MM") when it has
    /// that shape. Estimates like "30 mins" or "All day" return None.
    pub fn estimate_as_clock_time(&self) -> Option<NaiveTime> {
        let est = self.time_estimate.as_deref()?;
        NaiveTime::parse_from_str(est.trim(), "%H:%M").ok()
    }
}

pub(crate) fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;
    chrono::Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

// --- REMINDER TRIGGERS ---

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TriggerPayload {
    pub task_uid: String,
    pub dump_id: String,
    pub category_name: String,
}

/// One scheduled point in time at which a reminder should fire.
///
/// Ephemeral: recomputed on every planning pass. The identifier is
/// deterministic from (dump_id, task_uid, slot index) so re-registration
/// is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderTrigger {
    pub identifier: String,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub payload: TriggerPayload,
}

/// Deterministic identifier base shared by every trigger of one task.
/// The registrar diffs registrations by this prefix. `|` never occurs in
/// dump or task ids, so distinct tasks never share a prefix even when
/// the ids themselves contain `-`.
pub fn trigger_prefix(dump_id: &str, task_uid: &str) -> String {
    format!("rem|{}|{}", dump_id, task_uid)
}

// --- CATEGORIES & NUDGES ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default = "default_uid")]
    pub uid: String,
    pub name: String,
    pub emoji: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub emoji: String,
    pub name: String,
    pub count: u32,
}

/// Derived snapshot of pending work, fed to the nudge planner.
/// Not persisted here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NudgeState {
    pub pending_count: u32,
    #[serde(default)]
    pub category_breakdown: Vec<CategoryCount>,
}
