// File: ./src/config.rs
// Reminder offsets and import window, loaded from disk with defaults.
use anyhow::Result;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_due_lead_mins() -> u32 {
    30
}
fn default_evening_before() -> String {
    "20:00".to_string()
}
fn default_morning_of() -> String {
    "09:00".to_string()
}
fn default_estimate_lead_mins() -> u32 {
    15
}
fn default_nudge_morning() -> String {
    "09:00".to_string()
}
fn default_nudge_evening() -> String {
    "20:00".to_string()
}
fn default_calendar_window_days() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Minutes before the due instant for the closest reminder.
    #[serde(default = "default_due_lead_mins")]
    pub due_lead_mins: u32,

    /// Local time of the evening-before reminder ("HH:MM").
    #[serde(default = "default_evening_before")]
    pub evening_before: String,

    /// Local time of the morning-of reminder ("HH:MM").
    #[serde(default = "default_morning_of")]
    pub morning_of: String,

    /// Minutes before a scheduled clock-time estimate.
    #[serde(default = "default_estimate_lead_mins")]
    pub estimate_lead_mins: u32,

    #[serde(default = "default_nudge_morning")]
    pub nudge_morning: String,

    #[serde(default = "default_nudge_evening")]
    pub nudge_evening: String,

    /// How far ahead the calendar importer looks, in days.
    #[serde(default = "default_calendar_window_days")]
    pub calendar_window_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            due_lead_mins: default_due_lead_mins(),
            evening_before: default_evening_before(),
            morning_of: default_morning_of(),
            estimate_lead_mins: default_estimate_lead_mins(),
            nudge_morning: default_nudge_morning(),
            nudge_evening: default_nudge_evening(),
            calendar_window_days: default_calendar_window_days(),
        }
    }
}

impl ReminderConfig {
    fn path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "braindump", "braindump")?;
        Some(dirs.config_dir().join("reminders.toml"))
    }

    /// Loads the configuration, falling back to defaults if the file is
    /// missing or unreadable. Never fails.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Invalid reminder config ({}), using defaults", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::path() else {
            anyhow::bail!("Could not determine config path");
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn evening_before_time(&self) -> NaiveTime {
        parse_hhmm(&self.evening_before, 20)
    }
    pub fn morning_of_time(&self) -> NaiveTime {
        parse_hhmm(&self.morning_of, 9)
    }
    pub fn nudge_morning_time(&self) -> NaiveTime {
        parse_hhmm(&self.nudge_morning, 9)
    }
    pub fn nudge_evening_time(&self) -> NaiveTime {
        parse_hhmm(&self.nudge_evening, 20)
    }
}

fn parse_hhmm(s: &str, fallback_hour: u32) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(fallback_hour, 0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let cfg = ReminderConfig::default();
        assert_eq!(cfg.due_lead_mins, 30);
        assert_eq!(cfg.evening_before_time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(cfg.morning_of_time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(cfg.estimate_lead_mins, 15);
        assert_eq!(cfg.calendar_window_days, 30);
    }

    #[test]
    fn test_bad_time_string_falls_back() {
        let cfg = ReminderConfig {
            evening_before: "25:99".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.evening_before_time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }
}
