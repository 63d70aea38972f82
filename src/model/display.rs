// File: ./src/model/display.rs
use crate::model::ParsedTask;

/// Renders a parse result as short display chips for live feedback.
///
/// Fixed field order (date, time, duration, priority, context, tags) and
/// deterministic output, so identical input never reorders between
/// keystrokes.
pub fn preview_chips(parsed: &ParsedTask) -> Vec<String> {
    let mut chips = Vec::new();

    if let Some(d) = parsed.scheduled_date {
        chips.push(format!("📅 {}", d.format("%a %b %-d")));
    }
    if let Some(t) = parsed.scheduled_time {
        chips.push(format!("⏰ {}", t.format("%H:%M")));
    }
    if let Some(mins) = parsed.duration_mins {
        chips.push(format!("⏳ {}", format_duration_short(mins)));
    }
    if let Some(p) = parsed.priority {
        chips.push(format!("{} priority", p));
    }
    if let Some(ctx) = &parsed.context {
        chips.push(format!("@{}", ctx));
    }
    for tag in &parsed.tags {
        chips.push(format!("#{}", tag));
    }

    chips
}

fn format_duration_short(mins: u32) -> String {
    if mins >= 60 && mins % 60 == 0 {
        format!("{}h", mins / 60)
    } else if mins > 60 {
        format!("{}h{}m", mins / 60, mins % 60)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_chip_order_is_stable() {
        let parsed = ParsedTask {
            clean_text: "Call mom".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 3),
            scheduled_time: NaiveTime::from_hms_opt(15, 0, 0),
            priority: Some(Priority::High),
            context: Some("home".to_string()),
            duration_mins: Some(90),
            tags: vec!["family".to_string()],
        };
        let chips = preview_chips(&parsed);
        assert_eq!(
            chips,
            vec![
                "📅 Tue Mar 3",
                "⏰ 15:00",
                "⏳ 1h30m",
                "High priority",
                "@home",
                "#family",
            ]
        );
        // Re-rendering identical input must not flicker
        assert_eq!(chips, preview_chips(&parsed));
    }

    #[test]
    fn test_empty_parse_yields_no_chips() {
        assert!(preview_chips(&ParsedTask::default()).is_empty());
    }
}
