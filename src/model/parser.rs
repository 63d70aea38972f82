// File: ./src/model/parser.rs
use crate::model::{ParsedTask, Priority};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

#[derive(Debug, Clone, Copy, PartialEq)]
enum FragmentKind {
    Date,
    Time,
    Duration,
    Priority,
    Context,
    Tag,
}

/// Parses one line of capture text into structured task fields.
///
/// Total over all inputs: unrecognized or malformed expressions are
/// ignored and stay in `clean_text`; the empty string yields an
/// all-absent result. Relative dates ("tomorrow", "next friday") and
/// ambiguous clock times resolve against the caller-supplied `now`
/// (local wall clock) so the function stays pure and testable.
pub fn parse_task(input: &str, now: NaiveDateTime) -> ParsedTask {
    let words = split_with_spans(input);
    let mut parsed = ParsedTask::default();
    let mut kept: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < words.len() {
        let word = norm(&words[i].2);
        let mut matched: Option<(FragmentKind, usize)> = None;

        // Connector + expression ("at 3pm", "on friday", "for 30 min").
        // The connector joins the match span so it is stripped too.
        if is_connector(&word) && i + 1 < words.len() {
            if let Some((d, n)) = match_date(&words, i + 1, now.date()) {
                set_date(&mut parsed, d);
                matched = Some((FragmentKind::Date, 1 + n));
            } else if let Some((t, n)) = match_time(&words, i + 1, now, word == "at") {
                set_time(&mut parsed, t);
                matched = Some((FragmentKind::Time, 1 + n));
            } else if let Some((mins, n)) = match_duration(&words, i + 1) {
                set_duration(&mut parsed, mins);
                matched = Some((FragmentKind::Duration, 1 + n));
            }
        }

        // Categories are tried independently; a date match wins over a
        // time expression embedded in its span because it runs first.
        if matched.is_none() {
            if let Some((d, n)) = match_date(&words, i, now.date()) {
                set_date(&mut parsed, d);
                matched = Some((FragmentKind::Date, n));
            } else if let Some((t, n)) = match_time(&words, i, now, false) {
                set_time(&mut parsed, t);
                matched = Some((FragmentKind::Time, n));
            } else if let Some((mins, n)) = match_duration(&words, i) {
                set_duration(&mut parsed, mins);
                matched = Some((FragmentKind::Duration, n));
            } else if let Some((p, n)) = match_priority(&words, i) {
                if parsed.priority.is_none() {
                    parsed.priority = Some(p);
                }
                matched = Some((FragmentKind::Priority, n));
            } else if let Some(ctx) = match_context(&words[i].2) {
                if parsed.context.is_none() {
                    parsed.context = Some(ctx);
                }
                matched = Some((FragmentKind::Context, 1));
            } else if let Some(tag) = match_tag(&words[i].2) {
                if !parsed.tags.contains(&tag) {
                    parsed.tags.push(tag);
                }
                matched = Some((FragmentKind::Tag, 1));
            }
        }

        match matched {
            Some((_, n)) => i += n,
            None => {
                kept.push(words[i].2.as_str());
                i += 1;
            }
        }
    }

    parsed.clean_text = finish_clean_text(&kept);
    parsed
}

fn set_date(parsed: &mut ParsedTask, d: NaiveDate) {
    if parsed.scheduled_date.is_none() {
        parsed.scheduled_date = Some(d);
    }
}
fn set_time(parsed: &mut ParsedTask, t: NaiveTime) {
    if parsed.scheduled_time.is_none() {
        parsed.scheduled_time = Some(t);
    }
}
fn set_duration(parsed: &mut ParsedTask, mins: u32) {
    if parsed.duration_mins.is_none() {
        parsed.duration_mins = Some(mins);
    }
}

fn is_connector(w: &str) -> bool {
    matches!(w, "at" | "on" | "by" | "for" | "due")
}

/// Splits into words with their byte spans in the input.
fn split_with_spans(input: &str) -> Vec<(usize, usize, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut start_idx = 0;
    for (idx, c) in input.char_indices() {
        if c.is_whitespace() {
            if !current.is_empty() {
                parts.push((start_idx, idx, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                start_idx = idx;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        parts.push((start_idx, input.len(), current));
    }
    parts
}

/// Lowercases and trims sentence punctuation off both ends of a word so
/// "tomorrow," still matches.
fn norm(word: &str) -> String {
    word.trim_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | ';'))
        .to_lowercase()
}

fn finish_clean_text(kept: &[&str]) -> String {
    let joined = kept.join(" ");
    joined
        .trim()
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '-'))
        .trim_start_matches(|c: char| matches!(c, ',' | ';' | ':' | '-'))
        .trim()
        .to_string()
}

// --- DATE MATCHING ---

fn match_date(
    words: &[(usize, usize, String)],
    i: usize,
    today: NaiveDate,
) -> Option<(NaiveDate, usize)> {
    let w = norm(&words[i].2);
    match w.as_str() {
        "today" | "tonight" => return Some((today, 1)),
        "tomorrow" => return Some((today + Duration::days(1), 1)),
        "next" if i + 1 < words.len() => {
            let next = norm(&words[i + 1].2);
            if next == "week" {
                return Some((today + Duration::days(7), 2));
            }
            if let Some(wd) = parse_weekday(&next) {
                return Some((next_weekday(today, wd), 2));
            }
        }
        "in" if i + 1 < words.len() => {
            let amount = parse_english_number(&norm(&words[i + 1].2))?;
            let unit = norm(words.get(i + 2)?.2.as_str());
            let days = match unit.as_str() {
                "day" | "days" => amount as i64,
                "week" | "weeks" => amount as i64 * 7,
                "month" | "months" => amount as i64 * 30,
                _ => return None,
            };
            return Some((today + Duration::days(days), 3));
        }
        _ => {}
    }

    if let Some(wd) = parse_weekday(&w) {
        return Some((next_weekday(today, wd), 1));
    }

    // "March 3", "march 3rd"
    if let Some(month) = parse_month(&w)
        && i + 1 < words.len()
        && let Some(day) = parse_day_number(&norm(&words[i + 1].2))
        && let Some(date) = nearest_future_ymd(today, month, day)
    {
        return Some((date, 2));
    }

    // "3/10" or "3/10/2026"
    if w.contains('/') {
        let parts: Vec<&str> = w.split('/').collect();
        if parts.len() == 2 || parts.len() == 3 {
            let month: u32 = parts[0].parse().ok()?;
            let day: u32 = parts[1].parse().ok()?;
            if (1..=12).contains(&month) && (1..=31).contains(&day) {
                if parts.len() == 3 {
                    let year: i32 = parts[2].parse().ok()?;
                    let year = if year < 100 { year + 2000 } else { year };
                    return NaiveDate::from_ymd_opt(year, month, day).map(|d| (d, 1));
                }
                if let Some(date) = nearest_future_ymd(today, month, day) {
                    return Some((date, 1));
                }
            }
        }
    }

    None
}

/// Month/day without a year resolves to the nearest future occurrence.
fn nearest_future_ymd(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(d) if d >= today => Some(d),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_weekday(from: NaiveDate, target: Weekday) -> NaiveDate {
    let mut d = from + Duration::days(1);
    while d.weekday() != target {
        d += Duration::days(1);
    }
    d
}

fn parse_month(s: &str) -> Option<u32> {
    match s {
        "jan" | "january" => Some(1),
        "feb" | "february" => Some(2),
        "mar" | "march" => Some(3),
        "apr" | "april" => Some(4),
        "may" => Some(5),
        "jun" | "june" => Some(6),
        "jul" | "july" => Some(7),
        "aug" | "august" => Some(8),
        "sep" | "sept" | "september" => Some(9),
        "oct" | "october" => Some(10),
        "nov" | "november" => Some(11),
        "dec" | "december" => Some(12),
        _ => None,
    }
}

fn parse_day_number(s: &str) -> Option<u32> {
    let digits = s
        .strip_suffix("st")
        .or_else(|| s.strip_suffix("nd"))
        .or_else(|| s.strip_suffix("rd"))
        .or_else(|| s.strip_suffix("th"))
        .unwrap_or(s);
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_english_number(s: &str) -> Option<u32> {
    match s {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        _ => s.parse::<u32>().ok(),
    }
}

// --- TIME MATCHING ---

fn match_time(
    words: &[(usize, usize, String)],
    i: usize,
    now: NaiveDateTime,
    allow_bare_hour: bool,
) -> Option<(NaiveTime, usize)> {
    let w = norm(&words[i].2);
    match w.as_str() {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0).map(|t| (t, 1)),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0).map(|t| (t, 1)),
        _ => {}
    }

    if let Some(t) = parse_clock_token(&w, now) {
        return Some((t, 1));
    }

    // "3 pm" split across two words
    if i + 1 < words.len() {
        let next = norm(&words[i + 1].2);
        if (next == "am" || next == "pm")
            && let Some(t) = parse_clock_token(&format!("{}{}", w, next), now)
        {
            return Some((t, 2));
        }
    }

    // Bare hour ("at 3"): no am/pm marker, nearest future occurrence.
    if allow_bare_hour
        && let Ok(h) = w.parse::<u32>()
        && (1..=12).contains(&h)
    {
        return Some((resolve_ambiguous(h, 0, now)?, 1));
    }

    None
}

/// Parses "3pm", "3:30pm", "15:00". A colon form without an am/pm marker
/// and with hour <= 12 is ambiguous and resolves to the nearest future
/// occurrence relative to `now`.
fn parse_clock_token(s: &str, now: NaiveDateTime) -> Option<NaiveTime> {
    let (body, meridiem) = if let Some(b) = s.strip_suffix("am") {
        (b, Some(false))
    } else if let Some(b) = s.strip_suffix("pm") {
        (b, Some(true))
    } else {
        (s, None)
    };

    let (h, m) = if let Some((h_str, m_str)) = body.split_once(':') {
        (h_str.parse::<u32>().ok()?, m_str.parse::<u32>().ok()?)
    } else {
        // Bare numbers without a marker are too ambiguous to claim here;
        // they are only accepted after "at" (see match_time).
        meridiem?;
        (body.parse::<u32>().ok()?, 0)
    };
    if m > 59 {
        return None;
    }

    match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&h) {
                return None;
            }
            let h24 = if h == 12 {
                if is_pm { 12 } else { 0 }
            } else if is_pm {
                h + 12
            } else {
                h
            };
            NaiveTime::from_hms_opt(h24, m, 0)
        }
        None => {
            if h > 23 {
                return None;
            }
            if h > 12 || h == 0 {
                // Unambiguous 24-hour clock
                NaiveTime::from_hms_opt(h, m, 0)
            } else {
                resolve_ambiguous(h, m, now)
            }
        }
    }
}

/// Picks the am or pm reading of an ambiguous hour, whichever comes next.
fn resolve_ambiguous(h: u32, m: u32, now: NaiveDateTime) -> Option<NaiveTime> {
    let am = NaiveTime::from_hms_opt(h % 12, m, 0)?;
    let pm = NaiveTime::from_hms_opt(h % 12 + 12, m, 0)?;
    let t = now.time();
    if am > t {
        Some(am)
    } else if pm > t {
        Some(pm)
    } else {
        // Both already past today: earliest tomorrow
        Some(am)
    }
}

// --- DURATION MATCHING ---

fn match_duration(words: &[(usize, usize, String)], i: usize) -> Option<(u32, usize)> {
    let w = norm(&words[i].2);

    if let Some(mins) = parse_duration_token(&w) {
        return Some((mins, 1));
    }

    // "30 min", "two hours"
    if i + 1 < words.len()
        && let Some(amount) = parse_english_number(&w)
    {
        let unit = norm(&words[i + 1].2);
        let mins = match unit.as_str() {
            "min" | "mins" | "minute" | "minutes" => amount,
            "h" | "hr" | "hrs" | "hour" | "hours" => amount * 60,
            _ => return None,
        };
        return Some((mins, 2));
    }

    None
}

/// Parses compact duration tokens: "30m", "45min", "2h", "1h30m".
fn parse_duration_token(s: &str) -> Option<u32> {
    if let Some(rest) = s.strip_suffix('m')
        && let Some((h_str, m_str)) = rest.split_once('h')
    {
        let h: u32 = h_str.parse().ok()?;
        let m: u32 = m_str.parse().ok()?;
        return Some(h * 60 + m);
    }
    if let Some(n) = s.strip_suffix("mins").or_else(|| s.strip_suffix("min")) {
        return n.parse::<u32>().ok();
    }
    if let Some(n) = s.strip_suffix('m') {
        return n.parse::<u32>().ok();
    }
    if let Some(n) = s
        .strip_suffix("hrs")
        .or_else(|| s.strip_suffix("hr"))
        .or_else(|| s.strip_suffix('h'))
    {
        return n.parse::<u32>().ok().map(|h| h * 60);
    }
    None
}

// --- PRIORITY / CONTEXT / TAGS ---

fn match_priority(words: &[(usize, usize, String)], i: usize) -> Option<(Priority, usize)> {
    let w = norm(&words[i].2);
    match w.as_str() {
        "urgent" | "asap" | "important" => return Some((Priority::High, 1)),
        "medium" => return Some((Priority::Medium, 1)),
        "whenever" | "someday" | "eventually" => return Some((Priority::Low, 1)),
        _ => {}
    }
    if i + 1 < words.len() && norm(&words[i + 1].2) == "priority" {
        let p = match w.as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => return None,
        };
        return Some((p, 2));
    }
    None
}

const CONTEXT_KEYWORDS: &[&str] = &[
    "home", "work", "anywhere", "calls", "errands", "phone", "computer",
];

fn match_context(raw: &str) -> Option<String> {
    let w = norm(raw);
    if CONTEXT_KEYWORDS.contains(&w.as_str()) {
        return Some(w);
    }
    // "@home" style, but not "@@" or a lone "@"
    if let Some(rest) = raw.strip_prefix('@')
        && !rest.is_empty()
        && !rest.starts_with('@')
    {
        let ctx = norm(rest);
        if !ctx.is_empty() {
            return Some(ctx);
        }
    }
    None
}

fn match_tag(raw: &str) -> Option<String> {
    let rest = raw.strip_prefix('#')?;
    let tag = rest
        .trim_end_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | ';'))
        .to_string();
    (!tag.is_empty()).then_some(tag)
}
