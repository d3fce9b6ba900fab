//! Human-readable relative age of a timestamp ("3 hours ago").
//!
//! Months are approximated as 30-day buckets and years as 12 of those.

use chrono::{DateTime, Utc};

/// Render the age of `date` relative to `now`.
///
/// Dates at or after `now` render as "just now".
pub fn relative_age(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let seconds = (now - date).num_seconds();
  if seconds < 60 {
    return "just now".to_owned();
  }

  let minutes = seconds / 60;
  if minutes < 60 {
    return ago(minutes, "minute");
  }

  let hours = minutes / 60;
  if hours < 24 {
    return ago(hours, "hour");
  }

  let days = hours / 24;
  if days < 30 {
    return ago(days, "day");
  }

  let months = days / 30;
  if months < 12 {
    return ago(months, "month");
  }

  ago(months / 12, "year")
}

fn ago(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {unit} ago")
  } else {
    format!("{n} {unit}s ago")
  }
}
