// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time resolver: convert `(hour, minute, am/pm, named zone)` into an
//! absolute UTC instant, using a real IANA tz database (`chrono-tz`) rather
//! than a hand-rolled offset table — the legacy behavior this replaces was
//! buggy around daylight saving transitions.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, ErrorKind};

/// Resolve "the next occurrence of this wall-clock time in this zone",
/// relative to `now`. If the target time today has already passed, the
/// instant advances by one day.
pub fn resolve(hour: u32, minute: u32, meridiem: &str, zone_name: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let hour_24 = to_24_hour(hour, minute, meridiem)
        .map_err(|e| AppError::new(ErrorKind::InvalidTimeFormat, e))?;

    let tz: Tz = zone_name
        .trim()
        .parse()
        .map_err(|_| AppError::new(ErrorKind::InvalidTimezone, zone_name.to_string()))?;

    let now_local = now.with_timezone(&tz);
    let target_time = NaiveTime::from_hms_opt(hour_24, minute, 0)
        .ok_or_else(|| AppError::new(ErrorKind::InvalidTimeFormat, format!("{hour_24}:{minute}")))?;

    let mut target_date = now_local.date_naive();
    let mut target_instant = resolve_local(tz, target_date, target_time)?;

    if target_instant <= now {
        target_date = target_date
            .succ_opt()
            .ok_or_else(|| AppError::new(ErrorKind::InvalidTimeFormat, "date overflow".to_string()))?;
        target_instant = resolve_local(tz, target_date, target_time)?;
    }

    Ok(target_instant)
}

/// Resolve a local wall-clock date+time in `tz` to a UTC instant, handling
/// DST ambiguity by preferring the earlier of two valid offsets and a
/// skipped (spring-forward) local time by rolling forward to the next
/// valid instant.
fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> anyhow::Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _latest) => Ok(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => {
            // Local time falls in a spring-forward gap; nudge forward an
            // hour and retry once rather than failing the whole event.
            let nudged = naive + Duration::hours(1);
            match tz.from_local_datetime(&nudged) {
                chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
                chrono::LocalResult::None => {
                    anyhow::bail!(AppError::new(
                        ErrorKind::InvalidTimeFormat,
                        format!("{naive} has no valid local representation in {tz}")
                    ))
                }
            }
        }
    }
}

fn to_24_hour(hour: u32, minute: u32, meridiem: &str) -> Result<u32, String> {
    if !(1..=12).contains(&hour) {
        return Err(format!("hour {hour} out of range 1-12"));
    }
    if minute > 59 {
        return Err(format!("minute {minute} out of range 0-59"));
    }
    match meridiem.to_lowercase().as_str() {
        "am" => Ok(if hour == 12 { 0 } else { hour }),
        "pm" => Ok(if hour == 12 { 12 } else { hour + 12 }),
        other => Err(format!("invalid meridiem {other:?}, expected am or pm")),
    }
}

/// Remaining time until `deadline`, saturating to zero rather than going
/// negative once the deadline has passed.
pub fn remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> StdDuration {
    (deadline - now).to_std().unwrap_or(StdDuration::ZERO)
}

#[cfg(test)]
#[path = "timeres_tests.rs"]
mod tests;
