use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error("{0}")]
    InvalidFormat(String),
}

fn invalid(message: impl Into<String>) -> TemporalError {
    TemporalError::InvalidFormat(message.into())
}

/// A calendar date with an optional time of day. No time means all-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub hours: u32,
    pub minutes: u32,
}

impl Duration {
    pub fn total_minutes(&self) -> i64 {
        i64::from(self.hours) * 60 + i64::from(self.minutes)
    }
}

impl ParsedDateTime {
    pub fn date(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: None,
            minute: None,
        }
    }

    pub fn timed(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: Some(hour),
            minute: Some(minute),
        }
    }

    fn from_naive_date(date: NaiveDate) -> Self {
        Self::date(date.year(), date.month(), date.day())
    }

    pub fn is_all_day(&self) -> bool {
        self.hour.is_none()
    }

    /// Renders `YYYY-MM-DDTHH:MM:00.000±HHMM`, the timestamp shape the TickTick API accepts.
    ///
    /// The offset comes from `timezone` (an IANA name) when given, otherwise from the host's
    /// local zone at that wall-clock time. All-day values render as local midnight.
    pub fn to_api_string(&self, timezone: Option<&str>) -> Result<String, TemporalError> {
        let hour = self.hour.unwrap_or(0);
        let minute = self.minute.unwrap_or(0);
        let naive = self.naive_datetime(hour, minute)?;

        let offset_seconds = match timezone.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                let zone: Tz = name
                    .parse()
                    .map_err(|_| invalid(format!("Unknown timezone '{name}'")))?;
                zone_offset_seconds(&zone, &naive)
            }
            None => zone_offset_seconds(&Local, &naive),
        };

        Ok(format!(
            "{:04}-{:02}-{:02}T{hour:02}:{minute:02}:00.000{}",
            self.year,
            self.month,
            self.day,
            format_offset(offset_seconds)
        ))
    }

    pub fn add_duration(&self, duration: Duration) -> Result<ParsedDateTime, TemporalError> {
        let (Some(hour), Some(minute)) = (self.hour, self.minute) else {
            return Err(invalid(
                "Cannot add duration to an all-day date (no time component)",
            ));
        };

        let start = self.naive_datetime(hour, minute)?;
        let end = TimeDelta::try_minutes(duration.total_minutes())
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or_else(|| invalid("Date out of range after adding duration"))?;

        Ok(Self::timed(
            end.year(),
            end.month(),
            end.day(),
            end.hour(),
            end.minute(),
        ))
    }

    fn naive_datetime(&self, hour: u32, minute: u32) -> Result<NaiveDateTime, TemporalError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| {
                invalid(format!(
                    "Invalid calendar date {:04}-{:02}-{:02}",
                    self.year, self.month, self.day
                ))
            })
    }
}

fn zone_offset_seconds<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> i32 {
    match zone.offset_from_local_datetime(naive).earliest() {
        Some(offset) => offset.fix().local_minus_utc(),
        // Wall-clock time skipped by a DST transition.
        None => zone.offset_from_utc_datetime(naive).fix().local_minus_utc(),
    }
}

fn format_offset(total_seconds: i32) -> String {
    let sign = if total_seconds >= 0 { '+' } else { '-' };
    let magnitude = total_seconds.unsigned_abs();
    format!("{sign}{:02}{:02}", magnitude / 3600, (magnitude % 3600) / 60)
}

/// Parses `today`, `tomorrow`, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM` against the host's local date.
pub fn parse_datetime(input: &str) -> Result<ParsedDateTime, TemporalError> {
    parse_datetime_on(input, Local::now().date_naive())
}

pub fn parse_datetime_on(input: &str, today: NaiveDate) -> Result<ParsedDateTime, TemporalError> {
    let normalized = input.trim().to_lowercase();

    match normalized.as_str() {
        "today" => return Ok(ParsedDateTime::from_naive_date(today)),
        "tomorrow" => {
            let tomorrow = today
                .succ_opt()
                .ok_or_else(|| invalid(format!("Invalid date '{input}': out of range")))?;
            return Ok(ParsedDateTime::from_naive_date(tomorrow));
        }
        _ => {}
    }

    match normalized.split_once('t') {
        Some((date_part, time_part)) => {
            let (year, month, day) = parse_date_part(date_part, input, "'today', or 'tomorrow'")?;
            let (hour, minute) = parse_time_part(time_part, input)?;
            Ok(ParsedDateTime::timed(year, month, day, hour, minute))
        }
        None => {
            let (year, month, day) =
                parse_date_part(&normalized, input, "'today', or 'tomorrow'")?;
            Ok(ParsedDateTime::date(year, month, day))
        }
    }
}

fn parse_date_part(
    value: &str,
    original: &str,
    keywords: &str,
) -> Result<(i32, u32, u32), TemporalError> {
    let parts: Vec<&str> = value.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid(format!(
            "Invalid date '{original}': expected YYYY-MM-DD, {keywords}"
        )));
    };

    let non_numeric = || invalid(format!("Invalid date '{original}': non-numeric components"));
    let year = year.parse::<i32>().map_err(|_| non_numeric())?;
    let month = month.parse::<i64>().map_err(|_| non_numeric())?;
    let day = day.parse::<i64>().map_err(|_| non_numeric())?;

    // Month length is not checked here: Feb 30 parses and fails later if a real instant is needed.
    if !(1..=12).contains(&month) {
        return Err(invalid(format!("Month out of range in '{original}'")));
    }
    if !(1..=31).contains(&day) {
        return Err(invalid(format!("Day out of range in '{original}'")));
    }

    Ok((year, month as u32, day as u32))
}

fn parse_time_part(value: &str, original: &str) -> Result<(u32, u32), TemporalError> {
    let Some((hour, minute)) = value.split_once(':') else {
        return Err(invalid(format!(
            "Invalid time in '{original}': expected HH:MM"
        )));
    };
    if minute.contains(':') {
        return Err(invalid(format!(
            "Invalid time in '{original}': expected HH:MM"
        )));
    }

    let non_numeric = || invalid(format!("Invalid time in '{original}': non-numeric components"));
    let hour = hour.parse::<u32>().map_err(|_| non_numeric())?;
    let minute = minute.parse::<u32>().map_err(|_| non_numeric())?;

    if hour > 23 {
        return Err(invalid(format!("Hour out of range in '{original}'")));
    }
    if minute > 59 {
        return Err(invalid(format!("Minute out of range in '{original}'")));
    }
    Ok((hour, minute))
}

/// Parses compact durations such as `1h`, `45m` or `1h30m`.
pub fn parse_duration(input: &str) -> Result<Duration, TemporalError> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(invalid("Invalid duration: empty string"));
    }
    if normalized.contains('-') {
        return Err(invalid(format!(
            "Invalid duration '{input}': negative durations are not allowed"
        )));
    }

    let mut hours: Option<u32> = None;
    let mut minutes: Option<u32> = None;
    let mut digits = String::new();

    for ch in normalized.chars() {
        let slot = match ch {
            '0'..='9' => {
                digits.push(ch);
                continue;
            }
            'h' => &mut hours,
            'm' => &mut minutes,
            other => {
                return Err(invalid(format!(
                    "Invalid duration '{input}': unexpected character '{other}'"
                )));
            }
        };

        if digits.is_empty() {
            return Err(invalid(format!(
                "Invalid duration '{input}': expected a number before '{ch}'"
            )));
        }
        if slot.is_some() {
            return Err(invalid(format!(
                "Invalid duration '{input}': duplicate '{ch}' component"
            )));
        }
        let value = digits
            .parse::<u32>()
            .map_err(|_| invalid(format!("Invalid duration '{input}': value too large")))?;
        *slot = Some(value);
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(invalid(format!(
            "Invalid duration '{input}': missing unit (h or m)"
        )));
    }
    if hours.is_none() && minutes.is_none() {
        return Err(invalid(format!("Invalid duration '{input}'")));
    }

    let duration = Duration {
        hours: hours.unwrap_or(0),
        minutes: minutes.unwrap_or(0),
    };
    if duration.total_minutes() == 0 {
        return Err(invalid(format!(
            "Invalid duration '{input}': duration must be greater than zero"
        )));
    }
    Ok(duration)
}

/// Converts `today`, `yesterday` or `YYYY-MM-DD` into the `YYYYMMDD` integer used by habit check-ins.
pub fn date_to_stamp(input: &str) -> Result<i64, TemporalError> {
    date_to_stamp_on(input, Local::now().date_naive())
}

pub fn date_to_stamp_on(input: &str, today: NaiveDate) -> Result<i64, TemporalError> {
    let (year, month, day) = match relative_day(input, today)? {
        Some(date) => (date.year(), date.month(), date.day()),
        None => parse_date_part(&input.trim().to_lowercase(), input, "'today', or 'yesterday'")?,
    };
    Ok(i64::from(year) * 10_000 + i64::from(month) * 100 + i64::from(day))
}

/// Midnight UTC of the given day, in epoch milliseconds.
pub fn date_to_epoch_ms(input: &str) -> Result<i64, TemporalError> {
    date_to_epoch_ms_on(input, Local::now().date_naive())
}

pub fn date_to_epoch_ms_on(input: &str, today: NaiveDate) -> Result<i64, TemporalError> {
    let date = match relative_day(input, today)? {
        Some(date) => date,
        None => parse_strict_date(input)?,
    };
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid(format!("Invalid date '{input}'")))?;
    Ok(Utc.from_utc_datetime(&midnight).timestamp_millis())
}

/// End of the given day (inclusive), in epoch milliseconds.
pub fn end_of_day_epoch_ms(start_of_day_ms: i64) -> i64 {
    start_of_day_ms + MILLIS_PER_DAY - 1
}

fn relative_day(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, TemporalError> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(Some(today)),
        "yesterday" => today
            .pred_opt()
            .map(Some)
            .ok_or_else(|| invalid(format!("Invalid date '{input}': out of range"))),
        _ => Ok(None),
    }
}

fn parse_strict_date(input: &str) -> Result<NaiveDate, TemporalError> {
    let normalized = input.trim();
    let bytes = normalized.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());
    if !shaped {
        return Err(invalid(format!("Invalid date '{input}'")));
    }

    NaiveDate::parse_from_str(normalized, "%Y-%m-%d")
        .map_err(|_| invalid(format!("Invalid date '{input}': not a calendar date")))
}
