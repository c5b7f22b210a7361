//! Dates, instants, durations and time zones.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, TimeDelta, Utc};

use crate::{
    adapters::StringForm,
    errors::Error,
    marshal::{Marshal, Shape},
};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// An instant, encoded as RFC 3339 in UTC.
///
/// Fractional seconds are written only when present, with as many digits as
/// needed to keep full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(parsed) => Ok(Timestamp(parsed.with_timezone(&Utc))),
            Err(err) => parse_extended_year(s)
                .map(Timestamp)
                .ok_or_else(|| Error::malformed("Timestamp", format!("`{s}`: {err}"))),
        }
    }
}

/// Parses the signed form written for years outside `0..=9999`, such as
/// `+10000-01-01T00:00:00Z` or `-0001-01-01T00:00:00Z`.
fn parse_extended_year(s: &str) -> Option<DateTime<Utc>> {
    if !s.starts_with(['+', '-']) {
        return None;
    }
    let (negative, rest) = split_sign(s);
    let (digits, tail) = rest.split_once('-')?;
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    let year = if negative { -year } else { year };

    // 2000 is a leap year, so every month and day parses here.
    let placeholder = DateTime::parse_from_rfc3339(&format!("2000-{tail}")).ok()?;
    let local = placeholder.naive_local().with_year(year)?;
    local
        .and_local_timezone(*placeholder.offset())
        .single()
        .map(|parsed| parsed.with_timezone(&Utc))
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// A calendar date without time zone, `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(pub NaiveDate);

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        CalendarDate(value)
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(CalendarDate)
            .map_err(|err| Error::malformed("CalendarDate", format!("`{s}`: {err}")))
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// An exact amount of time, encoded as an ISO-8601 duration such as `PT1H30M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoDuration(pub TimeDelta);

impl From<TimeDelta> for IsoDuration {
    fn from(value: TimeDelta) -> Self {
        IsoDuration(value)
    }
}

impl Display for IsoDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let negative = self.0 < TimeDelta::zero();
        let magnitude = if negative { -self.0 } else { self.0 };
        let total_seconds = magnitude.num_seconds();
        let nanos = magnitude.subsec_nanos();

        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if negative {
            f.write_str("-")?;
        }
        f.write_str("PT")?;
        if hours != 0 {
            write!(f, "{hours}H")?;
        }
        if minutes != 0 {
            write!(f, "{minutes}M")?;
        }
        if seconds != 0 || nanos != 0 || (hours == 0 && minutes == 0) {
            write!(f, "{seconds}")?;
            if nanos != 0 {
                let fraction = format!("{nanos:09}");
                write!(f, ".{}", fraction.trim_end_matches('0'))?;
            }
            f.write_str("S")?;
        }
        Ok(())
    }
}

impl FromStr for IsoDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| Error::malformed("IsoDuration", format!("`{s}`: {reason}"));

        let upper = s.to_ascii_uppercase();
        let (negative, rest) = split_sign(&upper);
        let rest = rest
            .strip_prefix('P')
            .ok_or_else(|| malformed("missing `P`"))?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((_, "")) => return Err(malformed("empty time section")),
            Some((date, time)) => (date, Some(time)),
            None => (rest, None),
        };

        let date_components = parse_components(date_part, &['D'], false)
            .ok_or_else(|| malformed("invalid date section"))?;
        let time_components = match time_part {
            Some(time) => parse_components(time, &['H', 'M', 'S'], true)
                .ok_or_else(|| malformed("invalid time section"))?,
            None => Vec::new(),
        };
        if date_components.is_empty() && time_components.is_empty() {
            return Err(malformed("no components"));
        }

        let mut total: i128 = 0;
        for component in date_components.iter().chain(time_components.iter()) {
            let unit_seconds: i128 = match component.unit {
                'D' => 86_400,
                'H' => 3_600,
                'M' => 60,
                _ => 1,
            };
            total = component
                .nanos
                .checked_mul(unit_seconds)
                .and_then(|n| total.checked_add(n))
                .ok_or_else(|| malformed("out of range"))?;
        }
        if negative {
            total = -total;
        }

        let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND))
            .map_err(|_| malformed("out of range"))?;
        let nanos = total.rem_euclid(NANOS_PER_SECOND) as u32;
        TimeDelta::new(seconds, nanos)
            .map(IsoDuration)
            .ok_or_else(|| malformed("out of range"))
    }
}

/// A calendar-based amount of time, encoded as an ISO-8601 period such as `P1M`.
///
/// Unlike [`IsoDuration`], months and years have no fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub weeks: i32,
    pub days: i32,
}

impl Period {
    pub fn years(years: i32) -> Self {
        Period {
            years,
            ..Default::default()
        }
    }

    pub fn months(months: i32) -> Self {
        Period {
            months,
            ..Default::default()
        }
    }

    pub fn weeks(weeks: i32) -> Self {
        Period {
            weeks,
            ..Default::default()
        }
    }

    pub fn days(days: i32) -> Self {
        Period {
            days,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Period::default()
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        for (value, unit) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if value != 0 {
                write!(f, "{value}{unit}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::malformed("Period", format!("`{s}` is not a PnYnMnWnD period"));

        let rest = s
            .to_ascii_uppercase()
            .strip_prefix('P')
            .map(str::to_string)
            .ok_or_else(malformed)?;
        let components =
            parse_components(&rest, &['Y', 'M', 'W', 'D'], false).ok_or_else(malformed)?;
        if components.is_empty() {
            return Err(malformed());
        }

        let mut period = Period::default();
        for component in components {
            let value =
                i32::try_from(component.nanos / NANOS_PER_SECOND).map_err(|_| malformed())?;
            match component.unit {
                'Y' => period.years = value,
                'M' => period.months = value,
                'W' => period.weeks = value,
                _ => period.days = value,
            }
        }
        Ok(period)
    }
}

/// A time zone identifier: `Z`, a fixed offset such as `+09:00`, a
/// `UTC`/`GMT`/`UT` prefixed offset, or a region id such as `Asia/Tokyo`.
///
/// Region ids are checked for form only; they are kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fixed offset of this zone, if it is not a region.
    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        let id = self.0.as_str();
        if id == "Z" {
            return FixedOffset::east_opt(0);
        }
        let offset = ["UTC", "GMT", "UT"]
            .iter()
            .find_map(|prefix| id.strip_prefix(prefix))
            .unwrap_or(id);
        if offset.is_empty() {
            return FixedOffset::east_opt(0);
        }
        parse_offset_seconds(offset).and_then(FixedOffset::east_opt)
    }
}

impl FromStr for ZoneId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let zone = ZoneId(s.to_string());
        let is_offset_form = s == "Z"
            || s.starts_with(['+', '-'])
            || ["UTC", "GMT", "UT"].contains(&s)
            || ["UTC+", "UTC-", "GMT+", "GMT-", "UT+", "UT-"]
                .iter()
                .any(|prefix| s.starts_with(prefix));

        let valid = if is_offset_form {
            zone.fixed_offset().is_some()
        } else {
            is_region_id(s)
        };
        if valid {
            Ok(zone)
        } else {
            Err(Error::malformed(
                "ZoneId",
                format!("`{s}` is not a zone offset or region id"),
            ))
        }
    }
}

impl Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Region ids follow `[A-Za-z][A-Za-z0-9~/._+-]+`.
fn is_region_id(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    first.is_ascii_alphabetic()
        && !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "~/._+-".contains(c))
}

/// Parses `+H`, `+HH`, `+HH:MM`, `+HHMM`, `+HH:MM:SS` or `+HHMMSS` into seconds east of UTC.
fn parse_offset_seconds(offset: &str) -> Option<i32> {
    let (sign, body) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let fields: Vec<&str> = if body.contains(':') {
        body.split(':').collect()
    } else {
        match body.len() {
            1 | 2 => vec![body],
            4 => vec![&body[..2], &body[2..]],
            6 => vec![&body[..2], &body[2..4], &body[4..]],
            _ => return None,
        }
    };
    if fields.len() > 3 || fields[1..].iter().any(|f| f.len() != 2) {
        return None;
    }

    let mut parsed = fields.iter().map(|f| f.parse::<i32>().ok());
    let hours = parsed.next()??;
    let minutes = parsed.next().unwrap_or(Some(0))?;
    let seconds = parsed.next().unwrap_or(Some(0))?;
    if hours > 18 || minutes > 59 || seconds > 59 {
        return None;
    }
    let total = hours * 3600 + minutes * 60 + seconds;
    if total > 18 * 3600 {
        return None;
    }
    Some(sign * total)
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

/// One `<number><unit>` component, scaled to billionths of a unit.
struct Component {
    unit: char,
    nanos: i128,
}

/// Parses consecutive `<number><unit>` components, with units appearing in the
/// order given by `units` and each at most once. Only the last unit may carry
/// a fraction, and only when `fraction_on_last` is set.
fn parse_components(s: &str, units: &[char], fraction_on_last: bool) -> Option<Vec<Component>> {
    let mut components = Vec::new();
    let mut remaining_units = units;
    let mut rest = s;

    while !rest.is_empty() {
        let end = rest.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, tail) = rest.split_at(end);
        let unit = tail.chars().next()?;
        rest = &tail[unit.len_utf8()..];

        let position = remaining_units.iter().position(|u| *u == unit)?;
        remaining_units = &remaining_units[position + 1..];
        let fraction_allowed = fraction_on_last && units.last() == Some(&unit);

        let (negative, digits) = split_sign(number);
        let (whole, fraction) = match digits.split_once(['.', ',']) {
            Some(_) if !fraction_allowed => return None,
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty()
            || fraction.len() > 9
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        if digits.contains(['.', ',']) && fraction.is_empty() {
            return None;
        }

        let whole: i128 = whole.parse().ok()?;
        let fraction: i128 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<9}").parse().ok()?
        };
        let magnitude = whole.checked_mul(NANOS_PER_SECOND)?.checked_add(fraction)?;
        components.push(Component {
            unit,
            nanos: if negative { -magnitude } else { magnitude },
        });
    }

    Some(components)
}

impl StringForm for Timestamp {
    const TYPE_NAME: &'static str = "Timestamp";
}

impl StringForm for CalendarDate {
    const TYPE_NAME: &'static str = "CalendarDate";
}

impl StringForm for IsoDuration {
    const TYPE_NAME: &'static str = "IsoDuration";
}

impl StringForm for Period {
    const TYPE_NAME: &'static str = "Period";
}

impl StringForm for ZoneId {
    const TYPE_NAME: &'static str = "ZoneId";
}

impl Marshal for Timestamp {
    const SHAPES: &'static [Shape] = &[Shape::Json, Shape::DomainParam];

    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Marshal for CalendarDate {
    const SHAPES: &'static [Shape] = &[Shape::Json, Shape::DomainParam];

    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Marshal for IsoDuration {}

impl Marshal for Period {}

impl Marshal for ZoneId {
    const SHAPES: &'static [Shape] = &[Shape::Json, Shape::DomainParam];

    fn to_param(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

string_form_serde!(Timestamp, CalendarDate, IsoDuration, Period, ZoneId);
