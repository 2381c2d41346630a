//! Civil-date arithmetic: workday counting, Easter and German public
//! holidays, and humanized relative-day phrases.
//!
//! Dates are plain Gregorian calendar days without time or timezone.
//! Day arithmetic uses the standard days-from-civil algorithm, so
//! differences are exact across month and year boundaries.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("invalid date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidFormat(String),
    #[error("date out of range: {year:04}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// A Gregorian calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Date, DateError> {
        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return Err(DateError::OutOfRange { year, month, day });
        }
        Ok(Date {
            year,
            month: month as u8,
            day: day as u8,
        })
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse_iso(s: &str) -> Result<Date, DateError> {
        let invalid = || DateError::InvalidFormat(s.to_owned());
        let mut parts = s.splitn(3, '-');
        let year = parts.next().ok_or_else(invalid)?;
        let month = parts.next().ok_or_else(invalid)?;
        let day = parts.next().ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        Date::new(year, month, day)
    }

    /// The current day in UTC.
    pub fn today_utc() -> Date {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Date::from_day_number(secs as i64 / 86_400)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        u32::from(self.month)
    }

    pub fn day(&self) -> u32 {
        u32::from(self.day)
    }

    /// Days since 1970-01-01 (negative before the epoch).
    pub fn day_number(&self) -> i64 {
        days_from_civil(self.year, self.month(), self.day())
    }

    pub fn from_day_number(days: i64) -> Date {
        let (year, month, day) = civil_from_days(days);
        Date {
            year,
            month: month as u8,
            day: day as u8,
        }
    }

    pub fn add_days(&self, days: i64) -> Date {
        Date::from_day_number(self.day_number() + days)
    }

    /// ISO weekday: 1 = Monday .. 7 = Sunday.
    pub fn weekday(&self) -> u32 {
        // the epoch (day 0) was a Thursday
        ((self.day_number() + 3).rem_euclid(7) + 1) as u32
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday() > 5
    }

    /// `dd.mm.yyyy`, the display format used for out-of-range relative
    /// phrases.
    pub fn format_dmy(&self) -> String {
        format!("{:02}.{:02}.{}", self.day, self.month, self.year)
    }
}

/// Signed day difference `to - from`.
pub fn days_between(from: Date, to: Date) -> i64 {
    to.day_number() - from.day_number()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

// Howard Hinnant's days_from_civil / civil_from_days.
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    ((y + i64::from(m <= 2)) as i32, m as u32, d as u32)
}

/// Easter Sunday for a year, via the anonymous Gregorian algorithm
/// (Meeus/Jones/Butcher).
pub fn easter_sunday(year: i32) -> Date {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    Date {
        year,
        month: month as u8,
        day: day as u8,
    }
}

/// Nationwide official public holidays in Germany for a year: the five
/// fixed days plus the four Easter-relative ones.
pub fn german_public_holidays(year: i32) -> Vec<Date> {
    let easter = easter_sunday(year);
    let mut holidays = vec![
        Date { year, month: 1, day: 1 },    // New Year
        easter.add_days(-2),                // Good Friday
        easter.add_days(1),                 // Easter Monday
        Date { year, month: 5, day: 1 },    // Labour Day
        easter.add_days(39),                // Ascension
        easter.add_days(50),                // Whit Monday
        Date { year, month: 10, day: 3 },   // German Unity Day
        Date { year, month: 12, day: 25 },  // Christmas Day
        Date { year, month: 12, day: 26 },  // Boxing Day
    ];
    holidays.sort_unstable();
    holidays
}

/// Count the workdays (Monday to Friday) strictly between two dates,
/// optionally skipping German public holidays. Reversed arguments are
/// swapped; the two boundary days never count.
pub fn workdays_between(start: Date, end: Date, exclude_holidays: bool) -> i64 {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };

    let holidays: HashSet<Date> = if exclude_holidays {
        (start.year..=end.year)
            .flat_map(german_public_holidays)
            .collect()
    } else {
        HashSet::new()
    };

    let mut count: i64 = 0;
    let mut cursor = start;
    while cursor <= end {
        if !cursor.is_weekend() && !holidays.contains(&cursor) {
            count += 1;
        }
        cursor = cursor.add_days(1);
    }
    (count - 2).max(0)
}

/// Phrase set for [`relative_day_phrase`]. The `*_n_days` fields are
/// templates; `{n}` is replaced with the day count.
#[derive(Debug, Clone)]
pub struct Translations {
    pub last_week: String,
    pub since_1_week: String,
    pub since_n_days: String,
    pub day_before_yesterday: String,
    pub yesterday: String,
    pub since_yesterday: String,
    pub today: String,
    pub tomorrow: String,
    pub day_after_tomorrow: String,
    pub in_n_days: String,
    pub next_week: String,
    pub in_1_week: String,
}

impl Translations {
    pub fn english() -> Translations {
        Translations {
            last_week: "last week".into(),
            since_1_week: "since 1 week".into(),
            since_n_days: "since {n} days".into(),
            day_before_yesterday: "the day before yesterday".into(),
            yesterday: "yesterday".into(),
            since_yesterday: "since yesterday".into(),
            today: "today".into(),
            tomorrow: "tomorrow".into(),
            day_after_tomorrow: "the day after tomorrow".into(),
            in_n_days: "in {n} days".into(),
            next_week: "next week".into(),
            in_1_week: "in 1 week".into(),
        }
    }

    pub fn german() -> Translations {
        Translations {
            last_week: "letzte Woche".into(),
            since_1_week: "seit 1 Woche".into(),
            since_n_days: "seit {n} Tagen".into(),
            day_before_yesterday: "Vorgestern".into(),
            yesterday: "Gestern".into(),
            since_yesterday: "seit gestern".into(),
            today: "Heute".into(),
            tomorrow: "Morgen".into(),
            day_after_tomorrow: "Übermorgen".into(),
            in_n_days: "in {n} Tagen".into(),
            next_week: "nächste Woche".into(),
            in_1_week: "in 1 Woche".into(),
        }
    }
}

impl Default for Translations {
    fn default() -> Translations {
        Translations::english()
    }
}

/// Humanize a date relative to `today` when it is within 8 days in
/// either direction ("yesterday", "in 2 days", "next week"); otherwise
/// format it as `dd.mm.yyyy`. `informal` picks colloquial phrases over
/// the "since/in n days" forms, matching how the phrases are used in
/// running text versus tabular output.
pub fn relative_day_phrase(
    date: Date,
    today: Date,
    informal: bool,
    translations: &Translations,
) -> String {
    let t = translations;
    let diff = days_between(today, date);
    let formatted = || date.format_dmy();
    let fill = |template: &str, n: i64| template.replace("{n}", &n.to_string());

    match diff {
        -8..=-5 => pick(informal, &t.last_week, &t.since_1_week),
        -4 | -3 => {
            if informal {
                formatted()
            } else {
                fill(&t.since_n_days, -diff)
            }
        }
        -2 => pick(informal, &t.day_before_yesterday, &fill(&t.since_n_days, 2)),
        -1 => pick(informal, &t.yesterday, &t.since_yesterday),
        0 => t.today.clone(),
        1 => t.tomorrow.clone(),
        2 => pick(informal, &t.day_after_tomorrow, &fill(&t.in_n_days, 2)),
        3 | 4 => {
            if informal {
                formatted()
            } else {
                fill(&t.in_n_days, diff)
            }
        }
        5..=8 => pick(informal, &t.next_week, &t.in_1_week),
        _ => formatted(),
    }
}

fn pick(informal: bool, casual: &str, formal: &str) -> String {
    if informal { casual } else { formal }.to_owned()
}
