//! Token resolution against calendar fields

use chrono::{Datelike, Timelike};

use super::token::{tokenize, DateToken, Segment};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Format a date with a .NET-style pattern
///
/// Works on anything with calendar and clock fields (`NaiveDateTime`,
/// `DateTime<Tz>`); the result depends only on the value passed in.
pub fn format_date<T: Datelike + Timelike>(date: &T, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);

    for segment in tokenize(pattern) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Char(c) => out.push(c),
            Segment::Token(token) => out.push_str(&resolve(date, token)),
        }
    }

    out
}

fn resolve<T: Datelike + Timelike>(date: &T, token: DateToken) -> String {
    let month0 = date.month0() as usize;
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let hour12 = match date.hour() % 12 {
        0 => 12,
        h => h,
    };
    let quarter = date.month0() / 3 + 1;
    let is_pm = date.hour() >= 12;

    match token {
        DateToken::Year4 => format!("{:04}", date.year()),
        DateToken::Year2 => format!("{:02}", date.year().rem_euclid(100)),
        DateToken::MonthName => MONTH_NAMES[month0].to_string(),
        DateToken::MonthAbbrev => MONTH_NAMES[month0][..3].to_string(),
        DateToken::Month2 => format!("{:02}", date.month()),
        DateToken::Month => date.month().to_string(),
        DateToken::WeekdayName => WEEKDAY_NAMES[weekday].to_string(),
        DateToken::WeekdayAbbrev => WEEKDAY_NAMES[weekday][..3].to_string(),
        DateToken::Day2 => format!("{:02}", date.day()),
        DateToken::Day => date.day().to_string(),
        DateToken::Hour24Padded => format!("{:02}", date.hour()),
        DateToken::Hour24 => date.hour().to_string(),
        DateToken::Hour12Padded => format!("{:02}", hour12),
        DateToken::Hour12 => hour12.to_string(),
        DateToken::AmPm => if is_pm { "PM" } else { "AM" }.to_string(),
        DateToken::AmPmShort => if is_pm { "P" } else { "A" }.to_string(),
        DateToken::Minute2 => format!("{:02}", date.minute()),
        DateToken::Minute => date.minute().to_string(),
        DateToken::Second2 => format!("{:02}", date.second()),
        DateToken::Second => date.second().to_string(),
        DateToken::Quarter2 => format!("{:02}", quarter),
        DateToken::Quarter => format!("Q{}", quarter),
    }
}
