//! Departure date helpers.

use chrono::{Datelike, NaiveDate};

use super::Language;

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const MONTHS_AR: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

/// Format a departure date for display.
///
/// - en: `Mar 05, 2026`
/// - fr: `05 mars 2026`
/// - ar: `5 مارس 2026`
pub fn format_departure(date: NaiveDate, language: Language) -> String {
    let month = date.month0() as usize;
    match language {
        Language::En => format!("{} {:02}, {}", MONTHS_EN[month], date.day(), date.year()),
        Language::Fr => format!("{:02} {} {}", date.day(), MONTHS_FR[month], date.year()),
        Language::Ar => format!("{} {} {}", date.day(), MONTHS_AR[month], date.year()),
    }
}

/// Whole days from `today` until `departure`; negative once it has passed.
pub fn days_until(departure: NaiveDate, today: NaiveDate) -> i64 {
    departure.signed_duration_since(today).num_days()
}

pub fn is_today_or_future(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn format_each_language() {
        let date = d(2026, 3, 5);
        assert_eq!(format_departure(date, Language::En), "Mar 05, 2026");
        assert_eq!(format_departure(date, Language::Fr), "05 mars 2026");
        assert_eq!(format_departure(date, Language::Ar), "5 مارس 2026");
    }

    #[test]
    fn days_until_departure() {
        let today = d(2026, 10, 16);
        assert_eq!(days_until(d(2026, 10, 20), today), 4);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(d(2026, 10, 15), today), -1);
    }

    #[test]
    fn today_counts_as_future() {
        let today = d(2026, 10, 16);
        assert!(is_today_or_future(today, today));
        assert!(is_today_or_future(d(2027, 1, 1), today));
        assert!(!is_today_or_future(d(2026, 10, 15), today));
    }
}
