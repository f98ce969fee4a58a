//! Date builtins
//!
//! Dates are strings. Input is matched against a fixed, ordered list of
//! formats; a value matching none of them is an error. Functions that
//! return a date keep the shape of their input (date only, local date-time
//! or RFC 3339 with offset).

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeDelta, Utc,
};

use super::{Builtin, arity, string_arg, to_integer};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "now",
        signature: "now()",
        description: "Current UTC time as RFC 3339",
        call: now,
    },
    Builtin {
        name: "today",
        signature: "today()",
        description: "Current UTC date as YYYY-MM-DD",
        call: today,
    },
    Builtin {
        name: "formatDate",
        signature: "formatDate(date, format)",
        description: "Formats a date with strftime syntax, e.g. '%d/%m/%Y'",
        call: format_date,
    },
    Builtin {
        name: "addDays",
        signature: "addDays(date, days)",
        description: "Date shifted by a (possibly negative) number of days",
        call: add_days,
    },
    Builtin {
        name: "daysBetween",
        signature: "daysBetween(from, to)",
        description: "Whole days from the first date to the second",
        call: days_between,
    },
    Builtin {
        name: "year",
        signature: "year(date)",
        description: "Year of a date",
        call: year,
    },
    Builtin {
        name: "month",
        signature: "month(date)",
        description: "Month of a date (1-12)",
        call: month,
    },
    Builtin {
        name: "day",
        signature: "day(date)",
        description: "Day of the month (1-31)",
        call: day,
    },
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

const LOCAL_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_OUTPUT: &str = "%Y-%m-%d";

/// A parsed date argument
#[derive(Debug, Clone, Copy, PartialEq)]
enum Moment {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
    Date(NaiveDate),
}

impl Moment {
    fn parse(value: &Value) -> Result<Self, String> {
        let Value::String(s) = value else {
            return Err(format!("expected a date string, got {}", value.type_name()));
        };
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Moment::Zoned(dt));
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Moment::Local(dt));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, format) {
                return Ok(Moment::Date(d));
            }
        }
        Err(format!("unrecognized date '{}'", s))
    }

    fn date(self) -> NaiveDate {
        match self {
            Moment::Zoned(dt) => dt.date_naive(),
            Moment::Local(dt) => dt.date(),
            Moment::Date(d) => d,
        }
    }

    /// Instant on a common timeline, for differences
    fn instant(self) -> NaiveDateTime {
        match self {
            Moment::Zoned(dt) => dt.naive_utc(),
            Moment::Local(dt) => dt,
            Moment::Date(d) => d.and_time(NaiveTime::MIN),
        }
    }

    fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        match self {
            Moment::Zoned(dt) => dt.checked_add_signed(delta).map(Moment::Zoned),
            Moment::Local(dt) => dt.checked_add_signed(delta).map(Moment::Local),
            Moment::Date(d) => d.checked_add_signed(delta).map(Moment::Date),
        }
    }

    /// Render in the same shape the moment was parsed from
    fn render(self) -> String {
        match self {
            Moment::Zoned(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Moment::Local(dt) => dt.format(LOCAL_OUTPUT).to_string(),
            Moment::Date(d) => d.format(DATE_OUTPUT).to_string(),
        }
    }
}

fn now(args: &[Value]) -> Result<Value, String> {
    arity(args, 0, 0)?;
    Ok(Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)))
}

fn today(args: &[Value]) -> Result<Value, String> {
    arity(args, 0, 0)?;
    Ok(Value::String(Utc::now().date_naive().format(DATE_OUTPUT).to_string()))
}

fn format_date(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let moment = Moment::parse(&args[0])?;
    let format = string_arg(args, 1);

    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date format '{}'", format));
    }

    // Writing through fmt::Write reports missing fields (e.g. %z on a value
    // without an offset) as an error instead of panicking
    let mut out = String::new();
    let written = match moment {
        Moment::Zoned(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
        other => write!(out, "{}", other.instant().format_with_items(items.iter())),
    };
    written.map_err(|_| format!("format '{}' does not apply to '{}'", format, args[0]))?;
    Ok(Value::String(out))
}

fn add_days(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let moment = Moment::parse(&args[0])?;
    let days = to_integer(&args[1])?;
    TimeDelta::try_days(days)
        .and_then(|delta| moment.checked_add(delta))
        .map(|shifted| Value::String(shifted.render()))
        .ok_or_else(|| format!("adding {} days to '{}' is out of range", days, args[0]))
}

fn days_between(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let from = Moment::parse(&args[0])?.instant();
    let to = Moment::parse(&args[1])?.instant();
    Ok(Value::from((to - from).num_days()))
}

fn year(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::from(Moment::parse(&args[0])?.date().year()))
}

fn month(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::from(Moment::parse(&args[0])?.date().month()))
}

fn day(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::from(Moment::parse(&args[0])?.date().day()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_accepted_formats() {
        for input in [
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00+02:00",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30:00",
            "2024-01-15",
            "01/15/2024",
            "15.01.2024",
        ] {
            assert_eq!(day(&[s(input)]), Ok(Value::from(15)), "{}", input);
            assert_eq!(month(&[s(input)]), Ok(Value::from(1)), "{}", input);
            assert_eq!(year(&[s(input)]), Ok(Value::from(2024)), "{}", input);
        }
    }

    #[test]
    fn test_unrecognized_dates_fail() {
        assert!(year(&[s("next tuesday")]).is_err());
        assert!(year(&[s("2024-13-45")]).is_err());
        assert!(year(&[Value::from(20240115)]).is_err());
        assert!(year(&[Value::Null]).is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(&[s("2024-01-15"), s("%d/%m/%Y")]),
            Ok(s("15/01/2024"))
        );
        assert_eq!(
            format_date(&[s("2024-01-15T10:30:00Z"), s("%H:%M %z")]),
            Ok(s("10:30 +0000"))
        );
        assert!(format_date(&[s("2024-01-15"), s("%Q")]).is_err());
        assert!(format_date(&[s("2024-01-15"), s("%z")]).is_err());
    }

    #[test]
    fn test_add_days_keeps_shape() {
        assert_eq!(add_days(&[s("2024-01-30"), Value::from(2)]), Ok(s("2024-02-01")));
        assert_eq!(
            add_days(&[s("2024-01-01 08:00:00"), Value::from(-1)]),
            Ok(s("2023-12-31T08:00:00"))
        );
        assert_eq!(
            add_days(&[s("2024-02-28T00:00:00Z"), Value::from(1)]),
            Ok(s("2024-02-29T00:00:00Z"))
        );
        assert!(add_days(&[s("2024-01-01"), Value::from(1.5)]).is_err());
    }

    #[test]
    fn test_days_between() {
        assert_eq!(
            days_between(&[s("2024-01-01"), s("2024-03-01")]),
            Ok(Value::from(60))
        );
        assert_eq!(
            days_between(&[s("2024-03-01"), s("01/01/2024")]),
            Ok(Value::from(-60))
        );
    }

    #[test]
    fn test_now_and_today_shapes() {
        let current = now(&[]).unwrap();
        assert!(matches!(Moment::parse(&current), Ok(Moment::Zoned(_))));
        let date = today(&[]).unwrap();
        assert!(matches!(Moment::parse(&date), Ok(Moment::Date(_))));
        assert!(now(&[Value::from(1)]).is_err());
    }
}
