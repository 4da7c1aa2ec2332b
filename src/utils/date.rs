use chrono::{NaiveDateTime, Utc};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn format_date(date: NaiveDateTime) -> String {
    format!("{}", date.format(DATE_FMT))
}

pub fn parse_date(str: &str) -> Option<NaiveDateTime> {
    // e.g. 2022-09-24T04:40:35.726029
    NaiveDateTime::parse_from_str(str, DATE_FMT).ok()
}
