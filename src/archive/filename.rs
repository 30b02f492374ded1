//! Capture filename parsing.
//!
//! Captures are named `name[.YYYYMMDD[-HHMMSS]][.tag].ext`; tombstones add a
//! trailing `.meta` and always carry a date. The base name is matched lazily,
//! so `my.page.html` reads as name `my`, tag `page`. That reading is part of
//! the on-disk format and is kept as-is.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::utils::TOMBSTONE_SUFFIX;

static TOMBSTONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>.+?)\.(?P<date>\d{8})(?:-(?P<time>\d{6}))?(?:\.(?P<tag>[^.]+))?\.(?P<ext>[^.]+)\.meta$",
    )
    .expect("tombstone filename pattern is valid")
});

static CAPTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>.+?)(?:\.(?P<date>\d{8})(?:-(?P<time>\d{6}))?)?(?:\.(?P<tag>[^.]+))?\.(?P<ext>[^.]+)$",
    )
    .expect("capture filename pattern is valid")
});

/// Components decoded from one capture filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureName {
    pub name: String,
    /// `None` for undated captures.
    pub date: Option<DateTime<Utc>>,
    pub tag: Option<String>,
    pub ext: String,
    pub tombstone: bool,
}

impl CaptureName {
    /// Capture date, with undated files at the epoch so they sort last.
    pub fn capture_date(&self) -> DateTime<Utc> {
        self.date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Parse a filename; `None` when it matches neither pattern or carries an
/// impossible date.
pub fn parse_capture_filename(filename: &str) -> Option<CaptureName> {
    if filename.ends_with(TOMBSTONE_SUFFIX) {
        if let Some(caps) = TOMBSTONE_RE.captures(filename) {
            return from_captures(&caps, true);
        }
    }
    CAPTURE_RE
        .captures(filename)
        .and_then(|caps| from_captures(&caps, false))
}

fn from_captures(caps: &Captures<'_>, tombstone: bool) -> Option<CaptureName> {
    let date = match caps.name("date") {
        Some(date) => Some(parse_capture_date(
            date.as_str(),
            caps.name("time").map(|t| t.as_str()),
        )?),
        None => None,
    };
    Some(CaptureName {
        name: caps.name("name")?.as_str().to_string(),
        date,
        tag: caps.name("tag").map(|t| t.as_str().to_string()),
        ext: caps.name("ext")?.as_str().to_string(),
        tombstone,
    })
}

/// `YYYYMMDD` plus optional `HHMMSS`, interpreted as UTC.
pub fn parse_capture_date(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = match time {
        Some(t) => NaiveTime::parse_from_str(t, "%H%M%S").ok()?,
        None => NaiveTime::MIN,
    };
    Some(day.and_time(time).and_utc())
}
