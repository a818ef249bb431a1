//! Date-based release tags: `YYYY-MM-DD`, then `YYYY-MM-DD.0`, `.1`, ...

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A release tag
///
/// Ordered by date, then suffix; a bare date sorts before `.0` of the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseTag {
    pub date: NaiveDate,
    pub suffix: Option<u32>,
}

impl ReleaseTag {
    pub fn new(date: NaiveDate, suffix: Option<u32>) -> Self {
        Self { date, suffix }
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(DATE_FORMAT))?;
        if let Some(suffix) = self.suffix {
            write!(f, ".{}", suffix)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTag(pub String);

impl fmt::Display for InvalidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a release tag", self.0)
    }
}

impl std::error::Error for InvalidTag {}

impl FromStr for ReleaseTag {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTag(s.to_string());

        let (date, suffix) = match s.split_once('.') {
            Some((date, suffix)) => {
                if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                (date, Some(suffix.parse().map_err(|_| invalid())?))
            }
            None => (s, None),
        };

        // chrono accepts unpadded fields, tags never have them
        if date.len() != 10 {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;

        Ok(Self { date, suffix })
    }
}

/// Release tags found in `git tag` output; other lines are ignored
pub fn parse_tag_list(output: &str) -> Vec<ReleaseTag> {
    output
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

/// The tag to create next
///
/// Only the latest existing tag matters: on the same day its suffix is
/// incremented (a bare date is followed by `.0`), otherwise today's bare
/// date starts a new series.
pub fn next_release_tag<'a, I>(tags: I, today: NaiveDate) -> ReleaseTag
where
    I: IntoIterator<Item = &'a ReleaseTag>,
{
    match tags.into_iter().max() {
        Some(latest) if latest.date == today => {
            ReleaseTag::new(today, Some(latest.suffix.map_or(0, |n| n.saturating_add(1))))
        }
        _ => ReleaseTag::new(today, None),
    }
}

/// Today's UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
