//! Commit message generation.

use std::fmt;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::constants::COMMIT_MESSAGE_PREFIX;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]:[second]");

/// `Auto commit on <date> <time>`, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    pub fn at(timestamp: OffsetDateTime) -> anyhow::Result<Self> {
        let date = timestamp.format(DATE_FORMAT)?;
        let time = timestamp.format(TIME_FORMAT)?;
        Ok(Self(format!("{} {} {}", COMMIT_MESSAGE_PREFIX, date, time)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current local time, falling back to UTC when the offset is unknown.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
