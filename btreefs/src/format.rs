//! Human-readable rendering of listings and metadata.

use std::fmt::{Display, Write as _};

use chrono::{DateTime, TimeZone};

use crate::entry::{EntryKind, Metadata};

/// Timestamp pattern used by `stat`.
pub const STAT_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Timestamp pattern used by `ls -l`.
pub const LISTING_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Format milliseconds since the epoch in the given time zone.
///
/// Out-of-range stamps render as `-`.
#[must_use]
pub fn format_timestamp<Tz>(ms: u64, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || "-".to_owned(),
            |utc| utc.with_timezone(tz).format(pattern).to_string(),
        )
}

/// Entry name as shown in listings: directories carry a trailing `/`.
#[must_use]
pub fn display_name(meta: &Metadata) -> String {
    match meta.kind {
        EntryKind::Directory => format!("{}/", meta.name),
        EntryKind::File => meta.name.to_owned(),
    }
}

/// Render a directory listing.
///
/// The short form is a single line of names separated by two spaces; the
/// long form is one `date  name` line per entry.
#[must_use]
pub fn render_listing<Tz>(entries: &[Metadata], long: bool, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if long {
        let mut out = String::new();
        for meta in entries {
            let stamp = format_timestamp(meta.modified_ms, tz, LISTING_TIME_FORMAT);
            let _ = writeln!(out, "{stamp}  {}", display_name(meta));
        }
        return out;
    }

    let names: Vec<String> = entries.iter().map(display_name).collect();
    format!("{}\n", names.join("  "))
}

/// Render the `stat` report for one entry.
#[must_use]
pub fn render_metadata<Tz>(meta: &Metadata, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "    Name: {}", meta.name);
    let _ = writeln!(out, "    Type: {}", meta.kind.label());
    if let Some(size) = meta.size {
        let _ = writeln!(out, "    Size: {size} bytes");
    }
    if let Some(content) = &meta.content {
        let _ = writeln!(out, " Content: {content}");
    }
    let _ = writeln!(
        out,
        "  Access: {}",
        format_timestamp(meta.accessed_ms, tz, STAT_TIME_FORMAT)
    );
    let _ = writeln!(
        out,
        "  Modify: {}",
        format_timestamp(meta.modified_ms, tz, STAT_TIME_FORMAT)
    );
    let _ = writeln!(
        out,
        "  Create: {}",
        format_timestamp(meta.created_ms, tz, STAT_TIME_FORMAT)
    );
    out
}
