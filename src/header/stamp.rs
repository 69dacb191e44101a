//! Date entries of the header.
//!
//! Timestamps use the gettext layout `yyyy-MM-dd HH:mm` followed by the zone
//! offset with no separator, e.g. `2024-01-15 10:30+0000`. The current time is
//! always supplied by the caller.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::header::fields::HeaderFields;
use crate::header::{KEY_PO_REVISION_DATE, KEY_POT_CREATION_DATE};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M%z";

pub fn format_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Set `PO-Revision-Date` to `now`.
pub fn stamp_revision_date<Tz>(fields: &mut HeaderFields, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fields.set(KEY_PO_REVISION_DATE, &format_timestamp(now));
}

/// Set `POT-Creation-Date` to `now`.
pub fn stamp_creation_date<Tz>(fields: &mut HeaderFields, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fields.set(KEY_POT_CREATION_DATE, &format_timestamp(now));
}
