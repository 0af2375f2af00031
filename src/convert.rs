//! Mapping between `roster.v1` wire messages and store rows.
//!
//! Wire timestamps carry nanoseconds; the store keeps whole seconds, so the
//! fractional part is dropped on the way in. Going out never fails.

use crate::{
    data::{student::Student, teacher::Teacher},
    error::{MissingCourseSnafu, MissingTimestampSnafu, RosterResult, TimestampOutOfRangeSnafu},
    pb,
    service::Outcome,
};
use prost_types::Timestamp;
use snafu::{OptionExt, ResultExt};
use time::OffsetDateTime;

pub fn timestamp_to_instant(ts: &Timestamp, field: &'static str) -> RosterResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ts.seconds).context(TimestampOutOfRangeSnafu {
        field,
        seconds: ts.seconds,
    })
}

pub fn instant_to_timestamp(instant: OffsetDateTime) -> Timestamp {
    Timestamp {
        seconds: instant.unix_timestamp(),
        nanos: i32::try_from(instant.nanosecond()).unwrap_or_default(),
    }
}

fn required(ts: Option<&Timestamp>, field: &'static str) -> RosterResult<OffsetDateTime> {
    timestamp_to_instant(ts.context(MissingTimestampSnafu { field })?, field)
}

/// Current time at the store's resolution.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
}

impl TryFrom<pb::Student> for Student {
    type Error = crate::error::RosterError;

    fn try_from(value: pb::Student) -> Result<Self, Self::Error> {
        let course = value.course.context(MissingCourseSnafu)?;

        Ok(Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: required(value.dob.as_ref(), "dob")?,
            course_id: course.id,
        })
    }
}

impl From<Student> for pb::Student {
    fn from(value: Student) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: Some(instant_to_timestamp(value.dob)),
            course: Some(pb::Course {
                id: value.course_id,
            }),
        }
    }
}

/// Server-supplied values for fields a new record may leave out.
///
/// Only Register applies these; Edit replaces every column, so it needs them all.
pub trait RegisterDefaults {
    fn with_register_defaults(self) -> Self;
}

impl RegisterDefaults for pb::Student {
    fn with_register_defaults(self) -> Self {
        self
    }
}

impl RegisterDefaults for pb::Teacher {
    /// A new teacher without a `joined_date` joined now.
    fn with_register_defaults(mut self) -> Self {
        self.joined_date
            .get_or_insert_with(|| instant_to_timestamp(now()));
        self
    }
}

impl TryFrom<pb::Teacher> for Teacher {
    type Error = crate::error::RosterError;

    fn try_from(value: pb::Teacher) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: required(value.dob.as_ref(), "dob")?,
            joined_date: required(value.joined_date.as_ref(), "joined_date")?,
        })
    }
}

impl From<Teacher> for pb::Teacher {
    fn from(value: Teacher) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: Some(instant_to_timestamp(value.dob)),
            joined_date: Some(instant_to_timestamp(value.joined_date)),
        }
    }
}

impl From<Outcome> for pb::Response {
    fn from(value: Outcome) -> Self {
        Self {
            message: value.message,
            code: i32::from(value.code.as_u16()),
            id: value.id,
        }
    }
}
