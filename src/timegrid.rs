//! The time grid discretizing a simulation run.
//!
//! A [`Timegrid`] is the (first date, last date, step size) triple that both
//! the simulation window and every external series file are described by.
//! Besides the date/step arithmetic, this module implements the two codec
//! entry points the storage engine relies on:
//!
//! - [`Timegrid::from_array`]: decode a grid from the 13 leading scalar
//!   fields of a tagged binary series file.
//! - [`Timegrid::array2series`]: prepend those 13 fields to a flat value
//!   array when writing such a file.
//!
//! Text series files carry the grid as their first line in the canonical
//! call form, e.g. `Timegrid("2000-01-10", "2000-01-15", "1d")`, parsed by
//! [`Timegrid::parse`] against exactly that restricted grammar.

use crate::errors::{SequenceError, SequenceResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading scalar fields encoding the grid in a tagged binary
/// series file: two dates of six fields each, plus the step size.
pub const HEADER_LEN: usize = 13;

/// A uniform time grid: first date, last date and step size.
///
/// The span between first and last date is always a whole multiple of the
/// step size; [`Timegrid::len`] is the number of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timegrid {
    firstdate: NaiveDateTime,
    lastdate: NaiveDateTime,
    stepseconds: i64,
}

impl Timegrid {
    pub fn new(
        firstdate: NaiveDateTime,
        lastdate: NaiveDateTime,
        stepseconds: i64,
    ) -> SequenceResult<Self> {
        if stepseconds <= 0 {
            return Err(SequenceError::Timegrid {
                reason: format!("step size must be positive, not {stepseconds} seconds"),
            });
        }
        if lastdate < firstdate {
            return Err(SequenceError::Timegrid {
                reason: format!("last date ({lastdate}) precedes first date ({firstdate})"),
            });
        }
        let span = (lastdate - firstdate).num_seconds();
        if span % stepseconds != 0 {
            return Err(SequenceError::Timegrid {
                reason: format!(
                    "the span between {firstdate} and {lastdate} is not a whole \
                     multiple of the step size ({stepseconds} seconds)"
                ),
            });
        }
        Ok(Self {
            firstdate,
            lastdate,
            stepseconds,
        })
    }

    /// Build a grid from textual dates and a textual step size,
    /// e.g. `Timegrid::from_text("2000-01-10", "2000-01-15", "1d")`.
    pub fn from_text(firstdate: &str, lastdate: &str, stepsize: &str) -> SequenceResult<Self> {
        Self::new(
            parse_date(firstdate)?,
            parse_date(lastdate)?,
            parse_period(stepsize)?,
        )
    }

    pub fn firstdate(&self) -> NaiveDateTime {
        self.firstdate
    }

    pub fn lastdate(&self) -> NaiveDateTime {
        self.lastdate
    }

    /// Step size in seconds.
    pub fn step_seconds(&self) -> i64 {
        self.stepseconds
    }

    /// Number of time steps covered by the grid.
    pub fn len(&self) -> usize {
        ((self.lastdate - self.firstdate).num_seconds() / self.stepseconds) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The step index of `date` relative to the first date.
    ///
    /// Dates before the first date yield negative indices and dates past
    /// the last date yield indices beyond [`Timegrid::len`]; both are
    /// meaningful for aligning series that only partially overlap.
    /// A date not lying on the grid is an error.
    pub fn index_of(&self, date: NaiveDateTime) -> SequenceResult<i64> {
        let offset = (date - self.firstdate).num_seconds();
        if offset % self.stepseconds != 0 {
            return Err(SequenceError::Timegrid {
                reason: format!("date {date} does not lie on the grid {self}"),
            });
        }
        Ok(offset / self.stepseconds)
    }

    /// Whether `inner` defines a subset of this grid: same step size,
    /// aligned, and fully covered.
    pub fn contains(&self, inner: &Timegrid) -> bool {
        self.stepseconds == inner.stepseconds
            && self.firstdate <= inner.firstdate
            && self.lastdate >= inner.lastdate
            && (inner.firstdate - self.firstdate).num_seconds() % self.stepseconds == 0
    }

    /// Decode a grid from the [`HEADER_LEN`] leading fields of a tagged
    /// binary series array.
    pub fn from_array(fields: &[f64]) -> SequenceResult<Self> {
        if fields.len() < HEADER_LEN {
            return Err(SequenceError::Timegrid {
                reason: format!(
                    "a tagged series requires at least {HEADER_LEN} leading fields, \
                     but only {} are available",
                    fields.len()
                ),
            });
        }
        let firstdate = date_from_fields(&fields[..6])?;
        let lastdate = date_from_fields(&fields[6..12])?;
        Self::new(firstdate, lastdate, fields[12] as i64)
    }

    /// Encode the grid as its [`HEADER_LEN`] header fields.
    pub fn to_array(&self) -> [f64; HEADER_LEN] {
        let mut fields = [0.0; HEADER_LEN];
        date_to_fields(self.firstdate, &mut fields[..6]);
        date_to_fields(self.lastdate, &mut fields[6..12]);
        fields[12] = self.stepseconds as f64;
        fields
    }

    /// Prepend the header fields to a flat value array, yielding the full
    /// content of a tagged binary series file.
    pub fn array2series(&self, values: &[f64]) -> Vec<f64> {
        let mut series = Vec::with_capacity(HEADER_LEN + values.len());
        series.extend_from_slice(&self.to_array());
        series.extend_from_slice(values);
        series
    }

    /// Parse the canonical textual form against the restricted grammar
    /// `Timegrid("<first date>", "<last date>", "<step size>")`.
    pub fn parse(text: &str) -> SequenceResult<Self> {
        let parse_error = || SequenceError::Parse {
            what: "a time grid".to_string(),
            input: text.to_string(),
        };
        let inner = text
            .trim()
            .strip_prefix("Timegrid(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(parse_error)?;
        let mut args = Vec::with_capacity(3);
        for part in inner.split(',') {
            let arg = part
                .trim()
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .ok_or_else(parse_error)?;
            args.push(arg);
        }
        if args.len() != 3 {
            return Err(parse_error());
        }
        Self::from_text(args[0], args[1], args[2])
    }
}

impl fmt::Display for Timegrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timegrid(\"{}\", \"{}\", \"{}\")",
            self.firstdate.format("%Y-%m-%d %H:%M:%S"),
            self.lastdate.format("%Y-%m-%d %H:%M:%S"),
            period_to_text(self.stepseconds),
        )
    }
}

/// Parse a date in `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_date(text: &str) -> SequenceResult<NaiveDateTime> {
    let parse_error = || SequenceError::Parse {
        what: "a date".to_string(),
        input: text.to_string(),
    };
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime);
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| parse_error())?;
    date.and_hms_opt(0, 0, 0).ok_or_else(parse_error)
}

/// Parse a step size like `1d`, `12h`, `30m` or `90s` into seconds.
pub fn parse_period(text: &str) -> SequenceResult<i64> {
    let parse_error = || SequenceError::Parse {
        what: "a step size".to_string(),
        input: text.to_string(),
    };
    let text = text.trim();
    if text.len() < 2 {
        return Err(parse_error());
    }
    let (number, unit) = text.split_at(text.len() - 1);
    let number: i64 = number.parse().map_err(|_| parse_error())?;
    let factor = match unit {
        "d" => 86_400,
        "h" => 3_600,
        "m" => 60,
        "s" => 1,
        _ => return Err(parse_error()),
    };
    Ok(number * factor)
}

/// Render a step size in the coarsest whole unit.
pub fn period_to_text(seconds: i64) -> String {
    if seconds % 86_400 == 0 {
        format!("{}d", seconds / 86_400)
    } else if seconds % 3_600 == 0 {
        format!("{}h", seconds / 3_600)
    } else if seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{seconds}s")
    }
}

fn date_from_fields(fields: &[f64]) -> SequenceResult<NaiveDateTime> {
    let field_error = || SequenceError::Timegrid {
        reason: format!("the header fields {fields:?} do not encode a valid date"),
    };
    NaiveDate::from_ymd_opt(fields[0] as i32, fields[1] as u32, fields[2] as u32)
        .and_then(|date| date.and_hms_opt(fields[3] as u32, fields[4] as u32, fields[5] as u32))
        .ok_or_else(field_error)
}

fn date_to_fields(date: NaiveDateTime, fields: &mut [f64]) {
    fields[0] = date.year() as f64;
    fields[1] = date.month() as f64;
    fields[2] = date.day() as f64;
    fields[3] = date.hour() as f64;
    fields[4] = date.minute() as f64;
    fields[5] = date.second() as f64;
}
