//! Normalization of booking rows read back from the sheet.
//!
//! Both read paths (the published CSV export and the JSON query endpoint) go
//! through the same header table, so a column is recognized the same way no
//! matter where it came from.

use serde_json::Value;
use shared::domain::Booking;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingField {
    Room,
    Date,
    StartTime,
    EndTime,
    Purpose,
    Attendees,
    BookedBy,
    Timestamp,
}

/// Accepted header spellings, already normalized by [`normalize_header`].
const HEADER_SPELLINGS: [(&str, BookingField); 11] = [
    ("room", BookingField::Room),
    ("date", BookingField::Date),
    ("starttime", BookingField::StartTime),
    ("start_time", BookingField::StartTime),
    ("endtime", BookingField::EndTime),
    ("end_time", BookingField::EndTime),
    ("purpose", BookingField::Purpose),
    ("attendees", BookingField::Attendees),
    ("bookedby", BookingField::BookedBy),
    ("booked_by", BookingField::BookedBy),
    ("timestamp", BookingField::Timestamp),
];

/// Lowercases and drops all whitespace: `"Start Time"` and `"startTime"` both
/// become `"starttime"`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl BookingField {
    pub fn from_header(raw: &str) -> Option<Self> {
        let normalized = normalize_header(raw);
        HEADER_SPELLINGS
            .iter()
            .find(|(spelling, _)| *spelling == normalized)
            .map(|(_, field)| *field)
    }

    fn slot<'a>(self, booking: &'a mut Booking) -> &'a mut String {
        match self {
            BookingField::Room => &mut booking.room,
            BookingField::Date => &mut booking.date,
            BookingField::StartTime => &mut booking.start_time,
            BookingField::EndTime => &mut booking.end_time,
            BookingField::Purpose => &mut booking.purpose,
            BookingField::Attendees => &mut booking.attendees,
            BookingField::BookedBy => &mut booking.booked_by,
            BookingField::Timestamp => &mut booking.timestamp,
        }
    }
}

/// Resolves each header cell to the field it feeds. Unknown headers, and any
/// repeat of a field already claimed by an earlier column, map to `None`.
fn column_layout(header: &str) -> Result<Vec<Option<BookingField>>, ParseError> {
    let mut claimed = Vec::new();
    let layout: Vec<Option<BookingField>> = header
        .split(',')
        .map(|cell| match BookingField::from_header(cell) {
            Some(field) if !claimed.contains(&field) => {
                claimed.push(field);
                Some(field)
            }
            _ => None,
        })
        .collect();

    if claimed.is_empty() {
        return Err(ParseError::NoRecognizedColumns {
            header: header.to_string(),
        });
    }
    Ok(layout)
}

/// Parses the published CSV export. Rows are split on every comma; quoted
/// cells are not understood, so a comma inside a value shifts the row.
pub fn parse_bookings_csv(body: &str) -> Result<Vec<Booking>, ParseError> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(ParseError::MissingHeader)?;
    let layout = column_layout(header)?;

    Ok(lines
        .map(|line| {
            let mut booking = Booking::default();
            for (field, cell) in layout.iter().zip(line.split(',')) {
                if let Some(field) = field {
                    *field.slot(&mut booking) = cell.trim().to_string();
                }
            }
            booking
        })
        .collect())
}

/// Normalizes the query endpoint's answer: a JSON array of objects, or an
/// object holding that array under `data`. When two keys map to the same
/// field, the one that appears first in the response wins.
pub fn bookings_from_json(value: Value) -> Result<Vec<Booking>, ParseError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(ParseError::NotARecordList),
        },
        _ => return Err(ParseError::NotARecordList),
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(object) => Some(object),
            _ => None,
        })
        .map(|object| {
            let mut booking = Booking::default();
            let mut claimed = Vec::new();
            for (key, value) in object {
                let Some(field) = BookingField::from_header(&key) else {
                    continue;
                };
                if claimed.contains(&field) {
                    continue;
                }
                claimed.push(field);
                *field.slot(&mut booking) = cell_text(value);
            }
            booking
        })
        .collect())
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}
