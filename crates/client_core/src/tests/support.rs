use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::{Booking, NewAccessRequest, NewBackupRecord, NewBooking, Room},
    protocol::Acknowledgement,
};

use crate::{error::Result, ParseError, RemoteStore, StoreError};

/// In-memory store that records every create call and can be told to fail.
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub bookings: Mutex<Vec<NewBooking>>,
    pub access_requests: Mutex<Vec<NewAccessRequest>>,
    pub backups: Mutex<Vec<NewBackupRecord>>,
    pub stored_bookings: Vec<Booking>,
    pub fail_with_status: Option<u16>,
    pub malformed: bool,
}

impl RecordingStore {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    /// Every call fails as if the sheet answered with something unreadable.
    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            stored_bookings: bookings,
            ..Self::default()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.bookings.lock().expect("lock").len()
            + self.access_requests.lock().expect("lock").len()
            + self.backups.lock().expect("lock").len()
    }

    fn outcome(&self) -> Result<Acknowledgement> {
        if self.malformed {
            return Err(StoreError::Parse(ParseError::NotARecordList));
        }
        match self.fail_with_status {
            Some(status) => Err(StoreError::Status {
                endpoint: "memory://sheet".into(),
                status,
            }),
            None => Ok(Acknowledgement(json!({ "status": "success" }))),
        }
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn create_booking(&self, booking: NewBooking) -> Result<Acknowledgement> {
        self.bookings.lock().expect("lock").push(booking);
        self.outcome()
    }

    async fn create_access_request(&self, request: NewAccessRequest) -> Result<Acknowledgement> {
        self.access_requests.lock().expect("lock").push(request);
        self.outcome()
    }

    async fn create_backup_record(&self, record: NewBackupRecord) -> Result<Acknowledgement> {
        self.backups.lock().expect("lock").push(record);
        self.outcome()
    }

    async fn fetch_bookings(&self) -> Result<Vec<Booking>> {
        self.outcome().map(|_| self.stored_bookings.clone())
    }

    async fn fetch_access_requests(&self) -> Result<Value> {
        self.outcome().map(|_| json!([]))
    }

    async fn fetch_backups(&self) -> Result<Value> {
        self.outcome().map(|_| json!([]))
    }
}

pub(crate) fn booking(room: &str, date: &str, start: &str, end: &str) -> Booking {
    Booking {
        room: room.into(),
        date: date.into(),
        start_time: start.into(),
        end_time: end.into(),
        ..Booking::default()
    }
}

pub(crate) fn fixture_rooms() -> Vec<Room> {
    vec![
        Room::new(1, "Lab A - Chemistry", 12, "Fume hoods"),
        Room::new(2, "Lab B - Physics", 10, "Optical bench"),
        Room::new(3, "Conference Room 1", 20, "Projector"),
        Room::new(4, "Conference Room 2", 8, "Whiteboard"),
        Room::new(5, "Research Lab C", 6, "Workstations"),
    ]
}

/// The sample week shown by the old static schedule page.
pub(crate) fn fixture_bookings() -> Vec<Booking> {
    vec![
        Booking {
            booked_by: "Dr. Smith".into(),
            purpose: "Organic Chemistry Research".into(),
            attendees: "8".into(),
            ..booking("Lab A - Chemistry", "2024-01-15", "09:00", "11:00")
        },
        Booking {
            booked_by: "Prof. Johnson".into(),
            purpose: "Weekly Team Meeting".into(),
            attendees: "12".into(),
            ..booking("Conference Room 1", "2024-01-15", "14:00", "16:00")
        },
        Booking {
            booked_by: "Dr. Williams".into(),
            purpose: "Quantum Mechanics Experiment".into(),
            attendees: "6".into(),
            ..booking("Lab B - Physics", "2024-01-16", "10:00", "12:00")
        },
        Booking {
            booked_by: "Sarah Chen".into(),
            purpose: "Data Analysis Session".into(),
            attendees: "4".into(),
            ..booking("Research Lab C", "2024-01-16", "13:00", "17:00")
        },
        Booking {
            booked_by: "Dr. Brown".into(),
            purpose: "Project Review".into(),
            attendees: "5".into(),
            ..booking("Conference Room 2", "2024-01-17", "09:00", "10:30")
        },
    ]
}
