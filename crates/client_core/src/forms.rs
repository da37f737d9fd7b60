//! Input state and submit handlers for the booking, door-access and backup
//! pages. Each submit validates presence, calls the store once, and reports
//! the outcome as a [`Notice`].
//!
//! `submit` drives a whole round trip. A front end that awaits the store on
//! its own calls `begin_submit`, sends the record, then hands the outcome to
//! `finish_submit`; `is_pending()` reads `true` in between.

use chrono::NaiveDate;
use shared::{
    domain::{AccessArea, NewAccessRequest, NewBackupRecord, NewBooking, Room, RoomId},
    error::{RequiredFields, ValidationError},
    protocol::Acknowledgement,
};
use tracing::{debug, error};

use crate::{error::Result as StoreResult, schedule::format_day, RemoteStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Validation,
    Failure,
}

/// User-facing outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, description)
    }

    pub fn validation(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Validation, title, description)
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Failure, title, description)
    }

    fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != NoticeKind::Success
    }
}

fn missing_information(err: &ValidationError, description: &str) -> Notice {
    debug!("form validation failed: {err}");
    Notice::validation("Missing Information", description)
}

/// Failure notice for a store error. Errors that are not retryable get
/// [`NOT_RETRYABLE`] instead of the flow's retry prompt.
pub(crate) fn store_failure(flow: &str, err: &StoreError, title: &str, description: &str) -> Notice {
    error!(code = ?err.code(), retryable = err.is_retryable(), "{flow} failed: {err}");
    if err.is_retryable() {
        Notice::failure(title, description)
    } else {
        Notice::failure(title, NOT_RETRYABLE)
    }
}

pub const NOT_RETRYABLE: &str =
    "The request could not be completed. Please contact the lab administrator.";

#[derive(Debug, Clone)]
pub struct BookingForm {
    rooms: Vec<Room>,
    pub room_id: Option<RoomId>,
    pub date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
    pub attendees: String,
    /// Confirmation text for the booking in flight.
    pending: Option<String>,
}

impl BookingForm {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms,
            room_id: None,
            date: None,
            start_time: String::new(),
            end_time: String::new(),
            purpose: String::new(),
            attendees: String::new(),
            pending: None,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn selected_room(&self) -> Option<&Room> {
        self.room_id.and_then(|id| Room::find(&self.rooms, id))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Builds the record to submit. An id that is not in the catalog counts
    /// as no room selected.
    pub fn validate(&self) -> Result<NewBooking, ValidationError> {
        let room = self.selected_room();
        RequiredFields::new()
            .present("room", room)
            .present("date", self.date.as_ref())
            .text("start time", &self.start_time)
            .text("end time", &self.end_time)
            .text("purpose", &self.purpose)
            .finish()?;

        Ok(NewBooking {
            room: room.map(|room| room.name.clone()).unwrap_or_default(),
            date: self.date.map(format_day).unwrap_or_default(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            purpose: self.purpose.clone(),
            attendees: self.attendees.clone(),
        })
    }

    pub fn reset(&mut self) {
        self.room_id = None;
        self.date = None;
        self.start_time.clear();
        self.end_time.clear();
        self.purpose.clear();
        self.attendees.clear();
    }

    /// Validates and marks the form pending. The returned record goes to
    /// [`RemoteStore::create_booking`].
    pub fn begin_submit(&mut self) -> Result<NewBooking, Notice> {
        let booking = self
            .validate()
            .map_err(|err| missing_information(&err, "Please fill in all required fields."))?;
        self.pending = Some(format!(
            "{} has been reserved for {} from {} to {}. The schedule will be updated shortly.",
            booking.room,
            self.date
                .map(|date| date.format("%a %b %d %Y").to_string())
                .unwrap_or_default(),
            booking.start_time,
            booking.end_time,
        ));
        Ok(booking)
    }

    /// Clears the pending flag; success also clears the fields.
    pub fn finish_submit(&mut self, outcome: StoreResult<Acknowledgement>) -> Notice {
        let confirmation = self.pending.take().unwrap_or_default();
        match outcome {
            Ok(_) => {
                self.reset();
                Notice::success("Room Booked Successfully!", confirmation)
            }
            Err(err) => store_failure(
                "booking",
                &err,
                "Booking Failed",
                "There was an error creating your booking. Please try again.",
            ),
        }
    }

    pub async fn submit(&mut self, store: &dyn RemoteStore) -> Notice {
        let booking = match self.begin_submit() {
            Ok(booking) => booking,
            Err(notice) => return notice,
        };
        let outcome = store.create_booking(booking).await;
        self.finish_submit(outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessRequestForm {
    pub full_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub supervisor: String,
    pub reason: String,
    selected_areas: Vec<String>,
    pending: bool,
}

impl AccessRequestForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_areas(&self) -> &[String] {
        &self.selected_areas
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Checks or unchecks an access area. Returns `false` for ids that are
    /// not in the area catalog; those are never recorded.
    pub fn toggle_area(&mut self, area_id: &str, checked: bool) -> bool {
        if AccessArea::find(area_id).is_none() {
            return false;
        }
        let selected = self.selected_areas.iter().any(|id| id == area_id);
        if checked && !selected {
            self.selected_areas.push(area_id.to_string());
        } else if !checked {
            self.selected_areas.retain(|id| id != area_id);
        }
        true
    }

    pub fn validate(&self) -> Result<NewAccessRequest, ValidationError> {
        RequiredFields::new()
            .text("full name", &self.full_name)
            .text("student id", &self.student_id)
            .text("email", &self.email)
            .text("reason", &self.reason)
            .non_empty("access areas", &self.selected_areas)
            .finish()?;

        Ok(NewAccessRequest {
            full_name: self.full_name.clone(),
            student_id: self.student_id.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            supervisor: self.supervisor.clone(),
            reason: self.reason.clone(),
            selected_areas: self.selected_areas.clone(),
        })
    }

    pub fn reset(&mut self) {
        let pending = self.pending;
        *self = Self {
            pending,
            ..Self::default()
        };
    }

    pub fn begin_submit(&mut self) -> Result<NewAccessRequest, Notice> {
        let request = self.validate().map_err(|err| {
            missing_information(
                &err,
                "Please fill in all required fields and select at least one access area.",
            )
        })?;
        self.pending = true;
        Ok(request)
    }

    pub fn finish_submit(&mut self, outcome: StoreResult<Acknowledgement>) -> Notice {
        self.pending = false;
        match outcome {
            Ok(_) => {
                self.reset();
                Notice::success(
                    "Access Request Submitted!",
                    "Your door access request has been submitted for approval. \
                     You will receive an email notification once processed.",
                )
            }
            Err(err) => store_failure(
                "access request",
                &err,
                "Submission Failed",
                "There was an error submitting your access request. Please try again.",
            ),
        }
    }

    pub async fn submit(&mut self, store: &dyn RemoteStore) -> Notice {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(notice) => return notice,
        };
        let outcome = store.create_access_request(request).await;
        self.finish_submit(outcome)
    }
}

/// A file picked for backup. Only its name and size are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a byte total as megabytes, switching to gigabytes above 1024 MB.
pub fn format_total_size(files: &[SelectedFile]) -> String {
    let total_bytes: u64 = files.iter().map(|file| file.size_bytes).sum();
    let total_mb = total_bytes as f64 / BYTES_PER_MB;
    if total_mb > 1024.0 {
        format!("{:.2} GB", total_mb / 1024.0)
    } else {
        format!("{total_mb:.2} MB")
    }
}

#[derive(Debug, Clone, Default)]
pub struct BackupForm {
    pub files: Vec<SelectedFile>,
    pub backup_name: String,
    pub description: String,
    /// Name of the backup in flight.
    pending: Option<String>,
}

impl BackupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn total_size(&self) -> String {
        format_total_size(&self.files)
    }

    /// File selection is checked before the name, each with its own notice.
    pub fn validate(&self) -> Result<NewBackupRecord, Notice> {
        if let Err(err) = RequiredFields::new().non_empty("files", &self.files).finish() {
            debug!("backup validation failed: {err}");
            return Err(Notice::validation(
                "No Files Selected",
                "Please select files to backup.",
            ));
        }
        if let Err(err) = RequiredFields::new()
            .text("backup name", &self.backup_name)
            .finish()
        {
            debug!("backup validation failed: {err}");
            return Err(Notice::validation(
                "Missing Backup Name",
                "Please provide a name for your backup.",
            ));
        }

        Ok(NewBackupRecord {
            file_name: self.backup_name.clone(),
            description: self.description.clone(),
            size: self.total_size(),
        })
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.backup_name.clear();
        self.description.clear();
    }

    pub fn begin_submit(&mut self) -> Result<NewBackupRecord, Notice> {
        let record = self.validate()?;
        self.pending = Some(record.file_name.clone());
        Ok(record)
    }

    pub fn finish_submit(&mut self, outcome: StoreResult<Acknowledgement>) -> Notice {
        let backup_name = self.pending.take().unwrap_or_default();
        match outcome {
            Ok(_) => {
                self.reset();
                Notice::success(
                    "Backup Successful!",
                    format!("Your files have been securely backed up as \"{backup_name}\"."),
                )
            }
            Err(err) => store_failure(
                "backup record",
                &err,
                "Backup Failed",
                "There was an error recording your backup. Please try again.",
            ),
        }
    }

    pub async fn submit(&mut self, store: &dyn RemoteStore) -> Notice {
        let record = match self.begin_submit() {
            Ok(record) => record,
            Err(notice) => return notice,
        };
        let outcome = store.create_backup_record(record).await;
        self.finish_submit(outcome)
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
