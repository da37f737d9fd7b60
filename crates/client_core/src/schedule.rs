//! Derived views over the booking list: the selected day, the next few
//! bookings, and which rooms are free today.

use chrono::NaiveDate;
use shared::domain::{Booking, Room, RoomFilter, ALL_ROOMS};

use crate::{
    forms::{store_failure, Notice},
    RemoteStore,
};

pub const UPCOMING_LIMIT: usize = 5;
const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT).ok()
}

/// Bookings on `day` in the filtered room, in list order. Dates and room
/// names are compared as exact strings.
pub fn bookings_for_day<'a>(
    bookings: &'a [Booking],
    day: NaiveDate,
    filter: &RoomFilter,
) -> Vec<&'a Booking> {
    let day = format_day(day);
    bookings
        .iter()
        .filter(|booking| booking.date == day && filter.matches(&booking.room))
        .collect()
}

/// Up to `limit` bookings dated today or later, earliest first. Bookings on
/// the same date keep their list order; unreadable dates are left out.
pub fn upcoming_bookings(bookings: &[Booking], today: NaiveDate, limit: usize) -> Vec<&Booking> {
    let mut upcoming: Vec<(NaiveDate, &Booking)> = bookings
        .iter()
        .filter_map(|booking| parse_day(&booking.date).map(|date| (date, booking)))
        .filter(|(date, _)| *date >= today)
        .collect();
    upcoming.sort_by_key(|(date, _)| *date);
    upcoming
        .into_iter()
        .take(limit)
        .map(|(_, booking)| booking)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAvailability {
    pub room: String,
    pub booking_count: usize,
}

impl RoomAvailability {
    pub fn is_available(&self) -> bool {
        self.booking_count == 0
    }
}

/// Booking count per catalog room for `today`.
pub fn room_availability(
    bookings: &[Booking],
    rooms: &[Room],
    today: NaiveDate,
) -> Vec<RoomAvailability> {
    let today = format_day(today);
    rooms
        .iter()
        .filter(|room| room.name != ALL_ROOMS)
        .map(|room| RoomAvailability {
            room: room.name.clone(),
            booking_count: bookings
                .iter()
                .filter(|booking| booking.room == room.name && booking.date == today)
                .count(),
        })
        .collect()
}

/// State behind the schedule page: the fetched list plus the two selectors.
#[derive(Debug, Clone)]
pub struct SchedulePage {
    rooms: Vec<Room>,
    bookings: Vec<Booking>,
    selected_day: NaiveDate,
    room_filter: RoomFilter,
    load_error: Option<Notice>,
}

impl SchedulePage {
    pub fn new(rooms: Vec<Room>, today: NaiveDate) -> Self {
        Self {
            rooms,
            bookings: Vec::new(),
            selected_day: today,
            room_filter: RoomFilter::AllRooms,
            load_error: None,
        }
    }

    /// Replaces the booking list from the store. A failed load empties the
    /// list and records a notice; the page stays usable either way.
    pub async fn load(&mut self, store: &dyn RemoteStore) {
        match store.fetch_bookings().await {
            Ok(bookings) => {
                self.bookings = bookings;
                self.load_error = None;
            }
            Err(err) => {
                self.bookings.clear();
                self.load_error = Some(store_failure(
                    "schedule load",
                    &err,
                    "Schedule Unavailable",
                    "Bookings could not be loaded. Please try again later.",
                ));
            }
        }
    }

    pub fn with_bookings(mut self, bookings: Vec<Booking>) -> Self {
        self.bookings = bookings;
        self
    }

    pub fn select_day(&mut self, day: NaiveDate) {
        self.selected_day = day;
    }

    pub fn select_room(&mut self, filter: RoomFilter) {
        self.room_filter = filter;
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    pub fn room_filter(&self) -> &RoomFilter {
        &self.room_filter
    }

    pub fn load_error(&self) -> Option<&Notice> {
        self.load_error.as_ref()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Selector entries: the "All Rooms" sentinel followed by every room.
    pub fn room_labels(&self) -> Vec<&str> {
        std::iter::once(ALL_ROOMS)
            .chain(self.rooms.iter().map(|room| room.name.as_str()))
            .collect()
    }

    pub fn day_bookings(&self) -> Vec<&Booking> {
        bookings_for_day(&self.bookings, self.selected_day, &self.room_filter)
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Booking> {
        upcoming_bookings(&self.bookings, today, UPCOMING_LIMIT)
    }

    pub fn availability(&self, today: NaiveDate) -> Vec<RoomAvailability> {
        room_availability(&self.bookings, &self.rooms, today)
    }
}

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod tests;
