use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

id_newtype!(RoomId);

/// Label of the room-filter entry that matches every room.
pub const ALL_ROOMS: &str = "All Rooms";

/// Bookable start/end times offered by the booking form.
pub const TIME_SLOTS: [&str; 9] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub equipment: String,
}

impl Room {
    pub fn new(id: u32, name: &str, capacity: u32, equipment: &str) -> Self {
        Self {
            id: RoomId(id),
            name: name.to_string(),
            capacity,
            equipment: equipment.to_string(),
        }
    }

    /// The fixed list of bookable meeting rooms.
    pub fn catalog() -> Vec<Room> {
        vec![
            Room::new(
                1,
                "Ruang meeting lab (gedung lama)",
                20,
                "Large screen, video conference, whiteboard",
            ),
            Room::new(
                2,
                "Ruang meeting divisi (gedung baru)",
                15,
                "LCD projector, screen, whiteboard",
            ),
        ]
    }

    pub fn find(rooms: &[Room], id: RoomId) -> Option<&Room> {
        rooms.iter().find(|room| room.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    Standard,
    Restricted,
    #[serde(rename = "High Security")]
    HighSecurity,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SecurityLevel::Standard => "Standard",
            SecurityLevel::Restricted => "Restricted",
            SecurityLevel::HighSecurity => "High Security",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessArea {
    pub id: &'static str,
    pub name: &'static str,
    pub level: SecurityLevel,
}

pub const ACCESS_AREAS: [AccessArea; 6] = [
    AccessArea {
        id: "lab-a",
        name: "Chemistry Lab A",
        level: SecurityLevel::Standard,
    },
    AccessArea {
        id: "lab-b",
        name: "Physics Lab B",
        level: SecurityLevel::Standard,
    },
    AccessArea {
        id: "lab-c",
        name: "Research Lab C",
        level: SecurityLevel::Restricted,
    },
    AccessArea {
        id: "storage",
        name: "Equipment Storage",
        level: SecurityLevel::Restricted,
    },
    AccessArea {
        id: "clean-room",
        name: "Clean Room",
        level: SecurityLevel::HighSecurity,
    },
    AccessArea {
        id: "server-room",
        name: "Server Room",
        level: SecurityLevel::HighSecurity,
    },
];

impl AccessArea {
    pub fn find(id: &str) -> Option<&'static AccessArea> {
        ACCESS_AREAS.iter().find(|area| area.id == id)
    }
}

/// Room selector used by the schedule views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoomFilter {
    #[default]
    AllRooms,
    Room(String),
}

impl RoomFilter {
    /// Parses a selector label; the "All Rooms" label maps to the sentinel.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_ROOMS {
            RoomFilter::AllRooms
        } else {
            RoomFilter::Room(label.to_string())
        }
    }

    pub fn matches(&self, room: &str) -> bool {
        match self {
            RoomFilter::AllRooms => true,
            RoomFilter::Room(selected) => selected == room,
        }
    }
}

impl fmt::Display for RoomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomFilter::AllRooms => f.write_str(ALL_ROOMS),
            RoomFilter::Room(name) => f.write_str(name),
        }
    }
}

/// A booking row as stored in the remote sheet. Every field is kept as text;
/// nothing about overlaps, ordering of start/end or attendee counts is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub room: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
    pub attendees: String,
    pub booked_by: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccessRequestStatus {
    #[default]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub full_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub supervisor: String,
    pub reason: String,
    pub selected_areas: Vec<String>,
    pub timestamp: String,
    pub status: AccessRequestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackupStatus {
    #[default]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub file_name: String,
    pub description: String,
    pub timestamp: String,
    pub size: String,
    pub status: BackupStatus,
}

/// Booking fields supplied by the form; the store adds `bookedBy` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub room: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
    pub attendees: String,
}

impl NewBooking {
    pub fn into_booking(
        self,
        booked_by: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Booking {
        Booking {
            room: self.room,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            purpose: self.purpose,
            attendees: self.attendees,
            booked_by: booked_by.into(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessRequest {
    pub full_name: String,
    pub student_id: String,
    pub email: String,
    pub department: String,
    pub supervisor: String,
    pub reason: String,
    pub selected_areas: Vec<String>,
}

impl NewAccessRequest {
    pub fn into_request(self, timestamp: impl Into<String>) -> AccessRequest {
        AccessRequest {
            full_name: self.full_name,
            student_id: self.student_id,
            email: self.email,
            department: self.department,
            supervisor: self.supervisor,
            reason: self.reason,
            selected_areas: self.selected_areas,
            timestamp: timestamp.into(),
            status: AccessRequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBackupRecord {
    pub file_name: String,
    pub description: String,
    pub size: String,
}

impl NewBackupRecord {
    pub fn into_record(self, timestamp: impl Into<String>) -> BackupRecord {
        BackupRecord {
            file_name: self.file_name,
            description: self.description,
            timestamp: timestamp.into(),
            size: self.size,
            status: BackupStatus::Completed,
        }
    }
}
