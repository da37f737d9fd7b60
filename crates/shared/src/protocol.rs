use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation names understood by the sheet-backed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    CreateBooking,
    GetBookings,
    CreateAccessRequest,
    GetAccessRequests,
    CreateBackup,
    GetBackups,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::CreateBooking => "createBooking",
            Action::GetBookings => "getBookings",
            Action::CreateAccessRequest => "createAccessRequest",
            Action::GetAccessRequests => "getAccessRequests",
            Action::CreateBackup => "createBackup",
            Action::GetBackups => "getBackups",
        }
    }
}

/// Request body posted to the write endpoint: `{ "action": ..., "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub action: Action,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(action: Action, data: T) -> Self {
        Self { action, data }
    }
}

/// Query actions carry an empty object as their payload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

/// Opaque response body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acknowledgement(pub Value);

impl Acknowledgement {
    pub fn into_inner(self) -> Value {
        self.0
    }
}
