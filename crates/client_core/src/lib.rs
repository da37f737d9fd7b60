use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use shared::{
    domain::{Booking, NewAccessRequest, NewBackupRecord, NewBooking},
    protocol::{Acknowledgement, Action, EmptyPayload, Envelope},
};
use tracing::{debug, error, info, warn};
use url::Url;

pub mod error;
pub mod export;
pub mod forms;
pub mod schedule;

pub use error::{ParseError, StoreError};

use error::Result;

/// Name recorded in `bookedBy` until the portal has real sign-in.
pub const DEFAULT_SUBMITTER: &str = "Current User";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the front end needs from persistence. Form and page holders
/// take this by reference so tests can substitute an in-memory store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_booking(&self, booking: NewBooking) -> Result<Acknowledgement>;
    async fn create_access_request(&self, request: NewAccessRequest) -> Result<Acknowledgement>;
    async fn create_backup_record(&self, record: NewBackupRecord) -> Result<Acknowledgement>;
    async fn fetch_bookings(&self) -> Result<Vec<Booking>>;
    async fn fetch_access_requests(&self) -> Result<Value>;
    async fn fetch_backups(&self) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// POST target for `{ action, data }` envelopes, used for writes and queries.
    pub write_endpoint: Url,
    /// Published CSV export of the bookings sheet, tried before the query endpoint.
    pub export_url: Option<Url>,
    pub submitted_by: String,
    pub request_timeout: Duration,
}

impl RemoteStoreConfig {
    pub fn new(write_endpoint: &str) -> Result<Self> {
        Ok(Self {
            write_endpoint: parse_endpoint(write_endpoint)?,
            export_url: None,
            submitted_by: DEFAULT_SUBMITTER.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_export_url(mut self, export_url: &str) -> Result<Self> {
        self.export_url = Some(parse_endpoint(export_url)?);
        Ok(self)
    }

    pub fn with_submitter(mut self, submitted_by: impl Into<String>) -> Self {
        self.submitted_by = submitted_by.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|source| StoreError::InvalidEndpoint {
        url: raw.to_string(),
        source,
    })
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// HTTP client for the sheet-backed endpoint. One instance per process.
#[derive(Clone)]
pub struct RemoteStoreClient {
    http: Client,
    config: RemoteStoreConfig,
}

impl RemoteStoreClient {
    pub fn new(config: RemoteStoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(StoreError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RemoteStoreConfig {
        &self.config
    }

    /// Posts one envelope and returns the endpoint's acknowledgement. There is
    /// no retry and no idempotency key; a repeated call appends another row.
    pub async fn submit_record<T>(&self, action: Action, data: &T) -> Result<Acknowledgement>
    where
        T: Serialize + Sync,
    {
        debug!(action = action.as_str(), "posting to write endpoint");
        match self.post_envelope(action, data).await {
            Ok(ack) => Ok(ack),
            Err(err) => {
                error!(action = action.as_str(), "api request failed: {err}");
                Err(err)
            }
        }
    }

    async fn post_envelope<T>(&self, action: Action, data: &T) -> Result<Acknowledgement>
    where
        T: Serialize + Sync,
    {
        let endpoint = self.config.write_endpoint.as_str();
        let res = self
            .http
            .post(self.config.write_endpoint.clone())
            .json(&Envelope::new(action, data))
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        res.json::<Acknowledgement>()
            .await
            .map_err(|source| StoreError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    async fn fetch_export(&self, export_url: &Url) -> Result<Vec<Booking>> {
        let endpoint = export_url.as_str();
        let res = self
            .http
            .get(export_url.clone())
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = res.text().await.map_err(|source| StoreError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(export::parse_bookings_csv(&body)?)
    }

    async fn query_bookings(&self) -> Result<Vec<Booking>> {
        let ack = self
            .submit_record(Action::GetBookings, &EmptyPayload {})
            .await?;
        Ok(export::bookings_from_json(ack.into_inner())?)
    }
}

#[async_trait]
impl RemoteStore for RemoteStoreClient {
    async fn create_booking(&self, booking: NewBooking) -> Result<Acknowledgement> {
        let record = booking.into_booking(self.config.submitted_by.clone(), now_timestamp());
        let ack = self.submit_record(Action::CreateBooking, &record).await?;
        info!(room = %record.room, date = %record.date, "booking created");
        Ok(ack)
    }

    async fn create_access_request(&self, request: NewAccessRequest) -> Result<Acknowledgement> {
        let record = request.into_request(now_timestamp());
        let ack = self
            .submit_record(Action::CreateAccessRequest, &record)
            .await?;
        info!(
            areas = record.selected_areas.len(),
            "access request submitted"
        );
        Ok(ack)
    }

    async fn create_backup_record(&self, record: NewBackupRecord) -> Result<Acknowledgement> {
        let record = record.into_record(now_timestamp());
        let ack = self.submit_record(Action::CreateBackup, &record).await?;
        info!(file_name = %record.file_name, size = %record.size, "backup recorded");
        Ok(ack)
    }

    async fn fetch_bookings(&self) -> Result<Vec<Booking>> {
        if let Some(export_url) = &self.config.export_url {
            match self.fetch_export(export_url).await {
                Ok(bookings) => {
                    info!(count = bookings.len(), "loaded bookings from export");
                    return Ok(bookings);
                }
                Err(err) => {
                    warn!("booking export unavailable, falling back to query endpoint: {err}");
                }
            }
        }

        let bookings = self.query_bookings().await?;
        info!(count = bookings.len(), "loaded bookings from query endpoint");
        Ok(bookings)
    }

    async fn fetch_access_requests(&self) -> Result<Value> {
        let ack = self
            .submit_record(Action::GetAccessRequests, &EmptyPayload {})
            .await?;
        Ok(ack.into_inner())
    }

    async fn fetch_backups(&self) -> Result<Value> {
        let ack = self
            .submit_record(Action::GetBackups, &EmptyPayload {})
            .await?;
        Ok(ack.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
