// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client for the external Zone Service.
//!
//! Zones live in a separately deployed service and are referenced from
//! assignments by identifier only. The service exposes
//! `GET {base}/zones/{id}`, answering with the zone document or 404.
//!
//! Two callers use it with different failure policies:
//! - assignment creation treats any failure as a blocking not-found
//! - listings enrich each zone assignment independently and degrade a
//!   failed lookup to `null` ([`enrich_with_zones`])

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use ifn_domain::Assignment;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A zone document as returned by the Zone Service.
///
/// Kept as opaque JSON so fields this service does not know about still
/// reach clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneRecord(serde_json::Value);

impl ZoneRecord {
    /// Wraps a JSON document.
    #[must_use]
    pub const fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    /// Returns the zone identifier, if the document carries a string `id`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Returns the zone's display name (`name`, or the service's `nombre`).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("name")
            .or_else(|| self.0.get("nombre"))
            .and_then(serde_json::Value::as_str)
    }

    /// Returns the raw document.
    #[must_use]
    pub const fn document(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Errors from a zone lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ZoneServiceError {
    /// The service answered that the zone does not exist.
    #[error("Zone '{zone_id}' does not exist")]
    NotFound { zone_id: String },

    /// The service could not be reached or gave an unusable answer.
    #[error("Zone service unavailable while fetching '{zone_id}': {reason}")]
    Unavailable { zone_id: String, reason: String },
}

/// Errors building an [`HttpZoneDirectory`].
#[derive(Debug, Error)]
pub enum ZoneClientConfigError {
    /// The base URL cannot be parsed or cannot carry path segments.
    #[error("Invalid zone service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("Failed to build zone service client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Lookup of zones by identifier.
#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    /// Fetches one zone.
    ///
    /// # Errors
    ///
    /// Returns `ZoneServiceError::NotFound` if the zone does not exist and
    /// `ZoneServiceError::Unavailable` for every other failure.
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneRecord, ZoneServiceError>;
}

/// [`ZoneDirectory`] backed by the Zone Service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpZoneDirectory {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpZoneDirectory {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service root, e.g. `http://localhost:5002/api`
    /// * `timeout` - Upper bound for each request, connect included
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ZoneClientConfigError> {
        let parsed: Url =
            Url::parse(base_url).map_err(|e| ZoneClientConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        if parsed.cannot_be_a_base() {
            return Err(ZoneClientConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: String::from("URL cannot be a base"),
            });
        }

        let client: reqwest::Client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    fn zone_url(&self, zone_id: &str) -> Url {
        let mut url: Url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("zones").push(zone_id);
        }
        url
    }
}

#[async_trait]
impl ZoneDirectory for HttpZoneDirectory {
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneRecord, ZoneServiceError> {
        let unavailable = |reason: String| ZoneServiceError::Unavailable {
            zone_id: zone_id.to_string(),
            reason,
        };

        let url: Url = self.zone_url(zone_id);
        debug!(%url, "Fetching zone");

        let response: reqwest::Response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ZoneServiceError::NotFound {
                zone_id: zone_id.to_string(),
            }),
            status if status.is_success() => response
                .json::<serde_json::Value>()
                .await
                .map(ZoneRecord::new)
                .map_err(|e| unavailable(format!("undecodable body: {e}"))),
            status => Err(unavailable(format!("unexpected status {status}"))),
        }
    }
}

/// Looks up the zone of every zone-typed assignment concurrently.
///
/// All lookups are started together and joined, so one slow or failing
/// call never delays or aborts the others. The result is index-aligned
/// with `assignments`:
/// - `None` for assignments that do not target a zone
/// - `Some(None)` for a zone whose lookup failed (logged at `warn`)
/// - `Some(Some(record))` for a successful lookup
pub async fn enrich_with_zones(
    directory: &dyn ZoneDirectory,
    assignments: &[Assignment],
) -> Vec<Option<Option<ZoneRecord>>> {
    let lookups = assignments.iter().map(|assignment| async move {
        let zone_id: &str = assignment.target.zone_id()?;
        match directory.get_zone(zone_id).await {
            Ok(record) => Some(Some(record)),
            Err(e) => {
                warn!(
                    assignment_id = ?assignment.assignment_id,
                    zone_id,
                    error = %e,
                    "Zone enrichment failed"
                );
                Some(None)
            }
        }
    });

    join_all(lookups).await
}
