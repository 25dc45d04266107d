// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ifn_persistence::{NewConglomerate, NewSubplot, NewUser, Persistence};
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;

use crate::{
    AssignmentResponse, AuthenticatedActor, CreateAssignmentRequest, Role, ZoneDirectory,
    ZoneRecord, ZoneServiceError, create_assignment,
};

pub const ADMIN_EMAIL: &str = "ana@ifn.gov.co";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const BRIGADISTA_EMAIL: &str = "carlos@ifn.gov.co";
pub const BRIGADISTA_PASSWORD: &str = "field-password";

/// Users and reference entities created by [`setup_test_persistence`].
pub struct Fixture {
    pub admin: AuthenticatedActor,
    pub brigadista: AuthenticatedActor,
    pub other_brigadista: AuthenticatedActor,
    pub conglomerate_id: i64,
    pub subplot_id: i64,
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 08:30 UTC)
}

/// Creates an in-memory database with an admin, two brigadistas, one
/// conglomerate and one subplot.
pub fn setup_test_persistence() -> (Persistence, Fixture) {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");

    let admin_id: i64 = persistence
        .create_user(NewUser {
            name: "Ana Rodríguez",
            email: ADMIN_EMAIL,
            password: ADMIN_PASSWORD,
            role: "admin",
            zone: "Andina",
        })
        .unwrap();
    let brigadista_id: i64 = persistence
        .create_user(NewUser {
            name: "Carlos Pérez",
            email: BRIGADISTA_EMAIL,
            password: BRIGADISTA_PASSWORD,
            role: "brigadista",
            zone: "Amazonía",
        })
        .unwrap();
    let other_brigadista_id: i64 = persistence
        .create_user(NewUser {
            name: "Lucía Gómez",
            email: "lucia@ifn.gov.co",
            password: "other-password",
            role: "brigadista",
            zone: "Caribe",
        })
        .unwrap();

    let conglomerate_id: i64 = persistence
        .create_conglomerate(NewConglomerate {
            code: "CG-0001",
            department: "Antioquia",
            municipality: "Medellín",
            vereda: "Santa Elena",
            latitude: 6.2442,
            longitude: -75.5812,
        })
        .unwrap();
    let subplot_id: i64 = persistence
        .create_subplot(NewSubplot {
            conglomerate_code: "CG-0001",
            number: 3,
            latitude: 6.2443,
            longitude: -75.5811,
        })
        .unwrap();

    let fixture: Fixture = Fixture {
        admin: AuthenticatedActor::new(admin_id, Role::Admin),
        brigadista: AuthenticatedActor::new(brigadista_id, Role::Brigadista),
        other_brigadista: AuthenticatedActor::new(other_brigadista_id, Role::Brigadista),
        conglomerate_id,
        subplot_id,
    };
    (persistence, fixture)
}

pub fn conglomerate_request(brigadista: i64, conglomerate: i64) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        brigadista,
        assignment_type: String::from("conglomerate"),
        conglomerate: Some(conglomerate),
        subplot: None,
        zone_id: None,
        status: None,
        priority: None,
        due_at: None,
        brigade_label: Some(String::from("Brigada Norte")),
        notes: None,
    }
}

pub fn zone_request(brigadista: i64, zone_id: &str) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        assignment_type: String::from("zone"),
        conglomerate: None,
        zone_id: Some(zone_id.to_string()),
        ..conglomerate_request(brigadista, 0)
    }
}

/// Creates an assignment through the handler, panicking on failure.
pub async fn create_ok(
    persistence: &Mutex<Persistence>,
    zones: &dyn ZoneDirectory,
    admin: &AuthenticatedActor,
    request: &CreateAssignmentRequest,
    now: OffsetDateTime,
) -> AssignmentResponse {
    create_assignment(persistence, zones, admin, request, now)
        .await
        .expect("Failed to create assignment")
}

/// In-process zone service.
pub struct FakeZoneDirectory {
    zones: HashMap<String, ZoneRecord>,
    unavailable: bool,
    delay: Option<std::time::Duration>,
    calls: AtomicUsize,
}

impl FakeZoneDirectory {
    /// A reachable service that knows the given zones.
    pub fn with_zones(zone_ids: &[&str]) -> Self {
        let zones: HashMap<String, ZoneRecord> = zone_ids
            .iter()
            .map(|id| {
                let record: ZoneRecord =
                    ZoneRecord::new(json!({ "id": id, "nombre": format!("Zona {id}") }));
                ((*id).to_string(), record)
            })
            .collect();
        Self {
            zones,
            unavailable: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A service that fails every request.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::with_zones(&[])
        }
    }

    /// Makes every request take `delay` before answering.
    pub const fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneDirectory for FakeZoneDirectory {
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneRecord, ZoneServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(ZoneServiceError::Unavailable {
                zone_id: zone_id.to_string(),
                reason: String::from("connection refused"),
            });
        }
        self.zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| ZoneServiceError::NotFound {
                zone_id: zone_id.to_string(),
            })
    }
}
