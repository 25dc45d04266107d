// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod assignment_tests;
mod initialization_tests;

use ifn_domain::{Assignment, AssignmentDraft, AssignmentTarget};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{NewConglomerate, NewSubplot, NewUser, Persistence};

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 08:30 UTC)
}

pub fn create_test_admin(persistence: &mut Persistence) -> i64 {
    persistence
        .create_user(NewUser {
            name: "Ana Rodríguez",
            email: "ana@ifn.gov.co",
            password: "admin-password",
            role: "admin",
            zone: "Andina",
        })
        .unwrap()
}

pub fn create_test_brigadista(persistence: &mut Persistence, email: &str) -> i64 {
    persistence
        .create_user(NewUser {
            name: "Carlos Pérez",
            email,
            password: "field-password",
            role: "brigadista",
            zone: "Amazonía",
        })
        .unwrap()
}

pub fn create_test_conglomerate(persistence: &mut Persistence, code: &str) -> i64 {
    persistence
        .create_conglomerate(NewConglomerate {
            code,
            department: "Antioquia",
            municipality: "Medellín",
            vereda: "Santa Elena",
            latitude: 6.2442,
            longitude: -75.5812,
        })
        .unwrap()
}

pub fn create_test_subplot(persistence: &mut Persistence, conglomerate_code: &str) -> i64 {
    persistence
        .create_subplot(NewSubplot {
            conglomerate_code,
            number: 1,
            latitude: 6.2443,
            longitude: -75.5811,
        })
        .unwrap()
}

pub fn create_test_assignment(
    brigadista_id: i64,
    assigned_by: i64,
    target: AssignmentTarget,
    assigned_at: OffsetDateTime,
) -> Assignment {
    Assignment::create(
        AssignmentDraft {
            brigadista_id,
            target,
            status: None,
            priority: None,
            due_at: None,
            brigade_label: String::from("Brigada Norte"),
            notes: String::new(),
        },
        assigned_by,
        assigned_at,
    )
}
