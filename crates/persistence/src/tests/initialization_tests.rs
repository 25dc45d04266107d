// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, PersistenceError};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().unwrap();
    let mut second: Persistence = Persistence::new_in_memory().unwrap();

    super::create_test_conglomerate(&mut first, "CG-0001");

    assert_eq!(first.list_conglomerates().unwrap().len(), 1);
    assert!(second.list_conglomerates().unwrap().is_empty());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!("ifn-persistence-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        super::create_test_conglomerate(&mut persistence, "CG-0042");
    }

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    let conglomerates = reopened.list_conglomerates().unwrap();
    assert_eq!(conglomerates.len(), 1);
    assert_eq!(conglomerates[0].code, "CG-0042");

    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
