// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for record identity and the class document cache

use std::sync::Arc;

use compass::mock::MockConnector;
use compass::{rid, CompassError, Credentials, Database, Method, RelateTarget, Rid, Server};
use proptest::prelude::*;
use serde_json::{json, Value};

const BASE: &str = "http://localhost:2480";

/// Generate arbitrary RIDs in `cluster:position` form
fn arb_rid() -> impl Strategy<Value = String> {
    (0u32..64, 0u64..10_000).prop_map(|(cluster, position)| format!("{cluster}:{position}"))
}

/// Generate arbitrary field names that are not reserved
fn arb_field() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

fn open_database(documents: &Value) -> (MockConnector, Database) {
    let mock = MockConnector::new();
    mock.respond_json(Method::Get, &format!("{BASE}/database/demo"), 200, &json!({}))
        .respond_json(Method::Get, &format!("{BASE}/connect/demo"), 200, &json!({}))
        .respond_json(Method::Get, &format!("{BASE}/class/demo/Person/20"), 200, documents);

    let server = Server::with_connector(BASE, Credentials::admin(), Arc::new(mock.clone())).unwrap();
    let database = server.database("demo", &Credentials::admin()).unwrap();
    (mock, database)
}

proptest! {
    #[test]
    fn test_normalize_strips_hash_and_is_idempotent(raw in arb_rid(), hashed in any::<bool>()) {
        let input = if hashed { format!("#{raw}") } else { raw.clone() };
        let once = Rid::new(&input);

        prop_assert_eq!(once.as_str(), raw.as_str());
        prop_assert!(!once.as_str().starts_with('#'));
        prop_assert_eq!(Rid::new(once.as_str()), once.clone());
        prop_assert_eq!(rid::normalize(rid::normalize(&input)), rid::normalize(&input));
    }

    #[test]
    fn test_rid_field_is_immutable(raw in arb_rid(), field in arb_field(), value in any::<i64>()) {
        let documents = json!({"result": [{"@rid": format!("#{raw}")}]});
        let (_mock, database) = open_database(&documents);
        let mut klass = database.klass("Person", 20).unwrap();
        let document = klass.get_mut(&raw).unwrap();

        prop_assert!(matches!(document.set("@rid", json!("#0:0")), Err(CompassError::ImmutableKey(_))));
        prop_assert!(matches!(document.remove("@rid"), Err(CompassError::ImmutableKey(_))));

        document.set(field.clone(), json!(value)).unwrap();
        prop_assert_eq!(document.get(&field).unwrap(), &json!(value));
    }

    #[test]
    fn test_define_documents_never_duplicates(
        first in prop::collection::vec(arb_rid(), 0..12),
        second in prop::collection::vec(arb_rid(), 0..12),
    ) {
        let seed: Vec<Value> = first
            .iter()
            .map(|rid| json!({"@rid": format!("#{rid}"), "batch": 1}))
            .collect();
        let (_mock, database) = open_database(&json!({"result": seed}));
        let mut klass = database.klass("Person", 20).unwrap();

        let next: Vec<Value> = second
            .iter()
            .map(|rid| json!({"@rid": rid, "batch": 2}))
            .collect();
        klass.define_documents(next, false).unwrap();

        let mut distinct: Vec<&String> = first.iter().chain(second.iter()).collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(klass.size(), distinct.len());

        for rid in &first {
            prop_assert_eq!(klass.get(rid).unwrap().get("batch").unwrap(), &json!(1));
        }
    }

    #[test]
    fn test_define_documents_reset_drops_prior(
        first in prop::collection::vec(arb_rid(), 1..8),
        second in prop::collection::vec(arb_rid(), 0..8),
    ) {
        let seed: Vec<Value> = first.iter().map(|rid| json!({"@rid": rid})).collect();
        let (_mock, database) = open_database(&json!({"result": seed}));
        let mut klass = database.klass("Person", 20).unwrap();

        let next: Vec<Value> = second.iter().map(|rid| json!({"@rid": rid})).collect();
        klass.define_documents(next, true).unwrap();

        for rid in &first {
            prop_assert_eq!(klass.contains(rid), second.contains(rid));
        }
    }

    #[test]
    fn test_relate_multiple_appends_once(raw in arb_rid(), repeats in 1usize..5) {
        let documents = json!({"result": [{"@rid": "#1:0", "links": []}]});
        let (_mock, database) = open_database(&documents);
        let mut klass = database.klass("Person", 20).unwrap();
        let document = klass.get_mut("1:0").unwrap();

        for _ in 0..repeats {
            document.relate("links", RelateTarget::Rid(&raw), true).unwrap();
        }
        prop_assert_eq!(document.get("links").unwrap(), &json!([raw]));
    }
}
