//! Qry pipeline scenarios: predicates, sort, joins, index scans, and the
//! error budget.

mod common;

use common::*;
use serde_json::{json, Value};

use cask_core::{ErrCode, FindCondition, Join, SortKey, Status};
use cask_executor::{PutRequest, QryRequest, Request, RuntimeConfig};

fn find(fld: &str, op: &str) -> FindCondition {
    FindCondition {
        fld: fld.into(),
        op: op.into(),
        ..FindCondition::default()
    }
}

fn find_str(fld: &str, op: &str, val: &str) -> FindCondition {
    FindCondition {
        val_str: val.into(),
        ..find(fld, op)
    }
}

fn find_int(fld: &str, op: &str, val: i64) -> FindCondition {
    FindCondition {
        val_int: val,
        ..find(fld, op)
    }
}

fn sort_key(fld: &str, dir: &str) -> SortKey {
    SortKey {
        fld: fld.into(),
        dir: dir.into(),
        use_default: String::new(),
    }
}

fn qry(bkt: &str) -> QryRequest {
    QryRequest {
        bkt_name: bkt.into(),
        ..QryRequest::default()
    }
}

#[test]
fn zip_prefix_with_two_key_sort() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            find_conditions: vec![find_str("zip", "startswith", "54")],
            sort_keys: vec![sort_key("locationType", "descint"), sort_key("address", "ascstr")],
            ..qry("location")
        }),
    );
    assert_eq!(resp.status, Status::Ok, "{}", resp.msg);
    assert_eq!(rec_fields(&resp, "id"), vec!["104", "102", "103"]);
}

#[test]
fn conjunction_of_three_conditions() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            find_conditions: vec![
                find_str("st", "after", "ok"),
                find_str("address", "contains", "ave"),
                find_int("locationType", "equals", 3),
            ],
            ..qry("location")
        }),
    );
    assert_eq!(resp.status, Status::Ok, "{}", resp.msg);
    assert_eq!(rec_fields(&resp, "id"), vec!["104", "999"]);
}

#[test]
fn not_condition_excludes_matches() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            find_conditions: vec![find_str("st", "matches", "TN"), {
                let mut c = find_int("locationType", "equals", 3);
                c.not = true;
                c
            }],
            sort_keys: vec![sort_key("city", "ascstr")],
            ..qry("location")
        }),
    );
    assert_eq!(resp.status, Status::Ok, "{}", resp.msg);
    assert_eq!(rec_fields(&resp, "id"), vec!["102", "103"]);
}

#[test]
fn or_conditions_keep_non_matching_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            find_conditions: vec![find_str("st", "matches", "CA")],
            find_or_conditions: vec![find_int("locationType", "equals", 3)],
            ..qry("location")
        }),
    );
    // CA (100) plus type-3 records via the OR list
    assert_eq!(rec_fields(&resp, "id"), vec!["100", "104", "999"]);
}

#[test]
fn no_conditions_returns_range() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            start_key: "102".into(),
            end_key: "104".into(),
            ..qry("location")
        }),
    );
    assert_eq!(rec_fields(&resp, "id"), vec!["102", "103", "104"]);
}

#[test]
fn limit_bounds_matched_set_and_sets_next_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            limit: 2,
            ..qry("location")
        }),
    );
    assert_eq!(rec_fields(&resp, "id"), vec!["100", "101"]);
    assert_eq!(resp.next_key, "102");
}

#[test]
fn top_truncates_after_sort() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            sort_keys: vec![sort_key("zip", "descstr")],
            top: 2,
            ..qry("location")
        }),
    );
    // zips desc: 999 (77777), 103 (54902)
    assert_eq!(rec_fields(&resp, "id"), vec!["999", "103"]);
}

#[test]
fn invalid_condition_fails_before_scan() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            find_conditions: vec![find_str("st", "resembles", "tn")],
            ..qry("location")
        }),
    );
    assert_eq!(resp.status, Status::Fail);
    assert_eq!(resp.msg, "invalid findConditions");
}

#[test]
fn qry_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let req = || {
        Request::Qry(QryRequest {
            find_conditions: vec![find_str("zip", "startswith", "54")],
            sort_keys: vec![sort_key("locationType", "descint"), sort_key("address", "ascstr")],
            ..qry("location")
        })
    };
    let a = run(&store, req());
    let b = run(&store, req());
    let bytes = |resp: &cask_core::Response| -> Vec<String> {
        resp.recs.iter().map(|r| r.get().to_string()).collect()
    };
    assert_eq!(bytes(&a), bytes(&b));
}

#[test]
fn untouched_records_pass_through_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    // deliberately odd spacing survives the round trip
    let rec_text = r#"{"id":"1",  "st": "TN"}"#;
    let resp = run(
        &store,
        Request::Put(PutRequest {
            bkt_name: "b".into(),
            key_field: "id".into(),
            recs: vec![serde_json::value::RawValue::from_string(rec_text.into()).unwrap()],
            required_flds: vec![],
        }),
    );
    assert_eq!(resp.status, Status::Ok);

    let resp = run(&store, Request::Qry(qry("b")));
    assert_eq!(resp.recs[0].get(), rec_text);
}

#[test]
fn index_driven_qry_scans_in_index_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            index_bkt: "location_zip_index".into(),
            start_key: "30000".into(),
            end_key: "60000".into(),
            find_conditions: vec![find_str("st", "matches", "tn")],
            ..qry("location")
        }),
    );
    // zip order within range, TN only
    assert_eq!(rec_fields(&resp, "id"), vec!["102", "103"]);
}

#[test]
fn joins_before_find_enable_predicates_on_joined_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let requests = vec![
        json!({"id": "r1", "loc": "102"}),
        json!({"id": "r2", "loc": "103"}),
        json!({"id": "r3", "loc": "100"}),
        json!({"id": "r4", "loc": "104"}),
    ];
    let resp = run(
        &store,
        Request::Put(PutRequest {
            bkt_name: "request".into(),
            key_field: "id".into(),
            recs: requests.into_iter().map(raw).collect(),
            required_flds: vec![],
        }),
    );
    assert_eq!(resp.status, Status::Ok);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            joins_before_find: vec![Join {
                join_bkt: "location".into(),
                join_fld: "loc".into(),
                from_fld: "st".into(),
                to_fld: "location_st".into(),
                use_default: false,
            }],
            joins_after_find: vec![
                Join {
                    join_bkt: "location".into(),
                    join_fld: "loc".into(),
                    from_fld: "city".into(),
                    to_fld: "location_city".into(),
                    use_default: false,
                },
                Join {
                    join_bkt: "location".into(),
                    join_fld: "loc".into(),
                    from_fld: "address".into(),
                    to_fld: "location_address".into(),
                    use_default: false,
                },
            ],
            find_conditions: vec![find_str("location_st", "matches", "TN")],
            sort_keys: vec![sort_key("location_address", "descstr")],
            ..qry("request")
        }),
    );
    assert_eq!(resp.status, Status::Ok, "{}", resp.msg);
    assert_eq!(rec_fields(&resp, "id"), vec!["r2", "r1"]);

    // joined fields ride along on the output records
    let first: Value = serde_json::from_str(resp.recs[0].get()).unwrap();
    assert_eq!(first["location_st"], "TN");
    assert_eq!(first["location_city"], "Memphis");
    assert_eq!(first["location_address"], "99 Pine Rd");
}

#[test]
fn join_without_use_default_collects_soft_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    let resp = run(
        &store,
        Request::Put(PutRequest {
            bkt_name: "request".into(),
            key_field: "id".into(),
            recs: vec![raw(json!({"id": "r1", "loc": "no-such-loc"}))],
            required_flds: vec![],
        }),
    );
    assert_eq!(resp.status, Status::Ok);

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            joins_before_find: vec![Join {
                join_bkt: "location".into(),
                join_fld: "loc".into(),
                from_fld: "st".into(),
                to_fld: "location_st".into(),
                use_default: false,
            }],
            err_limit: 5,
            ..qry("request")
        }),
    );
    assert_eq!(resp.status, Status::Warning);
    assert_eq!(resp.errs.len(), 1);
    assert_eq!(resp.errs[0].code, ErrCode::JoinKey);
    assert!(resp.recs.is_empty());
}

#[test]
fn error_budget_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    // three records whose locationType is a string: each one trips fld-type
    // under an int condition with use_default never mattering (wrong type
    // errors under every policy)
    let bad = vec![
        json!({"id": "1", "locationType": "one"}),
        json!({"id": "2", "locationType": "two"}),
        json!({"id": "3", "locationType": "three"}),
    ];
    let resp = run(
        &store,
        Request::Put(PutRequest {
            bkt_name: "b".into(),
            key_field: "id".into(),
            recs: bad.into_iter().map(raw).collect(),
            required_flds: vec![],
        }),
    );
    assert_eq!(resp.status, Status::Ok);

    let qry_with_limit = |err_limit: i64| {
        Request::Qry(QryRequest {
            find_conditions: vec![find_int("locationType", "equals", 1)],
            err_limit,
            ..qry("b")
        })
    };

    // budget == error count: scan completes with warning
    let resp = run(&store, qry_with_limit(3));
    assert_eq!(resp.status, Status::Warning);
    assert_eq!(resp.errs.len(), 3);
    assert!(resp.errs.iter().all(|e| e.code == ErrCode::FldType));

    // budget == count - 1: fail with exactly count errors collected
    let resp = run(&store, qry_with_limit(2));
    assert_eq!(resp.status, Status::Fail);
    assert_eq!(resp.errs.len(), 3);

    // -1 selects the server-wide maximum
    let cfg = RuntimeConfig { max_errs: 3 };
    let resp = run_with(&store, &cfg, qry_with_limit(-1));
    assert_eq!(resp.status, Status::Warning);
    let cfg = RuntimeConfig { max_errs: 2 };
    let resp = run_with(&store, &cfg, qry_with_limit(-1));
    assert_eq!(resp.status, Status::Fail);
}

#[test]
fn parse_rec_soft_error_keeps_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    seed_locations(&store);

    // sneak a non-JSON value in through an index-free bucket write
    store
        .update(|tx| -> Result<(), cask_engine::Error> {
            let mut b = tx.bucket("location", true)?.unwrap();
            b.put(b"101a", b"not json at all")?;
            Ok(())
        })
        .unwrap();

    let resp = run(
        &store,
        Request::Qry(QryRequest {
            err_limit: 5,
            ..qry("location")
        }),
    );
    assert_eq!(resp.status, Status::Warning);
    assert_eq!(resp.errs.len(), 1);
    assert_eq!(resp.errs[0].code, ErrCode::ParseRec);
    assert_eq!(resp.errs[0].key, "101a");
    assert_eq!(resp.recs.len(), 6);
}
