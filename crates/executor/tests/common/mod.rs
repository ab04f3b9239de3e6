//! Shared fixtures for handler tests: an on-disk store seeded with the
//! location data set, plus helpers to run requests and read results.
#![allow(dead_code)]

use serde_json::{json, Value};

use cask_core::Response;
use cask_engine::Store;
use cask_executor::{dispatch, PutIndexRequest, PutRequest, Request, RuntimeConfig};

pub fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(dir.path().join("test.cask")).unwrap()
}

pub fn run(store: &Store, req: Request) -> Response {
    dispatch::execute(store, &RuntimeConfig::default(), &req).unwrap()
}

pub fn run_with(store: &Store, cfg: &RuntimeConfig, req: Request) -> Response {
    dispatch::execute(store, cfg, &req).unwrap()
}

pub fn raw(v: Value) -> Box<serde_json::value::RawValue> {
    serde_json::value::RawValue::from_string(v.to_string()).unwrap()
}

/// Keys of `recs`, read through the named field of each record.
pub fn rec_fields(resp: &Response, fld: &str) -> Vec<String> {
    resp.recs
        .iter()
        .map(|r| {
            let v: Value = serde_json::from_str(r.get()).unwrap();
            v[fld].as_str().unwrap().to_string()
        })
        .collect()
}

pub fn location_recs() -> Vec<Value> {
    vec![
        json!({"id": "100", "zip": "11111", "st": "CA", "city": "Los Angeles", "address": "1 Main St", "locationType": 1}),
        json!({"id": "101", "zip": "33309", "st": "FL", "city": "Fort Lauderdale", "address": "2 Oak Ave", "locationType": 2}),
        json!({"id": "102", "zip": "54301", "st": "TN", "city": "Chattanooga", "address": "77 Elm Ave", "locationType": 2}),
        json!({"id": "103", "zip": "54902", "st": "TN", "city": "Memphis", "address": "99 Pine Rd", "locationType": 2}),
        json!({"id": "104", "zip": "54633", "st": "TX", "city": "Dallas", "address": "5 Cedar Ave", "locationType": 3}),
        json!({"id": "999", "zip": "77777", "st": "WA", "city": "Seattle", "address": "8 Birch Ave", "locationType": 3}),
    ]
}

/// Seed the `location` bucket and its zip index (`<zip>|<id>` keys).
pub fn seed_locations(store: &Store) {
    let recs = location_recs();
    let resp = run(
        store,
        Request::Put(PutRequest {
            bkt_name: "location".into(),
            key_field: "id".into(),
            recs: recs.iter().cloned().map(raw).collect(),
            required_flds: vec![],
        }),
    );
    assert_eq!(resp.status, cask_core::Status::Ok, "{}", resp.msg);

    let indexes = recs
        .iter()
        .map(|r| cask_core::IndexKeyVal {
            key: format!("{}|{}", r["zip"].as_str().unwrap(), r["id"].as_str().unwrap()),
            val: r["id"].as_str().unwrap().to_string(),
            old_key: String::new(),
        })
        .collect();
    let resp = run(
        store,
        Request::PutIndex(PutIndexRequest {
            bkt_name: "location_zip_index".into(),
            indexes,
        }),
    );
    assert_eq!(resp.status, cask_core::Status::Ok, "{}", resp.msg);
}
