//! Routing and the request/response cycle.
//!
//! One POST route per operation; the body is demarshaled into the matching
//! request type and executed on the blocking pool (the store is
//! synchronous). Status mapping follows the three error tiers: transport
//! problems are 4xx and never open a transaction; data-level outcomes,
//! including rolled-back bad input, are 200 envelopes; transaction-level
//! failures are 500.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::post;
use axum::Router;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use cask_executor::{dispatch, Request};

use crate::compress::{accepts_gzip, gzip};
use crate::state::{AppState, RunState};

/// Seconds between flipping to `Down` and closing the listener, letting
/// in-flight responses flush.
const SHUTDOWN_GRACE_SECS: u64 = 2;

pub fn router(state: AppState) -> Router {
    Router::new()
        // get requests
        .route("/get", post(get_route))
        .route("/getone", post(get_one_route))
        .route("/getall", post(get_all_route))
        .route("/getallkeys", post(get_all_keys_route))
        // put requests
        .route("/put", post(put_route))
        .route("/putone", post(put_one_route))
        .route("/putbkts", post(put_bkts_route))
        .route("/putindex", post(put_index_route))
        // qry requests
        .route("/qry", post(qry_route))
        // other requests
        .route("/delete", post(delete_route))
        .route("/bkt", post(bkt_route))
        .route("/export", post(export_route))
        .route("/copydb", post(copy_db_route))
        // experimental requests
        .route("/getvalues", post(get_values_route))
        .route("/searchkeys", post(search_keys_route))
        // server controls
        .route("/traceon", post(trace_on))
        .route("/traceoff", post(trace_off))
        .route("/down", post(down))
        .fallback(unknown_route)
        .with_state(state)
}

macro_rules! route_fn {
    ($name:ident, $req:ty, $variant:expr) => {
        async fn $name(
            State(state): State<AppState>,
            headers: HeaderMap,
            body: Bytes,
        ) -> HttpResponse {
            run_request::<$req>(state, headers, body, $variant).await
        }
    };
}

route_fn!(get_route, cask_executor::GetRequest, Request::Get);
route_fn!(get_one_route, cask_executor::GetOneRequest, Request::GetOne);
route_fn!(get_all_route, cask_executor::GetAllRequest, Request::GetAll);
route_fn!(get_all_keys_route, cask_executor::GetAllKeysRequest, Request::GetAllKeys);
route_fn!(put_route, cask_executor::PutRequest, Request::Put);
route_fn!(put_one_route, cask_executor::PutOneRequest, Request::PutOne);
route_fn!(put_bkts_route, cask_executor::PutBktsRequest, Request::PutBkts);
route_fn!(put_index_route, cask_executor::PutIndexRequest, Request::PutIndex);
route_fn!(qry_route, cask_executor::QryRequest, Request::Qry);
route_fn!(delete_route, cask_executor::DeleteRequest, Request::Delete);
route_fn!(bkt_route, cask_executor::BktRequest, Request::Bkt);
route_fn!(export_route, cask_executor::ExportRequest, Request::Export);
route_fn!(copy_db_route, cask_executor::CopyDbRequest, Request::CopyDb);
route_fn!(get_values_route, cask_executor::GetValuesRequest, Request::GetValues);
route_fn!(search_keys_route, cask_executor::SearchKeysRequest, Request::SearchKeys);

async fn run_request<T>(
    state: AppState,
    headers: HeaderMap,
    body: Bytes,
    wrap: fn(T) -> Request,
) -> HttpResponse
where
    T: DeserializeOwned + Send + 'static,
{
    if state.status.get() != RunState::Running {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "server not accepting requests",
        )
            .into_response();
    }

    let req = match serde_json::from_slice::<T>(&body) {
        Ok(r) => wrap(r),
        Err(e) => {
            warn!(target: "cask::server", error = %e, "request body unmarshal failed");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let store = state.store.clone();
    let cfg = state.cfg.clone();
    let result = tokio::task::spawn_blocking(move || dispatch::execute(&store, &cfg, &req)).await;

    let response = match result {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
        Err(e) => {
            warn!(target: "cask::server", error = %e, "request task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "request task failed").into_response();
        }
    };

    let json = match serde_json::to_vec(&response) {
        Ok(j) => j,
        Err(e) => {
            warn!(target: "cask::server", error = %e, "response marshal failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "response marshal failed").into_response();
        }
    };

    if state.compress_response && accepts_gzip(&headers) {
        match gzip(&json) {
            Ok(packed) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::CONTENT_ENCODING, "gzip"),
                ],
                packed,
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response()
    }
}

async fn trace_on() -> StatusCode {
    cask_core::trace::set_enabled(true);
    info!(target: "cask::server", "tracing turned on");
    StatusCode::OK
}

async fn trace_off() -> StatusCode {
    cask_core::trace::set_enabled(false);
    info!(target: "cask::server", "tracing turned off");
    StatusCode::OK
}

/// Begin shutdown: reject new requests immediately, give in-flight
/// responses a moment to flush, then stop the listener. The store closes
/// when the last state handle drops.
async fn down(State(state): State<AppState>) -> StatusCode {
    info!(target: "cask::server", "shutdown requested");
    state.status.set(RunState::Down);
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
        let _ = state.shutdown.send(true);
    });
    StatusCode::OK
}

async fn unknown_route(uri: axum::http::Uri) -> HttpResponse {
    warn!(target: "cask::server", %uri, "invalid request url");
    (StatusCode::NOT_FOUND, "invalid request url").into_response()
}
