//! Request execution for cask.
//!
//! Every operation the server accepts is a variant of [`Request`]; the
//! server shell demarshals the body into the matching variant and hands it
//! to [`dispatch::execute`], which acquires a read or write transaction and
//! runs the handler. Handlers are thin compositions over the engine's
//! ReadLoop and the query pipeline in [`query`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod index;
pub mod query;
pub mod request;

pub use config::RuntimeConfig;
pub use error::Error;
pub use request::{
    BktRequest, CopyDbRequest, DeleteRequest, ExportRequest, GetAllKeysRequest, GetAllRequest,
    GetOneRequest, GetRequest, GetValuesRequest, PutBktsRequest, PutIndexRequest, PutOneRequest,
    PutRequest, QryRequest, Request, SearchKeysRequest,
};
