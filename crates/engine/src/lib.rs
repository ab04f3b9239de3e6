//! Storage substrate for cask, wrapping redb.
//!
//! The substrate supplies named buckets over a single database file, ordered
//! byte-key cursors, and a single-writer / multi-reader transaction model
//! with full rollback when an update closure fails. Everything above this
//! crate treats storage through that narrow surface; redb types do not leak.
//!
//! Values are copied out of the memory-mapped pages at the bucket boundary,
//! so callers never hold references into transaction-scoped memory.

mod bucket;
mod error;
mod read_loop;
mod store;
mod tx;

pub use bucket::{Cursor, ReadBucket, WriteBucket};
pub use error::Error;
pub use read_loop::{ReadLoop, Step};
pub use store::Store;
pub use tx::{ReadTx, WriteTx};
