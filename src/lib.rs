//! In-memory key/value server speaking a newline-delimited text protocol.
//!
//! Five value kinds live behind each key: scalar strings with a latent
//! numeric encoding, lists, hashes, sets, and sorted sets backed by a
//! rank-aware skip list. One reactor owns the keyspace; commands are
//! serialized and never suspend mid-operation.

pub mod cli;
pub mod client;
pub mod commands;
pub mod protocol;
pub mod scalar;
pub mod server;
pub mod skiplist;
pub mod store;
pub mod value;
pub mod zset;

pub use scalar::{Encoding, Scalar};
pub use skiplist::SkipList;
pub use store::{Keyspace, SharedKeyspace};
pub use value::Value;
pub use zset::SortedSet;
