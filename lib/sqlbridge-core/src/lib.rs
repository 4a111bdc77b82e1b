//!
//! sqlbridge core
//!
//! Safe Rust model of the values, allocators and statuses that cross the
//! boundary between an embedded SQL engine and foreign callers:
//!
//! - `status` / `error`: fixed status codes and the error taxonomy that
//!   maps onto them
//! - `value`: the closed `Value` sum and its typed extractors
//! - `array`, `sequence`, `blob`, `record`: composite and streaming values
//! - `store`: allocators and generational value handles
//! - `value_ref`: owned (allocator, value) pairs
//! - `engine` / `bridge`: the engine seam and statement/query execution
//! - `config`: TOML settings
//!

pub mod array;
pub mod blob;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod numeric;
pub mod record;
pub mod sequence;
pub mod status;
pub mod store;
pub mod types;
pub mod value;
pub mod value_ref;

pub use array::{Array, PlainBody};
pub use blob::{Blob, BlobSource};
pub use config::{Config, ConfigError, parse_config, parse_config_str};
pub use engine::{Engine, TransactionMode};
pub use error::{Result, SqlError};
pub use numeric::Numeric;
pub use record::{Column, Record};
pub use sequence::{SeqState, Sequence, SequenceSource};
pub use status::Status;
pub use store::{AllocatorId, AllocatorKind, Store, ValueHandle};
pub use types::Type;
pub use value::Value;
pub use value_ref::ValueRef;
