//! Adapters behind the Beauty Rating ports: SQLite persistence, filesystem
//! object storage, analysts and the system clock.

pub mod analyst;
pub mod db;
pub mod storage;
pub mod time;

pub use time::SystemClock;
