//! Data access: the SQLite loader, the TTL cache, and the demo seeder.
//!
//! - `store`: read-only `SELECT * FROM sales` into a `SalesDataset`
//! - `cache`: explicit `{data, fetched_at, ttl}` holder with `get_or_refresh`
//! - `seed`: synthetic sales rows so the dashboard is demoable out of the box

pub mod cache;
pub mod seed;
pub mod store;

pub use cache::*;
pub use seed::*;
pub use store::*;
