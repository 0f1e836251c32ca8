pub mod entry;

pub use entry::{Registry, SqliteRegistry};
