pub mod schema;

pub use schema::{BatchConfig, Config};
