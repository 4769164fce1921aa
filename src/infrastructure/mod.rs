//! Infrastructure layer: adapters and implementations for every external
//! dependency the domain ports describe.

pub mod database;
pub mod http;
pub mod logging;
