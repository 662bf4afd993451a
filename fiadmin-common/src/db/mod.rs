//! Database schema, record models and queries

pub mod init;
pub mod models;
pub mod references;
pub mod relations;

pub use init::*;
pub use models::*;
pub use references::*;
pub use relations::*;
