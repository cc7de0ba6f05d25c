//! Module container metadata: header, compact expansion, stub tables, and debug records.

pub mod debug;
pub mod expand;
pub mod header;
pub mod module;
pub mod stubs;
