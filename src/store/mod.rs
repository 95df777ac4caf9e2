//! Storage backends. Each one implements every seam the ledger, workflow,
//! catalog and directory consume.

pub mod memory;
pub mod mysql;
