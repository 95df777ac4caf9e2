//! Leave request lifecycle: the pure state machine, the persistence seam and
//! the orchestrator that ties them to the balance ledger.

pub mod machine;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use service::LeaveWorkflow;
pub use store::RequestStore;
