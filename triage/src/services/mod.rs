//! Service implementations
//!
//! Real implementations of the store contract. The in-process store is the
//! reference implementation; database-backed stores live with their own
//! deployments and only need to satisfy the `PatientStore` trait.

pub mod memory_store;

pub use memory_store::MemoryPatientStore;
