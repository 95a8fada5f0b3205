/// Launch record and query types
pub mod launch;

/// Provider document model
pub mod raw;

/// Raw document to launch record transform
pub mod normalizer;

/// Sync bookkeeping types
pub mod sync;

/// Repository interfaces
pub mod repository;
