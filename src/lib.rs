// Library module for filehasher
// Re-exports modules for use in integration tests and external crates

pub mod export;
pub mod hash;
