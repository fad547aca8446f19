//! WAL test suite
//!
//! One test binary for the write-ahead log, split by component.

mod entry_tests;
mod reader_tests;
mod recovery_tests;
mod writer_tests;
