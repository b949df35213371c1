//! Core types for the helmsman trade journal.
//!
//! This crate holds everything that does not perform I/O: the journal entity
//! model, the cache port trait, the storage traits used by the generic
//! repository, the filter/pagination query builder and the application error
//! code table.

pub mod cache;
pub mod ecode;
pub mod journal;
pub mod query;
pub mod storage;
