//! Filesystem abstraction for the call-profile oracle.
//!
//! This crate provides:
//! - Filesystem trait for whole-file reads, writes and output relocation
//! - RealFilesystem backed by `std::fs`
//! - MockFilesystem for tests

pub mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};
