//! Adapter implementations of the outbound ports (spec §6). The core itself
//! never depends on this module; only `main.rs`/`cli.rs` wire it in.

pub mod json_file;

pub use json_file::JsonFileRepository;
