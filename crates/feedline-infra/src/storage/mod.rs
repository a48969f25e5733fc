//! Image storage implementations.

mod fs;

pub use fs::FsImageStore;
