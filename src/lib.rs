//! Read and write terminated text strings on NTAG21x NFC tags.
//!
//! The radio side is provided by a [`Reader`] implementation; [`Ntag`] turns
//! its block primitives into string reads and writes over the tag's user
//! memory.

pub mod error;
pub mod memory;
pub mod ntag;
pub mod reader;
pub mod session;
pub mod version;

pub use error::{NtagError, ReaderError, Result};
pub use memory::MemoryTag;
pub use ntag::{Ntag213, Ntag215, Ntag216, NtagModel, BLOCK_SIZE, INIT_BLOCK};
pub use reader::{Identity, Reader, Uid};
pub use session::{ByteSizes, Ntag, NtagConfig};
pub use version::TagVersion;
