//! The tag-communication primitive the session is layered on.
//!
//! Implementations own the radio side: field control, anti-collision,
//! ISO14443 framing and the reader chip's command set. A session only ever
//! talks to the tag through this trait.

use std::fmt;

use crate::{
    error::ReaderError,
    ntag::{Block, SIGNATURE_LEN},
    version::TagVersion,
};

/// Tag UID as reported by anti-collision.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Uid(pub Vec<u8>);

impl Uid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Uid, hex::FromHexError> {
        hex::decode(s).map(Uid)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

/// Activation data of the selected tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub uid: Uid,
    pub atqa: u16,
    pub sak: u8,
}

pub trait Reader {
    /// Activate a tag in the field and return its UID.
    fn select(&mut self) -> Result<Uid, ReaderError>;

    fn get_version(&mut self) -> Result<TagVersion, ReaderError>;

    fn read_block(&mut self, block: u16) -> Result<Block, ReaderError>;

    fn write_block(&mut self, block: u16, data: &Block) -> Result<(), ReaderError>;

    fn clear_block(&mut self, block: u16) -> Result<(), ReaderError> {
        self.write_block(block, &[0; 4])
    }

    fn identity(&mut self) -> Result<Identity, ReaderError> {
        Err(ReaderError::Read("identity not supported by this reader".into()))
    }

    /// READ_SIG: the manufacturer's originality signature.
    fn read_signature(&mut self) -> Result<[u8; SIGNATURE_LEN], ReaderError> {
        Err(ReaderError::Read("signature not supported by this reader".into()))
    }
}

impl<R: Reader + ?Sized> Reader for &mut R {
    fn select(&mut self) -> Result<Uid, ReaderError> {
        (**self).select()
    }

    fn get_version(&mut self) -> Result<TagVersion, ReaderError> {
        (**self).get_version()
    }

    fn read_block(&mut self, block: u16) -> Result<Block, ReaderError> {
        (**self).read_block(block)
    }

    fn write_block(&mut self, block: u16, data: &Block) -> Result<(), ReaderError> {
        (**self).write_block(block, data)
    }

    fn clear_block(&mut self, block: u16) -> Result<(), ReaderError> {
        (**self).clear_block(block)
    }

    fn identity(&mut self) -> Result<Identity, ReaderError> {
        (**self).identity()
    }

    fn read_signature(&mut self) -> Result<[u8; SIGNATURE_LEN], ReaderError> {
        (**self).read_signature()
    }
}
