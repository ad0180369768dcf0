//! A tag that lives in memory.
//!
//! [`MemoryTag`] implements [`Reader`] over a byte image of the whole tag, so
//! a session can run against a blank model image or a raw dump (for example
//! a 540-byte NTAG215 dump) without any hardware attached.

use crate::{
    error::ReaderError,
    ntag::{Block, NtagModel, BLOCK_SIZE, CC_BLOCK, SIGNATURE_LEN},
    reader::{Identity, Reader, Uid},
    version::TagVersion,
};

// ATQA/SAK every NTAG21x answers with.
const NTAG_ATQA: u16 = 0x0044;
const NTAG_SAK: u8 = 0x00;
const CASCADE_TAG: u8 = 0x88;

#[derive(Clone, Debug)]
pub struct MemoryTag {
    data: Vec<u8>,
    version: TagVersion,
    signature: Option<[u8; SIGNATURE_LEN]>,
    present: bool,
    writes: usize,
}

impl MemoryTag {
    /// Factory-fresh image of model `M` with the given 7-byte UID.
    pub fn blank<M: NtagModel>(uid: [u8; 7]) -> MemoryTag {
        let mut data = vec![0u8; usize::from(M::PAGES) * BLOCK_SIZE];

        // block 0: uid0..2 + BCC0, block 1: uid3..6, block 2: BCC1 + internal + lock
        data[0..3].copy_from_slice(&uid[0..3]);
        data[3] = CASCADE_TAG ^ uid[0] ^ uid[1] ^ uid[2];
        data[4..8].copy_from_slice(&uid[3..7]);
        data[8] = uid[3] ^ uid[4] ^ uid[5] ^ uid[6];
        data[9] = 0x48;

        let cc = usize::from(CC_BLOCK) * BLOCK_SIZE;
        data[cc..cc + BLOCK_SIZE].copy_from_slice(&M::CAPABILITY_CONTAINER);

        MemoryTag {
            data,
            version: TagVersion::from(M::VERSION),
            signature: None,
            present: true,
            writes: 0,
        }
    }

    /// Image from a raw page dump.
    pub fn from_dump(dump: Vec<u8>, version: TagVersion) -> Result<MemoryTag, ReaderError> {
        let size = dump.len();
        if size < 4 * BLOCK_SIZE || size % BLOCK_SIZE != 0 {
            return Err(ReaderError::Read(format!(
                "dump should be a whole number of {BLOCK_SIZE}-byte pages covering the capability container, was {size} bytes"
            )));
        }

        Ok(MemoryTag {
            data: dump,
            version,
            signature: None,
            present: true,
            writes: 0,
        })
    }

    pub fn with_signature(mut self, signature: [u8; SIGNATURE_LEN]) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn set_version(&mut self, version: TagVersion) {
        self.version = version;
    }

    /// Take the tag out of (or put it back into) the field.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn uid(&self) -> Uid {
        let mut uid = self.data[0..3].to_vec();
        uid.extend_from_slice(&self.data[4..8]);
        Uid(uid)
    }

    pub fn pages(&self) -> usize {
        self.data.len() / BLOCK_SIZE
    }

    pub fn dump(&self) -> &[u8] {
        &self.data
    }

    pub fn into_dump(self) -> Vec<u8> {
        self.data
    }

    /// Block writes and clears issued so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn range(&self, block: u16) -> Option<std::ops::Range<usize>> {
        let start = usize::from(block) * BLOCK_SIZE;
        let end = start + BLOCK_SIZE;
        (end <= self.data.len()).then_some(start..end)
    }

    fn check_present(&self, err: fn(String) -> ReaderError) -> Result<(), ReaderError> {
        if self.present {
            Ok(())
        } else {
            Err(err("no tag present".into()))
        }
    }
}

impl Reader for MemoryTag {
    fn select(&mut self) -> Result<Uid, ReaderError> {
        self.check_present(ReaderError::Select)?;
        Ok(self.uid())
    }

    fn get_version(&mut self) -> Result<TagVersion, ReaderError> {
        self.check_present(ReaderError::Read)?;
        Ok(self.version)
    }

    fn read_block(&mut self, block: u16) -> Result<Block, ReaderError> {
        self.check_present(ReaderError::Read)?;
        let range = self
            .range(block)
            .ok_or_else(|| ReaderError::Read(format!("bad block index {block}")))?;
        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&self.data[range]);
        Ok(out)
    }

    fn write_block(&mut self, block: u16, data: &Block) -> Result<(), ReaderError> {
        self.check_present(ReaderError::Write)?;
        let range = self
            .range(block)
            .ok_or_else(|| ReaderError::Write(format!("bad block index {block}")))?;
        self.data[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn identity(&mut self) -> Result<Identity, ReaderError> {
        self.check_present(ReaderError::Read)?;
        Ok(Identity {
            uid: self.uid(),
            atqa: NTAG_ATQA,
            sak: NTAG_SAK,
        })
    }

    fn read_signature(&mut self) -> Result<[u8; SIGNATURE_LEN], ReaderError> {
        self.check_present(ReaderError::Read)?;
        self.signature
            .ok_or_else(|| ReaderError::Read("tag returned no signature".into()))
    }
}
