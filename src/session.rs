//! Text storage on a selected NTAG21x.
//!
//! A session selects a tag once, learns the size of its user area from the
//! capability container and then reads and writes sentinel-terminated
//! strings in 4-byte blocks starting at [`INIT_BLOCK`].

use log::{debug, warn};

use crate::{
    error::{NtagError, Result},
    ntag::{blocks_from_cc, BLOCK_SIZE, CC_BLOCK, CC_SIZE_OFFSET, INIT_BLOCK, SIGNATURE_LEN},
    reader::{Identity, Reader, Uid},
    version::TagVersion,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NtagConfig {
    /// Byte marking the end of a stored string.
    pub end_char: u8,
}

impl Default for NtagConfig {
    fn default() -> Self {
        NtagConfig { end_char: b'\0' }
    }
}

/// Byte sizes learned during `select`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteSizes {
    /// User memory declared by the capability container.
    pub usable: u32,
    /// Range declared by the GET_VERSION storage size field.
    pub declared_min: u32,
    pub declared_max: u32,
}

pub struct Ntag<R> {
    reader: R,
    end: u8,
    blocks: u16,
    bytes: Option<ByteSizes>,
    uid: Option<Uid>,
    version: Option<TagVersion>,
}

impl<R: Reader> Ntag<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, NtagConfig::default())
    }

    pub fn with_end_char(reader: R, end_char: u8) -> Self {
        Self::with_config(reader, NtagConfig { end_char })
    }

    pub fn with_config(reader: R, config: NtagConfig) -> Self {
        Ntag {
            reader,
            end: config.end_char,
            blocks: 0,
            bytes: None,
            uid: None,
            version: None,
        }
    }

    /// Select an NTAG21x if one is present and return its UID.
    ///
    /// On failure the session keeps whatever it learned from an earlier
    /// successful select.
    pub fn select(&mut self) -> Result<Uid> {
        let uid = self
            .reader
            .select()
            .map_err(|e| NtagError::Select(e.into_message()))?;

        let version = self.reader.get_version().map_err(|e| {
            warn!("version query failed for tag {uid}: {e}");
            NtagError::not_ntag()
        })?;
        if !version.is_ntag() {
            warn!("tag {uid} reports type {:#04x}, not an NTAG", version.tag_type);
            return Err(NtagError::not_ntag());
        }
        let (declared_min, declared_max) = version.declared_size();

        let cc = self.reader.read_block(CC_BLOCK).map_err(|e| {
            warn!("capability container unreadable on tag {uid}: {e}");
            NtagError::not_ntag()
        })?;
        let blocks = blocks_from_cc(cc[CC_SIZE_OFFSET]);
        let usable = u32::from(blocks) * BLOCK_SIZE as u32;

        debug!(
            "selected {} {uid}: {usable} usable bytes in {blocks} blocks, declared {declared_min}..{declared_max}",
            version.model_name().unwrap_or("NTAG21x")
        );
        if blocks == 0 {
            warn!("tag {uid} declares no user memory");
        }

        self.blocks = blocks;
        self.bytes = Some(ByteSizes {
            usable,
            declared_min,
            declared_max,
        });
        self.uid = Some(uid.clone());
        self.version = Some(version);

        Ok(uid)
    }

    pub fn is_selected(&self) -> bool {
        self.blocks > 0
    }

    /// Usable user memory in bytes.
    pub fn size(&self) -> Result<usize> {
        if !self.is_selected() {
            return Err(NtagError::not_selected());
        }
        Ok(usize::from(self.blocks) * BLOCK_SIZE)
    }

    /// One past the last user block.
    fn end_block(&self) -> u16 {
        INIT_BLOCK + self.blocks
    }

    pub(crate) fn check_block(&self, block: u16) -> Result<()> {
        if !self.is_selected() {
            return Err(NtagError::not_selected());
        }

        let end_block = self.end_block();
        if block < INIT_BLOCK || block >= end_block {
            return Err(NtagError::Write(format!(
                "invalid block number. {} < block < {}",
                INIT_BLOCK - 1,
                end_block
            )));
        }
        Ok(())
    }

    /// Read a terminated string starting at `block`.
    ///
    /// Reading stops at the first block holding the end byte or a NUL, which
    /// is what cleared memory holds. Every such byte in what was read is
    /// removed, not only the trailing ones.
    pub fn read(&mut self, block: u16) -> Result<String> {
        self.check_block(block)?;

        let end = self.end;
        let is_end = |b: &u8| *b == end || *b == b'\0';

        let mut read = Vec::new();
        for i in block..self.end_block() {
            let data = self.reader.read_block(i)?;
            read.extend_from_slice(&data);
            if data.iter().any(is_end) {
                break;
            }
        }

        read.retain(|b| !is_end(b));
        Ok(String::from_utf8(read)?)
    }

    /// Write `payload` starting at `block`, terminated with the end byte.
    ///
    /// Blocks are written as they are produced; when the payload runs past
    /// the user area the blocks already written stay on the tag.
    pub fn write(&mut self, block: u16, payload: &str) -> Result<()> {
        self.check_block(block)?;

        let mut payload = payload.as_bytes().to_vec();
        if payload.last() != Some(&self.end) {
            payload.push(self.end);
        }

        let end_block = self.end_block();
        for (b, chunk) in (block..).zip(payload.chunks(BLOCK_SIZE)) {
            if b >= end_block {
                warn!("write from block {block} overflowed at block {b}");
                return Err(NtagError::Overflow { block: b, end: end_block });
            }

            let mut data = [self.end; BLOCK_SIZE];
            data[..chunk.len()].copy_from_slice(chunk);

            debug!("write block {b}: {}", hex::encode(data));
            self.reader.write_block(b, &data)?;
        }
        Ok(())
    }

    /// Clear blocks `start_block..end_block`.
    ///
    /// Only `start_block` is validated; an `end_block` past the tag fails in
    /// the reader.
    pub fn clear(&mut self, start_block: u16, end_block: u16) -> Result<()> {
        self.check_block(start_block)?;

        debug!("clear blocks {start_block}..{end_block}");
        for i in start_block..end_block {
            self.reader.clear_block(i)?;
        }
        Ok(())
    }

    /// Clear the entire user area.
    pub fn clear_all(&mut self) -> Result<()> {
        self.clear(INIT_BLOCK, self.end_block())
    }

    pub fn blocks(&self) -> u16 {
        self.blocks
    }

    pub fn byte_sizes(&self) -> Option<ByteSizes> {
        self.bytes
    }

    pub fn uid(&self) -> Option<&Uid> {
        self.uid.as_ref()
    }

    pub fn version(&self) -> Option<&TagVersion> {
        self.version.as_ref()
    }

    pub fn end_char(&self) -> u8 {
        self.end
    }

    pub fn identity(&mut self) -> Result<Identity> {
        Ok(self.reader.identity()?)
    }

    /// Originality signature of the selected tag.
    pub fn signature(&mut self) -> Result<[u8; SIGNATURE_LEN]> {
        if !self.is_selected() {
            return Err(NtagError::not_selected());
        }
        Ok(self.reader.read_signature()?)
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryTag,
        ntag::{Ntag213, NtagModel},
    };

    const UID: [u8; 7] = [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

    /// Blank NTAG213 whose capability container declares `cc` units.
    fn tag_with_cc(cc: u8) -> MemoryTag {
        let mut tag = MemoryTag::blank::<Ntag213>(UID);
        let mut cc_block = Ntag213::CAPABILITY_CONTAINER;
        cc_block[CC_SIZE_OFFSET] = cc;
        tag.write_block(CC_BLOCK, &cc_block).unwrap();
        tag
    }

    fn selected(cc: u8) -> Ntag<MemoryTag> {
        let mut ntag = Ntag::new(tag_with_cc(cc));
        ntag.select().unwrap();
        ntag
    }

    #[test]
    fn size_follows_capability_container() {
        for c in [1u8, 2, 4, 0x12] {
            let ntag = selected(c);
            assert_eq!(ntag.blocks(), u16::from(c) * 2);
            assert_eq!(ntag.size().unwrap(), usize::from(c) * 8);
            assert_eq!(ntag.byte_sizes().unwrap().usable, u32::from(c) * 8);
        }
    }

    #[test]
    fn zero_capacity_stays_unselected() {
        let mut ntag = Ntag::new(tag_with_cc(0));
        ntag.select().unwrap();
        assert!(!ntag.is_selected());
        assert!(ntag.size().unwrap_err().is_not_selected());
    }

    #[test]
    fn check_block_bounds() {
        // 4 units -> 8 blocks -> user blocks 4..12
        let ntag = selected(4);
        assert!(ntag.check_block(4).is_ok());
        assert!(ntag.check_block(11).is_ok());

        for block in [0, 3, 12, 200] {
            let err = ntag.check_block(block).unwrap_err();
            assert!(matches!(err, NtagError::Write(_)));
            assert!(!err.is_not_selected());
        }
        assert_eq!(
            ntag.check_block(12).unwrap_err().to_string(),
            "invalid block number. 3 < block < 12"
        );
    }

    #[test]
    fn short_payload_is_padded() {
        let mut ntag = selected(4);
        ntag.write(4, "hi").unwrap();
        assert_eq!(ntag.reader_mut().read_block(4).unwrap(), *b"hi\0\0");
        assert_eq!(ntag.read(4).unwrap(), "hi");
    }

    #[test]
    fn exact_block_payload_gets_its_own_terminator_block() {
        let mut ntag = selected(4);
        ntag.write(4, "abcd").unwrap();
        assert_eq!(ntag.reader_mut().read_block(4).unwrap(), *b"abcd");
        assert_eq!(ntag.reader_mut().read_block(5).unwrap(), [0; 4]);
        assert_eq!(ntag.reader().write_count(), 2 + 1); // cc setup + 2
    }

    #[test]
    fn payload_already_terminated_is_not_extended() {
        let mut ntag = selected(4);
        ntag.write(4, "abc\0").unwrap();
        assert_eq!(ntag.reader().write_count(), 1 + 1);
        assert_eq!(ntag.read(4).unwrap(), "abc");
    }

    #[test]
    fn empty_payload_writes_terminator() {
        let mut ntag = selected(4);
        ntag.write(4, "xyz").unwrap();
        ntag.write(4, "").unwrap();
        assert_eq!(ntag.reader_mut().read_block(4).unwrap(), [0; 4]);
        assert_eq!(ntag.read(4).unwrap(), "");
    }

    #[test]
    fn overflow_keeps_earlier_blocks() {
        // 1 unit -> 2 blocks -> user blocks 4 and 5
        let mut ntag = selected(1);
        let err = ntag.write(4, "0123456789").unwrap_err();
        assert!(matches!(err, NtagError::Overflow { block: 6, end: 6 }));
        assert_eq!(ntag.reader_mut().read_block(4).unwrap(), *b"0123");
        assert_eq!(ntag.reader_mut().read_block(5).unwrap(), *b"4567");
        assert_eq!(ntag.reader_mut().read_block(6).unwrap(), [0; 4]);
    }

    #[test]
    fn payload_filling_area_exactly_fits() {
        let mut ntag = selected(1);
        ntag.write(4, "0123456").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "0123456");

        // the terminator would land on block 6
        assert!(matches!(
            ntag.write(4, "01234567"),
            Err(NtagError::Overflow { block: 6, .. })
        ));
    }

    #[test]
    fn read_stops_at_terminator() {
        let mut ntag = selected(4);
        ntag.write(4, "hello world").unwrap();
        ntag.reader_mut().write_block(8, b"tail").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "hello world");
        assert_eq!(ntag.read(8).unwrap(), "tail");
    }

    #[test]
    fn read_strips_embedded_terminators() {
        let mut ntag = selected(4);
        ntag.reader_mut().write_block(4, b"ab\0c").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "abc");
    }

    #[test]
    fn read_runs_to_end_of_area_without_terminator() {
        let mut ntag = selected(1);
        ntag.reader_mut().write_block(4, b"abcd").unwrap();
        ntag.reader_mut().write_block(5, b"efgh").unwrap();
        ntag.reader_mut().write_block(6, b"ijkl").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "abcdefgh");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let mut ntag = selected(1);
        ntag.reader_mut().write_block(4, &[0xFF, 0xFE, 0x00, 0x00]).unwrap();
        assert!(matches!(ntag.read(4), Err(NtagError::Encoding(_))));
    }

    #[test]
    fn multibyte_text_across_blocks() {
        let mut ntag = selected(4);
        ntag.write(4, "grüße, ünïcödé").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "grüße, ünïcödé");
    }

    #[test]
    fn custom_end_char() {
        let mut ntag = Ntag::with_end_char(tag_with_cc(4), b'$');
        ntag.select().unwrap();
        ntag.write(4, "hi").unwrap();
        assert_eq!(ntag.reader_mut().read_block(4).unwrap(), *b"hi$$");
        assert_eq!(ntag.read(4).unwrap(), "hi");
        assert_eq!(ntag.end_char(), b'$');
    }

    #[test]
    fn custom_end_char_reads_cleared_memory_as_empty() {
        let mut ntag = Ntag::with_end_char(MemoryTag::blank::<Ntag213>(UID), b'$');
        ntag.select().unwrap();
        assert_eq!(ntag.read(4).unwrap(), "");

        ntag.write(4, "hi").unwrap();
        ntag.clear_all().unwrap();
        assert_eq!(ntag.read(4).unwrap(), "");
    }

    #[test]
    fn custom_end_char_stops_at_nul() {
        let mut ntag = Ntag::with_end_char(tag_with_cc(4), b'$');
        ntag.select().unwrap();
        ntag.reader_mut().write_block(4, b"ab\0\0").unwrap();
        ntag.reader_mut().write_block(5, b"tail").unwrap();
        assert_eq!(ntag.read(4).unwrap(), "ab");
    }

    #[test]
    fn clear_range_and_all() {
        let mut ntag = selected(4);
        ntag.write(4, "0123456789ab").unwrap();
        ntag.clear(5, 6).unwrap();
        assert_eq!(ntag.reader_mut().read_block(5).unwrap(), [0; 4]);
        assert_eq!(ntag.read(4).unwrap(), "0123");

        ntag.clear_all().unwrap();
        assert_eq!(ntag.read(4).unwrap(), "");
        for b in 4..12 {
            assert_eq!(ntag.reader_mut().read_block(b).unwrap(), [0; 4]);
        }
    }

    #[test]
    fn clear_end_is_not_range_checked() {
        let mut ntag = selected(4);
        // user area ends at 12, image at 45
        ntag.clear(4, 20).unwrap();
        let err = ntag.clear(4, 300).unwrap_err();
        assert!(matches!(err, NtagError::Write(ref m) if m.contains("bad block index 45")));
    }

    #[test]
    fn signature_requires_selection() {
        let mut ntag = Ntag::new(MemoryTag::blank::<Ntag213>(UID).with_signature([7; 32]));
        assert!(ntag.signature().unwrap_err().is_not_selected());
        ntag.select().unwrap();
        assert_eq!(ntag.signature().unwrap(), [7; 32]);
        assert_eq!(ntag.identity().unwrap().sak, 0x00);
    }
}
