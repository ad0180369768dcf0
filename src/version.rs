use binrw::{BinRead, BinWrite};
use std::io::Cursor;

use crate::error::ReaderError;

/// Length of a GET_VERSION response.
pub const VERSION_LEN: usize = 8;

/// Product type reported by every NTAG21x.
pub const NTAG_TAG_TYPE: u8 = 0x04;

/// Decoded GET_VERSION response.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagVersion {
    pub header: u8, // fixed 0x00
    pub vendor: u8, // 0x04 = NXP
    pub tag_type: u8,
    pub tag_subtype: u8,
    pub version_major: u8,
    pub version_minor: u8,
    pub tag_size: u8, // storage size field
    pub protocol: u8,
}

impl TagVersion {
    pub fn from_bytes(data: &[u8]) -> Result<TagVersion, ReaderError> {
        if data.len() < VERSION_LEN {
            return Err(ReaderError::Read(format!(
                "version response should be {VERSION_LEN} bytes, was {}",
                data.len()
            )));
        }
        let mut cursor = Cursor::new(&data[..VERSION_LEN]);
        TagVersion::read(&mut cursor).map_err(|e| ReaderError::Read(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; VERSION_LEN] {
        let mut out = [0u8; VERSION_LEN];
        // eight u8 fields into an eight byte buffer
        self.write_to(&mut Cursor::new(&mut out[..])).unwrap();
        out
    }

    pub fn is_ntag(&self) -> bool {
        self.tag_type == NTAG_TAG_TYPE
    }

    /// Declared memory range `(min, max)` in bytes, from the storage size field.
    ///
    /// The upper seven bits give `n` with size `2^n`. The range widens to
    /// `(2^n, 2^(n+1))` only when `tag_size >> 3 == 1`, which is what the
    /// readers in the field check; NTAG216 therefore reports exactly 512.
    pub fn declared_size(&self) -> (u32, u32) {
        let n = u32::from(self.tag_size >> 1);
        let low = 2u32.saturating_pow(n);
        if self.tag_size >> 3 == 1 {
            (low, 2u32.saturating_pow(n + 1))
        } else {
            (low, low)
        }
    }

    pub fn model_name(&self) -> Option<&'static str> {
        if !self.is_ntag() {
            return None;
        }
        match self.tag_size {
            0x0F => Some("NTAG213"),
            0x11 => Some("NTAG215"),
            0x13 => Some("NTAG216"),
            _ => None,
        }
    }
}

impl From<[u8; VERSION_LEN]> for TagVersion {
    fn from(b: [u8; VERSION_LEN]) -> Self {
        TagVersion::read(&mut Cursor::new(b)).unwrap()
    }
}
