//! NTAG21x memory layout and per-model constants.

/// Bytes per block (page).
pub const BLOCK_SIZE: usize = 4;
/// First block of user memory. Blocks 0-2 hold the UID and lock bytes.
pub const INIT_BLOCK: u16 = 4;
/// Capability container block.
pub const CC_BLOCK: u16 = 3;
/// Offset of the memory size byte inside the capability container.
pub const CC_SIZE_OFFSET: usize = 2;
/// Length of the READ_SIG originality signature.
pub const SIGNATURE_LEN: usize = 32;

pub type Block = [u8; BLOCK_SIZE];

/// Usable user blocks declared by a capability container size byte.
///
/// The byte counts 8-byte units.
pub fn blocks_from_cc(size_byte: u8) -> u16 {
    let size_bytes = u16::from(size_byte) * 8;
    size_bytes / BLOCK_SIZE as u16
}

pub trait NtagModel {
    const NAME: &'static str;
    /// Total pages, including the configuration pages past user memory.
    const PAGES: u16;
    const CAPABILITY_CONTAINER: Block;
    const VERSION: [u8; 8];
}

pub struct Ntag213;
pub struct Ntag215;
pub struct Ntag216;

impl NtagModel for Ntag213 {
    const NAME: &'static str = "NTAG213";
    const PAGES: u16 = 45;
    const CAPABILITY_CONTAINER: Block = [0xE1, 0x10, 0x12, 0x00];
    const VERSION: [u8; 8] = [0x00, 0x04, 0x04, 0x02, 0x01, 0x00, 0x0F, 0x03];
}

impl NtagModel for Ntag215 {
    const NAME: &'static str = "NTAG215";
    const PAGES: u16 = 135;
    const CAPABILITY_CONTAINER: Block = [0xE1, 0x10, 0x3E, 0x00];
    const VERSION: [u8; 8] = [0x00, 0x04, 0x04, 0x02, 0x01, 0x00, 0x11, 0x03];
}

impl NtagModel for Ntag216 {
    const NAME: &'static str = "NTAG216";
    const PAGES: u16 = 231;
    const CAPABILITY_CONTAINER: Block = [0xE1, 0x10, 0x6D, 0x00];
    const VERSION: [u8; 8] = [0x00, 0x04, 0x04, 0x02, 0x01, 0x00, 0x13, 0x03];
}
