//! Board revision word decoding.
//!
//! The firmware exposes a packed revision code (new-style scheme,
//! 2012 onwards) through `/proc/device-tree/system/linux,revision` and
//! the mailbox property interface. It identifies the board model and
//! the SoC it carries.
use arbitrary_int::{u3, u4};

#[bitbybit::bitfield(u32)]
pub struct BoardRevision {
    /// Set for new-style revision codes. Old-style codes (pre-2012
    /// boards) encode everything in the low bits and are not decoded
    /// here.
    #[bit(23, r)]
    new_style: bool,
    /// 0 = 256 MB, each step doubles.
    #[bits(20..=22, r)]
    memory_size: u3,
    #[bits(16..=19, r)]
    manufacturer: u4,
    /// 0 = BCM2835, 1 = BCM2836, 2 = BCM2837, 3 = BCM2711, 4 = BCM2712.
    #[bits(12..=15, r)]
    processor: u4,
    /// Board model, e.g. 0x11 for the Raspberry Pi 4B.
    #[bits(4..=11, r)]
    model_type: u8,
    #[bits(0..=3, r)]
    revision: u4,
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn decodes_pi_4b_revision() {
        // Raspberry Pi 4B, 4 GB, revision 1.5.
        let rev = BoardRevision::new_with_raw_value(0x00C0_3115);
        assert!(rev.new_style());
        assert_eq!(rev.memory_size().value(), 4);
        assert_eq!(rev.manufacturer().value(), 0);
        assert_eq!(rev.processor().value(), 3);
        assert_eq!(rev.model_type(), 0x11);
        assert_eq!(rev.revision().value(), 5);
    }
}
