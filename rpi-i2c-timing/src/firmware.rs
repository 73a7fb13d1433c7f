//! Platform address and board model queries via the device tree.
//!
//! The ARM physical address of the peripheral window is board specific:
//! the bus window `0x7E00_0000` maps to `0x2000_0000` on the original
//! Pi, `0x3F00_0000` on the Pi 2/3 and `0xFE00_0000` on the Pi 4, so
//! the base has to be resolved at runtime. The firmware publishes the
//! mapping through the `ranges` property of the `soc` node, the same
//! source `bcm_host_get_peripheral_address()` uses.
use std::fs;
use std::io;

use bcm2711::revision::BoardRevision;
use log::warn;

use crate::Error;

pub const SOC_RANGES: &str = "/proc/device-tree/soc/ranges";
pub const VC_MEM_REG: &str = "/proc/device-tree/axi/vc_mem/reg";
pub const LINUX_REVISION: &str = "/proc/device-tree/system/linux,revision";

/// Board facts resolved once at startup.
///
/// Only `peripheral_base` is load bearing; the rest is informational
/// and degrades to `None` when the respective node is missing.
pub struct PlatformInfo {
    /// ARM physical base address of the peripheral window.
    pub peripheral_base: u32,
    /// Size of the peripheral window in bytes.
    pub peripheral_size: u32,
    /// Base of the VideoCore SDRAM window, if published.
    pub sdram_base: Option<u32>,
    /// Decoded board revision word, if published.
    pub revision: Option<BoardRevision>,
}

/// One big-endian cell of a device tree property blob.
fn be_cell(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset + 4)?;
    Some(u32::from_be_bytes(bytes.try_into().unwrap()))
}

/// Decode the peripheral window base and size from a `soc` node
/// `ranges` property.
///
/// The property is `<child-bus-address parent-address size>`. On boards
/// where the parent address is a single cell it sits at byte offset 4
/// with the size at offset 8. Newer device trees use a two-cell parent
/// address whose high cell (offset 4) is zero; the base then sits at
/// offset 8 and the size at offset 12.
pub fn ranges_window(buf: &[u8]) -> Option<(u32, u32)> {
    let base = be_cell(buf, 4)?;
    if base != 0 {
        Some((base, be_cell(buf, 8)?))
    } else {
        Some((be_cell(buf, 8)?, be_cell(buf, 12)?))
    }
}

/// Query the device tree for the peripheral window and board identity.
///
/// A missing or truncated `soc/ranges` node is fatal: without the
/// peripheral base no register window can be located, let alone mapped.
pub fn query() -> Result<PlatformInfo, Error> {
    let ranges = fs::read(SOC_RANGES).map_err(|source| Error::DeviceTree {
        path: SOC_RANGES,
        source,
    })?;
    let (peripheral_base, peripheral_size) =
        ranges_window(&ranges).ok_or_else(|| Error::DeviceTree {
            path: SOC_RANGES,
            source: io::Error::new(io::ErrorKind::InvalidData, "truncated ranges property"),
        })?;

    let sdram_base = match fs::read(VC_MEM_REG) {
        Ok(reg) => be_cell(&reg, 8),
        Err(e) => {
            warn!("could not read {VC_MEM_REG}: {e}");
            None
        }
    };
    let revision = match fs::read(LINUX_REVISION) {
        Ok(rev) => be_cell(&rev, 0).map(BoardRevision::new_with_raw_value),
        Err(e) => {
            warn!("could not read {LINUX_REVISION}: {e}");
            None
        }
    };

    Ok(PlatformInfo {
        peripheral_base,
        peripheral_size,
        sdram_base,
        revision,
    })
}
