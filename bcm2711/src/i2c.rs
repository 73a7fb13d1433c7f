//! BSC (I2C) register module.
//!
//! Register layout is defined in the BCM2711 ARM Peripherals Manual,
//! section 3.2. The manual lists bus addresses (`0x7E80_4000` for BSC1);
//! the VideoCore MMU maps the `0x7E00_0000` bus window to an ARM physical
//! base that varies by board generation, so only the offset within the
//! peripheral window is a constant here.
use arbitrary_int::{u2, u7};

/// Offset of the BSC1 register block within the ARM peripheral window.
pub const I2C_1_PERIPHERAL_OFFSET: usize = 0x0080_4000;
/// Bus address of the BSC1 block as listed in the peripherals manual.
pub const I2C_1_BUS_ADDR: u32 = 0x7E80_4000;

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug)]
pub enum TransferDirection {
    Write = 0b0,
    Read = 0b1,
}

#[bitbybit::bitfield(u32, default = 0x0)]
pub struct Control {
    /// Enables the controller. While 0, register accesses are still
    /// possible but no transfers are performed.
    #[bit(15, rw)]
    i2c_enable: bool,
    /// Interrupt on RXR.
    #[bit(10, rw)]
    int_on_rx: bool,
    /// Interrupt on TXW.
    #[bit(9, rw)]
    int_on_tx: bool,
    /// Interrupt on DONE.
    #[bit(8, rw)]
    int_on_done: bool,
    /// One-shot start of a new transfer. Reads back as 0.
    #[bit(7, rw)]
    start_transfer: bool,
    /// Writing a non-zero value clears the FIFO. Reads back as 0.
    #[bits(4..=5, rw)]
    clear_fifo: u2,
    #[bit(0, rw)]
    read_transfer: TransferDirection,
}

#[bitbybit::bitfield(u32)]
pub struct Status {
    /// Slave held the clock stretched for longer than CLKT.TOUT allows.
    /// Cleared by writing 1.
    #[bit(9, rw)]
    clkt: bool,
    /// Slave did not acknowledge its address or a data byte. Cleared by
    /// writing 1.
    #[bit(8, rw)]
    err: bool,
    /// FIFO is full.
    #[bit(7, r)]
    rx_full: bool,
    /// FIFO can accept at least one byte.
    #[bit(6, r)]
    tx_empty: bool,
    /// FIFO contains at least one byte to be read.
    #[bit(5, r)]
    rx_has_data: bool,
    /// FIFO can accept data for transmission.
    #[bit(4, r)]
    tx_can_accept: bool,
    /// FIFO needs reading (three quarters full during a read transfer).
    #[bit(3, r)]
    rx_needs_reading: bool,
    /// FIFO needs writing (less than a quarter full during a write
    /// transfer).
    #[bit(2, r)]
    tx_needs_writing: bool,
    /// Transfer complete. Cleared by writing 1.
    #[bit(1, rw)]
    done: bool,
    /// Transfer active.
    #[bit(0, r)]
    transfer_active: bool,
}

#[bitbybit::bitfield(u32, default = 0x0)]
pub struct DataLength {
    #[bits(0..=15, rw)]
    dlen: u16,
}

#[bitbybit::bitfield(u32, default = 0x0)]
pub struct SlaveAddress {
    #[bits(0..=6, rw)]
    addr: u7,
}

#[bitbybit::bitfield(u32, default = 0x0)]
pub struct Fifo {
    #[bits(0..=7, rw)]
    data: u8,
}

/// Clock divider register. The SCL frequency is the core clock divided
/// by CDIV. The hardware always rounds CDIV down to an even value.
#[bitbybit::bitfield(u32, default = 0x0)]
pub struct ClockDivider {
    /// Bits 31..16 are reserved and read/write as zero.
    #[bits(0..=15, rw)]
    cdiv: u16,
}

/// Data delay register. Both delays are in core clock cycles and must
/// stay below CDIV / 2; values at or above that make the SCL edges
/// ambiguous.
#[bitbybit::bitfield(u32, default = 0x0)]
pub struct DataDelay {
    /// Falling edge delay: cycles to wait after the SCL falling edge
    /// before outgoing data changes.
    #[bits(16..=31, rw)]
    fedl: u16,
    /// Rising edge delay: cycles to wait after the SCL rising edge
    /// before incoming data is sampled.
    #[bits(0..=15, rw)]
    redl: u16,
}

/// Clock stretch timeout register.
#[bitbybit::bitfield(u32, default = 0x0)]
pub struct ClockStretchTimeout {
    /// Number of SCL cycles a slave may stretch the clock before S.CLKT
    /// is raised. 0 disables the check. Bits 31..16 are reserved.
    #[bits(0..=15, rw)]
    tout: u16,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Bsc {
    #[mmio(PureRead, Write, Modify)]
    c: Control,
    #[mmio(PureRead, Write)]
    s: Status,
    #[mmio(PureRead, Write)]
    dlen: DataLength,
    #[mmio(PureRead, Write)]
    a: SlaveAddress,
    /// Reading pops a byte from the receive FIFO, so reads are not pure.
    #[mmio(Read, Write)]
    fifo: Fifo,
    #[mmio(PureRead, Write)]
    div: ClockDivider,
    #[mmio(PureRead, Write)]
    del: DataDelay,
    #[mmio(PureRead, Write)]
    clkt: ClockStretchTimeout,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Bsc>(), 0x20);

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn data_delay_field_positions() {
        let del = DataDelay::new_with_raw_value(0xDEAD_BEEF);
        assert_eq!(del.fedl(), 0xDEAD);
        assert_eq!(del.redl(), 0xBEEF);
    }

    #[test]
    fn data_delay_round_trip() {
        for raw in [0x0000_0000, 0xFFFF_FFFF, 0x005D_0177, 0x8000_0001] {
            let del = DataDelay::new_with_raw_value(raw);
            let packed = DataDelay::new_with_raw_value(0)
                .with_fedl(del.fedl())
                .with_redl(del.redl());
            assert_eq!(packed.raw_value(), raw);
        }
    }

    #[test]
    fn divider_and_timeout_use_low_half_only() {
        let div = ClockDivider::new_with_raw_value(0xABCD_1234);
        assert_eq!(div.cdiv(), 0x1234);
        assert_eq!(
            div.cdiv(),
            ClockDivider::new_with_raw_value(0x0000_1234).cdiv()
        );
        let clkt = ClockStretchTimeout::new_with_raw_value(0xFFFF_0040);
        assert_eq!(clkt.tout(), 0x0040);
        // Writes built from the default leave the reserved half zero.
        let div = ClockDivider::new_with_raw_value(0).with_cdiv(0xFFFF);
        assert_eq!(div.raw_value(), 0x0000_FFFF);
    }

    #[test]
    fn control_bit_positions() {
        let c = Control::new_with_raw_value(0x0000_8080);
        assert!(c.i2c_enable());
        assert!(c.start_transfer());
        assert!(!c.int_on_done());
    }

    #[test]
    fn status_bit_positions() {
        // TXE and DONE set, everything else clear: the idle state after
        // a completed transfer.
        let s = Status::new_with_raw_value(0x0000_0042);
        assert!(s.tx_empty());
        assert!(s.done());
        assert!(!s.transfer_active());
        assert!(!s.clkt());
    }

    #[test]
    fn register_block_layout() {
        assert_eq!(core::mem::size_of::<Bsc>(), 0x20);
        assert_eq!(core::mem::offset_of!(Bsc, div), 0x14);
        assert_eq!(core::mem::offset_of!(Bsc, del), 0x18);
        assert_eq!(core::mem::offset_of!(Bsc, clkt), 0x1C);
    }
}
