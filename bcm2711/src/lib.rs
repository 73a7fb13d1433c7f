//! Register definitions for the Broadcom BCM2711 SoC as found on the
//! Raspberry Pi 4 family.
//!
//! Only the blocks needed for bus timing diagnostics are modelled: the
//! BSC (Broadcom Serial Controller) I2C register set and the board
//! revision word exposed by the firmware.
//!
//! Peripheral addresses are given as offsets into the ARM peripheral
//! window. The absolute physical base of that window differs between
//! board generations and has to be queried at runtime, for example from
//! the device tree.
#![no_std]

pub mod i2c;
pub mod revision;
