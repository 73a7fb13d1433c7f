//! Formatted diagnostic output.
//!
//! The report is the product of the tool and goes to stdout via
//! `println!`; advisory diagnostics use the `log` macros instead.
use bcm2711::i2c::MmioBsc;

use crate::firmware::PlatformInfo;
use crate::timing::{self, AppliedTimings};

/// Render the low 16 bits of a register as two 8-bit binary groups,
/// e.g. `10000000 00110010`.
pub fn bit_pattern(v: u32) -> String {
    format!("{:08b} {:08b}", (v >> 8) as u8, (v & 0xFF) as u8)
}

fn fmt_micros(micros: Option<u64>) -> String {
    match micros {
        Some(us) => format!("{us} microsec."),
        None => "unavailable (no core clock)".to_string(),
    }
}

pub fn print_platform(info: &PlatformInfo, controller_addr: usize) {
    match &info.revision {
        Some(rev) => println!(
            "Raspberry Model type: {:#x}, Processor ID: {:#x}",
            rev.model_type(),
            rev.processor().value()
        ),
        None => println!("Raspberry Model type: unknown (no revision node)"),
    }
    println!(
        "ARM peripheral address base: {:#010x}",
        info.peripheral_base
    );
    println!("Peripheral window size: {:#010x}", info.peripheral_size);
    match info.sdram_base {
        Some(base) => println!("SDRAM address base: {base:#010x}"),
        None => println!("SDRAM address base: unknown"),
    }
    println!("I2C1 controller address base: {controller_addr:#010x}");
}

pub fn print_clocks(core_clk: Option<u32>, cdiv: u16) {
    match core_clk {
        Some(rate) => {
            println!("Core clock (MHz): {}", rate / 1_000_000);
            match timing::i2c_clock_hz(rate, cdiv) {
                Some(hz) => println!("I2C clock (KHz): {}", hz / 1000),
                None => println!("I2C clock: unavailable (CDIV is 0)"),
            }
        }
        None => println!("Core clock: unavailable"),
    }
}

pub fn print_registers(regs: &mut MmioBsc<'_>) {
    println!("C: {}", bit_pattern(regs.read_c().raw_value()));
    println!("S: {}", bit_pattern(regs.read_s().raw_value()));
    println!("DLEN: {}", regs.read_dlen().raw_value());
    println!("A: {}", regs.read_a().raw_value());
    println!("FIFO: {}", regs.read_fifo().raw_value());
    let div = regs.read_div();
    let del = regs.read_del();
    let clkt = regs.read_clkt();
    println!("DIV: {}", div.raw_value());
    println!("DEL: {}", del.raw_value());
    println!("  FEDL: {}", del.fedl());
    println!("  REDL: {}", del.redl());
    println!("CLKT: {}", clkt.raw_value());
    // CDIV and TOUT use only the lower halves of the 32-bit registers.
    println!("DIV.CDIV: {}", div.cdiv());
    println!("CLKT.TOUT: {}", clkt.tout());
}

pub fn print_update(applied: &AppliedTimings, core_clk: Option<u32>) {
    let (suggested_fedl, suggested_redl) = timing::default_delays(applied.cdiv);
    println!(
        "Suggested values: FEDL={}, REDL={}. Max: {}",
        suggested_fedl,
        suggested_redl,
        (applied.cdiv / 2).saturating_sub(1)
    );
    let to_micros = |cycles| fmt_micros(core_clk.and_then(|rate| timing::cycles_to_micros(cycles, rate)));
    println!(
        "Updating delay values to: DEL.FEDL={} = {} output, DEL.REDL={} = {} incoming.",
        applied.fedl,
        to_micros(applied.fedl),
        applied.redl,
        to_micros(applied.redl),
    );
    println!(
        "Timing values updated: DIV.CDIV={}, CLKT.TOUT={}.",
        applied.cdiv, applied.tout
    );
    println!(
        "Clock stretching timeout: {}.",
        fmt_micros(core_clk.and_then(|rate| timing::cycles_to_micros(applied.tout, rate)))
    );
}
