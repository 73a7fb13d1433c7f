use clap::Parser as _;
use log::{error, info};
use simple_logger::SimpleLogger;

use bcm2711::i2c::{Bsc, I2C_1_PERIPHERAL_OFFSET};
use rpi_i2c_timing::devmem::DevMem;
use rpi_i2c_timing::timing::TimingRequest;
use rpi_i2c_timing::{Error, clock, firmware, report};

#[derive(clap::Parser, Debug)]
#[command(version, about = "Raspberry Pi I2C bus timing utility")]
#[command(
    long_about = "Inspects and tunes the BSC1 (I2C1) bus timing registers of a \
BCM2711 based Raspberry Pi by mapping them directly from /dev/mem, bypassing \
the kernel I2C driver.\n\nRun without arguments to read the current timing \
values. Pass CDIV and TOUT (and optionally FEDL and REDL) to write new ones. \
Requires root and an otherwise idle bus."
)]
struct Cli {
    /// New clock divider, in (0, 65535]. Rounded down to an even value
    /// before writing, as required by the hardware.
    #[arg(requires = "tout", allow_negative_numbers = true)]
    cdiv: Option<String>,
    /// New clock stretch timeout in SCL cycles, in [0, 65535]. 0
    /// disables clock stretch detection.
    #[arg(allow_negative_numbers = true)]
    tout: Option<String>,
    /// Falling edge delay in core clock cycles; magnitude must be below
    /// CDIV / 2. A negative value is treated as its absolute value.
    /// Derived from CDIV when omitted.
    #[arg(requires = "redl", allow_negative_numbers = true)]
    fedl: Option<String>,
    /// Rising edge delay in core clock cycles; magnitude must be below
    /// CDIV / 2. A negative value is treated as its absolute value.
    /// Derived from CDIV when omitted.
    #[arg(allow_negative_numbers = true)]
    redl: Option<String>,
}

fn run(cli: &Cli) -> Result<(), Error> {
    // Validate everything the user gave us before touching the hardware.
    let request = match (cli.cdiv.as_deref(), cli.tout.as_deref()) {
        (Some(cdiv), Some(tout)) => Some(TimingRequest::parse(
            cdiv,
            tout,
            cli.fedl.as_deref(),
            cli.redl.as_deref(),
        )?),
        _ => None,
    };

    let platform = firmware::query()?;
    let controller_addr = platform.peripheral_base as usize + I2C_1_PERIPHERAL_OFFSET;
    report::print_platform(&platform, controller_addr);

    let window = {
        let devmem = DevMem::open()?;
        devmem.map(controller_addr, size_of::<Bsc>())?
        // The /dev/mem handle is dropped here; the mapping stays valid.
    };
    info!("mapped BSC1 register window at {controller_addr:#010x}");
    // SAFETY: the window maps exactly one BSC register block and the
    // handle does not outlive the mapping, which is released at the end
    // of this function on every path.
    let mut regs = unsafe { Bsc::new_mmio_at(window.as_mut_ptr() as usize) };

    let core_clk = clock::core_clock_rate();
    let display_cdiv = match &request {
        Some(request) => request.effective_cdiv(),
        None => regs.read_div().cdiv(),
    };
    report::print_clocks(core_clk, display_cdiv);
    report::print_registers(&mut regs);

    if let Some(request) = request {
        let applied = request.apply(&mut regs);
        report::print_update(&applied, core_clk);
    }
    Ok(())
}

fn main() {
    SimpleLogger::new().init().unwrap();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    #[test]
    fn accepts_zero_two_or_four_values() {
        assert!(Cli::try_parse_from(["rpi-i2c-timing"]).is_ok());
        assert!(Cli::try_parse_from(["rpi-i2c-timing", "1500", "35"]).is_ok());
        assert!(Cli::try_parse_from(["rpi-i2c-timing", "1500", "35", "93", "375"]).is_ok());
    }

    #[test]
    fn rejects_odd_value_counts() {
        assert!(Cli::try_parse_from(["rpi-i2c-timing", "1500"]).is_err());
        assert!(Cli::try_parse_from(["rpi-i2c-timing", "1500", "35", "93"]).is_err());
        assert!(
            Cli::try_parse_from(["rpi-i2c-timing", "1500", "35", "93", "375", "7"]).is_err()
        );
    }

    #[test]
    fn values_are_passed_through_unparsed() {
        // Range and sign handling belong to TimingRequest::parse, not
        // the CLI layer.
        let cli = Cli::try_parse_from(["rpi-i2c-timing", "1500", "35", "-93", "375"]).unwrap();
        assert_eq!(cli.fedl.as_deref(), Some("-93"));
    }
}
