//! Core clock sampling.
//!
//! The I2C clock is derived from the VPU core clock, whose current rate
//! the clk framework exposes in debugfs. The sample is advisory: if it
//! cannot be read, derived frequencies and timeouts are simply reported
//! as unavailable.
use std::fs;

use log::warn;

pub const VPU_CLK_RATE: &str = "/sys/kernel/debug/clk/vpu/clk_rate";

/// Read the current VPU core clock rate in Hz, once per invocation.
pub fn core_clock_rate() -> Option<u32> {
    match fs::read_to_string(VPU_CLK_RATE) {
        Ok(text) => {
            let rate = parse_clk_rate(&text);
            if rate.is_none() {
                warn!("unexpected contents in {VPU_CLK_RATE}: {text:?}");
            }
            rate
        }
        Err(e) => {
            warn!("could not read {VPU_CLK_RATE}: {e} (is debugfs mounted?)");
            None
        }
    }
}

fn parse_clk_rate(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_debugfs_rate() {
        assert_eq!(parse_clk_rate("500000000\n"), Some(500_000_000));
        assert_eq!(parse_clk_rate("  250000000 "), Some(250_000_000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_clk_rate(""), None);
        assert_eq!(parse_clk_rate("-1\n"), None);
        assert_eq!(parse_clk_rate("fast\n"), None);
    }
}
