//! Timing validation, derivation and the register write path.
use bcm2711::i2c::{ClockDivider, ClockStretchTimeout, DataDelay, MmioBsc};

use crate::Error;

/// Round a clock divider down to an even value. The BSC hardware only
/// supports even dividers and would drop the low bit itself; doing it
/// here keeps the reported and written values identical.
#[inline]
pub fn round_down_even(v: u16) -> u16 {
    v & 0xFFFE
}

/// Default data delays for a given (even) clock divider, matching the
/// heuristic of the reference `i2c-bcm2835` kernel driver:
/// FEDL = CDIV / 16, REDL = CDIV / 4, each at least 1.
pub fn default_delays(cdiv: u16) -> (u16, u16) {
    ((cdiv / 16).max(1), (cdiv / 4).max(1))
}

/// Derived SCL frequency in Hz, if both inputs are usable.
pub fn i2c_clock_hz(core_clk: u32, cdiv: u16) -> Option<u32> {
    if cdiv == 0 {
        return None;
    }
    Some(core_clk / u32::from(cdiv))
}

/// Convert a core clock cycle count to microseconds.
pub fn cycles_to_micros(cycles: u16, core_clk: u32) -> Option<u64> {
    if core_clk == 0 {
        return None;
    }
    Some(u64::from(cycles) * 1_000_000 / u64::from(core_clk))
}

/// Validated user request for new timing values.
///
/// `fedl`/`redl` are `None` when the user left them to be derived from
/// the divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRequest {
    pub cdiv: u16,
    pub tout: u16,
    pub fedl: Option<u16>,
    pub redl: Option<u16>,
}

/// The values actually written to the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTimings {
    pub cdiv: u16,
    pub tout: u16,
    pub fedl: u16,
    pub redl: u16,
}

fn parse_int(name: &'static str, text: &str) -> Result<i64, Error> {
    text.trim()
        .parse()
        .map_err(|source| Error::Parse { name, source })
}

/// Parse and bound-check one delay argument. A negative input is
/// accepted and silently interpreted as its absolute value; the
/// magnitude must stay strictly below CDIV / 2.
fn parse_delay(name: &'static str, text: &str, half_cdiv: i64) -> Result<u16, Error> {
    let value = parse_int(name, text)?;
    let magnitude = value.unsigned_abs();
    if magnitude >= half_cdiv as u64 {
        return Err(Error::OutOfRange {
            name,
            value,
            lo: 0,
            hi: half_cdiv - 1,
        });
    }
    Ok(magnitude as u16)
}

impl TimingRequest {
    /// Validate raw argument strings in documented order: CDIV in
    /// (0, 65535], TOUT in [0, 65535], then the optional delays against
    /// CDIV / 2 (integer division of the divider as given, before even
    /// rounding).
    pub fn parse(
        cdiv: &str,
        tout: &str,
        fedl: Option<&str>,
        redl: Option<&str>,
    ) -> Result<Self, Error> {
        let cdiv_raw = parse_int("CDIV", cdiv)?;
        if cdiv_raw <= 0 || cdiv_raw > 0xFFFF {
            return Err(Error::OutOfRange {
                name: "CDIV",
                value: cdiv_raw,
                lo: 0,
                hi: 0xFFFF,
            });
        }
        let tout_raw = parse_int("TOUT", tout)?;
        if !(0..=0xFFFF).contains(&tout_raw) {
            return Err(Error::OutOfRange {
                name: "TOUT",
                value: tout_raw,
                lo: 0,
                hi: 0xFFFF,
            });
        }
        let half_cdiv = cdiv_raw / 2;
        let fedl = fedl
            .map(|text| parse_delay("FEDL", text, half_cdiv))
            .transpose()?;
        let redl = redl
            .map(|text| parse_delay("REDL", text, half_cdiv))
            .transpose()?;
        Ok(Self {
            cdiv: cdiv_raw as u16,
            tout: tout_raw as u16,
            fedl,
            redl,
        })
    }

    /// The divider as it will be written, rounded down to even.
    pub fn effective_cdiv(&self) -> u16 {
        round_down_even(self.cdiv)
    }

    /// Write `DIV`, `CLKT` and `DEL`, in that order. There is no
    /// atomicity across the three writes; the bus is expected to be
    /// idle during configuration. Missing delays are filled in from
    /// [`default_delays`].
    pub fn apply(&self, regs: &mut MmioBsc<'_>) -> AppliedTimings {
        let cdiv = self.effective_cdiv();
        let (default_fedl, default_redl) = default_delays(cdiv);
        let fedl = self.fedl.unwrap_or(default_fedl);
        let redl = self.redl.unwrap_or(default_redl);
        regs.write_div(ClockDivider::DEFAULT.with_cdiv(cdiv));
        regs.write_clkt(ClockStretchTimeout::DEFAULT.with_tout(self.tout));
        regs.write_del(DataDelay::DEFAULT.with_fedl(fedl).with_redl(redl));
        AppliedTimings {
            cdiv,
            tout: self.tout,
            fedl,
            redl,
        }
    }
}
