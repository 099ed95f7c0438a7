/// Canonical names for RCW field values; presentation only.

use std::fmt;

use super::*;

/// marker for codes without a known meaning
pub const UNKNOWN: &str = "?";

impl PhyMode {
	pub fn name(self) -> &'static str {
		match self {
			PhyMode::Rmii => "RMII",
			PhyMode::Sgmii => "SGMII",
			PhyMode::Rgmii => "RGMII",
			PhyMode::NoPhy => "No PHY",
		}
	}
}

impl BootMedia {
	pub fn name(self) -> &'static str {
		match self {
			BootMedia::Qspi => "QSPI",
			BootMedia::Sd => "SD",
			BootMedia::Mmc => "MMC",
			BootMedia::Reserved(_) => UNKNOWN,
		}
	}
}

impl ClockSource {
	pub fn name(self) -> &'static str {
		match self {
			ClockSource::Parallel => "parallel",
			ClockSource::I2c => "I2C",
		}
	}
}

impl OscillatorMode {
	pub fn name(self) -> &'static str {
		match self {
			OscillatorMode::DifferentialOrCrystal => "differential/crystal",
			OscillatorMode::Bypass => "bypass",
		}
	}
}

impl PllMode {
	pub fn name(self) -> &'static str {
		match self {
			PllMode::PllAtIrc => "PLL@IRC",
			PllMode::IrcAt48MHz => "IRC@48MHz",
		}
	}
}

impl SdSpeed {
	pub fn name(self) -> &'static str {
		match self {
			SdSpeed::Default => "default",
			SdSpeed::High => "high",
		}
	}
}

impl WaitPeriod {
	/// startup delay in milliseconds; `None` for undefined codes (5 and 6)
	pub fn millis(self) -> Option<u32> {
		match self.0 {
			0 => Some(0),
			1 => Some(5),
			2 => Some(10),
			3 => Some(20),
			4 => Some(35),
			7 => Some(50),
			_ => None,
		}
	}
}

macro_rules! display_by_name {
	($($t:ty),*) => {$(
		impl fmt::Display for $t {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str(self.name())
			}
		}
	)*};
}

display_by_name!(PhyMode, BootMedia, ClockSource, OscillatorMode, PllMode, SdSpeed);

impl fmt::Display for WaitPeriod {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.millis() {
			Some(ms) => write!(f, "{}ms", ms),
			None => f.write_str(UNKNOWN),
		}
	}
}

fn on_off(v: u32) -> &'static str {
	if 0 != v { "on" } else { "off" }
}

impl Field {
	pub fn label(self) -> &'static str {
		match self {
			Field::Phy => "PHY",
			Field::Boot => "BOOT",
			Field::ClockSource => "SRC",
			Field::Oscillator => "XOSC",
			Field::Pll => "PLL",
			Field::WaitPeriod => "WAIT",
			Field::SdSpeed => "SPEED",
			Field::MmcMode => "MODE",
			Field::QspiMode => "MODE",
			Field::QspiPort => "PORT",
			Field::QspiCk2Clock => "CK2",
			Field::QspiCas => "CAS",
			Field::QspiPorDelay => "PORDLY",
			Field::QspiDifferentialClock => "CKN",
			Field::QspiHoldTime => "TDH",
			Field::QspiFullSpeedPhase => "FSPHS",
			Field::QspiFullSpeedDelay => "FSDLY",
			Field::QspiDllTap => "DLLTAP",
			Field::QspiDqsSelect => "DQSSEL",
			Field::ReservedPayload => "DATA",
		}
	}

	/// render a raw field code
	pub fn describe(self, value: u32) -> String {
		match self {
			Field::Phy => PhyMode::from_bits(value).to_string(),
			Field::Boot => match BootMedia::from_code(value as u8) {
				BootMedia::Reserved(code) => format!("{} (reserved code {})", UNKNOWN, code),
				media => media.to_string(),
			},
			Field::ClockSource => ClockSource::from_bits(value).to_string(),
			Field::Oscillator => OscillatorMode::from_bits(value).to_string(),
			Field::Pll => PllMode::from_bits(value).to_string(),
			Field::WaitPeriod => WaitPeriod(value as u8).to_string(),
			Field::SdSpeed => SdSpeed::from_bits(value).to_string(),
			Field::QspiCk2Clock
			| Field::QspiDifferentialClock
			| Field::QspiFullSpeedPhase
			| Field::QspiFullSpeedDelay => on_off(value).to_string(),
			Field::ReservedPayload => format!("0x{:08x}", value),
			_ => value.to_string(),
		}
	}
}

impl fmt::Display for ConfigWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "RCW")?;
		writeln!(f, "=================================")?;
		for (field, value) in self.fields() {
			writeln!(f, "    {:<7} {}", format!("{}:", field.label()), field.describe(value))?;
		}
		Ok(())
	}
}
