/// Reset Configuration Word (RCW) of the S32G boot ROM
///
/// The processor reads a single 32-bit little-endian word from the EEPROM at
/// reset. Bits 0-1 (PHY), 5-7 (boot media), 8 (configuration source), 16
/// (oscillator) and 31 (PLL) have the same meaning for every boot media; all
/// other bits are interpreted depending on the selected boot media.

mod codec;
mod names;
mod policy;

pub use self::codec::{
	assigned_mask,
	decode,
	encode,
};

pub use self::names::UNKNOWN;

pub use self::policy::{
	ConfigDelta,
	FieldChange,
	plan_update,
};

use std::fmt;
use std::str;

/// size of the RCW in the EEPROM
pub const RCW_SIZE: usize = 4;

/// offset of the RCW in the EEPROM
pub const RCW_OFFSET: u8 = 0;

/// RCW as stored on the bus (little-endian)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawWord(pub [u8; RCW_SIZE]);

impl RawWord {
	pub fn from_u32(word: u32) -> Self {
		RawWord(word.to_le_bytes())
	}

	pub fn to_u32(&self) -> u32 {
		u32::from_le_bytes(self.0)
	}
}

impl fmt::Display for RawWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.to_u32())
	}
}

impl fmt::Debug for RawWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"0x{:08x} ([{:02x} {:02x} {:02x} {:02x}])",
			self.to_u32(),
			self.0[0], self.0[1], self.0[2], self.0[3],
		)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PhyMode {
	Rmii,
	Sgmii,
	Rgmii,
	NoPhy,
}

impl PhyMode {
	pub(crate) fn from_bits(v: u32) -> Self {
		match v & 0x3 {
			0b00 => PhyMode::Rmii,
			0b01 => PhyMode::Sgmii,
			0b10 => PhyMode::Rgmii,
			0b11 => PhyMode::NoPhy,
			_ => unreachable!(),
		}
	}

	pub fn code(self) -> u32 {
		match self {
			PhyMode::Rmii => 0b00,
			PhyMode::Sgmii => 0b01,
			PhyMode::Rgmii => 0b10,
			PhyMode::NoPhy => 0b11,
		}
	}
}

/// Boot media (3-bit code); codes without a known layout are kept as
/// `Reserved`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BootMedia {
	Qspi,
	Sd,
	Mmc,
	Reserved(u8),
}

impl BootMedia {
	pub fn from_code(code: u8) -> Self {
		match code & 0x7 {
			0 => BootMedia::Qspi,
			2 => BootMedia::Sd,
			3 => BootMedia::Mmc,
			c => BootMedia::Reserved(c),
		}
	}

	pub fn code(self) -> u8 {
		match self {
			BootMedia::Qspi => 0,
			BootMedia::Sd => 2,
			BootMedia::Mmc => 3,
			BootMedia::Reserved(c) => c & 0x7,
		}
	}
}

impl str::FromStr for BootMedia {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"qspi" => Ok(BootMedia::Qspi),
			"sd" => Ok(BootMedia::Sd),
			"mmc" => Ok(BootMedia::Mmc),
			_ => bail!("unknown boot media {:?} (expected qspi, sd or mmc)", s),
		}
	}
}

/// Which path the RCW is programmed through
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ClockSource {
	Parallel,
	I2c,
}

impl ClockSource {
	pub(crate) fn from_bits(v: u32) -> Self {
		if 0 == v & 0x1 { ClockSource::Parallel } else { ClockSource::I2c }
	}

	pub fn code(self) -> u32 {
		match self {
			ClockSource::Parallel => 0,
			ClockSource::I2c => 1,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum OscillatorMode {
	DifferentialOrCrystal,
	Bypass,
}

impl OscillatorMode {
	pub(crate) fn from_bits(v: u32) -> Self {
		if 0 == v & 0x1 { OscillatorMode::DifferentialOrCrystal } else { OscillatorMode::Bypass }
	}

	pub fn code(self) -> u32 {
		match self {
			OscillatorMode::DifferentialOrCrystal => 0,
			OscillatorMode::Bypass => 1,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PllMode {
	PllAtIrc,
	IrcAt48MHz,
}

impl PllMode {
	pub(crate) fn from_bits(v: u32) -> Self {
		if 0 == v & 0x1 { PllMode::PllAtIrc } else { PllMode::IrcAt48MHz }
	}

	pub fn code(self) -> u32 {
		match self {
			PllMode::PllAtIrc => 0,
			PllMode::IrcAt48MHz => 1,
		}
	}
}

/// 3-bit SD/MMC startup delay code; see `WaitPeriod::millis`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct WaitPeriod(pub u8);

impl WaitPeriod {
	pub const MS_50: WaitPeriod = WaitPeriod(7);
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SdSpeed {
	Default,
	High,
}

impl SdSpeed {
	pub(crate) fn from_bits(v: u32) -> Self {
		if 0 == v & 0x1 { SdSpeed::Default } else { SdSpeed::High }
	}

	pub fn code(self) -> u32 {
		match self {
			SdSpeed::Default => 0,
			SdSpeed::High => 1,
		}
	}
}

impl Default for SdSpeed {
	fn default() -> Self {
		SdSpeed::Default
	}
}

/// QuadSPI boot settings
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct QspiConfig {
	pub mode: u8, // 3-bit
	pub port: u8, // 1-bit
	pub ck2_clock: bool,
	pub cas: u8, // 4-bit QuadSPI_SFACR[CAS]
	pub por_delay: u8, // 3-bit
	pub differential_clock: bool,
	pub hold_time: u8, // 2-bit
	pub full_speed_phase: bool, // SMPR[FSPHS]
	pub full_speed_delay: bool, // SMPR[FSDLY]
	pub dll_tap: u8, // 3-bit
	pub dqs_select: u8, // 2-bit
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct SdConfig {
	pub wait: WaitPeriod,
	pub speed: SdSpeed,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct MmcConfig {
	pub wait: WaitPeriod,
	pub mode: u8, // 4-bit
}

/// Boot media dependent part of the RCW
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MediaConfig {
	Qspi(QspiConfig),
	Sd(SdConfig),
	Mmc(MmcConfig),
	// unknown layout: all bits outside the common fields, unmodified
	Reserved { code: u8, payload: u32 },
}

impl MediaConfig {
	/// all-zero payload for the given boot media
	pub fn zeroed(media: BootMedia) -> Self {
		match media {
			BootMedia::Qspi => MediaConfig::Qspi(QspiConfig::default()),
			BootMedia::Sd => MediaConfig::Sd(SdConfig::default()),
			BootMedia::Mmc => MediaConfig::Mmc(MmcConfig::default()),
			BootMedia::Reserved(code) => MediaConfig::Reserved { code, payload: 0 },
		}
	}

	pub fn boot_media(&self) -> BootMedia {
		match *self {
			MediaConfig::Qspi(_) => BootMedia::Qspi,
			MediaConfig::Sd(_) => BootMedia::Sd,
			MediaConfig::Mmc(_) => BootMedia::Mmc,
			MediaConfig::Reserved { code, .. } => BootMedia::Reserved(code),
		}
	}
}

/// Decoded RCW
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ConfigWord {
	pub phy: PhyMode,
	pub clock_source: ClockSource,
	pub oscillator: OscillatorMode,
	pub pll: PllMode,
	pub media: MediaConfig,
}

impl ConfigWord {
	pub fn boot_media(&self) -> BootMedia {
		self.media.boot_media()
	}

	/// All fields present in the active layout with their raw codes, common
	/// fields first.
	pub fn fields(&self) -> Vec<(Field, u32)> {
		let mut fields = vec![
			(Field::Phy, self.phy.code()),
			(Field::Boot, u32::from(self.boot_media().code())),
			(Field::ClockSource, self.clock_source.code()),
			(Field::Oscillator, self.oscillator.code()),
			(Field::Pll, self.pll.code()),
		];

		match self.media {
			MediaConfig::Qspi(ref q) => fields.extend_from_slice(&[
				(Field::QspiMode, u32::from(q.mode)),
				(Field::QspiPort, u32::from(q.port)),
				(Field::QspiCk2Clock, u32::from(q.ck2_clock)),
				(Field::QspiCas, u32::from(q.cas)),
				(Field::QspiPorDelay, u32::from(q.por_delay)),
				(Field::QspiDifferentialClock, u32::from(q.differential_clock)),
				(Field::QspiHoldTime, u32::from(q.hold_time)),
				(Field::QspiFullSpeedPhase, u32::from(q.full_speed_phase)),
				(Field::QspiFullSpeedDelay, u32::from(q.full_speed_delay)),
				(Field::QspiDllTap, u32::from(q.dll_tap)),
				(Field::QspiDqsSelect, u32::from(q.dqs_select)),
			]),
			MediaConfig::Sd(ref sd) => fields.extend_from_slice(&[
				(Field::WaitPeriod, u32::from(sd.wait.0)),
				(Field::SdSpeed, sd.speed.code()),
			]),
			MediaConfig::Mmc(ref mmc) => fields.extend_from_slice(&[
				(Field::WaitPeriod, u32::from(mmc.wait.0)),
				(Field::MmcMode, u32::from(mmc.mode)),
			]),
			MediaConfig::Reserved { payload, .. } => {
				fields.push((Field::ReservedPayload, payload));
			},
		}

		fields
	}
}

/// Single field of the RCW, as listed by `ConfigWord::fields`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Field {
	Phy,
	Boot,
	ClockSource,
	Oscillator,
	Pll,
	// SD and MMC
	WaitPeriod,
	SdSpeed,
	MmcMode,
	QspiMode,
	QspiPort,
	QspiCk2Clock,
	QspiCas,
	QspiPorDelay,
	QspiDifferentialClock,
	QspiHoldTime,
	QspiFullSpeedPhase,
	QspiFullSpeedDelay,
	QspiDllTap,
	QspiDqsSelect,
	ReservedPayload,
}
