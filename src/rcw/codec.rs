use super::*;

#[derive(Clone, Copy, Debug)]
struct BitField {
	shift: u32,
	width: u32,
}

impl BitField {
	fn mask(self) -> u32 {
		(((1u64 << self.width) - 1) as u32) << self.shift
	}

	fn get(self, word: u32) -> u32 {
		(word & self.mask()) >> self.shift
	}

	// value bits outside the field width are dropped
	fn put(self, word: &mut u32, value: u32) {
		*word = (*word & !self.mask()) | ((value << self.shift) & self.mask());
	}
}

// common to all boot media
const PHY:  BitField = BitField { shift: 0, width: 2 };
const BOOT: BitField = BitField { shift: 5, width: 3 };
const SRC:  BitField = BitField { shift: 8, width: 1 };
const XOSC: BitField = BitField { shift: 16, width: 1 };
const PLL:  BitField = BitField { shift: 31, width: 1 };

// SD and MMC
const WAIT:     BitField = BitField { shift: 17, width: 3 };
const SD_SPEED: BitField = BitField { shift: 20, width: 1 };
const MMC_MODE: BitField = BitField { shift: 20, width: 4 };

// QuadSPI
const QSPI_MODE:      BitField = BitField { shift: 2, width: 3 };
const QSPI_PORT:      BitField = BitField { shift: 9, width: 1 };
const QSPI_CK2:       BitField = BitField { shift: 10, width: 1 };
const QSPI_CAS:       BitField = BitField { shift: 11, width: 4 };
const QSPI_POR_DELAY: BitField = BitField { shift: 17, width: 3 };
const QSPI_CKN:       BitField = BitField { shift: 20, width: 1 };
const QSPI_TDH:       BitField = BitField { shift: 22, width: 2 };
const QSPI_FSPHS:     BitField = BitField { shift: 24, width: 1 };
const QSPI_FSDLY:     BitField = BitField { shift: 25, width: 1 };
const QSPI_DLLFSMPF:  BitField = BitField { shift: 26, width: 3 };
const QSPI_DQS_SEL:   BitField = BitField { shift: 29, width: 2 };

const COMMON_FIELDS: [BitField; 5] = [PHY, BOOT, SRC, XOSC, PLL];
const SD_FIELDS: [BitField; 2] = [WAIT, SD_SPEED];
const MMC_FIELDS: [BitField; 2] = [WAIT, MMC_MODE];
const QSPI_FIELDS: [BitField; 11] = [
	QSPI_MODE, QSPI_PORT, QSPI_CK2, QSPI_CAS, QSPI_POR_DELAY, QSPI_CKN,
	QSPI_TDH, QSPI_FSPHS, QSPI_FSDLY, QSPI_DLLFSMPF, QSPI_DQS_SEL,
];

fn combined_mask(fields: &[BitField]) -> u32 {
	fields.iter().fold(0, |mask, f| mask | f.mask())
}

fn common_mask() -> u32 {
	combined_mask(&COMMON_FIELDS)
}

/// Bits `encode` writes for the given boot media; everything else is
/// written as zero.
pub fn assigned_mask(media: BootMedia) -> u32 {
	common_mask() | match media {
		BootMedia::Qspi => combined_mask(&QSPI_FIELDS),
		BootMedia::Sd => combined_mask(&SD_FIELDS),
		BootMedia::Mmc => combined_mask(&MMC_FIELDS),
		// payload is carried opaque
		BootMedia::Reserved(_) => !0,
	}
}

pub fn decode(raw: RawWord) -> ConfigWord {
	let word = raw.to_u32();

	let media = match BootMedia::from_code(BOOT.get(word) as u8) {
		BootMedia::Qspi => MediaConfig::Qspi(QspiConfig {
			mode: QSPI_MODE.get(word) as u8,
			port: QSPI_PORT.get(word) as u8,
			ck2_clock: 0 != QSPI_CK2.get(word),
			cas: QSPI_CAS.get(word) as u8,
			por_delay: QSPI_POR_DELAY.get(word) as u8,
			differential_clock: 0 != QSPI_CKN.get(word),
			hold_time: QSPI_TDH.get(word) as u8,
			full_speed_phase: 0 != QSPI_FSPHS.get(word),
			full_speed_delay: 0 != QSPI_FSDLY.get(word),
			dll_tap: QSPI_DLLFSMPF.get(word) as u8,
			dqs_select: QSPI_DQS_SEL.get(word) as u8,
		}),
		BootMedia::Sd => MediaConfig::Sd(SdConfig {
			wait: WaitPeriod(WAIT.get(word) as u8),
			speed: SdSpeed::from_bits(SD_SPEED.get(word)),
		}),
		BootMedia::Mmc => MediaConfig::Mmc(MmcConfig {
			wait: WaitPeriod(WAIT.get(word) as u8),
			mode: MMC_MODE.get(word) as u8,
		}),
		BootMedia::Reserved(code) => MediaConfig::Reserved {
			code,
			payload: word & !common_mask(),
		},
	};

	ConfigWord {
		phy: PhyMode::from_bits(PHY.get(word)),
		clock_source: ClockSource::from_bits(SRC.get(word)),
		oscillator: OscillatorMode::from_bits(XOSC.get(word)),
		pll: PllMode::from_bits(PLL.get(word)),
		media,
	}
}

pub fn encode(cfg: &ConfigWord) -> RawWord {
	let mut word = 0u32;

	PHY.put(&mut word, cfg.phy.code());
	BOOT.put(&mut word, u32::from(cfg.boot_media().code()));
	SRC.put(&mut word, cfg.clock_source.code());
	XOSC.put(&mut word, cfg.oscillator.code());
	PLL.put(&mut word, cfg.pll.code());

	match cfg.media {
		MediaConfig::Qspi(ref q) => {
			QSPI_MODE.put(&mut word, u32::from(q.mode));
			QSPI_PORT.put(&mut word, u32::from(q.port));
			QSPI_CK2.put(&mut word, u32::from(q.ck2_clock));
			QSPI_CAS.put(&mut word, u32::from(q.cas));
			QSPI_POR_DELAY.put(&mut word, u32::from(q.por_delay));
			QSPI_CKN.put(&mut word, u32::from(q.differential_clock));
			QSPI_TDH.put(&mut word, u32::from(q.hold_time));
			QSPI_FSPHS.put(&mut word, u32::from(q.full_speed_phase));
			QSPI_FSDLY.put(&mut word, u32::from(q.full_speed_delay));
			QSPI_DLLFSMPF.put(&mut word, u32::from(q.dll_tap));
			QSPI_DQS_SEL.put(&mut word, u32::from(q.dqs_select));
		},
		MediaConfig::Sd(ref sd) => {
			WAIT.put(&mut word, u32::from(sd.wait.0));
			SD_SPEED.put(&mut word, sd.speed.code());
		},
		MediaConfig::Mmc(ref mmc) => {
			WAIT.put(&mut word, u32::from(mmc.wait.0));
			MMC_MODE.put(&mut word, u32::from(mmc.mode));
		},
		MediaConfig::Reserved { payload, .. } => {
			word |= payload & !common_mask();
		},
	}

	RawWord::from_u32(word)
}

#[cfg(test)]
mod test {
	use super::*;

	fn check_roundtrip(word: u32) {
		let cfg = decode(RawWord::from_u32(word));
		let expected = word & assigned_mask(cfg.boot_media());
		assert_eq!(encode(&cfg).to_u32(), expected,
			"0x{:08x} ({:?}) didn't encode back to 0x{:08x}", word, cfg.boot_media(), expected
		);
		// zeroed bits carry no information: decoding again yields the same config
		assert_eq!(decode(encode(&cfg)), cfg, "0x{:08x} decoded differently after re-encoding", word);
	}

	#[test]
	fn field_masks_disjoint() {
		let mut all = COMMON_FIELDS.to_vec();
		all.extend_from_slice(&QSPI_FIELDS);
		let mut seen = 0u32;
		for f in all {
			assert_eq!(seen & f.mask(), 0, "{:?} overlaps another field", f);
			seen |= f.mask();
		}
		assert_eq!(assigned_mask(BootMedia::Qspi), !((1 << 15) | (1 << 21)));
		assert_eq!(assigned_mask(BootMedia::Sd), 0x801f_01e3);
		assert_eq!(assigned_mask(BootMedia::Mmc), 0x80ff_01e3);
		assert_eq!(assigned_mask(BootMedia::Reserved(5)), !0);
	}

	#[test]
	fn decode_zero() {
		let cfg = decode(RawWord([0, 0, 0, 0]));
		assert_eq!(cfg.phy, PhyMode::Rmii);
		assert_eq!(cfg.boot_media(), BootMedia::Qspi);
		assert_eq!(cfg.clock_source, ClockSource::Parallel);
		assert_eq!(cfg.oscillator, OscillatorMode::DifferentialOrCrystal);
		assert_eq!(cfg.pll, PllMode::PllAtIrc);
		assert_eq!(cfg.media, MediaConfig::Qspi(QspiConfig::default()));
	}

	#[test]
	fn decode_common_fields() {
		// NoPhy, SD, I2C, bypass, IRC@48MHz
		let cfg = decode(RawWord::from_u32(0x8001_0143));
		assert_eq!(cfg.phy, PhyMode::NoPhy);
		assert_eq!(cfg.boot_media(), BootMedia::Sd);
		assert_eq!(cfg.clock_source, ClockSource::I2c);
		assert_eq!(cfg.oscillator, OscillatorMode::Bypass);
		assert_eq!(cfg.pll, PllMode::IrcAt48MHz);
	}

	#[test]
	fn decode_little_endian() {
		// SD, I2C, wait 50ms, high speed
		let cfg = decode(RawWord([0x40, 0x01, 0x1e, 0x00]));
		assert_eq!(cfg.clock_source, ClockSource::I2c);
		assert_eq!(cfg.media, MediaConfig::Sd(SdConfig {
			wait: WaitPeriod(7),
			speed: SdSpeed::High,
		}));
	}

	#[test]
	fn decode_mmc() {
		// MMC, wait code 3, mode 0b1010
		let word = (3 << 5) | (3 << 17) | (0b1010 << 20);
		let cfg = decode(RawWord::from_u32(word));
		assert_eq!(cfg.media, MediaConfig::Mmc(MmcConfig {
			wait: WaitPeriod(3),
			mode: 0b1010,
		}));
	}

	#[test]
	fn decode_qspi() {
		let word = 0
			| (0b101 << 2) // mode
			| (1 << 9) // port
			| (0b0110 << 11) // cas
			| (0b011 << 17) // por delay
			| (0b10 << 22) // hold time
			| (1 << 25) // fsdly
			| (0b110 << 26) // dll tap
			| (0b01 << 29) // dqs select
		;
		let cfg = decode(RawWord::from_u32(word));
		assert_eq!(cfg.media, MediaConfig::Qspi(QspiConfig {
			mode: 0b101,
			port: 1,
			ck2_clock: false,
			cas: 0b0110,
			por_delay: 0b011,
			differential_clock: false,
			hold_time: 0b10,
			full_speed_phase: false,
			full_speed_delay: true,
			dll_tap: 0b110,
			dqs_select: 0b01,
		}));
		assert_eq!(encode(&cfg).to_u32(), word);
	}

	#[test]
	fn reserved_boot_media_kept_verbatim() {
		for &code in &[1u32, 4, 5, 6, 7] {
			let word = 0x5a5a_a5a5 & !(0x7 << 5) | (code << 5);
			let cfg = decode(RawWord::from_u32(word));
			assert_eq!(cfg.boot_media(), BootMedia::Reserved(code as u8));
			assert_eq!(encode(&cfg).to_u32(), word);
		}
	}

	#[test]
	fn encode_zeroes_unassigned_bits() {
		// SD with all bits set: only the SD layout survives
		let cfg = decode(RawWord::from_u32(!0 & !(0x7 << 5) | (2 << 5)));
		assert_eq!(encode(&cfg).to_u32(), 0x801f_01e3 & !(0x7 << 5) | (2 << 5));
	}

	#[test]
	fn roundtrip() {
		let patterns = [
			0x0000_0000, 0xffff_ffff, 0x5555_5555, 0xaaaa_aaaa,
			0x0001_0000, 0x8000_0000, 0x001e_0140, 0x1234_5678,
			0xdead_beef, 0xcafe_f00d, 0x0f0f_0f0f, 0xf0f0_f0f0,
		];
		for &p in &patterns {
			// force each known boot media
			for &code in &[0u32, 2, 3] {
				check_roundtrip(p & !(0x7 << 5) | (code << 5));
			}
		}
	}

	#[test]
	fn encode_masks_oversized_values() {
		let mut cfg = decode(RawWord::from_u32(3 << 5));
		cfg.media = MediaConfig::Mmc(MmcConfig {
			wait: WaitPeriod(0xff),
			mode: 0xff,
		});
		assert_eq!(encode(&cfg).to_u32(), (3 << 5) | (0x7 << 17) | (0xf << 20));
	}
}
