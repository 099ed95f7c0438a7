use std::thread;
use std::time::{
	Duration,
	Instant,
};

use crate::rcw::{
	RCW_OFFSET,
	RCW_SIZE,
	RawWord,
};

use super::{
	BusError,
	I2cBus,
	SlaveAddress,
};

/// AT24C01 self-timed write cycle; the EEPROM doesn't acknowledge its
/// address until it is done.
pub const EEPROM_WRITE_CYCLE: Duration = Duration::from_millis(5);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

pub trait RcwEepromExt: I2cBus {
	fn read_rcw(&mut self, address: SlaveAddress) -> Result<RawWord, BusError> {
		let mut raw = RawWord([0u8; RCW_SIZE]);
		self.read_block(address, RCW_OFFSET, &mut raw.0)?;
		debug!("I2C {}: read RCW {:?}", address, raw);
		Ok(raw)
	}

	fn write_rcw(&mut self, address: SlaveAddress, raw: RawWord) -> Result<(), BusError> {
		debug!("I2C {}: write RCW {:?}", address, raw);
		self.write_block(address, RCW_OFFSET, &raw.0)?;
		reliable_sleep(EEPROM_WRITE_CYCLE);
		Ok(())
	}
}
impl<B: I2cBus + ?Sized> RcwEepromExt for B {}
