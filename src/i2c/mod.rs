/// I2C bus abstraction: a single 7-bit addressed slave with 8-bit
/// sub-address offsets (e.g. AT24C01 EEPROM).
///
/// Transactions:
/// - read: write offset, (repeated) start, read `len` bytes
/// - write: write offset followed by payload in one transfer
///
/// Implementations never retry on their own; errors carry the transport
/// status code.

use std::fmt;
use std::io;
use std::str;

mod address;
mod eeprom;
#[cfg(test)]
pub(crate) mod stub;

pub use self::address::{
	AddressValue,
	DEFAULT_EEPROM_ADDRESS,
	SlaveAddress,
	parse_address,
};

pub use self::eeprom::{
	EEPROM_WRITE_CYCLE,
	RcwEepromExt,
	reliable_sleep,
};

/// largest payload of a single transfer
pub const MAX_TRANSFER: usize = 60;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BusState {
	Idle,
	Busy(u8), // transport specific state machine value
}

#[derive(Clone, Debug, Fail)]
#[fail(display = "status {}: {}", code, message)]
pub struct BusError {
	pub code: i32,
	pub message: String,
}

impl BusError {
	pub fn new<S: Into<String>>(code: i32, message: S) -> Self {
		BusError {
			code,
			message: message.into(),
		}
	}
}

impl From<io::Error> for BusError {
	fn from(e: io::Error) -> Self {
		BusError::new(e.raw_os_error().unwrap_or(-1), e.to_string())
	}
}

pub trait I2cBus {
	fn configure_bus(&mut self, divider: u8) -> Result<(), BusError>;
	fn query_bus_state(&mut self) -> Result<BusState, BusError>;
	fn cancel_bus_transaction(&mut self) -> Result<(), BusError>;

	// fills all of `buf` or fails
	fn read_block(&mut self, address: SlaveAddress, offset: u8, buf: &mut [u8]) -> Result<(), BusError>;
	fn write_block(&mut self, address: SlaveAddress, offset: u8, data: &[u8]) -> Result<(), BusError>;
}

impl<'a, B: ?Sized + I2cBus> I2cBus for &'a mut B {
	fn configure_bus(&mut self, divider: u8) -> Result<(), BusError> {
		B::configure_bus(*self, divider)
	}
	fn query_bus_state(&mut self) -> Result<BusState, BusError> {
		B::query_bus_state(*self)
	}
	fn cancel_bus_transaction(&mut self) -> Result<(), BusError> {
		B::cancel_bus_transaction(*self)
	}

	fn read_block(&mut self, address: SlaveAddress, offset: u8, buf: &mut [u8]) -> Result<(), BusError> {
		B::read_block(*self, address, offset, buf)
	}
	fn write_block(&mut self, address: SlaveAddress, offset: u8, data: &[u8]) -> Result<(), BusError> {
		B::write_block(*self, address, offset, data)
	}
}

/// I2C clock frequency in Hz
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BusSpeed(pub u32);

impl BusSpeed {
	pub const STANDARD: BusSpeed = BusSpeed(100_000);
	pub const FAST: BusSpeed = BusSpeed(400_000);
}

impl fmt::Display for BusSpeed {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if 0 == self.0 % 1000 {
			write!(f, "{}kHz", self.0 / 1000)
		} else {
			write!(f, "{}Hz", self.0)
		}
	}
}

impl str::FromStr for BusSpeed {
	type Err = ::failure::Error;

	// "400000", "400k", "400kHz"
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.trim().to_ascii_lowercase();
		let lower = lower.trim_end_matches("hz");
		let (digits, factor) = if lower.ends_with('k') {
			(&lower[..lower.len() - 1], 1000)
		} else {
			(lower, 1)
		};
		let value = with_context!(("invalid bus speed {:?}", s),
			Ok(digits.parse::<u32>()?)
		)?;
		let hz = value.checked_mul(factor).ok_or_else(|| format_err!("bus speed {:?} too large", s))?;
		ensure!(hz > 0, "bus speed must not be zero");
		Ok(BusSpeed(hz))
	}
}
