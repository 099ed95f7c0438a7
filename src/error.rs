use std::fmt;
use std::io;

use crate::i2c::{
	AddressValue,
	BusError,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Read,
	Write,
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Direction::Read => f.write_str("read"),
			Direction::Write => f.write_str("write"),
		}
	}
}

/// Everything that can end a run; none of these are recovered from.
#[derive(Debug, Fail)]
pub enum RcwError {
	#[fail(display = "illegal address: {} (7-bit address required: 0x00..0x7f)", _0)]
	InvalidAddress(AddressValue),

	#[fail(display = "no MCP2221 device found")]
	NoDeviceFound,

	#[fail(display = "found {} MCP2221 devices, select one by index", count)]
	DeviceSelectionRequired { count: usize },

	#[fail(display = "illegal device number {} out of range [0-{}]", index, last)]
	DeviceSelectionOutOfRange { index: usize, last: usize },

	#[fail(display = "cannot open MCP2221 device {}: {}", path, cause)]
	DeviceOpenFailed { path: String, #[cause] cause: io::Error },

	#[fail(display = "cannot get I2C state: {}", _0)]
	BusStateQueryFailed(#[cause] BusError),

	#[fail(display = "cannot set I2C divider: {}", _0)]
	BusConfigurationFailed(#[cause] BusError),

	#[fail(display = "cannot {} RCW: {}", _0, _1)]
	TransactionFailed(Direction, #[cause] BusError),
}

impl RcwError {
	/// transport status code for bus errors
	pub fn status_code(&self) -> Option<i32> {
		match self {
			RcwError::BusStateQueryFailed(e)
			| RcwError::BusConfigurationFailed(e)
			| RcwError::TransactionFailed(_, e) => Some(e.code),
			_ => None,
		}
	}
}
