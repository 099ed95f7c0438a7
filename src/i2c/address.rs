use std::fmt;
use std::str;

use crate::RcwError;

pub const DEFAULT_EEPROM_ADDRESS: SlaveAddress = SlaveAddress(0x50);

/// Unvalidated address value, shown in hex
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AddressValue(pub i64);

impl fmt::Display for AddressValue {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.0 < 0 {
			write!(f, "-{:#04x}", self.0.unsigned_abs())
		} else {
			write!(f, "{:#04x}", self.0)
		}
	}
}

/// 7-bit I2C slave address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SlaveAddress(u8);

impl SlaveAddress {
	pub fn new(address: i64) -> Result<Self, RcwError> {
		if address < 0 || address > 0x7f {
			return Err(RcwError::InvalidAddress(AddressValue(address)));
		}
		Ok(SlaveAddress(address as u8))
	}

	pub fn get(self) -> u8 {
		self.0
	}

	/// address byte with R/W bit cleared
	pub fn write_byte(self) -> u8 {
		self.0 << 1
	}

	/// address byte with R/W bit set
	pub fn read_byte(self) -> u8 {
		(self.0 << 1) | 1
	}
}

impl Default for SlaveAddress {
	fn default() -> Self {
		DEFAULT_EEPROM_ADDRESS
	}
}

impl fmt::Display for SlaveAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

/// Parse a hexadecimal address ("50", "0x50", "-1") without range check.
pub fn parse_address(s: &str) -> crate::AResult<i64> {
	let s = s.trim();
	let (negative, digits) = if s.starts_with('-') {
		(true, &s[1..])
	} else {
		(false, s)
	};
	let digits = if digits.starts_with("0x") || digits.starts_with("0X") {
		&digits[2..]
	} else {
		digits
	};
	ensure!(!digits.is_empty(), "empty address: {:?}", s);
	// from_str_radix would accept another sign
	ensure!(digits.chars().all(|c| c.is_ascii_hexdigit()), "invalid address {:?}: not a hex number", s);
	let value = with_context!(("invalid address {:?}", s),
		Ok(i64::from_str_radix(digits, 16)?)
	)?;
	Ok(if negative { -value } else { value })
}

impl str::FromStr for SlaveAddress {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(SlaveAddress::new(parse_address(s)?)?)
	}
}
