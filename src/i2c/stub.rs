//! In-memory AT24C01 behind a recording bus, for tests.

use super::*;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Call {
	Configure(u8),
	QueryState,
	Cancel,
	Read { offset: u8, len: usize },
	Write { offset: u8, data: Vec<u8> },
}

pub struct MemoryEeprom {
	pub address: SlaveAddress,
	pub memory: [u8; 128],
	pub state: BusState,
	pub calls: Vec<Call>,
	pub fail_configure: Option<i32>,
	pub fail_query: Option<i32>,
	pub fail_cancel: Option<i32>,
	pub fail_read: Option<i32>,
	pub fail_write: Option<i32>,
	// bit errors applied to written data
	pub corrupt_write: u8,
}

impl MemoryEeprom {
	pub fn with_rcw(word: u32) -> Self {
		let mut memory = [0xffu8; 128];
		memory[..4].copy_from_slice(&word.to_le_bytes());
		MemoryEeprom {
			address: DEFAULT_EEPROM_ADDRESS,
			memory,
			state: BusState::Idle,
			calls: Vec::new(),
			fail_configure: None,
			fail_query: None,
			fail_cancel: None,
			fail_read: None,
			fail_write: None,
			corrupt_write: 0,
		}
	}

	pub fn rcw(&self) -> u32 {
		let mut b = [0u8; 4];
		b.copy_from_slice(&self.memory[..4]);
		u32::from_le_bytes(b)
	}

	pub fn writes(&self) -> usize {
		self.calls.iter().filter(|c| match c { Call::Write { .. } => true, _ => false }).count()
	}

	fn check_address(&self, address: SlaveAddress) -> Result<(), BusError> {
		if address != self.address {
			return Err(BusError::new(0x25, format!("no ACK from {}", address)));
		}
		Ok(())
	}
}

impl I2cBus for MemoryEeprom {
	fn configure_bus(&mut self, divider: u8) -> Result<(), BusError> {
		self.calls.push(Call::Configure(divider));
		match self.fail_configure {
			Some(code) => Err(BusError::new(code, "divider rejected")),
			None => Ok(()),
		}
	}

	fn query_bus_state(&mut self) -> Result<BusState, BusError> {
		self.calls.push(Call::QueryState);
		match self.fail_query {
			Some(code) => Err(BusError::new(code, "no status")),
			None => Ok(self.state),
		}
	}

	fn cancel_bus_transaction(&mut self) -> Result<(), BusError> {
		self.calls.push(Call::Cancel);
		if let Some(code) = self.fail_cancel {
			return Err(BusError::new(code, "cancel rejected"));
		}
		self.state = BusState::Idle;
		Ok(())
	}

	fn read_block(&mut self, address: SlaveAddress, offset: u8, buf: &mut [u8]) -> Result<(), BusError> {
		self.calls.push(Call::Read { offset, len: buf.len() });
		if let Some(code) = self.fail_read {
			return Err(BusError::new(code, "read failed"));
		}
		self.check_address(address)?;
		let start = offset as usize;
		buf.copy_from_slice(&self.memory[start..start + buf.len()]);
		Ok(())
	}

	fn write_block(&mut self, address: SlaveAddress, offset: u8, data: &[u8]) -> Result<(), BusError> {
		self.calls.push(Call::Write { offset, data: data.to_vec() });
		if let Some(code) = self.fail_write {
			return Err(BusError::new(code, "write failed"));
		}
		self.check_address(address)?;
		let start = offset as usize;
		for (i, b) in data.iter().enumerate() {
			self.memory[start + i] = *b ^ if i == 0 { self.corrupt_write } else { 0 };
		}
		Ok(())
	}
}
