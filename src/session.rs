/// One inspect/update cycle on the RCW EEPROM.
///
/// A session owns the bus for its lifetime: the bus is checked (and a stuck
/// transfer cancelled) and configured before the first transaction. A run
/// reads at most twice and writes at most once.

use crate::i2c::{
	BusState,
	I2cBus,
	RcwEepromExt,
	SlaveAddress,
};
use crate::rcw::{
	self,
	BootMedia,
	ConfigDelta,
	ConfigWord,
	RawWord,
};
use crate::{
	Direction,
	RcwError,
};

/// RCW as read from the device
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Snapshot {
	pub raw: RawWord,
	pub config: ConfigWord,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UpdateReport {
	pub before: Snapshot,
	pub delta: ConfigDelta,
	/// read back after writing; `None` if nothing was written
	pub after: Option<Snapshot>,
}

impl UpdateReport {
	/// word that was (or in a dry run would have been) written
	pub fn planned(&self) -> RawWord {
		rcw::encode(&self.delta.target)
	}

	/// `false` only if a written word didn't read back as planned
	pub fn verified(&self) -> bool {
		match self.after {
			Some(ref after) => after.raw == self.planned(),
			None => true,
		}
	}
}

pub struct RcwSession<B: I2cBus> {
	bus: B,
	address: SlaveAddress,
}

impl<B: I2cBus> RcwSession<B> {
	pub fn start(mut bus: B, address: SlaveAddress, divider: u8) -> Result<Self, RcwError> {
		let state = bus.query_bus_state().map_err(RcwError::BusStateQueryFailed)?;
		if let BusState::Busy(s) = state {
			warn!("I2C bus not idle (state 0x{:02x}), cancelling transfer", s);
			if let Err(e) = bus.cancel_bus_transaction() {
				warn!("Couldn't cancel I2C transfer: {}", e);
			}
		}

		bus.configure_bus(divider).map_err(RcwError::BusConfigurationFailed)?;

		Ok(RcwSession {
			bus,
			address,
		})
	}

	pub fn address(&self) -> SlaveAddress {
		self.address
	}

	pub fn read(&mut self) -> Result<Snapshot, RcwError> {
		let raw = self.bus.read_rcw(self.address)
			.map_err(|e| RcwError::TransactionFailed(Direction::Read, e))?;
		info!("I2C {}: RCW {}", self.address, raw);
		Ok(Snapshot {
			raw,
			config: rcw::decode(raw),
		})
	}

	pub fn write(&mut self, config: &ConfigWord) -> Result<RawWord, RcwError> {
		let raw = rcw::encode(config);
		info!("I2C {}: writing RCW {}", self.address, raw);
		self.bus.write_rcw(self.address, raw)
			.map_err(|e| RcwError::TransactionFailed(Direction::Write, e))?;
		Ok(raw)
	}

	/// Write the planned word (if anything changed) and read it back.
	pub fn commit(&mut self, delta: &ConfigDelta) -> Result<Option<Snapshot>, RcwError> {
		if !delta.changed {
			return Ok(None);
		}
		let written = self.write(&delta.target)?;
		let after = self.read()?;
		if after.raw != written {
			warn!("I2C {}: RCW read back as {} after writing {}", self.address, after.raw, written);
		}
		Ok(Some(after))
	}

	pub fn update(&mut self, desired: BootMedia, dry_run: bool) -> Result<UpdateReport, RcwError> {
		let before = self.read()?;
		let delta = rcw::plan_update(&before.config, desired);
		for change in &delta.changes {
			info!("I2C {}: {}", self.address, change);
		}

		let after = if !delta.changed {
			info!("I2C {}: RCW already configured for {}", self.address, desired);
			None
		} else if dry_run {
			info!("I2C {}: dry run, not writing RCW", self.address);
			None
		} else {
			self.commit(&delta)?
		};

		Ok(UpdateReport {
			before,
			delta,
			after,
		})
	}

	pub fn close(self) -> B {
		self.bus
	}
}

/// Complete cycle; the address is validated before the bus is touched.
pub fn update_rcw<B: I2cBus>(
	bus: B,
	address: i64,
	divider: u8,
	desired: BootMedia,
	dry_run: bool,
) -> Result<UpdateReport, RcwError> {
	let address = SlaveAddress::new(address)?;
	RcwSession::start(bus, address, divider)?.update(desired, dry_run)
}
