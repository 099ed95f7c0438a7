/// Microchip MCP2221(A) USB to I2C/UART bridge
///
/// Talks HID: every command is a 64-byte output report answered by a 64-byte
/// input report echoing the command code in byte 0. Byte 1 of the response
/// is the command status (0x00: success).
///
/// Commands used:
/// - 0x10 status/set parameters: byte 2 = 0x10 cancels the current I2C
///   transfer, byte 3 = 0x20 sets the I2C clock divider from byte 4; the
///   response carries the I2C engine state in byte 8
/// - 0x90 I2C write data (with STOP)
/// - 0x94 I2C write data without STOP
/// - 0x93 I2C read data with repeated START
/// - 0x40 get I2C data: byte 3 = number of bytes (0x7f on error), data
///   from byte 4
///
/// I2C transfers: bytes 1+2 = length (little-endian), byte 3 = 8-bit slave
/// address (R/W bit included), payload from byte 4.

mod hidraw;
mod list;

use std::io;
use std::path::Path;

pub use self::hidraw::HidDevice;

pub use self::list::{
	DeviceInfo,
	list_devices,
	select_device,
};

use crate::i2c::{
	BusError,
	BusSpeed,
	BusState,
	I2cBus,
	MAX_TRANSFER,
	SlaveAddress,
	reliable_sleep,
};
use crate::RcwError;

pub const VENDOR_ID: u16 = 0x04d8;
pub const PRODUCT_ID: u16 = 0x00dd;

pub const REPORT_SIZE: usize = 64;
pub type Report = [u8; REPORT_SIZE];

#[allow(dead_code)]
mod consts {
	pub const CMD_STATUS_SET_PARAMETERS: u8 = 0x10;
	pub const CMD_I2C_WRITE_DATA: u8 = 0x90;
	pub const CMD_I2C_READ_DATA_REPEATED_START: u8 = 0x93;
	pub const CMD_I2C_WRITE_DATA_NO_STOP: u8 = 0x94;
	pub const CMD_I2C_GET_DATA: u8 = 0x40;

	// status/set parameters request
	pub const CANCEL_TRANSFER: u8 = 0x10;
	pub const SET_SPEED: u8 = 0x20;

	// status/set parameters response
	pub const SPEED_ACCEPTED: u8 = 0x20;
	pub const SPEED_REJECTED: u8 = 0x21; // transfer in progress
	pub const STATE_OFFSET: usize = 8;

	pub const STATUS_OK: u8 = 0x00;
	pub const STATUS_BUSY: u8 = 0x01;
	pub const GET_DATA_ERROR: u8 = 0x41;
	pub const GET_DATA_INVALID_LEN: u8 = 0x7f;

	// system clock the I2C divider applies to
	pub const CLOCK_HZ: u32 = 12_000_000;
	pub const DIVIDER_OFFSET: u32 = 3;
}

use self::consts::*;

const GET_DATA_POLLS: usize = 20;
const GET_DATA_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(1);

/// Divider for the requested I2C clock: 12 MHz / speed - 3
/// (400 kHz => 27, 100 kHz => 117).
pub fn divider_for(speed: BusSpeed) -> crate::AResult<u8> {
	ensure!(speed.0 > 0, "I2C speed must not be zero");
	ensure!(speed.0 <= 400_000, "I2C speed {} not supported (max 400kHz)", speed);
	let divider = CLOCK_HZ / speed.0;
	ensure!(divider > DIVIDER_OFFSET && divider - DIVIDER_OFFSET <= 0xff, "I2C speed {} out of range", speed);
	Ok((divider - DIVIDER_OFFSET) as u8)
}

/// One HID request/response round trip
pub trait ReportExchange {
	fn exchange(&mut self, request: &Report) -> io::Result<Report>;
}

impl<'a, D: ?Sized + ReportExchange> ReportExchange for &'a mut D {
	fn exchange(&mut self, request: &Report) -> io::Result<Report> {
		D::exchange(*self, request)
	}
}

/// Opened MCP2221; the device is released when dropped.
pub struct Mcp2221<D: ReportExchange = HidDevice> {
	device: D,
}

impl Mcp2221<HidDevice> {
	pub fn open(info: &DeviceInfo) -> Result<Self, RcwError> {
		Self::open_path(&info.node)
	}

	pub fn open_path(path: &Path) -> Result<Self, RcwError> {
		let device = HidDevice::open(path).map_err(|cause| RcwError::DeviceOpenFailed {
			path: path.display().to_string(),
			cause,
		})?;
		info!("Opened MCP2221 {}", path.display());
		Ok(Mcp2221 { device })
	}
}

impl<D: ReportExchange> Mcp2221<D> {
	pub fn new(device: D) -> Self {
		Mcp2221 { device }
	}

	pub fn close(self) -> D {
		self.device
	}

	fn command(&mut self, request: &Report) -> Result<Report, BusError> {
		let response = self.device.exchange(request)?;
		if response[0] != request[0] {
			return Err(BusError::new(-1, format!(
				"response 0x{:02x} doesn't match command 0x{:02x}", response[0], request[0]
			)));
		}
		Ok(response)
	}

	// commands that only report success in byte 1
	fn checked_command(&mut self, request: &Report, what: &str) -> Result<Report, BusError> {
		let response = self.command(request)?;
		if response[1] != STATUS_OK {
			return Err(BusError::new(i32::from(response[1]), format!("{} not accepted", what)));
		}
		Ok(response)
	}

	fn status(&mut self, cancel: bool, divider: Option<u8>) -> Result<Report, BusError> {
		let mut request = [0u8; REPORT_SIZE];
		request[0] = CMD_STATUS_SET_PARAMETERS;
		if cancel {
			request[2] = CANCEL_TRANSFER;
		}
		if let Some(divider) = divider {
			request[3] = SET_SPEED;
			request[4] = divider;
		}
		self.checked_command(&request, "status/set parameters")
	}

	fn transfer_request(command: u8, address_byte: u8, len: usize) -> Report {
		let mut request = [0u8; REPORT_SIZE];
		request[0] = command;
		request[1] = len as u8;
		request[2] = (len >> 8) as u8;
		request[3] = address_byte;
		request
	}

	fn get_data(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
		let mut request = [0u8; REPORT_SIZE];
		request[0] = CMD_I2C_GET_DATA;

		let mut polls = 0;
		let response = loop {
			let response = self.command(&request)?;
			if response[1] == STATUS_OK {
				break response;
			}
			polls += 1;
			if response[1] != GET_DATA_ERROR || polls >= GET_DATA_POLLS {
				return Err(BusError::new(i32::from(response[1]), format!(
					"reading I2C data failed (engine state 0x{:02x})", response[2]
				)));
			}
			reliable_sleep(GET_DATA_POLL_INTERVAL);
		};

		let len = response[3];
		if len == GET_DATA_INVALID_LEN || len as usize != buf.len() {
			return Err(BusError::new(i32::from(len), format!(
				"expected {} bytes of I2C data, got length 0x{:02x}", buf.len(), len
			)));
		}
		buf.copy_from_slice(&response[4..4 + buf.len()]);
		Ok(())
	}
}

impl<D: ReportExchange> I2cBus for Mcp2221<D> {
	fn configure_bus(&mut self, divider: u8) -> Result<(), BusError> {
		let response = self.status(false, Some(divider))?;
		if response[3] != SPEED_ACCEPTED {
			return Err(BusError::new(i32::from(response[3]), format!("divider {} not accepted", divider)));
		}
		debug!("MCP2221: I2C divider {}", divider);
		Ok(())
	}

	fn query_bus_state(&mut self) -> Result<BusState, BusError> {
		let response = self.status(false, None)?;
		match response[STATE_OFFSET] {
			0 => Ok(BusState::Idle),
			s => Ok(BusState::Busy(s)),
		}
	}

	fn cancel_bus_transaction(&mut self) -> Result<(), BusError> {
		self.status(true, None)?;
		Ok(())
	}

	fn read_block(&mut self, address: SlaveAddress, offset: u8, buf: &mut [u8]) -> Result<(), BusError> {
		if buf.is_empty() || buf.len() > MAX_TRANSFER {
			return Err(BusError::new(-libc::EINVAL, format!("invalid read length {}", buf.len())));
		}

		let mut request = Self::transfer_request(CMD_I2C_WRITE_DATA_NO_STOP, address.write_byte(), 1);
		request[4] = offset;
		self.checked_command(&request, "I2C write (no stop)")?;

		let request = Self::transfer_request(CMD_I2C_READ_DATA_REPEATED_START, address.read_byte(), buf.len());
		self.checked_command(&request, "I2C read (repeated start)")?;

		self.get_data(buf)?;
		debug!("MCP2221: read {} bytes from {} @{:02x}", buf.len(), address, offset);
		Ok(())
	}

	fn write_block(&mut self, address: SlaveAddress, offset: u8, data: &[u8]) -> Result<(), BusError> {
		// offset byte counts towards the transfer
		if data.len() + 1 > MAX_TRANSFER {
			return Err(BusError::new(-libc::EINVAL, format!("invalid write length {}", data.len())));
		}

		let mut request = Self::transfer_request(CMD_I2C_WRITE_DATA, address.write_byte(), data.len() + 1);
		request[4] = offset;
		request[5..5 + data.len()].copy_from_slice(data);
		self.checked_command(&request, "I2C write")?;
		debug!("MCP2221: wrote {} bytes to {} @{:02x}", data.len(), address, offset);
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use std::collections::VecDeque;

	use super::*;

	/// replays canned responses and records requests
	struct Scripted {
		requests: Vec<Report>,
		responses: VecDeque<Report>,
	}

	impl Scripted {
		fn new(responses: Vec<Report>) -> Self {
			Scripted {
				requests: Vec::new(),
				responses: responses.into_iter().collect(),
			}
		}
	}

	impl ReportExchange for Scripted {
		fn exchange(&mut self, request: &Report) -> io::Result<Report> {
			self.requests.push(*request);
			self.responses.pop_front().ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "no response"))
		}
	}

	fn response(bytes: &[u8]) -> Report {
		let mut r = [0u8; REPORT_SIZE];
		r[..bytes.len()].copy_from_slice(bytes);
		r
	}

	fn address() -> SlaveAddress {
		SlaveAddress::new(0x50).unwrap()
	}

	#[test]
	fn dividers() {
		assert_eq!(divider_for(BusSpeed::FAST).unwrap(), 27);
		assert_eq!(divider_for(BusSpeed::STANDARD).unwrap(), 117);
		assert!(divider_for(BusSpeed(1_000_000)).is_err());
		assert!(divider_for(BusSpeed(10_000)).is_err());
		assert!(divider_for(BusSpeed(0)).is_err());
	}

	#[test]
	fn state_and_cancel() {
		let mut dev = Scripted::new(vec![
			response(&[0x10, 0x00, 0, 0, 0, 0, 0, 0, 0x52]),
			response(&[0x10, 0x00, 0x10]),
		]);
		{
			let mut mcp = Mcp2221::new(&mut dev);
			assert_eq!(mcp.query_bus_state().unwrap(), BusState::Busy(0x52));
			mcp.cancel_bus_transaction().unwrap();
		}
		assert_eq!(dev.requests[0][..5], [0x10, 0, 0, 0, 0]);
		assert_eq!(dev.requests[1][..5], [0x10, 0, 0x10, 0, 0]);
	}

	#[test]
	fn configure_divider() {
		let mut dev = Scripted::new(vec![
			response(&[0x10, 0x00, 0x00, 0x20, 27]),
			response(&[0x10, 0x00, 0x00, 0x21]),
		]);
		{
			let mut mcp = Mcp2221::new(&mut dev);
			mcp.configure_bus(27).unwrap();
			let e = mcp.configure_bus(27).unwrap_err();
			assert_eq!(e.code, 0x21);
		}
		assert_eq!(dev.requests[0][..5], [0x10, 0, 0, 0x20, 27]);
	}

	#[test]
	fn read_rcw_block() {
		let mut dev = Scripted::new(vec![
			response(&[0x94, 0x00]),
			response(&[0x93, 0x00]),
			response(&[0x40, 0x41, 0x55]),
			response(&[0x40, 0x00, 0x00, 4, 0x40, 0x01, 0x1e, 0x00]),
		]);
		let mut buf = [0u8; 4];
		Mcp2221::new(&mut dev).read_block(address(), 0, &mut buf).unwrap();
		assert_eq!(buf, [0x40, 0x01, 0x1e, 0x00]);
		assert_eq!(dev.requests[0][..5], [0x94, 1, 0, 0xa0, 0]);
		assert_eq!(dev.requests[1][..4], [0x93, 4, 0, 0xa1]);
		assert_eq!(dev.requests[2][0], 0x40);
		assert_eq!(dev.requests.len(), 4);
	}

	#[test]
	fn pending_data_gives_up() {
		let mut responses = vec![
			response(&[0x94, 0x00]),
			response(&[0x93, 0x00]),
		];
		for _ in 0..GET_DATA_POLLS {
			responses.push(response(&[0x40, 0x41, 0x55]));
		}
		// never reached
		responses.push(response(&[0x40, 0x00, 0x00, 4, 0x40, 0x01, 0x1e, 0x00]));
		let mut dev = Scripted::new(responses);
		let mut buf = [0u8; 4];
		let e = Mcp2221::new(&mut dev).read_block(address(), 0, &mut buf).unwrap_err();
		assert_eq!(e.code, 0x41);
		assert_eq!(dev.requests.len(), 2 + GET_DATA_POLLS);
		assert_eq!(dev.responses.len(), 1);
		assert_eq!(buf, [0u8; 4]);
	}

	#[test]
	fn short_read_rejected() {
		let mut dev = Scripted::new(vec![
			response(&[0x94, 0x00]),
			response(&[0x93, 0x00]),
			response(&[0x40, 0x00, 0x00, 2, 0x40, 0x01]),
		]);
		let mut buf = [0u8; 4];
		let e = Mcp2221::new(&mut dev).read_block(address(), 0, &mut buf).unwrap_err();
		assert_eq!(e.code, 2);
	}

	#[test]
	fn nack_not_retried() {
		let mut dev = Scripted::new(vec![
			response(&[0x94, 0x01]),
		]);
		let mut buf = [0u8; 4];
		let e = Mcp2221::new(&mut dev).read_block(address(), 0, &mut buf).unwrap_err();
		assert_eq!(e.code, 1);
		assert_eq!(dev.requests.len(), 1);
	}

	#[test]
	fn write_rcw_block() {
		let mut dev = Scripted::new(vec![
			response(&[0x90, 0x00]),
		]);
		Mcp2221::new(&mut dev).write_block(address(), 0, &[0x40, 0x01, 0x1e, 0x00]).unwrap();
		assert_eq!(dev.requests[0][..9], [0x90, 5, 0, 0xa0, 0, 0x40, 0x01, 0x1e, 0x00]);
	}

	#[test]
	fn oversized_transfers_rejected() {
		let mut dev = Scripted::new(Vec::new());
		let mut mcp = Mcp2221::new(&mut dev);
		assert!(mcp.write_block(address(), 0, &[0u8; MAX_TRANSFER]).is_err());
		let mut buf = [0u8; MAX_TRANSFER + 1];
		assert!(mcp.read_block(address(), 0, &mut buf).is_err());
		drop(mcp);
		assert!(dev.requests.is_empty());
	}
}
