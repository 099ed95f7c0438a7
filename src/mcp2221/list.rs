use std::fs;
use std::io::{
	self,
	Read,
};
use std::path::{
	Path,
	PathBuf,
};

use super::{
	PRODUCT_ID,
	VENDOR_ID,
};
use crate::RcwError;

const HIDRAW_CLASS: &str = "/sys/class/hidraw";
const BUS_USB: u16 = 0x0003;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DeviceInfo {
	pub name: String, // e.g. "hidraw3"
	pub node: PathBuf, // e.g. "/dev/hidraw3"
}

/// parse "HID_ID=0003:000004D8:000000DD" from a uevent file: (bus, vendor, product)
pub(super) fn parse_hid_id(uevent: &str) -> Option<(u16, u16, u16)> {
	let value = uevent.lines().find_map(|line| {
		let line = line.trim();
		if line.starts_with("HID_ID=") { Some(&line[7..]) } else { None }
	})?;
	let mut parts = value.split(':');
	let bus = u32::from_str_radix(parts.next()?, 16).ok()?;
	let vendor = u32::from_str_radix(parts.next()?, 16).ok()?;
	let product = u32::from_str_radix(parts.next()?, 16).ok()?;
	if parts.next().is_some() || bus > 0xffff || vendor > 0xffff || product > 0xffff {
		return None;
	}
	Some((bus as u16, vendor as u16, product as u16))
}

fn read_uevent(class_dir: &Path, name: &str) -> crate::AResult<String> {
	with_context!(("couldn't read uevent for {}", name), {
		let mut f = fs::File::open(class_dir.join(name).join("device/uevent"))?;
		let mut result = String::new();
		f.read_to_string(&mut result)?;
		Ok(result)
	})
}

fn list_in(class_dir: &Path) -> crate::AResult<Vec<DeviceInfo>> {
	let entries = match fs::read_dir(class_dir) {
		Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
		r => r?,
	};

	let mut list = Vec::new();
	for entry in entries {
		let entry = entry?;
		let name = entry.file_name().into_string().map_err(|e| {
			format_err!("Invalid (Non-UTF8) hidraw device name {:?}", e)
		})?;
		let uevent = match read_uevent(class_dir, &name) {
			Ok(uevent) => uevent,
			Err(e) => {
				warn!("{}: skipped: {}", name, e);
				continue;
			},
		};
		match parse_hid_id(&uevent) {
			Some((BUS_USB, VENDOR_ID, PRODUCT_ID)) => {
				debug!("{}: MCP2221", name);
				list.push(DeviceInfo {
					node: Path::new("/dev").join(&name),
					name,
				});
			},
			Some(_) => (),
			None => warn!("{}: no HID_ID in uevent", name),
		}
	}
	list.sort();

	Ok(list)
}

/// all MCP2221 bridges, sorted by hidraw node
pub fn list_devices() -> crate::AResult<Vec<DeviceInfo>> {
	list_in(Path::new(HIDRAW_CLASS))
}

/// Pick a device: a single device is used without index, otherwise an
/// explicit index is required.
pub fn select_device(devices: &[DeviceInfo], index: Option<usize>) -> Result<&DeviceInfo, RcwError> {
	match (devices.len(), index) {
		(0, _) => Err(RcwError::NoDeviceFound),
		(1, None) => Ok(&devices[0]),
		(count, None) => Err(RcwError::DeviceSelectionRequired { count }),
		(count, Some(index)) => devices.get(index).ok_or(RcwError::DeviceSelectionOutOfRange {
			index,
			last: count - 1,
		}),
	}
}
