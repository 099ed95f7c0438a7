use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{
	Path,
	PathBuf,
};

use super::{
	REPORT_SIZE,
	Report,
	ReportExchange,
};

const RESPONSE_TIMEOUT_MS: libc::c_int = 1000;

/// Linux hidraw node
#[derive(Debug)]
pub struct HidDevice {
	file: fs::File,
	path: PathBuf,
}

impl HidDevice {
	pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		let path = path.as_ref().to_path_buf();
		let file = fs::OpenOptions::new()
			.read(true)
			.write(true)
			.custom_flags(libc::O_CLOEXEC)
			.open(&path)?;

		Ok(HidDevice {
			file,
			path,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn wait_readable(&self) -> io::Result<()> {
		let mut pfd = libc::pollfd {
			fd: self.file.as_raw_fd(),
			events: libc::POLLIN,
			revents: 0,
		};
		loop {
			let res = unsafe { libc::poll(&mut pfd, 1, RESPONSE_TIMEOUT_MS) };
			if res < 0 {
				let e = io::Error::last_os_error();
				if e.kind() == io::ErrorKind::Interrupted {
					continue;
				}
				return Err(e);
			}
			if res == 0 {
				return Err(io::Error::new(io::ErrorKind::TimedOut, format!("no HID response from {:?}", self.path)));
			}
			return Ok(());
		}
	}
}

impl ReportExchange for HidDevice {
	fn exchange(&mut self, request: &Report) -> io::Result<Report> {
		// leading byte is the (unused) report id
		let mut out = [0u8; REPORT_SIZE + 1];
		out[1..].copy_from_slice(&request[..]);
		let l = self.file.write(&out)?;
		if l != out.len() {
			return Err(io::Error::new(io::ErrorKind::Other, "failed to write whole HID report"));
		}

		self.wait_readable()?;
		let mut response = [0u8; REPORT_SIZE];
		let l = self.file.read(&mut response)?;
		if l != REPORT_SIZE {
			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, format!("short HID report ({} bytes)", l)));
		}
		Ok(response)
	}
}
