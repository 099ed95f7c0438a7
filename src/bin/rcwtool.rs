#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate s32g_rcwtool;
use s32g_rcwtool::*;

use std::process::exit;

use s32g_rcwtool::i2c::{
	BusSpeed,
	DEFAULT_EEPROM_ADDRESS,
	SlaveAddress,
};
use s32g_rcwtool::rcw::BootMedia;

fn get_param_or<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(default),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn print_snapshot(snapshot: &Snapshot) {
	println!("RCW: {}", snapshot.raw);
	print!("{}", snapshot.config);
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(about: "rcwtool: read/write the S32G reset configuration word in an I2C-EEPROM")
		(@arg addr: --addr +takes_value "7-bit I2C address (hex) [default: 50]")
		(@arg boot: --boot +takes_value "boot media to configure: qspi, sd or mmc [default: sd]")
		(@arg device: --device +takes_value "index of the MCP2221 device to use if more than one is connected")
		(@arg speed: --speed +takes_value "I2C clock, e.g. 100k or 400k [default: 400k]")
		(@arg dry_run: --("dry-run") "show the planned changes without writing")
	).get_matches();

	// validate the address before touching any device
	let address = match matches.value_of("addr") {
		Some(a) => SlaveAddress::new(i2c::parse_address(a)?)?,
		None => DEFAULT_EEPROM_ADDRESS,
	};
	let desired: BootMedia = get_param_or(&matches, "boot", BootMedia::Sd)?;
	let speed: BusSpeed = get_param_or(&matches, "speed", BusSpeed::FAST)?;
	let divider = mcp2221::divider_for(speed)?;
	let index = match matches.value_of("device") {
		Some(_) => Some(get_param_or::<usize>(&matches, "device", 0)?),
		None => None,
	};
	let dry_run = matches.is_present("dry_run");

	let devices = mcp2221::list_devices()?;
	info!("Found {} device{}", devices.len(), if devices.len() == 1 { "" } else { "s" });
	for (i, dev) in devices.iter().enumerate() {
		info!("  [{}] {}", i, dev.node.display());
	}
	let device = mcp2221::Mcp2221::open(mcp2221::select_device(&devices, index)?)?;

	let mut session = RcwSession::start(device, address, divider)?;
	let report = session.update(desired, dry_run)?;
	session.close();

	print_snapshot(&report.before);
	for change in &report.delta.changes {
		println!("  {}", change);
	}
	if dry_run && report.delta.changed {
		println!("RCW {} not written (dry run)", report.planned());
	}
	if let Some(ref after) = report.after {
		print_snapshot(after);
	}
	ensure!(report.verified(),
		"RCW verify failed: expected {}, EEPROM has {}",
		report.planned(),
		report.after.map(|a| a.raw.to_string()).unwrap_or_default()
	);

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
