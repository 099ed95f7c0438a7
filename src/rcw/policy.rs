use std::fmt;

use super::*;

/// Field level difference; `None` if the field isn't part of the layout on
/// that side (boot media changed).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FieldChange {
	pub field: Field,
	pub old: Option<u32>,
	pub new: Option<u32>,
}

impl fmt::Display for FieldChange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let describe = |v: Option<u32>| match v {
			Some(v) => self.field.describe(v),
			None => "-".to_string(),
		};
		write!(f, "{}: {} -> {}", self.field.label(), describe(self.old), describe(self.new))
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConfigDelta {
	pub changes: Vec<FieldChange>,
	pub changed: bool,
	/// configuration to write if `changed`
	pub target: ConfigWord,
}

fn diff(original: &ConfigWord, target: &ConfigWord) -> Vec<FieldChange> {
	let old_fields = original.fields();
	let new_fields = target.fields();
	let lookup = |fields: &[(Field, u32)], field: Field| {
		fields.iter().find(|&&(f, _)| f == field).map(|&(_, v)| v)
	};

	let mut changes = Vec::new();
	for &(field, old) in &old_fields {
		let new = lookup(&new_fields[..], field);
		if new != Some(old) {
			changes.push(FieldChange { field, old: Some(old), new });
		}
	}
	for &(field, new) in &new_fields {
		if lookup(&old_fields[..], field).is_none() {
			changes.push(FieldChange { field, old: None, new: Some(new) });
		}
	}
	changes
}

/// Changes needed to boot from `desired` with the RCW programmed over I2C.
///
/// - configuration source is forced to I2C
/// - switching boot media starts from the zeroed payload of the new media;
///   common fields are kept
/// - SD boot is forced to high speed with a 50ms wait period
pub fn plan_update(current: &ConfigWord, desired: BootMedia) -> ConfigDelta {
	let mut target = *current;

	target.clock_source = ClockSource::I2c;

	if target.boot_media() != desired {
		target.media = MediaConfig::zeroed(desired);
	}

	if let MediaConfig::Sd(ref mut sd) = target.media {
		sd.speed = SdSpeed::High;
		sd.wait = WaitPeriod::MS_50;
	}

	let changes = diff(current, &target);
	ConfigDelta {
		changed: !changes.is_empty(),
		changes,
		target,
	}
}
