//! Append-only record of `install` attempts, shown by `list`.
//!
//! Dispatch never consults this; the registry is the source of truth for
//! what can run.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
	Installed,
	Failed,
}

impl fmt::Display for InstallStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Installed => "installed",
			Self::Failed => "failed",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
	pub name: String,
	pub status: InstallStatus,
}

#[derive(Debug, Default)]
pub struct PackageLog {
	records: Vec<PackageRecord>,
}

impl PackageLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, name: impl Into<String>, status: InstallStatus) {
		self.records.push(PackageRecord {
			name: name.into(),
			status,
		});
	}

	pub fn records(&self) -> &[PackageRecord] {
		&self.records
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.records.iter().map(|r| r.name.as_str())
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
