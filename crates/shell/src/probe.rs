//! Filesystem metadata and the `ls`/`ll` renderings built on it.

use std::ffi::OsStr;
use std::fmt::Write as _;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use nix::unistd::{Gid, Group, Uid, User};

use crate::output::{Palette, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	File,
	Dir,
	Symlink,
	Other,
}

/// Metadata for one directory entry, as `stat` reports it.
#[derive(Debug, Clone)]
pub struct EntryInfo {
	pub name: String,
	pub kind: EntryKind,
	pub mode: u32,
	pub nlink: u64,
	pub uid: u32,
	pub gid: u32,
	pub size: u64,
	pub modified: Option<SystemTime>,
}

impl EntryInfo {
	pub fn is_hidden(&self) -> bool {
		self.name.starts_with('.')
	}

	pub fn is_dir(&self) -> bool {
		self.kind == EntryKind::Dir
	}

	pub fn is_user_executable(&self) -> bool {
		self.mode & 0o100 != 0
	}
}

/// Stats `path`, following symlinks and falling back to the link itself
/// when the target is gone.
pub fn stat(path: &Path) -> io::Result<EntryInfo> {
	let meta = std::fs::metadata(path).or_else(|_| std::fs::symlink_metadata(path))?;
	let file_type = meta.file_type();
	let kind = if file_type.is_dir() {
		EntryKind::Dir
	} else if file_type.is_file() {
		EntryKind::File
	} else if file_type.is_symlink() {
		EntryKind::Symlink
	} else {
		EntryKind::Other
	};
	let name = path
		.file_name()
		.map(OsStr::to_string_lossy)
		.unwrap_or_else(|| path.to_string_lossy())
		.into_owned();

	Ok(EntryInfo {
		name,
		kind,
		mode: meta.permissions().mode(),
		nlink: meta.nlink(),
		uid: meta.uid(),
		gid: meta.gid(),
		size: meta.size(),
		modified: meta.modified().ok(),
	})
}

/// Entries of `dir` sorted by name. Entries that vanish between listing
/// and stat are skipped.
pub fn read_dir(dir: &Path) -> io::Result<Vec<EntryInfo>> {
	let mut entries = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		match stat(&entry.path()) {
			Ok(info) => entries.push(info),
			Err(e) => tracing::warn!(path = %entry.path().display(), "stat failed: {e}"),
		}
	}
	entries.sort_by(|a, b| a.name.cmp(&b.name));
	Ok(entries)
}

/// `rwxr-x---`, coloured per bit.
pub fn permission_string(info: &EntryInfo, palette: Palette) -> String {
	const BITS: [(u32, char); 9] = [
		(0o400, 'r'),
		(0o200, 'w'),
		(0o100, 'x'),
		(0o040, 'r'),
		(0o020, 'w'),
		(0o010, 'x'),
		(0o004, 'r'),
		(0o002, 'w'),
		(0o001, 'x'),
	];
	let exec_tone = if info.is_hidden() {
		Tone::Orange
	} else {
		Tone::Green
	};

	BITS.iter()
		.map(|&(mask, ch)| {
			if info.mode & mask == 0 {
				return "-".to_string();
			}
			let tone = match ch {
				'r' => Tone::Green,
				'w' => Tone::Blue,
				_ => exec_tone,
			};
			palette.paint(tone, ch)
		})
		.collect()
}

pub fn user_name(uid: u32) -> String {
	match User::from_uid(Uid::from_raw(uid)) {
		Ok(Some(user)) => user.name,
		_ => uid.to_string(),
	}
}

pub fn group_name(gid: u32) -> String {
	match Group::from_gid(Gid::from_raw(gid)) {
		Ok(Some(group)) => group.name,
		_ => gid.to_string(),
	}
}

fn format_mtime(modified: Option<SystemTime>) -> String {
	match modified {
		Some(time) => DateTime::<Local>::from(time)
			.format("%a %b %e %H:%M:%S %Y")
			.to_string(),
		None => "?".to_string(),
	}
}

fn name_tone(info: &EntryInfo) -> Option<Tone> {
	if info.is_dir() {
		Some(Tone::Blue)
	} else if info.is_user_executable() {
		Some(if info.is_hidden() {
			Tone::Orange
		} else {
			Tone::Green
		})
	} else {
		None
	}
}

/// `ls -l`-style listing, hidden entries included, led by a `total` line
/// in kilobytes.
pub fn render_long(entries: &[EntryInfo], palette: Palette) -> String {
	let total: u64 = entries.iter().map(|e| e.size).sum();
	let mut out = format!("total {}\n", total.div_ceil(1024));

	for info in entries {
		let name = match name_tone(info) {
			Some(tone) => palette.paint(tone, &info.name),
			None => info.name.clone(),
		};
		let _ = writeln!(
			out,
			"{} {:>4} {} {} {} {} {}",
			permission_string(info, palette),
			info.nlink,
			palette.paint(Tone::Green, format!("{:>8}", user_name(info.uid))),
			palette.paint(Tone::Green, format!("{:>8}", group_name(info.gid))),
			palette.paint(Tone::Blue, format!("{:>8}", info.size)),
			format_mtime(info.modified),
			name,
		);
	}
	out
}

/// Single-line listing of visible entries; directories get `/`,
/// executables `*`.
pub fn render_short(entries: &[EntryInfo], palette: Palette) -> String {
	let names: Vec<String> = entries
		.iter()
		.filter(|e| !e.is_hidden())
		.map(|info| {
			if info.is_dir() {
				palette.paint(Tone::Blue, format!("{}/", info.name))
			} else if info.is_user_executable() {
				palette.paint(Tone::Green, format!("{}*", info.name))
			} else {
				info.name.clone()
			}
		})
		.collect();
	let mut out = names.join(" ");
	out.push('\n');
	out
}
