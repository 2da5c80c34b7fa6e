//! C ABI shared between the dynsh host and dynamically loaded commands.
//!
//! A plugin is a `cdylib` exporting [`DYNSH_PLUGIN_ENTRY_V1`] with the
//! signature [`DynshPluginEntryV1`]. The host calls the entry once right
//! after `dlopen`, passing [`DYNSH_PLUGIN_ABI_VERSION_V1`]; the plugin fills a
//! [`DynshGuestV1`] and returns [`DynshStatus::Ok`]. Every later invocation of
//! the command goes through [`DynshGuestV1::execute`] with a
//! [`DynshInvocationV1`] describing the arguments and the output sinks.
//!
//! Every type here is `#[repr(C)]` so plugins can redeclare the layout
//! without linking this crate (see `commands/echo.rs`).

#![allow(non_camel_case_types)]

use core::ffi::c_void;

/// Version tag of the current ABI. Bumped on any layout change.
pub const DYNSH_PLUGIN_ABI_VERSION_V1: u32 = 1;

/// Nul-terminated name of the exported entry point.
pub const DYNSH_PLUGIN_ENTRY_V1: &[u8] = b"dynsh_plugin_entry_v1\0";

/// Borrowed UTF-8 string slice.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DynshStr {
	pub ptr: *const u8,
	pub len: usize,
}

impl DynshStr {
	pub const EMPTY: Self = Self {
		ptr: core::ptr::null(),
		len: 0,
	};

	/// Borrows `s`. The result must not outlive `s`.
	pub fn new(s: &str) -> Self {
		Self {
			ptr: s.as_ptr(),
			len: s.len(),
		}
	}

	/// Views the slice as `&str`, returning `None` for invalid UTF-8.
	///
	/// # Safety
	/// `ptr` must be null or point to `len` readable bytes that stay alive
	/// and unmodified for `'a`.
	pub unsafe fn as_str<'a>(self) -> Option<&'a str> {
		if self.ptr.is_null() {
			return Some("");
		}
		let bytes = unsafe { core::slice::from_raw_parts(self.ptr, self.len) };
		core::str::from_utf8(bytes).ok()
	}
}

/// Result of an entry point or command invocation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynshStatus {
	Ok = 0,
	Failed = 1,
	Incompatible = 2,
	InvalidArgs = 3,
}

/// Writes `text` to the stream bound to `sink`.
pub type DynshWriteFn = extern "C" fn(sink: *mut c_void, text: DynshStr);

/// Arguments and output channels for a single command invocation.
///
/// `args` points to `argc` strings, not including the command name. All
/// pointers are valid only for the duration of the `execute` call.
#[repr(C)]
pub struct DynshInvocationV1 {
	pub struct_size: usize,
	pub args: *const DynshStr,
	pub argc: usize,
	pub sink: *mut c_void,
	pub write_out: DynshWriteFn,
	pub write_err: DynshWriteFn,
}

impl DynshInvocationV1 {
	/// # Safety
	/// `args`/`argc` must describe a valid array for the lifetime `'a`.
	pub unsafe fn args<'a>(&self) -> &'a [DynshStr] {
		if self.args.is_null() || self.argc == 0 {
			return &[];
		}
		unsafe { core::slice::from_raw_parts(self.args, self.argc) }
	}
}

/// Command body exported by the plugin.
pub type DynshExecuteFn = extern "C" fn(invocation: *const DynshInvocationV1) -> DynshStatus;

/// Descriptor a plugin hands back from its entry point.
///
/// `name` must point into static data of the plugin; the host reads it for
/// as long as the library stays loaded.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DynshGuestV1 {
	pub abi_version: u32,
	pub name: DynshStr,
	pub execute: Option<DynshExecuteFn>,
}

/// Signature of [`DYNSH_PLUGIN_ENTRY_V1`].
pub type DynshPluginEntryV1 =
	unsafe extern "C" fn(abi_version: u32, out_guest: *mut DynshGuestV1) -> DynshStatus;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entry_symbol_is_nul_terminated() {
		assert_eq!(DYNSH_PLUGIN_ENTRY_V1.last(), Some(&0));
		assert!(!DYNSH_PLUGIN_ENTRY_V1[..DYNSH_PLUGIN_ENTRY_V1.len() - 1].contains(&0));
	}

	#[test]
	fn status_discriminants_are_stable() {
		assert_eq!(DynshStatus::Ok as u32, 0);
		assert_eq!(DynshStatus::Failed as u32, 1);
		assert_eq!(DynshStatus::Incompatible as u32, 2);
		assert_eq!(DynshStatus::InvalidArgs as u32, 3);
	}

	#[test]
	fn str_round_trips_through_raw_parts() {
		let owned = String::from("héllo");
		let raw = DynshStr::new(&owned);
		assert_eq!(raw.len, owned.len());
		assert_eq!(unsafe { raw.as_str() }, Some("héllo"));
	}

	#[test]
	fn null_str_reads_as_empty() {
		assert_eq!(unsafe { DynshStr::EMPTY.as_str() }, Some(""));
	}

	#[test]
	fn invalid_utf8_is_rejected() {
		let bytes = [0xff, 0xfe];
		let raw = DynshStr {
			ptr: bytes.as_ptr(),
			len: bytes.len(),
		};
		assert_eq!(unsafe { raw.as_str() }, None);
	}

	#[test]
	fn invocation_without_args_yields_empty_slice() {
		extern "C" fn sink(_: *mut c_void, _: DynshStr) {}
		let inv = DynshInvocationV1 {
			struct_size: core::mem::size_of::<DynshInvocationV1>(),
			args: core::ptr::null(),
			argc: 0,
			sink: core::ptr::null_mut(),
			write_out: sink,
			write_err: sink,
		};
		assert!(unsafe { inv.args() }.is_empty());
	}
}
