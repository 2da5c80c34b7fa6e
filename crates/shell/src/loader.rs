//! Opens compiled artifacts and binds them into the registry.

use std::ffi::c_void;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use dynsh_plugin_abi::{
	DYNSH_PLUGIN_ABI_VERSION_V1, DYNSH_PLUGIN_ENTRY_V1, DynshExecuteFn, DynshGuestV1,
	DynshInvocationV1, DynshPluginEntryV1, DynshStatus, DynshStr,
};
use libloading::Library;

use crate::error::{CommandError, LoadError};
use crate::output::Streams;
use crate::registry::{ExternalCommand, Registry};

/// A command backed by a loaded shared library.
///
/// The library stays mapped for as long as this value lives; the registry
/// never drops it before process exit unless the name is re-installed.
pub struct LoadedCommand {
	name: String,
	path: PathBuf,
	execute: DynshExecuteFn,
	_lib: Library,
}

impl std::fmt::Debug for LoadedCommand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoadedCommand")
			.field("name", &self.name)
			.field("path", &self.path)
			.finish_non_exhaustive()
	}
}

impl LoadedCommand {
	/// Opens `path` and runs its entry point.
	pub fn open(name: &str, path: &Path) -> Result<Self, LoadError> {
		// A bare file name would make dlopen search the system library path.
		let path = if path.is_relative() && !path.starts_with(".") {
			Path::new(".").join(path)
		} else {
			path.to_path_buf()
		};

		let lib = unsafe { Library::new(&path) }.map_err(|e| LoadError::LoadFailed {
			path: path.clone(),
			message: e.to_string(),
		})?;

		let entry: DynshPluginEntryV1 = unsafe {
			*lib.get::<DynshPluginEntryV1>(DYNSH_PLUGIN_ENTRY_V1)
				.map_err(|e| LoadError::MissingEntry {
					path: path.clone(),
					message: e.to_string(),
				})?
		};

		let mut guest = DynshGuestV1 {
			abi_version: 0,
			name: DynshStr::EMPTY,
			execute: None,
		};
		let status = unsafe { entry(DYNSH_PLUGIN_ABI_VERSION_V1, &mut guest) };
		match status {
			DynshStatus::Ok if guest.abi_version == DYNSH_PLUGIN_ABI_VERSION_V1 => {}
			DynshStatus::Ok | DynshStatus::Incompatible => {
				return Err(LoadError::AbiMismatch {
					path,
					expected: DYNSH_PLUGIN_ABI_VERSION_V1,
					actual: guest.abi_version,
				});
			}
			status => return Err(LoadError::EntryFailed { path, status }),
		}
		let Some(execute) = guest.execute else {
			return Err(LoadError::MissingExecute { path });
		};

		match unsafe { guest.name.as_str() } {
			Some(declared) if !declared.is_empty() && declared != name => {
				tracing::debug!(name, declared, "plugin declares a different name");
			}
			_ => {}
		}

		tracing::info!(name, path = %path.display(), "loaded plugin");
		Ok(Self {
			name: name.to_string(),
			path,
			execute,
			_lib: lib,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ExternalCommand for LoadedCommand {
	fn name(&self) -> &str {
		&self.name
	}

	fn origin(&self) -> Option<&Path> {
		Some(&self.path)
	}

	fn execute(&self, args: &[&str], streams: &mut Streams<'_>) -> Result<(), CommandError> {
		let raw: Vec<DynshStr> = args.iter().map(|a| DynshStr::new(a)).collect();
		let mut sink = Sink {
			streams: &mut *streams,
			error: None,
		};
		let invocation = DynshInvocationV1 {
			struct_size: std::mem::size_of::<DynshInvocationV1>(),
			args: raw.as_ptr(),
			argc: raw.len(),
			sink: (&mut sink as *mut Sink<'_, '_>).cast::<c_void>(),
			write_out: sink_write_out,
			write_err: sink_write_err,
		};

		let status = (self.execute)(&invocation);
		if let Some(error) = sink.error.take() {
			return Err(CommandError::Output(error));
		}
		streams.out.flush()?;

		match status {
			DynshStatus::Ok => Ok(()),
			status => Err(CommandError::PluginFailed {
				name: self.name.clone(),
				status,
			}),
		}
	}
}

/// Opens `artifact` and registers it as `name`.
///
/// On failure the registry is left as it was.
pub fn load(registry: &mut Registry, name: &str, artifact: &Path) -> Result<(), LoadError> {
	let command = LoadedCommand::open(name, artifact)?;
	registry.register(name, Rc::new(command));
	Ok(())
}

struct Sink<'s, 'a> {
	streams: &'s mut Streams<'a>,
	error: Option<io::Error>,
}

impl Sink<'_, '_> {
	fn write(&mut self, to_err: bool, text: DynshStr) {
		if self.error.is_some() {
			return;
		}
		let Some(text) = (unsafe { text.as_str() }) else {
			return;
		};
		let stream = if to_err {
			&mut *self.streams.err
		} else {
			&mut *self.streams.out
		};
		if let Err(e) = stream.write_all(text.as_bytes()) {
			self.error = Some(e);
		}
	}
}

extern "C" fn sink_write_out(sink: *mut c_void, text: DynshStr) {
	if let Some(sink) = unsafe { sink.cast::<Sink<'_, '_>>().as_mut() } {
		sink.write(false, text);
	}
}

extern "C" fn sink_write_err(sink: *mut c_void, text: DynshStr) {
	if let Some(sink) = unsafe { sink.cast::<Sink<'_, '_>>().as_mut() } {
		sink.write(true, text);
	}
}
