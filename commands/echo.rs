//! `echo`: prints its arguments separated by spaces.
//!
//! Built by `install echo` with
//! `rustc --crate-type cdylib --edition 2021 -o packages/libecho.so commands/echo.rs`.
//! The declarations below mirror `dynsh-plugin-abi` v1 so this file
//! compiles on its own.

#![allow(dead_code)]

use std::ffi::c_void;

const ABI_VERSION: u32 = 1;
static NAME: &str = "echo";

#[repr(C)]
#[derive(Clone, Copy)]
pub struct DynshStr {
    ptr: *const u8,
    len: usize,
}

impl DynshStr {
    fn new(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DynshStatus {
    Ok = 0,
    Failed = 1,
    Incompatible = 2,
    InvalidArgs = 3,
}

#[repr(C)]
pub struct DynshInvocationV1 {
    struct_size: usize,
    args: *const DynshStr,
    argc: usize,
    sink: *mut c_void,
    write_out: extern "C" fn(*mut c_void, DynshStr),
    write_err: extern "C" fn(*mut c_void, DynshStr),
}

#[repr(C)]
pub struct DynshGuestV1 {
    abi_version: u32,
    name: DynshStr,
    execute: Option<extern "C" fn(*const DynshInvocationV1) -> DynshStatus>,
}

/// # Safety
/// `out_guest` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynsh_plugin_entry_v1(
    abi_version: u32,
    out_guest: *mut DynshGuestV1,
) -> DynshStatus {
    if out_guest.is_null() {
        return DynshStatus::Failed;
    }
    let guest = DynshGuestV1 {
        abi_version: ABI_VERSION,
        name: DynshStr::new(NAME),
        execute: Some(execute),
    };
    unsafe { out_guest.write(guest) };
    if abi_version != ABI_VERSION {
        return DynshStatus::Incompatible;
    }
    DynshStatus::Ok
}

extern "C" fn execute(invocation: *const DynshInvocationV1) -> DynshStatus {
    let Some(inv) = (unsafe { invocation.as_ref() }) else {
        return DynshStatus::Failed;
    };
    let args: &[DynshStr] = if inv.args.is_null() || inv.argc == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(inv.args, inv.argc) }
    };

    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            (inv.write_out)(inv.sink, DynshStr::new(" "));
        }
        (inv.write_out)(inv.sink, *arg);
    }
    (inv.write_out)(inv.sink, DynshStr::new("\n"));
    DynshStatus::Ok
}
