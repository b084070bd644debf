//! In-process stand-in for the host side of the C boundary.
//!
//! Defines the `interface_*` symbols the real host exports, interpreting the
//! opaque pointer as a [`FakeHost`]. Only compiled for tests or with the
//! `fake-host` feature; a production build must resolve them from the host.

use std::ffi::{c_char, CString};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use contracts::Position;

use crate::ffi::{IInterface, IPlugin};

/// Host-owned instance behind an `IInterface` pointer
#[derive(Debug)]
pub struct FakeHost {
    name: Option<CString>,
    frame: AtomicU64,
    position: Mutex<Position>,
    shutdown_requests: AtomicU32,
}

impl FakeHost {
    /// Instance with the given name (interior NULs are stripped)
    pub fn new(name: &str) -> Self {
        let bytes: Vec<u8> = name.bytes().filter(|b| *b != 0).collect();
        Self::with_name_bytes(bytes)
    }

    /// Instance whose name is arbitrary bytes (must not contain NUL)
    pub fn with_name_bytes(bytes: Vec<u8>) -> Self {
        Self::build(CString::new(bytes).ok())
    }

    /// Instance whose name accessor returns a null pointer
    pub fn unnamed() -> Self {
        Self::build(None)
    }

    fn build(name: Option<CString>) -> Self {
        Self {
            name,
            frame: AtomicU64::new(0),
            position: Mutex::new(Position::default()),
            shutdown_requests: AtomicU32::new(0),
        }
    }

    /// Opaque pointer handed to the plugin
    pub fn as_ptr(&self) -> *mut IInterface {
        self as *const FakeHost as *mut IInterface
    }

    pub fn set_frame(&self, frame: u64) {
        self.frame.store(frame, Ordering::SeqCst);
    }

    /// Step to the next frame, returning it
    pub fn advance(&self) -> u64 {
        self.frame.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn set_position(&self, position: Position) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }

    /// Number of `interface_shutdown` calls received
    pub fn shutdown_requests(&self) -> u32 {
        self.shutdown_requests.load(Ordering::SeqCst)
    }

    fn position(&self) -> Position {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host-owned plugin slot; only its address matters
#[derive(Debug)]
pub struct FakePluginSlot {
    slot: Box<u8>,
}

impl FakePluginSlot {
    pub fn new() -> Self {
        Self { slot: Box::new(0) }
    }

    /// Opaque pointer handed to the plugin
    pub fn as_ptr(&self) -> *mut IPlugin {
        &*self.slot as *const u8 as *mut IPlugin
    }
}

impl Default for FakePluginSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// # Safety
/// `interface` must come from [`FakeHost::as_ptr`] on a live instance.
unsafe fn host<'a>(interface: *mut IInterface) -> &'a FakeHost {
    &*(interface as *const FakeHost)
}

#[no_mangle]
pub unsafe extern "C" fn interface_shutdown(interface: *mut IInterface) {
    host(interface)
        .shutdown_requests
        .fetch_add(1, Ordering::SeqCst);
}

#[no_mangle]
pub unsafe extern "C" fn interface_get_name(interface: *mut IInterface) -> *const c_char {
    match &host(interface).name {
        Some(name) => name.as_ptr(),
        None => std::ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn interface_get_frame(interface: *mut IInterface) -> u64 {
    host(interface).frame.load(Ordering::SeqCst)
}

#[no_mangle]
pub unsafe extern "C" fn interface_get_position_x(interface: *mut IInterface) -> f64 {
    host(interface).position().x
}

#[no_mangle]
pub unsafe extern "C" fn interface_get_position_y(interface: *mut IInterface) -> f64 {
    host(interface).position().y
}

#[no_mangle]
pub unsafe extern "C" fn interface_get_position_z(interface: *mut IInterface) -> f64 {
    host(interface).position().z
}
