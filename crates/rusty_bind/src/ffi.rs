//! Raw declarations of the host's C boundary.
//!
//! The host owns every `IInterface` and `IPlugin`; only pointers cross the
//! boundary and their layout is never inspected on this side.

use std::ffi::c_char;
use std::marker::{PhantomData, PhantomPinned};

/// Opaque host interface instance (`plugin::IInterface`)
#[repr(C)]
pub struct IInterface {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Opaque host plugin slot (`plugin::IPlugin`)
#[repr(C)]
pub struct IPlugin {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

extern "C" {
    pub fn interface_shutdown(interface: *mut IInterface);
    pub fn interface_get_name(interface: *mut IInterface) -> *const c_char;
    pub fn interface_get_frame(interface: *mut IInterface) -> u64;
    pub fn interface_get_position_x(interface: *mut IInterface) -> f64;
    pub fn interface_get_position_y(interface: *mut IInterface) -> f64;
    pub fn interface_get_position_z(interface: *mut IInterface) -> f64;
}
