//! Safe wrapper over a borrowed `IInterface` pointer

use std::ffi::CStr;
use std::marker::PhantomData;
use std::ptr::NonNull;

use contracts::{HostInterface, Position};

use crate::ffi;

/// Host interface borrowed for the duration of one host callback
pub struct Interface<'a> {
    raw: NonNull<ffi::IInterface>,
    _borrow: PhantomData<&'a ffi::IInterface>,
}

impl<'a> Interface<'a> {
    /// Wrap a raw host pointer; `None` for null
    ///
    /// # Safety
    /// A non-null `raw` must point to a live host instance for all of `'a`.
    pub unsafe fn from_raw(raw: *mut ffi::IInterface) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self {
            raw,
            _borrow: PhantomData,
        })
    }

    /// The wrapped pointer
    pub fn as_ptr(&self) -> *mut ffi::IInterface {
        self.raw.as_ptr()
    }
}

impl std::fmt::Debug for Interface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Interface").field(&self.raw).finish()
    }
}

// SAFETY (all calls below): `raw` is non-null and live for `'a` per `from_raw`.
impl HostInterface for Interface<'_> {
    fn name(&self) -> String {
        let name = unsafe { ffi::interface_get_name(self.as_ptr()) };
        if name.is_null() {
            return String::new();
        }
        // The host keeps ownership of the text; copy it out before returning.
        unsafe { CStr::from_ptr(name) }
            .to_string_lossy()
            .into_owned()
    }

    fn frame(&self) -> u64 {
        unsafe { ffi::interface_get_frame(self.as_ptr()) }
    }

    fn position(&self) -> Position {
        unsafe {
            Position::new(
                ffi::interface_get_position_x(self.as_ptr()),
                ffi::interface_get_position_y(self.as_ptr()),
                ffi::interface_get_position_z(self.as_ptr()),
            )
        }
    }

    fn shutdown(&self) {
        unsafe { ffi::interface_shutdown(self.as_ptr()) }
    }
}
