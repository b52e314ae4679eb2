//! Host-owned handles crossing the C ABI.
//!
//! Both handles pair an opaque `user_data` pointer with the host callback that
//! understands it. The embedder never frees either one.

use std::ffi::{CStr, c_char, c_void};
use std::ptr::{self, NonNull};

use log::warn;

/// Resolves GL entry points by name.
pub trait GlProcResolver {
    /// Returns the function pointer for `name`, or null if the host has none.
    fn get_proc_address(&self, name: &CStr) -> *const c_void;
}

impl<F> GlProcResolver for F
where
    F: Fn(&CStr) -> *const c_void,
{
    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        self(name)
    }
}

/// Asks the host to schedule another paint. Must not paint synchronously.
pub trait RepaintRequester {
    fn request_repaint(&self);
}

/// GL loader handle. Valid only for the duration of the `vtk_load_gl` call.
#[repr(C)]
#[derive(Debug)]
pub struct HostGlLoader {
    pub user_data: *mut c_void,
    pub get_proc_address:
        Option<unsafe extern "C" fn(user_data: *mut c_void, name: *const c_char) -> *const c_void>,
}

impl GlProcResolver for HostGlLoader {
    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        match self.get_proc_address {
            Some(lookup) => unsafe { lookup(self.user_data, name.as_ptr()) },
            None => ptr::null(),
        }
    }
}

/// Repaint requester handle. Must stay valid from `vtk_new` until `vtk_destroy` returns.
#[repr(C)]
#[derive(Debug)]
pub struct HostRepaintRequester {
    pub user_data: *mut c_void,
    pub request_repaint: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

/// Borrowed view of a [`HostRepaintRequester`] held for the lifetime of a surface.
#[derive(Debug)]
pub struct HostRepaintHandle(NonNull<HostRepaintRequester>);

impl HostRepaintHandle {
    /// # Safety
    /// `requester` must stay valid and unmoved until the surface holding this
    /// handle has been destroyed.
    pub unsafe fn from_raw(requester: *const HostRepaintRequester) -> Option<Self> {
        NonNull::new(requester as *mut HostRepaintRequester).map(Self)
    }
}

impl RepaintRequester for HostRepaintHandle {
    fn request_repaint(&self) {
        let requester = unsafe { self.0.as_ref() };
        match requester.request_repaint {
            Some(request) => unsafe { request(requester.user_data) },
            None => warn!("[Host] Repaint requester has no callback; repaint request dropped."),
        }
    }
}
