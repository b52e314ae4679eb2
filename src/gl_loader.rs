//! Process-wide GL function loading.
//!
//! The host owns the GL context and the lookup; we borrow its resolver for one
//! call, fill the `gl` crate's table and let the toolkit fill its own.

use std::ffi::{CStr, CString, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::host::GlProcResolver;
use crate::toolkit::Toolkit;

static GL_LOADED: AtomicBool = AtomicBool::new(false);

/// True once [`load_gl`] has completed at least once in this process.
pub fn is_gl_loaded() -> bool {
    GL_LOADED.load(Ordering::SeqCst)
}

/// Loads GL function pointers through `resolver`.
///
/// Missing functions become unloaded entries and are not reported as an
/// error; they fail at first use. `resolver` is not retained.
pub fn load_gl<T: Toolkit>(toolkit: &mut T, resolver: &dyn GlProcResolver) {
    if GL_LOADED.load(Ordering::SeqCst) {
        warn!("[GlLoader] GL already loaded; reloading the function table.");
    }

    let mut resolved = 0usize;
    let mut missing = 0usize;
    gl::load_with(|name| {
        let Ok(c_name) = CString::new(name) else {
            return ptr::null();
        };
        let proc_addr = resolver.get_proc_address(&c_name);
        if proc_addr.is_null() {
            missing += 1;
        } else {
            resolved += 1;
        }
        proc_addr
    });
    debug!(
        "[GlLoader] Embedder table: {} resolved, {} missing.",
        resolved, missing
    );

    toolkit.load_gl(&mut |name: &CStr| -> *const c_void { resolver.get_proc_address(name) });

    GL_LOADED.store(true, Ordering::SeqCst);
    info!("[GlLoader] GL function tables loaded.");
}
