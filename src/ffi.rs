//! Flat C ABI for hosts written in other languages.
//!
//! All functions must be called from one thread. State lives in a
//! thread-local slot created by `vtk_load_gl`. Any contract violation
//! (wrong order, null handle, re-entrant call from a host callback) is logged
//! and aborts the process; nothing unwinds across this boundary.

use log::{error, info};

use crate::config::EmbedderConfig;
use crate::constants::DEFAULT_LOG_FILTER;
use crate::error::EmbedderError;
use crate::host::{HostGlLoader, HostRepaintHandle, HostRepaintRequester};
use crate::init_logging;
use crate::state::{ShimSlot, ShimState};
use crate::toolkit::native::NativeToolkit;

thread_local! {
    static SHIM_SLOT: ShimSlot<NativeToolkit> = const { ShimSlot::new() };
}

fn fatal(operation: &str, err: EmbedderError) -> ! {
    init_logging(DEFAULT_LOG_FILTER);
    error!("[EmbedderABI] {} failed: {}", operation, err);
    std::process::abort();
}

fn call<R>(
    operation: &'static str,
    f: impl FnOnce(&ShimSlot<NativeToolkit>) -> Result<R, EmbedderError>,
) -> R {
    match SHIM_SLOT.with(f) {
        Ok(value) => value,
        Err(err) => fatal(operation, err),
    }
}

fn native_state() -> Result<ShimState<NativeToolkit>, EmbedderError> {
    let config = EmbedderConfig::load()
        .map_err(|err| EmbedderError::InvalidConfig(format!("{:#}", err)))?;
    init_logging(&config.log_filter);

    let lib_path = config.toolkit_library_path()?;
    let toolkit = NativeToolkit::load(&lib_path)?;
    Ok(ShimState::new(
        toolkit,
        config.interaction_style,
        config.scene,
    ))
}

/// Loads GL through the host's lookup. `loader` is not used after this returns.
///
/// # Safety
/// `loader` must point to a valid `HostGlLoader` for the duration of the call,
/// and the host's GL context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vtk_load_gl(loader: *const HostGlLoader) {
    let Some(loader) = (unsafe { loader.as_ref() }) else {
        fatal("vtk_load_gl", EmbedderError::NullHandle("GL loader"));
    };
    call("vtk_load_gl", |slot| slot.load_gl(native_state, loader));
}

/// Creates the render surface.
///
/// # Safety
/// `requester` must stay valid until `vtk_destroy` returns.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vtk_new(width: i32, height: i32, requester: *const HostRepaintRequester) {
    let Some(handle) = (unsafe { HostRepaintHandle::from_raw(requester) }) else {
        fatal("vtk_new", EmbedderError::NullHandle("repaint requester"));
    };
    call("vtk_new", |slot| slot.create(width, height, Box::new(handle)));
    info!("[EmbedderABI] Surface created ({}x{}).", width, height);
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_destroy() {
    call("vtk_destroy", |slot| slot.destroy());
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_paint() {
    call("vtk_paint", |slot| slot.paint());
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_is_dirty() -> bool {
    call("vtk_is_dirty", |slot| slot.is_dirty())
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_mouse_move(x: i32, y: i32) {
    call("vtk_mouse_move", |slot| slot.mouse_move(x, y));
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_update_mouse_down(primary: bool, secondary: bool, middle: bool) {
    call("vtk_update_mouse_down", |slot| {
        slot.update_mouse_down(primary, secondary, middle)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_mouse_wheel(delta: i32) {
    call("vtk_mouse_wheel", |slot| slot.mouse_wheel(delta));
}

#[unsafe(no_mangle)]
pub extern "C" fn vtk_set_size(width: i32, height: i32) {
    call("vtk_set_size", |slot| slot.set_size(width, height));
}

/// Writes the current surface size.
///
/// # Safety
/// Both pointers must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vtk_get_size(out_width: *mut i32, out_height: *mut i32) {
    if out_width.is_null() || out_height.is_null() {
        fatal("vtk_get_size", EmbedderError::NullHandle("size output"));
    }
    let (width, height) = call("vtk_get_size", |slot| slot.size());
    unsafe {
        *out_width = width;
        *out_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_thread_is_dirty_without_a_surface() {
        let dirty = std::thread::spawn(|| vtk_is_dirty()).join().unwrap();
        assert!(dirty);
    }
}
