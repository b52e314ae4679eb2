#![allow(non_snake_case)] // field names mirror the exported bridge symbols

use anyhow::{Context, Result};
use libloading::{Library, Symbol};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    ffi::{c_char, c_int, c_ulong, c_void},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::constants::TOOLKIT_BRIDGE_LIBRARY_STEM;

/// Resolver handed to the bridge while it loads its GL table.
pub type BridgeProcResolver =
    unsafe extern "C" fn(user_data: *mut c_void, name: *const c_char) -> *const c_void;

/// Observer callback registered on a bridge render window.
/// `call_data` is event specific; for `WindowIsCurrentEvent` it points at a C `bool`.
pub type BridgeObserverCallback =
    unsafe extern "C" fn(client_data: *mut c_void, call_data: *mut c_void);

/// Function table of the toolkit bridge library.
///
/// The bridge is a thin C ABI wrapper compiled against the toolkit; every
/// handle it returns is an opaque toolkit object pointer.
#[derive(Debug)]
pub struct ToolkitBridge {
    _lib: &'static Library,

    pub vtkBridgeLoadGL: Symbol<
        'static,
        unsafe extern "C" fn(resolver: BridgeProcResolver, user_data: *mut c_void) -> c_int,
    >,

    pub vtkBridgeRenderWindowNew: Symbol<'static, unsafe extern "C" fn() -> *mut c_void>,
    pub vtkBridgeRenderWindowDelete: Symbol<'static, unsafe extern "C" fn(window: *mut c_void)>,
    pub vtkBridgeRenderWindowSetSize:
        Symbol<'static, unsafe extern "C" fn(window: *mut c_void, width: c_int, height: c_int)>,
    pub vtkBridgeRenderWindowRender: Symbol<'static, unsafe extern "C" fn(window: *mut c_void)>,
    pub vtkBridgeRenderWindowAddObserver: Symbol<
        'static,
        unsafe extern "C" fn(
            window: *mut c_void,
            event: *const c_char,
            callback: BridgeObserverCallback,
            client_data: *mut c_void,
        ) -> c_ulong,
    >,

    /// Returns a renderer owned by `window`, or null.
    pub vtkBridgeRendererNew: Symbol<
        'static,
        unsafe extern "C" fn(
            window: *mut c_void,
            reset_camera: bool,
            automatic_light_creation: bool,
        ) -> *mut c_void,
    >,
    /// Returns 0 when the source class is unknown to the toolkit.
    pub vtkBridgeRendererAddActor: Symbol<
        'static,
        unsafe extern "C" fn(
            renderer: *mut c_void,
            source: *const c_char,
            rotate_x: f64,
            rotate_y: f64,
            red: f64,
            green: f64,
            blue: f64,
        ) -> c_int,
    >,

    pub vtkBridgeInteractorNew: Symbol<
        'static,
        unsafe extern "C" fn(window: *mut c_void, style: *const c_char) -> *mut c_void,
    >,
    pub vtkBridgeInteractorDelete:
        Symbol<'static, unsafe extern "C" fn(interactor: *mut c_void)>,
    pub vtkBridgeInteractorSetEventPosition:
        Symbol<'static, unsafe extern "C" fn(interactor: *mut c_void, x: c_int, y: c_int)>,
    pub vtkBridgeInteractorSetSize: Symbol<
        'static,
        unsafe extern "C" fn(interactor: *mut c_void, width: c_int, height: c_int),
    >,
    pub vtkBridgeInteractorInvokeEvent:
        Symbol<'static, unsafe extern "C" fn(interactor: *mut c_void, event: *const c_char)>,
}

static BRIDGE_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<ToolkitBridge>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Platform file name of the bridge, e.g. `libvtk_bridge.so` or `vtk_bridge.dll`.
pub fn default_library_name() -> String {
    libloading::library_filename(TOOLKIT_BRIDGE_LIBRARY_STEM)
        .to_string_lossy()
        .into_owned()
}

/// Resolves the bridge path: `dir` if given, else the directory of the running executable.
pub fn resolve_library_path(dir: Option<&Path>, file_name: &str) -> Result<PathBuf> {
    let lib_dir = if let Some(d) = dir {
        d.to_path_buf()
    } else {
        std::env::current_exe()
            .context("Failed to get current exe path")?
            .parent()
            .map(PathBuf::from)
            .context("Exe has no parent directory")?
    };
    Ok(lib_dir.join(file_name))
}

impl ToolkitBridge {
    pub fn load(lib_path: &Path) -> Result<Self> {
        // Symbols borrow the library for 'static; the library is never unloaded.
        let lib_static: &'static Library = Box::leak(Box::new(
            unsafe { Library::new(lib_path) }
                .with_context(|| format!("Failed to load {}", lib_path.display()))?,
        ));

        macro_rules! load_symbol {
            ($lib:expr, $name:expr) => {
                unsafe { $lib.get($name) }.with_context(|| {
                    format!(
                        "Missing symbol: {} in {}",
                        String::from_utf8_lossy($name),
                        lib_path.display()
                    )
                })
            };
        }

        Ok(ToolkitBridge {
            _lib: lib_static,
            vtkBridgeLoadGL: load_symbol!(lib_static, b"vtkBridgeLoadGL\0")?,
            vtkBridgeRenderWindowNew: load_symbol!(lib_static, b"vtkBridgeRenderWindowNew\0")?,
            vtkBridgeRenderWindowDelete: load_symbol!(
                lib_static,
                b"vtkBridgeRenderWindowDelete\0"
            )?,
            vtkBridgeRenderWindowSetSize: load_symbol!(
                lib_static,
                b"vtkBridgeRenderWindowSetSize\0"
            )?,
            vtkBridgeRenderWindowRender: load_symbol!(
                lib_static,
                b"vtkBridgeRenderWindowRender\0"
            )?,
            vtkBridgeRenderWindowAddObserver: load_symbol!(
                lib_static,
                b"vtkBridgeRenderWindowAddObserver\0"
            )?,
            vtkBridgeRendererNew: load_symbol!(lib_static, b"vtkBridgeRendererNew\0")?,
            vtkBridgeRendererAddActor: load_symbol!(lib_static, b"vtkBridgeRendererAddActor\0")?,
            vtkBridgeInteractorNew: load_symbol!(lib_static, b"vtkBridgeInteractorNew\0")?,
            vtkBridgeInteractorDelete: load_symbol!(lib_static, b"vtkBridgeInteractorDelete\0")?,
            vtkBridgeInteractorSetEventPosition: load_symbol!(
                lib_static,
                b"vtkBridgeInteractorSetEventPosition\0"
            )?,
            vtkBridgeInteractorSetSize: load_symbol!(
                lib_static,
                b"vtkBridgeInteractorSetSize\0"
            )?,
            vtkBridgeInteractorInvokeEvent: load_symbol!(
                lib_static,
                b"vtkBridgeInteractorInvokeEvent\0"
            )?,
        })
    }

    /// Loads the bridge at `lib_path` once per process and hands out shared copies.
    pub fn get_for(lib_path: &Path) -> Result<Arc<Self>> {
        let mut cache = BRIDGE_CACHE.lock();

        if let Some(existing) = cache.get(lib_path) {
            return Ok(existing.clone());
        }

        let bridge = Self::load(lib_path).with_context(|| {
            format!("Failed to load toolkit bridge from {}", lib_path.display())
        })?;
        let arc_bridge = Arc::new(bridge);
        cache.insert(lib_path.to_path_buf(), arc_bridge.clone());
        Ok(arc_bridge)
    }
}
