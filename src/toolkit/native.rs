//! Toolkit backed by the dynamically loaded bridge library.

use std::ffi::{CStr, c_char, c_void};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::constants::{WINDOW_FRAME_EVENT, WINDOW_IS_CURRENT_EVENT};
use crate::error::EmbedderError;
use crate::toolkit::bridge_loader::{BridgeObserverCallback, ToolkitBridge};
use crate::toolkit::{
    InteractionStyle, Interactor, InteractorEvent, RenderWindow, SceneSpec, Toolkit,
    WindowObserver,
};

type ResolveFn<'a> = &'a mut dyn FnMut(&CStr) -> *const c_void;

unsafe extern "C" fn proc_resolver_trampoline(
    user_data: *mut c_void,
    name: *const c_char,
) -> *const c_void {
    if user_data.is_null() || name.is_null() {
        return std::ptr::null();
    }
    let resolve = unsafe { &mut *(user_data as *mut ResolveFn<'_>) };
    resolve(unsafe { CStr::from_ptr(name) })
}

unsafe extern "C" fn is_current_trampoline(client_data: *mut c_void, call_data: *mut c_void) {
    if client_data.is_null() || call_data.is_null() {
        return;
    }
    let observer = unsafe { &mut *(client_data as *mut WindowObserver) };
    if let WindowObserver::IsCurrent(answer) = observer {
        unsafe { *(call_data as *mut bool) = answer() };
    }
}

unsafe extern "C" fn frame_requested_trampoline(client_data: *mut c_void, _call_data: *mut c_void) {
    if client_data.is_null() {
        return;
    }
    let observer = unsafe { &mut *(client_data as *mut WindowObserver) };
    if let WindowObserver::FrameRequested(request) = observer {
        request();
    }
}

pub struct NativeToolkit {
    bridge: Arc<ToolkitBridge>,
}

impl NativeToolkit {
    pub fn load(lib_path: &Path) -> Result<Self, EmbedderError> {
        let bridge = ToolkitBridge::get_for(lib_path)?;
        info!("[NativeToolkit] Bridge loaded from {}", lib_path.display());
        Ok(Self { bridge })
    }
}

/// Observers handed to the toolkit as client data.
///
/// Each one is leaked with `Box::into_raw`; the toolkit holds that pointer
/// until the slots are dropped and reclaim it.
#[derive(Default)]
struct ObserverSlots(Vec<*mut WindowObserver>);

struct ObserverRegistration {
    event: &'static CStr,
    callback: BridgeObserverCallback,
    client_data: *mut c_void,
}

impl ObserverSlots {
    fn register(&mut self, observer: WindowObserver) -> ObserverRegistration {
        let (event, callback) = match &observer {
            WindowObserver::IsCurrent(_) => (
                WINDOW_IS_CURRENT_EVENT,
                is_current_trampoline as BridgeObserverCallback,
            ),
            WindowObserver::FrameRequested(_) => (
                WINDOW_FRAME_EVENT,
                frame_requested_trampoline as BridgeObserverCallback,
            ),
        };
        let raw = Box::into_raw(Box::new(observer));
        self.0.push(raw);
        ObserverRegistration {
            event,
            callback,
            client_data: raw as *mut c_void,
        }
    }
}

impl Drop for ObserverSlots {
    fn drop(&mut self) {
        for raw in self.0.drain(..) {
            unsafe { drop(Box::from_raw(raw)) };
        }
    }
}

pub struct NativeRenderWindow {
    bridge: Arc<ToolkitBridge>,
    handle: NonNull<c_void>,
    // Dropped after `Drop::drop` has deleted the toolkit window, so no
    // callback can reach a freed observer.
    observers: ObserverSlots,
}

impl RenderWindow for NativeRenderWindow {
    fn set_size(&mut self, width: i32, height: i32) {
        unsafe { (self.bridge.vtkBridgeRenderWindowSetSize)(self.handle.as_ptr(), width, height) };
    }

    fn add_observer(&mut self, observer: WindowObserver) {
        let registration = self.observers.register(observer);
        let tag = unsafe {
            (self.bridge.vtkBridgeRenderWindowAddObserver)(
                self.handle.as_ptr(),
                registration.event.as_ptr(),
                registration.callback,
                registration.client_data,
            )
        };
        debug!(
            "[NativeToolkit] Observer for {:?} registered (tag {}).",
            registration.event, tag
        );
    }

    fn render(&mut self) {
        unsafe { (self.bridge.vtkBridgeRenderWindowRender)(self.handle.as_ptr()) };
    }
}

impl Drop for NativeRenderWindow {
    fn drop(&mut self) {
        unsafe { (self.bridge.vtkBridgeRenderWindowDelete)(self.handle.as_ptr()) };
        debug!("[NativeToolkit] Render window released.");
    }
}

pub struct NativeInteractor {
    bridge: Arc<ToolkitBridge>,
    handle: NonNull<c_void>,
}

impl Interactor for NativeInteractor {
    fn set_event_position(&mut self, x: i32, y: i32) {
        unsafe { (self.bridge.vtkBridgeInteractorSetEventPosition)(self.handle.as_ptr(), x, y) };
    }

    fn set_size(&mut self, width: i32, height: i32) {
        unsafe { (self.bridge.vtkBridgeInteractorSetSize)(self.handle.as_ptr(), width, height) };
    }

    fn invoke_event(&mut self, event: InteractorEvent) {
        unsafe {
            (self.bridge.vtkBridgeInteractorInvokeEvent)(
                self.handle.as_ptr(),
                event.command_name().as_ptr(),
            )
        };
    }
}

impl Drop for NativeInteractor {
    fn drop(&mut self) {
        unsafe { (self.bridge.vtkBridgeInteractorDelete)(self.handle.as_ptr()) };
        debug!("[NativeToolkit] Interactor released.");
    }
}

impl Toolkit for NativeToolkit {
    type Window = NativeRenderWindow;
    type Interactor = NativeInteractor;

    fn load_gl(&mut self, resolve: &mut dyn FnMut(&CStr) -> *const c_void) {
        let mut resolve: ResolveFn<'_> = resolve;
        let user_data = &mut resolve as *mut ResolveFn<'_> as *mut c_void;
        let version = unsafe { (self.bridge.vtkBridgeLoadGL)(proc_resolver_trampoline, user_data) };
        if version == 0 {
            warn!("[NativeToolkit] Toolkit GL loader reported failure; continuing.");
        } else {
            info!("[NativeToolkit] Toolkit GL loaded (version code {}).", version);
        }
    }

    fn create_render_window(
        &mut self,
        width: i32,
        height: i32,
    ) -> Result<Self::Window, EmbedderError> {
        let raw = unsafe { (self.bridge.vtkBridgeRenderWindowNew)() };
        let handle = NonNull::new(raw).ok_or_else(|| {
            EmbedderError::ToolkitFailed("render window creation returned null".to_string())
        })?;
        let mut window = NativeRenderWindow {
            bridge: self.bridge.clone(),
            handle,
            observers: ObserverSlots::default(),
        };
        window.set_size(width, height);
        Ok(window)
    }

    fn populate_scene(
        &mut self,
        window: &mut Self::Window,
        scene: &SceneSpec,
    ) -> Result<(), EmbedderError> {
        let renderer = unsafe {
            (self.bridge.vtkBridgeRendererNew)(
                window.handle.as_ptr(),
                scene.renderer.reset_camera,
                scene.renderer.automatic_light_creation,
            )
        };
        if renderer.is_null() {
            return Err(EmbedderError::ToolkitFailed(
                "renderer creation returned null".to_string(),
            ));
        }

        for actor in &scene.actors {
            let [red, green, blue] = actor.color;
            let added = unsafe {
                (self.bridge.vtkBridgeRendererAddActor)(
                    renderer,
                    actor.source.class_name().as_ptr(),
                    actor.rotate_x,
                    actor.rotate_y,
                    red,
                    green,
                    blue,
                )
            };
            if added == 0 {
                return Err(EmbedderError::ToolkitFailed(format!(
                    "toolkit rejected actor {:?}",
                    actor
                )));
            }
        }
        Ok(())
    }

    fn create_interactor(
        &mut self,
        window: &mut Self::Window,
        style: InteractionStyle,
    ) -> Result<Self::Interactor, EmbedderError> {
        let raw = unsafe {
            (self.bridge.vtkBridgeInteractorNew)(window.handle.as_ptr(), style.class_name().as_ptr())
        };
        let handle = NonNull::new(raw).ok_or_else(|| {
            EmbedderError::ToolkitFailed("interactor creation returned null".to_string())
        })?;
        Ok(NativeInteractor {
            bridge: self.bridge.clone(),
            handle,
        })
    }
}
