//! The rendering toolkit as seen from the embedder.
//!
//! The toolkit owns the render window, renderer, camera, interactor and scene
//! graph. The embedder only forwards calls into it and receives two kinds of
//! callbacks back ([`WindowObserver`]). Everything behind these traits is the
//! toolkit's business.

use std::ffi::{CStr, c_void};

use serde::{Deserialize, Serialize};

use crate::constants::{
    PLACEHOLDER_CUBE_COLOR, PLACEHOLDER_CUBE_ROTATE_X, PLACEHOLDER_CUBE_ROTATE_Y,
};
use crate::error::EmbedderError;

pub mod bridge_loader;
pub mod headless;
pub mod native;

/// Events the embedder raises on the interactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractorEvent {
    MouseMove,
    LeftButtonPress,
    LeftButtonRelease,
    RightButtonPress,
    RightButtonRelease,
    MiddleButtonPress,
    MiddleButtonRelease,
    MouseWheelForward,
    MouseWheelBackward,
}

impl InteractorEvent {
    /// Toolkit command name for this event.
    pub fn command_name(self) -> &'static CStr {
        match self {
            InteractorEvent::MouseMove => c"MouseMoveEvent",
            InteractorEvent::LeftButtonPress => c"LeftButtonPressEvent",
            InteractorEvent::LeftButtonRelease => c"LeftButtonReleaseEvent",
            InteractorEvent::RightButtonPress => c"RightButtonPressEvent",
            InteractorEvent::RightButtonRelease => c"RightButtonReleaseEvent",
            InteractorEvent::MiddleButtonPress => c"MiddleButtonPressEvent",
            InteractorEvent::MiddleButtonRelease => c"MiddleButtonReleaseEvent",
            InteractorEvent::MouseWheelForward => c"MouseWheelForwardEvent",
            InteractorEvent::MouseWheelBackward => c"MouseWheelBackwardEvent",
        }
    }

    /// Maps a wheel delta onto a wheel event; zero maps to nothing.
    pub fn from_wheel_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(InteractorEvent::MouseWheelForward),
            -1 => Some(InteractorEvent::MouseWheelBackward),
            _ => None,
        }
    }
}

/// Callbacks the embedder registers on a render window.
pub enum WindowObserver {
    /// Asked whenever the toolkit wants to know if its GL context is current.
    IsCurrent(Box<dyn FnMut() -> bool>),
    /// Raised when toolkit state changed and a new frame is needed.
    /// Runs synchronously, possibly from inside `RenderWindow::render`.
    FrameRequested(Box<dyn FnMut()>),
}

impl std::fmt::Debug for WindowObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowObserver::IsCurrent(_) => f.write_str("WindowObserver::IsCurrent"),
            WindowObserver::FrameRequested(_) => f.write_str("WindowObserver::FrameRequested"),
        }
    }
}

/// Interactor style installed on a freshly created interactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionStyle {
    #[default]
    TrackballCamera,
    JoystickCamera,
    TrackballActor,
}

impl InteractionStyle {
    pub fn class_name(self) -> &'static CStr {
        match self {
            InteractionStyle::TrackballCamera => c"vtkInteractorStyleTrackballCamera",
            InteractionStyle::JoystickCamera => c"vtkInteractorStyleJoystickCamera",
            InteractionStyle::TrackballActor => c"vtkInteractorStyleTrackballActor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometrySource {
    #[default]
    Cube,
}

impl GeometrySource {
    pub fn class_name(self) -> &'static CStr {
        match self {
            GeometrySource::Cube => c"vtkCubeSource",
        }
    }
}

/// One actor of the scene, described for the toolkit to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSpec {
    pub source: GeometrySource,
    /// Rotation about X in degrees, applied before `rotate_y`.
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub color: [f64; 3],
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            source: GeometrySource::Cube,
            rotate_x: PLACEHOLDER_CUBE_ROTATE_X,
            rotate_y: PLACEHOLDER_CUBE_ROTATE_Y,
            color: PLACEHOLDER_CUBE_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSpec {
    pub reset_camera: bool,
    pub automatic_light_creation: bool,
}

impl Default for RendererSpec {
    fn default() -> Self {
        Self {
            reset_camera: true,
            automatic_light_creation: true,
        }
    }
}

/// Scene content placed in the render window at creation time.
///
/// The default is the placeholder scene: one rotated red cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub renderer: RendererSpec,
    pub actors: Vec<ActorSpec>,
}

impl Default for SceneSpec {
    fn default() -> Self {
        Self {
            renderer: RendererSpec::default(),
            actors: vec![ActorSpec::default()],
        }
    }
}

/// A render window owned by the toolkit.
pub trait RenderWindow {
    fn set_size(&mut self, width: i32, height: i32);
    fn add_observer(&mut self, observer: WindowObserver);
    /// Draws one frame into whatever framebuffer is bound.
    fn render(&mut self);
}

/// An interactor bound to a render window.
pub trait Interactor {
    fn set_event_position(&mut self, x: i32, y: i32);
    fn set_size(&mut self, width: i32, height: i32);
    fn invoke_event(&mut self, event: InteractorEvent);
}

/// Factory for the toolkit objects that make up one embedded surface.
pub trait Toolkit {
    type Window: RenderWindow;
    type Interactor: Interactor;

    /// Lets the toolkit resolve its own GL entry points.
    /// `resolve` is only valid for the duration of this call.
    fn load_gl(&mut self, resolve: &mut dyn FnMut(&CStr) -> *const c_void);

    fn create_render_window(&mut self, width: i32, height: i32)
    -> Result<Self::Window, EmbedderError>;

    /// Adds a renderer (camera included) and the scene's actors to `window`.
    fn populate_scene(
        &mut self,
        window: &mut Self::Window,
        scene: &SceneSpec,
    ) -> Result<(), EmbedderError>;

    fn create_interactor(
        &mut self,
        window: &mut Self::Window,
        style: InteractionStyle,
    ) -> Result<Self::Interactor, EmbedderError>;
}
