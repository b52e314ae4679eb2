//! Shared names and placeholder scene defaults.

use std::ffi::CStr;

/// Environment variable pointing at an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VTK_EMBEDDER_CONFIG";

/// Default log filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Library stem of the toolkit bridge; the platform prefix/suffix is added at load time.
pub const TOOLKIT_BRIDGE_LIBRARY_STEM: &str = "vtk_bridge";

/// Placeholder cube colour (RGB, 0..1).
pub const PLACEHOLDER_CUBE_COLOR: [f64; 3] = [0.8, 0.2, 0.2];

/// Placeholder cube rotation about X, then Y, in degrees.
pub const PLACEHOLDER_CUBE_ROTATE_X: f64 = 45.0;
pub const PLACEHOLDER_CUBE_ROTATE_Y: f64 = 45.0;

// Toolkit command names, resolved by the bridge through the toolkit's own
// string-to-event-id table.
pub const WINDOW_IS_CURRENT_EVENT: &CStr = c"WindowIsCurrentEvent";
pub const WINDOW_FRAME_EVENT: &CStr = c"WindowFrameEvent";
