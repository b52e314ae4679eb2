//! GL state the host expects to survive a toolkit render.

use gl::types::GLint;
use log::trace;

/// Restores the host's framebuffer binding and viewport when dropped.
///
/// The toolkit is free to rebind both while rendering; the host expects its
/// own target to still be bound once paint returns.
pub struct ScopedGlState {
    framebuffer: GLint,
    viewport: [GLint; 4],
}

impl ScopedGlState {
    /// Captures the current state, or `None` when the entry points needed to
    /// save and restore it were never resolved.
    pub fn capture() -> Option<Self> {
        if !Self::entry_points_loaded() {
            return None;
        }

        let mut framebuffer: GLint = 0;
        let mut viewport: [GLint; 4] = [0; 4];
        unsafe {
            gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut framebuffer);
            gl::GetIntegerv(gl::VIEWPORT, viewport.as_mut_ptr());
        }
        trace!(
            "[GlState] Captured framebuffer {} viewport {:?}",
            framebuffer, viewport
        );

        Some(Self {
            framebuffer,
            viewport,
        })
    }

    fn entry_points_loaded() -> bool {
        gl::GetIntegerv::is_loaded() && gl::BindFramebuffer::is_loaded() && gl::Viewport::is_loaded()
    }
}

impl Drop for ScopedGlState {
    fn drop(&mut self) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.framebuffer as u32);
            gl::Viewport(
                self.viewport[0],
                self.viewport[1],
                self.viewport[2],
                self.viewport[3],
            );
        }
    }
}
