//! Lifecycle bookkeeping behind the flat C ABI.
//!
//! Holds the toolkit, the configured scene and at most one surface, and turns
//! out-of-order calls into [`EmbedderError`]s.

use std::cell::RefCell;

use log::{info, warn};

use crate::error::EmbedderError;
use crate::gl_loader;
use crate::host::{GlProcResolver, RepaintRequester};
use crate::surface::EmbeddedSurface;
use crate::toolkit::{InteractionStyle, SceneSpec, Toolkit};

pub struct ShimState<T: Toolkit> {
    toolkit: T,
    gl_loaded: bool,
    style: InteractionStyle,
    scene: SceneSpec,
    surface: Option<EmbeddedSurface<T>>,
}

impl<T: Toolkit> ShimState<T> {
    pub fn new(toolkit: T, style: InteractionStyle, scene: SceneSpec) -> Self {
        Self {
            toolkit,
            gl_loaded: false,
            style,
            scene,
            surface: None,
        }
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn load_gl(&mut self, resolver: &dyn GlProcResolver) {
        if self.surface.is_some() {
            warn!("[ShimState] Reloading GL while a surface exists.");
        }
        gl_loader::load_gl(&mut self.toolkit, resolver);
        self.gl_loaded = true;
    }

    pub fn create(
        &mut self,
        width: i32,
        height: i32,
        requester: Box<dyn RepaintRequester>,
    ) -> Result<(), EmbedderError> {
        if !self.gl_loaded {
            return Err(EmbedderError::GlNotLoaded);
        }
        if self.surface.is_some() {
            return Err(EmbedderError::SurfaceExists);
        }
        let surface = EmbeddedSurface::new(
            &mut self.toolkit,
            width,
            height,
            requester,
            self.style,
            &self.scene,
        )?;
        self.surface = Some(surface);
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), EmbedderError> {
        let surface = self.surface.take().ok_or(EmbedderError::NoSurface)?;
        surface.destroy();
        info!("[ShimState] Surface destroyed; ready for a new one.");
        Ok(())
    }

    /// Dirty flag of the current surface. Without a surface this reports
    /// `true`, the state any new surface starts in.
    pub fn is_dirty(&self) -> bool {
        self.surface.as_ref().map_or(true, |surface| surface.is_dirty())
    }

    pub fn paint(&mut self) -> Result<(), EmbedderError> {
        self.surface_mut()?.paint();
        Ok(())
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), EmbedderError> {
        self.surface_mut()?.mouse_move(x, y);
        Ok(())
    }

    pub fn update_mouse_down(
        &mut self,
        primary: bool,
        secondary: bool,
        middle: bool,
    ) -> Result<(), EmbedderError> {
        self.surface_mut()?
            .update_mouse_down(primary, secondary, middle);
        Ok(())
    }

    pub fn mouse_wheel(&mut self, delta: i32) -> Result<(), EmbedderError> {
        self.surface_mut()?.mouse_wheel(delta);
        Ok(())
    }

    pub fn set_size(&mut self, width: i32, height: i32) -> Result<(), EmbedderError> {
        self.surface_mut()?.set_size(width, height);
        Ok(())
    }

    pub fn size(&self) -> Result<(i32, i32), EmbedderError> {
        self.surface
            .as_ref()
            .map(|surface| surface.size())
            .ok_or(EmbedderError::NoSurface)
    }

    fn surface_mut(&mut self) -> Result<&mut EmbeddedSurface<T>, EmbedderError> {
        self.surface.as_mut().ok_or(EmbedderError::NoSurface)
    }
}

/// Single-threaded home of a [`ShimState`], created lazily by the first
/// `load_gl`. Every call borrows the slot for its whole duration, so a host
/// callback that calls back in gets [`EmbedderError::ReentrantCall`].
pub struct ShimSlot<T: Toolkit>(RefCell<Option<ShimState<T>>>);

impl<T: Toolkit> Default for ShimSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolkit> ShimSlot<T> {
    pub const fn new() -> Self {
        Self(RefCell::new(None))
    }

    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut Option<ShimState<T>>) -> Result<R, EmbedderError>,
    ) -> Result<R, EmbedderError> {
        let mut slot = self
            .0
            .try_borrow_mut()
            .map_err(|_| EmbedderError::ReentrantCall)?;
        f(&mut slot)
    }

    fn with_state<R>(
        &self,
        missing: EmbedderError,
        f: impl FnOnce(&mut ShimState<T>) -> Result<R, EmbedderError>,
    ) -> Result<R, EmbedderError> {
        self.with(|slot| f(slot.as_mut().ok_or(missing)?))
    }

    /// Builds the state with `init` on first use, then loads GL into it.
    pub fn load_gl(
        &self,
        init: impl FnOnce() -> Result<ShimState<T>, EmbedderError>,
        resolver: &dyn GlProcResolver,
    ) -> Result<(), EmbedderError> {
        self.with(|slot| {
            let state = match slot.take() {
                Some(state) => state,
                None => init()?,
            };
            slot.insert(state).load_gl(resolver);
            Ok(())
        })
    }

    pub fn create(
        &self,
        width: i32,
        height: i32,
        requester: Box<dyn RepaintRequester>,
    ) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::GlNotLoaded, |state| {
            state.create(width, height, requester)
        })
    }

    pub fn destroy(&self) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.destroy())
    }

    pub fn is_dirty(&self) -> Result<bool, EmbedderError> {
        self.with(|slot| Ok(slot.as_ref().map_or(true, |state| state.is_dirty())))
    }

    pub fn paint(&self) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.paint())
    }

    pub fn mouse_move(&self, x: i32, y: i32) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.mouse_move(x, y))
    }

    pub fn update_mouse_down(
        &self,
        primary: bool,
        secondary: bool,
        middle: bool,
    ) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| {
            state.update_mouse_down(primary, secondary, middle)
        })
    }

    pub fn mouse_wheel(&self, delta: i32) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.mouse_wheel(delta))
    }

    pub fn set_size(&self, width: i32, height: i32) -> Result<(), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.set_size(width, height))
    }

    pub fn size(&self) -> Result<(i32, i32), EmbedderError> {
        self.with_state(EmbedderError::NoSurface, |state| state.size())
    }
}
