//! One embedded render surface: window, renderer, interactor and scene.
//!
//! The host drives it from a single thread: it forwards input and size
//! changes, watches [`EmbeddedSurface::is_dirty`] and calls
//! [`EmbeddedSurface::paint`] on its own schedule. The toolkit signals that a
//! frame is needed through the frame-requested observer, which marks the
//! surface dirty and asks the host to schedule a repaint.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use crate::buttons::MouseButtons;
use crate::error::EmbedderError;
use crate::gl_loader::is_gl_loaded;
use crate::gl_state::ScopedGlState;
use crate::host::RepaintRequester;
use crate::toolkit::{
    InteractionStyle, Interactor, InteractorEvent, RenderWindow, SceneSpec, Toolkit,
    WindowObserver,
};

/// State shared with the frame-requested observer.
#[derive(Debug, Default)]
struct FrameSignal {
    dirty: Cell<bool>,
    requests: Cell<u64>,
}

pub struct EmbeddedSurface<T: Toolkit> {
    // Field order is drop order: the interactor goes before its window.
    interactor: T::Interactor,
    window: T::Window,
    signal: Rc<FrameSignal>,
    buttons: MouseButtons,
    width: i32,
    height: i32,
}

impl<T: Toolkit> EmbeddedSurface<T> {
    /// Builds the render surface and registers the bridge callbacks.
    ///
    /// `requester` is kept until the surface is destroyed. GL must already
    /// be loaded through [`crate::gl_loader::load_gl`].
    pub fn new(
        toolkit: &mut T,
        width: i32,
        height: i32,
        requester: Box<dyn RepaintRequester>,
        style: InteractionStyle,
        scene: &SceneSpec,
    ) -> Result<Self, EmbedderError> {
        if !is_gl_loaded() {
            return Err(EmbedderError::GlNotLoaded);
        }
        info!("[Surface] Creating {}x{} surface.", width, height);

        let signal = Rc::new(FrameSignal {
            dirty: Cell::new(true),
            requests: Cell::new(0),
        });

        let mut window = toolkit.create_render_window(width, height)?;
        toolkit.populate_scene(&mut window, scene)?;

        // The host makes our context current before every call into the toolkit.
        window.add_observer(WindowObserver::IsCurrent(Box::new(|| true)));

        let frame_signal = signal.clone();
        window.add_observer(WindowObserver::FrameRequested(Box::new(move || {
            frame_signal.dirty.set(true);
            frame_signal.requests.set(frame_signal.requests.get() + 1);
            requester.request_repaint();
        })));

        let interactor = toolkit.create_interactor(&mut window, style)?;
        debug!("[Surface] Interactor created with {:?} style.", style);

        Ok(Self {
            interactor,
            window,
            signal,
            buttons: MouseButtons::new(),
            width,
            height,
        })
    }

    /// Releases the interactor, then the window and with it the repaint requester.
    pub fn destroy(self) {
        info!("[Surface] Destroying {}x{} surface.", self.width, self.height);
        drop(self);
    }

    pub fn is_dirty(&self) -> bool {
        self.signal.dirty.get()
    }

    /// Renders one frame, then clears the dirty flag.
    ///
    /// The flag is cleared even when the toolkit requested another frame
    /// during this render; such a request is lost.
    pub fn paint(&mut self) {
        let requests_before = self.signal.requests.get();
        {
            let _gl_state = ScopedGlState::capture();
            self.window.render();
        }
        self.signal.dirty.set(false);

        let during_render = self.signal.requests.get() - requests_before;
        if during_render > 0 {
            debug!(
                "[Surface] {} frame request(s) arrived during paint and were cleared with it.",
                during_render
            );
        }
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) {
        self.interactor.set_event_position(x, y);
        self.interactor.invoke_event(InteractorEvent::MouseMove);
    }

    /// Raises press/release events for buttons whose state changed since the last call.
    pub fn update_mouse_down(&mut self, primary: bool, secondary: bool, middle: bool) {
        for event in self.buttons.update(primary, secondary, middle) {
            debug!("[Surface] {:?}", event);
            self.interactor.invoke_event(event);
        }
    }

    pub fn mouse_wheel(&mut self, delta: i32) {
        if let Some(event) = InteractorEvent::from_wheel_delta(delta) {
            self.interactor.invoke_event(event);
        }
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        debug!("[Surface] Resizing to {}x{}.", width, height);
        self.width = width;
        self.height = height;
        self.window.set_size(width, height);
        self.interactor.set_size(width, height);
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn buttons(&self) -> &MouseButtons {
        &self.buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ButtonState, MouseButton};
    use crate::gl_loader::load_gl;
    use crate::toolkit::headless::{HeadlessToolkit, JournalEntry};
    use std::ffi::{CStr, c_void};

    #[derive(Clone, Default)]
    struct CountingRequester(Rc<Cell<u32>>);

    impl RepaintRequester for CountingRequester {
        fn request_repaint(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn surface_with(
        mut toolkit: HeadlessToolkit,
    ) -> (EmbeddedSurface<HeadlessToolkit>, HeadlessToolkit, CountingRequester) {
        load_gl(&mut toolkit, &|_name: &CStr| -> *const c_void { std::ptr::null() });
        let requester = CountingRequester::default();
        let surface = EmbeddedSurface::new(
            &mut toolkit,
            800,
            600,
            Box::new(requester.clone()),
            InteractionStyle::TrackballCamera,
            &SceneSpec::default(),
        )
        .unwrap();
        (surface, toolkit, requester)
    }

    #[test]
    fn dirty_until_first_paint() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        assert!(surface.is_dirty());
        surface.paint();
        assert!(!surface.is_dirty());
        assert_eq!(toolkit.journal().frames_rendered(), 1);
    }

    #[test]
    fn render_sees_current_context() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        surface.paint();
        assert!(
            toolkit
                .journal()
                .entries()
                .contains(&JournalEntry::Rendered { context_current: true })
        );
    }

    #[test]
    fn frame_request_marks_dirty_and_asks_host() {
        let (mut surface, toolkit, requester) = surface_with(HeadlessToolkit::new());
        surface.paint();

        toolkit.frame_trigger().unwrap().request_frame();

        assert!(surface.is_dirty());
        assert_eq!(requester.0.get(), 1);
    }

    #[test]
    fn request_during_render_is_lost() {
        let (mut surface, _toolkit, requester) =
            surface_with(HeadlessToolkit::new().with_frame_request_during_render());
        surface.paint();
        assert!(!surface.is_dirty());
        assert_eq!(requester.0.get(), 1);
    }

    #[test]
    fn wheel_maps_sign_to_direction() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        let journal = toolkit.journal();
        surface.mouse_wheel(0);
        assert!(journal.events().is_empty());
        surface.mouse_wheel(3);
        surface.mouse_wheel(-7);
        assert_eq!(
            journal.events(),
            vec![
                InteractorEvent::MouseWheelForward,
                InteractorEvent::MouseWheelBackward
            ]
        );
    }

    #[test]
    fn mouse_move_sets_position_before_event() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        let journal = toolkit.journal();
        journal.clear();
        surface.mouse_move(12, 34);
        assert_eq!(
            journal.entries(),
            vec![
                JournalEntry::EventPosition { x: 12, y: 34 },
                JournalEntry::Event(InteractorEvent::MouseMove),
            ]
        );
    }

    #[test]
    fn set_size_reaches_window_and_interactor() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        let journal = toolkit.journal();
        surface.set_size(1024, 768);
        assert_eq!(surface.size(), (1024, 768));
        assert_eq!(surface.window.size(), (1024, 768));
        let entries = journal.entries();
        assert!(entries.contains(&JournalEntry::WindowResized { width: 1024, height: 768 }));
        assert!(entries.contains(&JournalEntry::InteractorResized { width: 1024, height: 768 }));
    }

    #[test]
    fn button_state_is_tracked_per_surface() {
        let (mut surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        surface.update_mouse_down(false, true, false);
        surface.update_mouse_down(false, true, false);
        assert_eq!(surface.buttons().state(MouseButton::Right), ButtonState::Pressed);
        assert_eq!(
            toolkit.journal().count_event(InteractorEvent::RightButtonPress),
            1
        );
    }

    #[test]
    fn destroy_releases_interactor_first() {
        let (surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        let journal = toolkit.journal();
        surface.destroy();
        let entries = journal.entries();
        let tail = &entries[entries.len() - 2..];
        assert_eq!(
            tail,
            &[JournalEntry::InteractorReleased, JournalEntry::WindowReleased]
        );
    }

    #[test]
    fn scene_and_observers_are_set_up_on_create() {
        let (_surface, toolkit, _) = surface_with(HeadlessToolkit::new());
        let entries = toolkit.journal().entries();
        assert!(entries.contains(&JournalEntry::WindowCreated { width: 800, height: 600 }));
        assert!(entries.contains(&JournalEntry::InteractorCreated(
            InteractionStyle::TrackballCamera
        )));
        let actors = entries
            .iter()
            .filter(|e| matches!(e, JournalEntry::ActorAdded(_)))
            .count();
        assert_eq!(actors, 1);
    }
}
