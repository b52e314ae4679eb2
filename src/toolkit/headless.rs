//! In-process toolkit with no GPU work.
//!
//! Every call is written to a [`Journal`] so hosts and tests can see exactly
//! what reached the toolkit. The interactor behaves like a trackball camera as
//! far as frame requests go: dragging and wheeling ask for a new frame.

use std::cell::RefCell;
use std::ffi::{CStr, c_void};
use std::rc::Rc;

use log::{debug, trace};

use crate::error::EmbedderError;
use crate::toolkit::{
    ActorSpec, InteractionStyle, Interactor, InteractorEvent, RenderWindow, RendererSpec,
    SceneSpec, Toolkit, WindowObserver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    IsCurrent,
    FrameRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    GlLoaded { lookup_resolved: bool },
    WindowCreated { width: i32, height: i32 },
    WindowResized { width: i32, height: i32 },
    ObserverAdded(ObserverKind),
    RendererAdded(RendererSpec),
    ActorAdded(ActorSpec),
    InteractorCreated(InteractionStyle),
    InteractorResized { width: i32, height: i32 },
    EventPosition { x: i32, y: i32 },
    Event(InteractorEvent),
    Rendered { context_current: bool },
    FrameRequested,
    InteractorReleased,
    WindowReleased,
}

/// Shared, append-only record of toolkit calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<JournalEntry>>>);

impl Journal {
    fn push(&self, entry: JournalEntry) {
        trace!("[Headless] {:?}", entry);
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Interactor events in the order they were raised.
    pub fn events(&self) -> Vec<InteractorEvent> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Event(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn count_event(&self, event: InteractorEvent) -> usize {
        self.events().into_iter().filter(|e| *e == event).count()
    }

    pub fn frames_rendered(&self) -> usize {
        self.count(|entry| matches!(entry, JournalEntry::Rendered { .. }))
    }

    pub fn frame_requests(&self) -> usize {
        self.count(|entry| matches!(entry, JournalEntry::FrameRequested))
    }

    pub fn gl_loads(&self) -> usize {
        self.count(|entry| matches!(entry, JournalEntry::GlLoaded { .. }))
    }

    fn count(&self, predicate: impl Fn(&JournalEntry) -> bool) -> usize {
        self.0.borrow().iter().filter(|entry| predicate(entry)).count()
    }
}

#[derive(Default)]
struct Observers {
    is_current: Vec<Box<dyn FnMut() -> bool>>,
    frame_requested: Vec<Box<dyn FnMut()>>,
}

/// Fires the frame-requested observers of one headless window, the way the
/// toolkit does when its state changes.
#[derive(Clone)]
pub struct FrameTrigger {
    observers: Rc<RefCell<Observers>>,
    journal: Journal,
}

impl FrameTrigger {
    pub fn request_frame(&self) {
        self.journal.push(JournalEntry::FrameRequested);
        let mut observers = self.observers.borrow_mut();
        for observer in observers.frame_requested.iter_mut() {
            observer();
        }
    }

    fn context_is_current(&self) -> bool {
        let mut observers = self.observers.borrow_mut();
        // Any observer answering yes is enough, as with the toolkit's own query.
        observers.is_current.iter_mut().fold(false, |current, ask| ask() || current)
    }
}

pub struct HeadlessToolkit {
    journal: Journal,
    request_frame_during_render: bool,
    last_trigger: Option<FrameTrigger>,
}

impl Default for HeadlessToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self {
            journal: Journal::default(),
            request_frame_during_render: false,
            last_trigger: None,
        }
    }

    /// Every render pass will itself request another frame before returning.
    pub fn with_frame_request_during_render(mut self) -> Self {
        self.request_frame_during_render = true;
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Trigger for the most recently created window.
    pub fn frame_trigger(&self) -> Option<FrameTrigger> {
        self.last_trigger.clone()
    }
}

pub struct HeadlessWindow {
    width: i32,
    height: i32,
    trigger: FrameTrigger,
    request_frame_during_render: bool,
}

impl HeadlessWindow {
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

impl RenderWindow for HeadlessWindow {
    fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.trigger
            .journal
            .push(JournalEntry::WindowResized { width, height });
    }

    fn add_observer(&mut self, observer: WindowObserver) {
        let mut observers = self.trigger.observers.borrow_mut();
        let kind = match observer {
            WindowObserver::IsCurrent(callback) => {
                observers.is_current.push(callback);
                ObserverKind::IsCurrent
            }
            WindowObserver::FrameRequested(callback) => {
                observers.frame_requested.push(callback);
                ObserverKind::FrameRequested
            }
        };
        self.trigger.journal.push(JournalEntry::ObserverAdded(kind));
    }

    fn render(&mut self) {
        let context_current = self.trigger.context_is_current();
        self.trigger
            .journal
            .push(JournalEntry::Rendered { context_current });
        if self.request_frame_during_render {
            self.trigger.request_frame();
        }
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        self.trigger.journal.push(JournalEntry::WindowReleased);
    }
}

pub struct HeadlessInteractor {
    trigger: FrameTrigger,
    buttons_down: u8,
}

impl Interactor for HeadlessInteractor {
    fn set_event_position(&mut self, x: i32, y: i32) {
        self.trigger.journal.push(JournalEntry::EventPosition { x, y });
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.trigger
            .journal
            .push(JournalEntry::InteractorResized { width, height });
    }

    fn invoke_event(&mut self, event: InteractorEvent) {
        self.trigger.journal.push(JournalEntry::Event(event));
        match event {
            InteractorEvent::LeftButtonPress
            | InteractorEvent::RightButtonPress
            | InteractorEvent::MiddleButtonPress => self.buttons_down += 1,
            InteractorEvent::LeftButtonRelease
            | InteractorEvent::RightButtonRelease
            | InteractorEvent::MiddleButtonRelease => {
                self.buttons_down = self.buttons_down.saturating_sub(1)
            }
            InteractorEvent::MouseMove if self.buttons_down > 0 => self.trigger.request_frame(),
            InteractorEvent::MouseWheelForward | InteractorEvent::MouseWheelBackward => {
                self.trigger.request_frame()
            }
            InteractorEvent::MouseMove => {}
        }
    }
}

impl Drop for HeadlessInteractor {
    fn drop(&mut self) {
        self.trigger.journal.push(JournalEntry::InteractorReleased);
    }
}

impl Toolkit for HeadlessToolkit {
    type Window = HeadlessWindow;
    type Interactor = HeadlessInteractor;

    fn load_gl(&mut self, resolve: &mut dyn FnMut(&CStr) -> *const c_void) {
        let lookup_resolved = !resolve(c"glGetString").is_null();
        self.journal.push(JournalEntry::GlLoaded { lookup_resolved });
    }

    fn create_render_window(
        &mut self,
        width: i32,
        height: i32,
    ) -> Result<Self::Window, EmbedderError> {
        self.journal.push(JournalEntry::WindowCreated { width, height });
        let trigger = FrameTrigger {
            observers: Rc::new(RefCell::new(Observers::default())),
            journal: self.journal.clone(),
        };
        self.last_trigger = Some(trigger.clone());
        Ok(HeadlessWindow {
            width,
            height,
            trigger,
            request_frame_during_render: self.request_frame_during_render,
        })
    }

    fn populate_scene(
        &mut self,
        _window: &mut Self::Window,
        scene: &SceneSpec,
    ) -> Result<(), EmbedderError> {
        self.journal
            .push(JournalEntry::RendererAdded(scene.renderer.clone()));
        for actor in &scene.actors {
            self.journal.push(JournalEntry::ActorAdded(actor.clone()));
        }
        debug!("[Headless] Scene with {} actor(s) populated.", scene.actors.len());
        Ok(())
    }

    fn create_interactor(
        &mut self,
        window: &mut Self::Window,
        style: InteractionStyle,
    ) -> Result<Self::Interactor, EmbedderError> {
        self.journal.push(JournalEntry::InteractorCreated(style));
        Ok(HeadlessInteractor {
            trigger: window.trigger.clone(),
            buttons_down: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn frame_trigger_reaches_registered_observers() {
        let mut toolkit = HeadlessToolkit::new();
        let mut window = toolkit.create_render_window(10, 10).unwrap();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        window.add_observer(WindowObserver::FrameRequested(Box::new(move || {
            counter.set(counter.get() + 1)
        })));

        toolkit.frame_trigger().unwrap().request_frame();

        assert_eq!(fired.get(), 1);
        assert_eq!(toolkit.journal().frame_requests(), 1);
    }

    #[test]
    fn render_reports_context_answer() {
        let mut toolkit = HeadlessToolkit::new();
        let mut window = toolkit.create_render_window(10, 10).unwrap();
        window.render();
        window.add_observer(WindowObserver::IsCurrent(Box::new(|| true)));
        window.render();

        let rendered: Vec<_> = toolkit
            .journal()
            .entries()
            .into_iter()
            .filter(|e| matches!(e, JournalEntry::Rendered { .. }))
            .collect();
        assert_eq!(
            rendered,
            vec![
                JournalEntry::Rendered { context_current: false },
                JournalEntry::Rendered { context_current: true },
            ]
        );
    }

    #[test]
    fn drag_requests_frames_but_hover_does_not() {
        let mut toolkit = HeadlessToolkit::new();
        let mut window = toolkit.create_render_window(10, 10).unwrap();
        let mut interactor = toolkit
            .create_interactor(&mut window, InteractionStyle::TrackballCamera)
            .unwrap();
        let journal = toolkit.journal();

        interactor.invoke_event(InteractorEvent::MouseMove);
        assert_eq!(journal.frame_requests(), 0);

        interactor.invoke_event(InteractorEvent::LeftButtonPress);
        interactor.invoke_event(InteractorEvent::MouseMove);
        assert_eq!(journal.frame_requests(), 1);

        interactor.invoke_event(InteractorEvent::LeftButtonRelease);
        interactor.invoke_event(InteractorEvent::MouseMove);
        interactor.invoke_event(InteractorEvent::MouseWheelBackward);
        assert_eq!(journal.frame_requests(), 2);
    }
}
