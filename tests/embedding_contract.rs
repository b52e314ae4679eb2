use std::cell::Cell;
use std::ffi::{CStr, c_char, c_void};
use std::ptr;

use vtk_gl_embedder::host::{HostGlLoader, HostRepaintHandle, HostRepaintRequester};
use vtk_gl_embedder::state::ShimState;
use vtk_gl_embedder::toolkit::headless::HeadlessToolkit;
use vtk_gl_embedder::toolkit::{InteractionStyle, InteractorEvent, SceneSpec};

unsafe extern "C" fn count_lookups(user_data: *mut c_void, name: *const c_char) -> *const c_void {
    let lookups = unsafe { &*(user_data as *const Cell<usize>) };
    assert!(!unsafe { CStr::from_ptr(name) }.to_bytes().is_empty());
    lookups.set(lookups.get() + 1);
    ptr::null()
}

unsafe extern "C" fn count_repaints(user_data: *mut c_void) {
    let repaints = unsafe { &*(user_data as *const Cell<u32>) };
    repaints.set(repaints.get() + 1);
}

fn loaded_state(lookups: &Cell<usize>) -> ShimState<HeadlessToolkit> {
    let mut state = ShimState::new(
        HeadlessToolkit::new(),
        InteractionStyle::TrackballCamera,
        SceneSpec::default(),
    );
    // Scoped like the host's loader: gone once load_gl returns.
    {
        let loader = HostGlLoader {
            user_data: lookups as *const Cell<usize> as *mut c_void,
            get_proc_address: Some(count_lookups),
        };
        state.load_gl(&loader);
    }
    state
}

#[test]
fn create_paint_press_destroy_scenario() {
    let lookups = Cell::new(0usize);
    let repaints = Cell::new(0u32);
    let requester = HostRepaintRequester {
        user_data: &repaints as *const Cell<u32> as *mut c_void,
        request_repaint: Some(count_repaints),
    };

    let mut state = loaded_state(&lookups);
    assert!(lookups.get() > 0);

    let handle = unsafe { HostRepaintHandle::from_raw(&requester) }.unwrap();
    state.create(800, 600, Box::new(handle)).unwrap();
    assert!(state.is_dirty());

    state.paint().unwrap();
    assert!(!state.is_dirty());

    let journal = state.toolkit().journal();
    journal.clear();

    state.update_mouse_down(true, false, false).unwrap();
    assert_eq!(journal.events(), vec![InteractorEvent::LeftButtonPress]);

    state.update_mouse_down(true, false, false).unwrap();
    assert_eq!(journal.events().len(), 1);

    state.destroy().unwrap();
    assert_eq!(repaints.get(), 0);
}

#[test]
fn dragging_asks_the_host_for_a_repaint() {
    let lookups = Cell::new(0usize);
    let repaints = Cell::new(0u32);
    let requester = HostRepaintRequester {
        user_data: &repaints as *const Cell<u32> as *mut c_void,
        request_repaint: Some(count_repaints),
    };

    let mut state = loaded_state(&lookups);
    let handle = unsafe { HostRepaintHandle::from_raw(&requester) }.unwrap();
    state.create(300, 300, Box::new(handle)).unwrap();
    state.paint().unwrap();

    state.update_mouse_down(true, false, false).unwrap();
    state.mouse_move(10, 10).unwrap();
    assert!(state.is_dirty());
    assert_eq!(repaints.get(), 1);

    state.paint().unwrap();
    assert!(!state.is_dirty());

    state.update_mouse_down(false, false, false).unwrap();
    state.mouse_move(20, 20).unwrap();
    assert!(!state.is_dirty());

    state.mouse_wheel(1).unwrap();
    assert!(state.is_dirty());
    assert_eq!(repaints.get(), 2);

    state.destroy().unwrap();
}

#[test]
fn wheel_events_follow_delta_sign() {
    let lookups = Cell::new(0usize);
    let requester = HostRepaintRequester {
        user_data: ptr::null_mut(),
        request_repaint: None,
    };
    let mut state = loaded_state(&lookups);
    let handle = unsafe { HostRepaintHandle::from_raw(&requester) }.unwrap();
    state.create(300, 300, Box::new(handle)).unwrap();
    let journal = state.toolkit().journal();
    journal.clear();

    state.mouse_wheel(0).unwrap();
    assert!(journal.events().is_empty());

    state.mouse_wheel(120).unwrap();
    assert_eq!(journal.count_event(InteractorEvent::MouseWheelForward), 1);

    state.mouse_wheel(-120).unwrap();
    assert_eq!(journal.count_event(InteractorEvent::MouseWheelBackward), 1);
    assert_eq!(journal.events().len(), 2);

    state.destroy().unwrap();
}

#[test]
fn resize_is_reported_back_exactly() {
    let lookups = Cell::new(0usize);
    let requester = HostRepaintRequester {
        user_data: ptr::null_mut(),
        request_repaint: None,
    };
    let mut state = loaded_state(&lookups);
    let handle = unsafe { HostRepaintHandle::from_raw(&requester) }.unwrap();
    state.create(300, 300, Box::new(handle)).unwrap();

    state.set_size(641, 479).unwrap();
    assert_eq!(state.size().unwrap(), (641, 479));

    state.destroy().unwrap();
}
