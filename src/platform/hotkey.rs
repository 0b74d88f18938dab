//! Global hotkey detection (Ctrl+Shift+Z converts, Esc quits)

use rdev::{listen, Event, EventType, Key};
use std::sync::mpsc;
use std::thread;

/// Hotkey events sent to the worker loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Convert the clipboard contents
    Convert,
    /// Stop the utility
    Quit,
}

/// Modifier state machine fed with raw key events
#[derive(Debug, Default)]
pub struct HotkeyTracker {
    ctrl: bool,
    shift: bool,
}

impl HotkeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event_type: &EventType) -> Option<HotkeyEvent> {
        match event_type {
            EventType::KeyPress(key) => match key {
                Key::ControlLeft | Key::ControlRight => {
                    self.ctrl = true;
                    None
                }
                Key::ShiftLeft | Key::ShiftRight => {
                    self.shift = true;
                    None
                }
                Key::KeyZ if self.ctrl && self.shift => Some(HotkeyEvent::Convert),
                Key::Escape => Some(HotkeyEvent::Quit),
                _ => None,
            },
            EventType::KeyRelease(key) => {
                match key {
                    Key::ControlLeft | Key::ControlRight => self.ctrl = false,
                    Key::ShiftLeft | Key::ShiftRight => self.shift = false,
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }
}

/// Start the global listener on its own thread.
///
/// The callback only forwards events; clipboard work happens on the
/// receiving side.
pub fn start_hotkey_listener() -> mpsc::Receiver<HotkeyEvent> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut tracker = HotkeyTracker::new();
        let callback = move |event: Event| {
            if let Some(hotkey) = tracker.handle(&event.event_type) {
                let _ = tx.send(hotkey);
            }
        };

        // returns only on failure; dropping tx ends the worker loop
        if let Err(e) = listen(callback) {
            log::error!("hotkey listener failed: {:?}", e);
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_shift_z() {
        let mut tracker = HotkeyTracker::new();
        assert_eq!(tracker.handle(&EventType::KeyPress(Key::ControlLeft)), None);
        assert_eq!(tracker.handle(&EventType::KeyPress(Key::ShiftRight)), None);
        assert_eq!(
            tracker.handle(&EventType::KeyPress(Key::KeyZ)),
            Some(HotkeyEvent::Convert)
        );
    }

    #[test]
    fn test_z_without_modifiers() {
        let mut tracker = HotkeyTracker::new();
        assert_eq!(tracker.handle(&EventType::KeyPress(Key::KeyZ)), None);

        tracker.handle(&EventType::KeyPress(Key::ControlLeft));
        assert_eq!(tracker.handle(&EventType::KeyPress(Key::KeyZ)), None);
    }

    #[test]
    fn test_release_clears_modifier() {
        let mut tracker = HotkeyTracker::new();
        tracker.handle(&EventType::KeyPress(Key::ControlLeft));
        tracker.handle(&EventType::KeyPress(Key::ShiftLeft));
        tracker.handle(&EventType::KeyRelease(Key::ShiftLeft));
        assert_eq!(tracker.handle(&EventType::KeyPress(Key::KeyZ)), None);
    }

    #[test]
    fn test_escape_quits() {
        let mut tracker = HotkeyTracker::new();
        assert_eq!(
            tracker.handle(&EventType::KeyPress(Key::Escape)),
            Some(HotkeyEvent::Quit)
        );
    }
}
