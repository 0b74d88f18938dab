//! Desktop utility: global hotkey + clipboard conversion

pub mod clipboard;
pub mod hotkey;
pub mod typing;

use std::sync::mpsc::Receiver;
use thiserror::Error;

use clipboard::ClipboardConverter;
use hotkey::{start_hotkey_listener, HotkeyEvent};
use typing::KeyboardOutput;

#[derive(Error, Debug)]
pub enum DesktopError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Keyboard error: {0}")]
    Keyboard(String),
    #[error("Hotkey listener stopped")]
    Listener,
}

/// Run until Esc is pressed.
///
/// With `paste` set, the converted text is also pasted into the focused
/// field; otherwise it is only left on the clipboard.
pub fn run(paste: bool) -> Result<(), DesktopError> {
    let mut converter = ClipboardConverter::new()?;
    let mut keyboard = if paste {
        Some(KeyboardOutput::new()?)
    } else {
        None
    };
    let events = start_hotkey_listener();

    log::info!("hebfix started - copy text, press Ctrl+Shift+Z to convert it, Esc to quit");

    dispatch(&events, || match converter.convert_clipboard() {
        Ok(Some(converted)) => {
            if let Some(keyboard) = keyboard.as_mut() {
                if let Err(e) = keyboard.paste_converted(&converted) {
                    log::error!("{}", e);
                }
            }
        }
        Ok(None) => log::info!("clipboard is empty, nothing to convert"),
        Err(e) => log::error!("{}", e),
    })
}

/// Feed hotkey events to `on_convert` until Quit.
/// A closed channel means the listener thread died.
fn dispatch<F: FnMut()>(events: &Receiver<HotkeyEvent>, mut on_convert: F) -> Result<(), DesktopError> {
    loop {
        match events.recv().map_err(|_| DesktopError::Listener)? {
            HotkeyEvent::Convert => on_convert(),
            HotkeyEvent::Quit => {
                log::info!("Esc pressed, exiting");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_quit_stops_loop() {
        let (tx, rx) = mpsc::channel();
        tx.send(HotkeyEvent::Convert).unwrap();
        tx.send(HotkeyEvent::Convert).unwrap();
        tx.send(HotkeyEvent::Quit).unwrap();
        tx.send(HotkeyEvent::Convert).unwrap();

        let mut conversions = 0;
        assert!(dispatch(&rx, || conversions += 1).is_ok());
        assert_eq!(conversions, 2);
    }

    #[test]
    fn test_dead_listener_is_an_error() {
        let (tx, rx) = mpsc::channel();
        tx.send(HotkeyEvent::Convert).unwrap();
        drop(tx);

        let mut conversions = 0;
        let result = dispatch(&rx, || conversions += 1);
        assert!(matches!(result, Err(DesktopError::Listener)));
        assert_eq!(conversions, 1);
    }
}
