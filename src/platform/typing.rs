//! Paste the converted text back into the focused field (enigo)

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::thread;
use std::time::Duration;

use super::DesktopError;
use crate::core::language::{classify, Language};

/// Where to leave the cursor after pasting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKey {
    Home,
    End,
}

/// Home after a Hebrew result (the line reads right to left), End after an
/// English one. Decided by the last letter; `None` when there is none.
pub fn cursor_key_for(text: &str) -> Option<CursorKey> {
    let last = text.chars().rev().map(classify).find(|l| l.is_known())?;
    match last {
        Language::Hebrew => Some(CursorKey::Home),
        Language::English => Some(CursorKey::End),
        Language::Unknown => None,
    }
}

pub struct KeyboardOutput {
    enigo: Enigo,
}

impl KeyboardOutput {
    pub fn new() -> Result<Self, DesktopError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| DesktopError::Keyboard(format!("Failed to initialize Enigo: {}", e)))?;
        Ok(Self { enigo })
    }

    /// Paste whatever is on the clipboard, then move the cursor
    pub fn paste_converted(&mut self, converted: &str) -> Result<(), DesktopError> {
        // clipboard must settle before the paste
        thread::sleep(Duration::from_millis(50));
        self.send_paste()?;
        thread::sleep(Duration::from_millis(100));

        match cursor_key_for(converted) {
            Some(CursorKey::Home) => self.send_key(Key::Home),
            Some(CursorKey::End) => self.send_key(Key::End),
            None => Ok(()),
        }
    }

    fn send_key(&mut self, key: Key) -> Result<(), DesktopError> {
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| DesktopError::Keyboard(format!("Failed to send key: {}", e)))
    }

    fn send_paste(&mut self) -> Result<(), DesktopError> {
        let modifier = modifier_key();
        self.enigo
            .key(modifier, Direction::Press)
            .map_err(|e| DesktopError::Keyboard(format!("Failed to press modifier: {}", e)))?;
        thread::sleep(Duration::from_millis(10));

        let clicked = self
            .enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| DesktopError::Keyboard(format!("Failed to paste: {}", e)));

        thread::sleep(Duration::from_millis(50));
        self.enigo
            .key(modifier, Direction::Release)
            .map_err(|e| DesktopError::Keyboard(format!("Failed to release modifier: {}", e)))?;
        clicked
    }
}

/// Cmd on macOS, Ctrl elsewhere
fn modifier_key() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }
    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hebrew_result_goes_home() {
        assert_eq!(cursor_key_for("שלום"), Some(CursorKey::Home));
        assert_eq!(cursor_key_for("hello שלום"), Some(CursorKey::Home));
    }

    #[test]
    fn test_english_result_goes_end() {
        assert_eq!(cursor_key_for("akuo"), Some(CursorKey::End));
        assert_eq!(cursor_key_for("שלום akuo"), Some(CursorKey::End));
    }

    #[test]
    fn test_trailing_punctuation_skipped() {
        assert_eq!(cursor_key_for("akuo 123!"), Some(CursorKey::End));
        assert_eq!(cursor_key_for("שלום?"), Some(CursorKey::Home));
    }

    #[test]
    fn test_no_letters() {
        assert_eq!(cursor_key_for(""), None);
        assert_eq!(cursor_key_for("42 "), None);
    }
}
