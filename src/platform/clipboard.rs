//! Convert the clipboard contents in place

use arboard::Clipboard;

use super::DesktopError;
use crate::core::converter::convert_last_language;

pub struct ClipboardConverter {
    clipboard: Clipboard,
}

impl ClipboardConverter {
    pub fn new() -> Result<Self, DesktopError> {
        let clipboard = Clipboard::new().map_err(|e| {
            DesktopError::Clipboard(format!("Failed to initialize clipboard: {}", e))
        })?;
        Ok(Self { clipboard })
    }

    /// Replace the clipboard text with its converted form.
    /// Returns `None` when the clipboard holds no text.
    pub fn convert_clipboard(&mut self) -> Result<Option<String>, DesktopError> {
        let text = match self.clipboard.get_text() {
            Ok(text) => text,
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(e) => {
                return Err(DesktopError::Clipboard(format!(
                    "Failed to read clipboard: {}",
                    e
                )))
            }
        };

        if text.is_empty() {
            return Ok(None);
        }

        let converted = convert_last_language(&text);
        log::info!("clipboard: {:?} -> {:?}", text, converted);

        self.clipboard
            .set_text(converted.clone())
            .map_err(|e| DesktopError::Clipboard(format!("Failed to write clipboard: {}", e)))?;

        Ok(Some(converted))
    }
}
