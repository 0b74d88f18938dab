//! Layout tables, character classification and the trailing-run converter

pub mod converter;
pub mod language;
pub mod layout;
