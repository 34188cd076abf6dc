//! Turning uploaded bytes into something the editor can work on.

use write_fonts::read::tables::name::Name;
use write_fonts::read::{FontRef, ReadError, TableProvider};

use super::FontError;

/// Parse a single sfnt font. Collections and non-font data are rejected.
pub fn parse_font(bytes: &[u8]) -> Result<FontRef<'_>, FontError> {
    FontRef::new(bytes).map_err(FontError::Parse)
}

pub fn name_table<'a>(font: &FontRef<'a>) -> Result<Name<'a>, FontError> {
    match font.name() {
        Ok(name) => Ok(name),
        Err(ReadError::TableIsMissing(_)) => Err(FontError::MissingNameTable),
        Err(err) => Err(FontError::Parse(err)),
    }
}
