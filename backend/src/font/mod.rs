//! Name-table editing for uploaded fonts.
//!
//! Parsing and serialization belong to `write-fonts` (and the `read-fonts`
//! crate it re-exports). This module decides which records change and how
//! the edited table goes back into the font.

pub mod loader;
pub mod patch;
pub mod write;

use write_fonts::read::ReadError;

use crate::types::NameFields;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("not a valid font: {0}")]
    Parse(#[source] ReadError),
    #[error("font has no name table")]
    MissingNameTable,
    #[error("edited name table exceeds the 64 KiB string storage limit")]
    NameTableOverflow,
}

/// Rewrite the family, subfamily and full-name records of `bytes`.
///
/// Returns a complete font in which every table other than `name` is copied
/// unchanged from the input, apart from the checksum adjustment in `head`.
pub fn rename_font(bytes: &[u8], fields: &NameFields) -> Result<Vec<u8>, FontError> {
    let font = loader::parse_font(bytes)?;
    let name = loader::name_table(&font)?;
    let edited = patch::apply_name_fields(&name, fields)?;
    tracing::debug!(
        rewritten = edited.rewritten,
        records = edited.records.len(),
        "name records updated"
    );
    let name_bytes = write::compile_name(&edited)?;
    Ok(write::rebuild_with_name(bytes, font, name_bytes))
}
