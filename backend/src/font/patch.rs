//! Rewriting the editable name records.
//!
//! Records are carried as raw string bytes, so entries in encodings the font
//! library cannot decode (Mac Japanese, ISO, Windows ShiftJIS, ...) pass
//! through exactly as they were.

use std::borrow::Cow;

use write_fonts::read::tables::name::{Encoding, MacRomanMapping, Name};
use write_fonts::read::ReadError;
use write_fonts::types::NameId;

use super::FontError;
use crate::types::{NameField, NameFields};

/// A name record with its string in the record's own encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNameRecord<'a> {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    pub bytes: Cow<'a, [u8]>,
}

/// The name table after editing, in source record order.
#[derive(Debug, Clone, Default)]
pub struct EditedName<'a> {
    pub records: Vec<RawNameRecord<'a>>,
    /// Language-tag strings of a version 1 table.
    pub lang_tags: Option<Vec<&'a [u8]>>,
    pub rewritten: usize,
}

/// Replace the string of every record carrying one of the editable name ids
/// with the matching value from `fields`. Every other record keeps its bytes.
pub fn apply_name_fields<'a>(name: &Name<'a>, fields: &NameFields) -> Result<EditedName<'a>, FontError> {
    let storage = name.string_data().as_bytes();
    let mut edited = EditedName::default();

    for record in name.name_record() {
        let name_id = record.name_id();
        let bytes = match NameField::ALL.into_iter().find(|field| field.name_id() == name_id) {
            Some(field) => {
                edited.rewritten += 1;
                Cow::Owned(encode_name(
                    record.platform_id(),
                    record.encoding_id(),
                    fields.get(field),
                ))
            }
            None => Cow::Borrowed(string_bytes(
                storage,
                record.string_offset().to_u32() as usize,
                record.length(),
            )?),
        };
        edited.records.push(RawNameRecord {
            platform_id: record.platform_id(),
            encoding_id: record.encoding_id(),
            language_id: record.language_id(),
            name_id,
            bytes,
        });
    }

    if let Some(tags) = name.lang_tag_record() {
        let tags = tags
            .iter()
            .map(|tag| string_bytes(storage, tag.lang_tag_offset().to_u32() as usize, tag.length()))
            .collect::<Result<Vec<_>, _>>()?;
        edited.lang_tags = Some(tags);
    }

    Ok(edited)
}

/// Encode `value` for a record on the given platform and encoding.
///
/// Mac Roman records get Mac Roman, with `?` for characters it lacks; the
/// Unicode records of the same font carry the exact text. Everything else is
/// written as UTF-16BE.
pub fn encode_name(platform_id: u16, encoding_id: u16, value: &str) -> Vec<u8> {
    match Encoding::new(platform_id, encoding_id) {
        Encoding::MacRoman => value
            .chars()
            .map(|c| MacRomanMapping.encode(c).unwrap_or(b'?'))
            .collect(),
        _ => value.encode_utf16().flat_map(u16::to_be_bytes).collect(),
    }
}

fn string_bytes(storage: &[u8], offset: usize, length: u16) -> Result<&[u8], FontError> {
    storage
        .get(offset..offset + length as usize)
        .ok_or(FontError::Parse(ReadError::OutOfBounds))
}
