//! Reassembling a font around an edited name table.

use std::collections::HashMap;

use write_fonts::read::FontRef;
use write_fonts::types::Tag;
use write_fonts::FontBuilder;

use super::patch::EditedName;
use super::FontError;

const NAME_HEADER_LEN: usize = 6;
const NAME_RECORD_LEN: usize = 12;
const LANG_TAG_RECORD_LEN: usize = 4;
const TABLE_DIRECTORY_HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Serialize `edited` as a `name` table, keeping record order.
///
/// Identical strings share storage.
pub fn compile_name(edited: &EditedName<'_>) -> Result<Vec<u8>, FontError> {
    let mut storage = StringStorage::default();
    let record_slots = edited
        .records
        .iter()
        .map(|record| storage.insert(&record.bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let tag_slots = match &edited.lang_tags {
        Some(tags) => Some(
            tags.iter()
                .map(|tag| storage.insert(tag))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let lang_tag_len = tag_slots
        .as_ref()
        .map_or(0, |tags| 2 + tags.len() * LANG_TAG_RECORD_LEN);
    let header_len = NAME_HEADER_LEN + record_slots.len() * NAME_RECORD_LEN + lang_tag_len;

    let mut out = Vec::with_capacity(header_len + storage.data.len());
    push_u16(&mut out, u16::from(tag_slots.is_some()));
    push_u16(&mut out, to_u16(record_slots.len())?);
    push_u16(&mut out, to_u16(header_len)?);
    for (record, (length, offset)) in edited.records.iter().zip(&record_slots) {
        push_u16(&mut out, record.platform_id);
        push_u16(&mut out, record.encoding_id);
        push_u16(&mut out, record.language_id);
        push_u16(&mut out, record.name_id.to_u16());
        push_u16(&mut out, *length);
        push_u16(&mut out, *offset);
    }
    if let Some(tags) = &tag_slots {
        push_u16(&mut out, to_u16(tags.len())?);
        for (length, offset) in tags {
            push_u16(&mut out, *length);
            push_u16(&mut out, *offset);
        }
    }
    out.extend_from_slice(&storage.data);
    Ok(out)
}

/// Replace the `name` table of `font` and copy every other table verbatim.
///
/// `original` is the buffer `font` was parsed from; its sfnt version tag is
/// carried over so CFF-flavoured fonts stay `OTTO`.
pub fn rebuild_with_name(original: &[u8], font: FontRef<'_>, name: Vec<u8>) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    builder.add_raw(Tag::new(b"name"), name);
    builder.copy_missing_tables(font);
    let mut bytes = builder.build();
    restore_sfnt_version(original, &mut bytes);
    bytes
}

#[derive(Default)]
struct StringStorage<'a> {
    data: Vec<u8>,
    seen: HashMap<&'a [u8], u16>,
}

impl<'a> StringStorage<'a> {
    /// Returns (length, offset) of `bytes` within the storage area.
    fn insert(&mut self, bytes: &'a [u8]) -> Result<(u16, u16), FontError> {
        let length = to_u16(bytes.len())?;
        if let Some(&offset) = self.seen.get(bytes) {
            return Ok((length, offset));
        }
        let offset = to_u16(self.data.len())?;
        self.data.extend_from_slice(bytes);
        self.seen.insert(bytes, offset);
        Ok((length, offset))
    }
}

fn to_u16(value: usize) -> Result<u16, FontError> {
    u16::try_from(value).map_err(|_| FontError::NameTableOverflow)
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    if let Some(slot) = bytes.get_mut(at..at + 4) {
        slot.copy_from_slice(&value.to_be_bytes());
    }
}

fn table_offset(font: &[u8], tag: &[u8; 4]) -> Option<usize> {
    let num_tables = font.get(4..6).map(|raw| u16::from_be_bytes([raw[0], raw[1]]))?;
    (0..num_tables as usize)
        .map(|i| TABLE_DIRECTORY_HEADER_LEN + i * TABLE_RECORD_LEN)
        .find(|&record| font.get(record..record + 4) == Some(&tag[..]))
        .and_then(|record| read_u32(font, record + 8))
        .map(|offset| offset as usize)
}

/// Put the input's sfnt version back, moving `head.checkSumAdjustment` by
/// the same amount so the whole-file checksum stays balanced.
fn restore_sfnt_version(original: &[u8], rebuilt: &mut [u8]) {
    let (Some(source), Some(built)) = (read_u32(original, 0), read_u32(rebuilt, 0)) else {
        return;
    };
    if source == built {
        return;
    }
    write_u32(rebuilt, 0, source);
    if let Some(at) = table_offset(rebuilt, b"head").map(|head| head + CHECKSUM_ADJUSTMENT_OFFSET) {
        if let Some(adjustment) = read_u32(rebuilt, at) {
            write_u32(rebuilt, at, adjustment.wrapping_sub(source.wrapping_sub(built)));
        }
    }
}
