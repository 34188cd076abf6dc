#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use write_fonts::{
    read::{FontRef, TableProvider},
    tables::name::{Name, NameRecord},
    types::{NameId, Tag},
    FontBuilder,
};

pub const BOUNDARY: &str = "X-FONT-BOUNDARY";
pub const GLYF_STANDIN: &[u8] = b"glyph outlines";
pub const HEAD_STANDIN: &[u8] = b"head table bytes";

fn record(platform: u16, encoding: u16, language: u16, id: u16, text: &str) -> NameRecord {
    NameRecord::new(
        platform,
        encoding,
        language,
        NameId::new(id),
        text.to_string().into(),
    )
}

/// A small font with a Windows and a Macintosh copy of the editable names.
pub fn sample_font() -> Vec<u8> {
    let mut name = Name::default();
    name.name_record = vec![
        record(1, 0, 0, 1, "Original"),
        record(1, 0, 0, 2, "Book"),
        record(3, 1, 0x409, 0, "Copyright 2024 Somebody"),
        record(3, 1, 0x409, 1, "Original"),
        record(3, 1, 0x409, 2, "Book"),
        record(3, 1, 0x409, 3, "Original Book"),
        record(3, 1, 0x409, 4, "Original Book"),
        record(3, 1, 0x409, 6, "Original-Book"),
    ];
    let mut builder = FontBuilder::new();
    builder.add_table(&name).unwrap();
    builder.add_raw(Tag::new(b"glyf"), GLYF_STANDIN);
    builder.add_raw(Tag::new(b"head"), HEAD_STANDIN);
    builder.build()
}

/// A name table mixing a Mac Japanese record with a Windows family record.
pub fn font_with_legacy_record() -> Vec<u8> {
    #[rustfmt::skip]
    const NAME: &[u8] = &[
        0x00, 0x00, // version
        0x00, 0x02, // count
        0x00, 0x1E, // storage offset
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x02, 0x00, 0x00,
        0x00, 0x03, 0x00, 0x01, 0x04, 0x09, 0x00, 0x01, 0x00, 0x02, 0x00, 0x02,
        0x82, 0xA0, // Shift-JIS
        0x00, 0x41,
    ];
    let mut builder = FontBuilder::new();
    builder.add_raw(Tag::new(b"name"), NAME);
    builder.build()
}

/// (platform, encoding, name id, raw string bytes) for every name record.
pub fn raw_records(bytes: &[u8]) -> Vec<(u16, u16, u16, Vec<u8>)> {
    let font = FontRef::new(bytes).unwrap();
    let name = font.name().unwrap();
    let storage = name.string_data().as_bytes();
    name.name_record()
        .iter()
        .map(|record| {
            let start = record.string_offset().to_u32() as usize;
            let end = start + record.length() as usize;
            (
                record.platform_id(),
                record.encoding_id(),
                record.name_id().to_u16(),
                storage[start..end].to_vec(),
            )
        })
        .collect()
}

/// (platform, name id, text) for every name record in `bytes`.
pub fn name_strings(bytes: &[u8]) -> Vec<(u16, u16, String)> {
    let font = FontRef::new(bytes).unwrap();
    let name = font.name().unwrap();
    let data = name.string_data();
    name.name_record()
        .iter()
        .map(|record| {
            let text = record.string(data).unwrap().chars().collect();
            (record.platform_id(), record.name_id().to_u16(), text)
        })
        .collect()
}

pub fn name_string(bytes: &[u8], platform: u16, id: u16) -> String {
    name_strings(bytes)
        .into_iter()
        .find(|(p, i, _)| *p == platform && *i == id)
        .map(|(_, _, text)| text)
        .unwrap_or_else(|| panic!("no record {id} on platform {platform}"))
}

/// `head` with `checkSumAdjustment` zeroed; the builder recomputes it.
pub fn head_without_checksum(bytes: &[u8]) -> Vec<u8> {
    let mut head = table_bytes(bytes, b"head");
    head[8..12].fill(0);
    head
}

pub fn table_bytes(bytes: &[u8], tag: &[u8; 4]) -> Vec<u8> {
    let font = FontRef::new(bytes).unwrap();
    font.table_data(Tag::new(tag)).unwrap().as_bytes().to_vec()
}

#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: font/ttf\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn font(self, bytes: &[u8]) -> Self {
        self.file("font", "original.ttf", bytes)
    }

    pub fn into_body(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

pub fn modify_request(body: MultipartBody, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/modify-font")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.into_body())).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
