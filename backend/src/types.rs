use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use write_fonts::types::NameId;

pub const DEFAULT_FAMILY_NAME: &str = "Modified Family";
pub const DEFAULT_SUBFAMILY_NAME: &str = "Regular";

/// The name-table entries a client is allowed to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameField {
    Family,
    Subfamily,
    FullName,
}

impl NameField {
    /// Every editable field, in the order records are rewritten.
    pub const ALL: [NameField; 3] = [NameField::Family, NameField::Subfamily, NameField::FullName];

    /// Name id of the records holding this field.
    ///
    /// The full name lives under id 3 for the clients of this service, which
    /// OpenType itself reserves for the unique identifier.
    pub fn name_id(self) -> NameId {
        match self {
            NameField::Family => NameId::new(1),
            NameField::Subfamily => NameId::new(2),
            NameField::FullName => NameId::new(3),
        }
    }

    /// Multipart field carrying the value.
    pub fn form_key(self) -> &'static str {
        match self {
            NameField::Family => "familyName",
            NameField::Subfamily => "subfamilyName",
            NameField::FullName => "fullName",
        }
    }

    pub fn from_form_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.form_key() == key)
    }
}

/// Resolved values for the three editable records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    pub family_name: String,
    pub subfamily_name: String,
    pub full_name: String,
}

impl NameFields {
    /// Apply defaults to the submitted values. Missing and blank values are
    /// treated alike; the full name falls back to the resolved family and
    /// subfamily.
    pub fn resolve(family: Option<&str>, subfamily: Option<&str>, full: Option<&str>) -> Self {
        let family_name = non_blank(family).unwrap_or(DEFAULT_FAMILY_NAME).to_owned();
        let subfamily_name = non_blank(subfamily)
            .unwrap_or(DEFAULT_SUBFAMILY_NAME)
            .to_owned();
        let full_name = match non_blank(full) {
            Some(full) => full.to_owned(),
            None => format!("{family_name} {subfamily_name}"),
        };
        NameFields {
            family_name,
            subfamily_name,
            full_name,
        }
    }

    pub fn get(&self, field: NameField) -> &str {
        match field {
            NameField::Family => &self.family_name,
            NameField::Subfamily => &self.subfamily_name,
            NameField::FullName => &self.full_name,
        }
    }

    /// File name offered for the rewritten font.
    pub fn download_name(&self) -> String {
        format!("{}.ttf", self.full_name)
    }
}

impl Default for NameFields {
    fn default() -> Self {
        NameFields::resolve(None, None, None)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// The parts of a `/modify-font` upload, as collected from the multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub font: Option<Bytes>,
    pub family_name: Option<String>,
    pub subfamily_name: Option<String>,
    pub full_name: Option<String>,
}

impl UploadForm {
    pub fn set_field(&mut self, field: NameField, value: String) {
        let slot = match field {
            NameField::Family => &mut self.family_name,
            NameField::Subfamily => &mut self.subfamily_name,
            NameField::FullName => &mut self.full_name,
        };
        *slot = Some(value);
    }

    pub fn name_fields(&self) -> NameFields {
        NameFields::resolve(
            self.family_name.as_deref(),
            self.subfamily_name.as_deref(),
            self.full_name.as_deref(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
}

impl PingResponse {
    pub fn ok() -> Self {
        PingResponse {
            status: "ok".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
