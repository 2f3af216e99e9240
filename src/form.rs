//! Form drafts and the payloads built from them.
//!
//! Every entity declares one [`FormSchema`]: the field names the server's
//! parser expects and how each one is encoded. Drafts can only hold fields the
//! schema names, so the payload builder and the server contract cannot drift
//! apart field by field.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

/// How a field travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Text,
    /// Coerced to a non-negative integer before sending.
    Number,
    Bool,
    /// Structured sub-data; a single JSON-serialized part in multipart bodies.
    Json,
    File { multiple: bool, max_bytes: u64 },
}

impl Encoding {
    pub fn describe(&self) -> &'static str {
        match self {
            Encoding::Text => "text",
            Encoding::Number => "a number",
            Encoding::Bool => "true/false",
            Encoding::Json => "JSON",
            Encoding::File { .. } => "a file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub encoding: Encoding,
    pub required: bool,
    /// Resent with partial updates; the server treats an absent field as "clear it".
    pub companion: bool,
}

impl FieldSpec {
    const fn of(name: &'static str, encoding: Encoding) -> Self {
        Self { name, encoding, required: false, companion: false }
    }

    pub const fn text(name: &'static str) -> Self { Self::of(name, Encoding::Text) }
    pub const fn number(name: &'static str) -> Self { Self::of(name, Encoding::Number) }
    pub const fn flag(name: &'static str) -> Self { Self::of(name, Encoding::Bool) }
    pub const fn json(name: &'static str) -> Self { Self::of(name, Encoding::Json) }

    pub const fn file(name: &'static str, max_bytes: u64) -> Self {
        Self::of(name, Encoding::File { multiple: false, max_bytes })
    }

    pub const fn files(name: &'static str, max_bytes: u64) -> Self {
        Self::of(name, Encoding::File { multiple: true, max_bytes })
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn companion(mut self) -> Self {
        self.companion = true;
        self
    }
}

/// Ordered field list for one entity.
#[derive(Debug)]
pub struct FormSchema {
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Any file field forces a multipart body.
    pub fn is_multipart(&self) -> bool {
        self.fields.iter().any(|f| matches!(f.encoding, Encoding::File { .. }))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{field}` expects {expected}")]
    WrongKind { field: String, expected: &'static str },
    #[error("`{0}` is required")]
    Required(String),
    #[error("`{field}`: {file} is {size} bytes, the limit is {limit}")]
    FileTooLarge { field: String, file: String, size: u64, limit: u64 },
    #[error("field `{field}` is not valid JSON: {reason}")]
    InvalidJson { field: String, reason: String },
    #[error("field `{field}` is not true/false: `{value}`")]
    InvalidBool { field: String, value: String },
}

/// Leading integer digits, never negative. Blanks and garbage give 0.
pub fn coerce_non_negative(raw: &str) -> u64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: u64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(u64::from(b - b'0'));
    }
    if !seen || negative { 0 } else { value }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid_json(field: &str, e: serde_json::Error) -> FormError {
    FormError::InvalidJson { field: field.to_string(), reason: e.to_string() }
}

/// A new file chosen for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name).first_or_octet_stream().to_string();
        Self { file_name, mime, bytes }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading upload {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 { self.bytes.len() as u64 }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Raw input as typed; used for text and number fields.
    Text(String),
    Bool(bool),
    Json(serde_json::Value),
    Files(Vec<FileUpload>),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self { FieldValue::Text(v.to_string()) }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self { FieldValue::Text(v) }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self { FieldValue::Text(v.unwrap_or_default()) }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self { FieldValue::Text(v.to_string()) }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self { FieldValue::Bool(v) }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self { FieldValue::Json(v) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    File(FileUpload),
}

/// Multipart body, kept inspectable until it is handed to the HTTP client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<(String, Part)>,
}

impl FormPayload {
    pub fn parts(&self) -> &[(String, Part)] { &self.parts }

    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|(n, p)| match p {
                Part::Text(t) if n == name => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> { self.texts(name).into_iter().next() }

    pub fn files(&self, name: &str) -> Vec<&FileUpload> {
        self.parts
            .iter()
            .filter_map(|(n, p)| match p {
                Part::File(f) if n == name => Some(f),
                _ => None,
            })
            .collect()
    }

    fn push_text(&mut self, name: &str, value: String) {
        self.parts.push((name.to_string(), Part::Text(value)));
    }

    pub fn into_form(self) -> reqwest::Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in self.parts {
            form = match part {
                Part::Text(t) => form.text(name, t),
                Part::File(f) => {
                    let part = reqwest::multipart::Part::bytes(f.bytes)
                        .file_name(f.file_name)
                        .mime_str(&f.mime)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Request body for a create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Multipart(FormPayload),
}

impl Payload {
    pub fn is_multipart(&self) -> bool { matches!(self, Payload::Multipart(_)) }
}

/// Local draft of one form, bound to its schema.
#[derive(Debug, Clone)]
pub struct FormDraft {
    schema: &'static FormSchema,
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormDraft {
    pub fn new(schema: &'static FormSchema) -> Self { Self { schema, values: BTreeMap::new() } }

    pub fn schema(&self) -> &'static FormSchema { self.schema }

    fn spec(&self, name: &str) -> Result<&'static FieldSpec, FormError> {
        self.schema.field(name).ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn wrong_kind(spec: &FieldSpec) -> FormError {
        FormError::WrongKind { field: spec.name.to_string(), expected: spec.encoding.describe() }
    }

    /// Set a text or number field from raw input.
    pub fn set_text(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        match spec.encoding {
            Encoding::Text | Encoding::Number => {
                self.values.insert(spec.name, FieldValue::Text(value.into()));
                Ok(self)
            }
            _ => Err(Self::wrong_kind(spec)),
        }
    }

    pub fn set_number(&mut self, name: &str, value: i64) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        if spec.encoding != Encoding::Number {
            return Err(Self::wrong_kind(spec));
        }
        self.values.insert(spec.name, FieldValue::Text(value.to_string()));
        Ok(self)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        if spec.encoding != Encoding::Bool {
            return Err(Self::wrong_kind(spec));
        }
        self.values.insert(spec.name, FieldValue::Bool(value));
        Ok(self)
    }

    pub fn set_json<T: Serialize>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        if spec.encoding != Encoding::Json {
            return Err(Self::wrong_kind(spec));
        }
        let value = serde_json::to_value(value).map_err(|e| invalid_json(name, e))?;
        self.values.insert(spec.name, FieldValue::Json(value));
        Ok(self)
    }

    /// Add a new upload. Single-file fields keep only the latest choice.
    pub fn attach(&mut self, name: &str, file: FileUpload) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        let Encoding::File { multiple, .. } = spec.encoding else {
            return Err(Self::wrong_kind(spec));
        };
        let slot = self.values.entry(spec.name).or_insert_with(|| FieldValue::Files(Vec::new()));
        match slot {
            FieldValue::Files(files) if multiple => files.push(file),
            other => *other = FieldValue::Files(vec![file]),
        }
        Ok(self)
    }

    /// Set any non-file field from a raw string, parsed per the schema.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<&mut Self, FormError> {
        let spec = self.spec(name)?;
        match spec.encoding {
            Encoding::Text | Encoding::Number => self.set_text(name, raw),
            Encoding::Bool => {
                let v = parse_flag(raw).ok_or_else(|| FormError::InvalidBool {
                    field: name.to_string(),
                    value: raw.to_string(),
                })?;
                self.set_bool(name, v)
            }
            Encoding::Json => {
                let v: serde_json::Value =
                    serde_json::from_str(raw).map_err(|e| invalid_json(name, e))?;
                self.values.insert(spec.name, FieldValue::Json(v));
                Ok(self)
            }
            Encoding::File { .. } => Err(Self::wrong_kind(spec)),
        }
    }

    /// Pre-fill from a stored record. Names outside the schema are ignored.
    pub fn prefill(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        if let Some(spec) = self.schema.field(name) {
            self.values.insert(spec.name, value.into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> { self.values.get(name) }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(t)) => Some(t),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn json(&self, name: &str) -> Option<&serde_json::Value> {
        match self.values.get(name) {
            Some(FieldValue::Json(v)) => Some(v),
            _ => None,
        }
    }

    /// Drop every field the predicate rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&FieldSpec) -> bool) {
        let schema = self.schema;
        self.values.retain(|name, _| schema.field(name).is_some_and(&mut keep));
    }

    /// Per-field checks: required text present, uploads within their ceilings.
    pub fn validate(&self) -> Result<(), FormError> {
        for spec in self.schema.fields {
            let value = self.values.get(spec.name);
            if spec.required && matches!(spec.encoding, Encoding::Text | Encoding::Number) {
                let present = matches!(value, Some(FieldValue::Text(t)) if !t.trim().is_empty());
                if !present {
                    return Err(FormError::Required(spec.name.to_string()));
                }
            }
            let (Encoding::File { max_bytes, .. }, Some(FieldValue::Files(files))) =
                (spec.encoding, value)
            else {
                continue;
            };
            if let Some(big) = files.iter().find(|f| f.size() > max_bytes) {
                return Err(FormError::FileTooLarge {
                    field: spec.name.to_string(),
                    file: big.file_name.clone(),
                    size: big.size(),
                    limit: max_bytes,
                });
            }
        }
        Ok(())
    }

    /// Validate, then encode.
    pub fn build(&self) -> Result<Payload, FormError> {
        self.validate()?;
        Ok(self.encode())
    }

    /// Encode without validation; used for partial updates that carry only a few fields.
    pub fn encode(&self) -> Payload {
        if self.schema.is_multipart() {
            Payload::Multipart(self.encode_multipart())
        } else {
            Payload::Json(self.encode_json())
        }
    }

    fn encode_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for spec in self.schema.fields {
            let Some(value) = self.values.get(spec.name) else { continue };
            let json = match (spec.encoding, value) {
                (Encoding::Number, FieldValue::Text(raw)) => {
                    serde_json::Value::from(coerce_non_negative(raw))
                }
                (_, FieldValue::Text(t)) => serde_json::Value::String(t.clone()),
                (_, FieldValue::Bool(b)) => serde_json::Value::Bool(*b),
                (_, FieldValue::Json(v)) => v.clone(),
                (_, FieldValue::Files(_)) => continue,
            };
            obj.insert(spec.name.to_string(), json);
        }
        serde_json::Value::Object(obj)
    }

    fn encode_multipart(&self) -> FormPayload {
        let mut out = FormPayload::default();
        for spec in self.schema.fields {
            let Some(value) = self.values.get(spec.name) else { continue };
            match (spec.encoding, value) {
                (Encoding::Number, FieldValue::Text(raw)) => {
                    out.push_text(spec.name, coerce_non_negative(raw).to_string())
                }
                (_, FieldValue::Text(t)) => out.push_text(spec.name, t.clone()),
                (_, FieldValue::Bool(b)) => out.push_text(spec.name, b.to_string()),
                (_, FieldValue::Json(v)) => out.push_text(spec.name, v.to_string()),
                // No new file chosen means "leave unchanged": the field is simply absent.
                (_, FieldValue::Files(files)) => {
                    for f in files {
                        out.parts.push((spec.name.to_string(), Part::File(f.clone())));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GALLERY: FormSchema = FormSchema { fields: &[
        FieldSpec::text("title").required(),
        FieldSpec::number("domainId"),
        FieldSpec::flag("isActive"),
        FieldSpec::json("existingImages").companion(),
        FieldSpec::files("images", 1024),
    ] };

    static NOTE: FormSchema = FormSchema { fields: &[
        FieldSpec::text("title").required(),
        FieldSpec::number("priority"),
        FieldSpec::flag("isActive"),
        FieldSpec::json("tags"),
    ] };

    #[test]
    fn coercion_clamps_to_non_negative() {
        for raw in ["-5", "", "abc", "-0", "   ", "-", "+"] {
            assert_eq!(coerce_non_negative(raw), 0, "input {raw:?}");
        }
        assert_eq!(coerce_non_negative("7"), 7);
        assert_eq!(coerce_non_negative("  42"), 42);
        assert_eq!(coerce_non_negative("12abc"), 12);
        assert_eq!(coerce_non_negative("+3"), 3);
        assert_eq!(coerce_non_negative("4.9"), 4);
        assert_eq!(coerce_non_negative("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn multipart_carries_retained_list_and_each_new_file() {
        let retained = vec!["a.png", "b.png", "c.png"];
        let mut d = FormDraft::new(&GALLERY);
        d.set_text("title", "Banner").unwrap()
            .set_text("domainId", "-4").unwrap()
            .set_bool("isActive", false).unwrap()
            .set_json("existingImages", &retained).unwrap();
        d.attach("images", FileUpload::new("x.png", vec![1, 2])).unwrap();
        d.attach("images", FileUpload::new("y.jpg", vec![3])).unwrap();

        let Payload::Multipart(p) = d.build().unwrap() else { panic!("expected multipart") };
        let lists = p.texts("existingImages");
        assert_eq!(lists.len(), 1);
        let parsed: Vec<String> = serde_json::from_str(lists[0]).unwrap();
        assert_eq!(parsed.len(), retained.len());
        assert_eq!(p.files("images").len(), 2);
        assert_eq!(p.files("images")[1].mime, "image/jpeg");
        assert_eq!(p.text("domainId"), Some("0"));
        assert_eq!(p.text("isActive"), Some("false"));
    }

    #[test]
    fn file_field_without_new_upload_is_omitted() {
        let mut d = FormDraft::new(&GALLERY);
        d.set_text("title", "Banner").unwrap();
        let Payload::Multipart(p) = d.build().unwrap() else { panic!("expected multipart") };
        assert!(p.files("images").is_empty());
        assert!(p.parts().iter().all(|(n, _)| n != "images"));
    }

    #[test]
    fn json_schema_encodes_typed_values() {
        let mut d = FormDraft::new(&NOTE);
        d.set("title", "Exam dates").unwrap()
            .set("priority", "abc").unwrap()
            .set("isActive", "yes").unwrap()
            .set("tags", r#"["exam","2024"]"#).unwrap();
        let Payload::Json(v) = d.build().unwrap() else { panic!("expected json") };
        assert_eq!(v["title"], "Exam dates");
        assert_eq!(v["priority"], 0);
        assert_eq!(v["isActive"], true);
        assert_eq!(v["tags"][1], "2024");
    }

    #[test]
    fn schema_rejects_unknown_and_mistyped_fields() {
        let mut d = FormDraft::new(&NOTE);
        assert_eq!(d.set("nope", "x").unwrap_err(), FormError::UnknownField("nope".into()));
        assert!(matches!(d.set_bool("title", true), Err(FormError::WrongKind { .. })));
        assert!(matches!(d.set("isActive", "maybe"), Err(FormError::InvalidBool { .. })));
        assert!(matches!(d.set("tags", "[oops"), Err(FormError::InvalidJson { .. })));
        let file = FileUpload::new("a.txt", vec![]);
        assert!(matches!(d.attach("title", file), Err(FormError::WrongKind { .. })));
    }

    #[test]
    fn validation_checks_required_and_file_ceiling() {
        let mut d = FormDraft::new(&GALLERY);
        d.set_text("title", "   ").unwrap();
        assert_eq!(d.build().unwrap_err(), FormError::Required("title".into()));

        d.set_text("title", "ok").unwrap();
        d.attach("images", FileUpload::new("huge.png", vec![0; 2048])).unwrap();
        assert!(matches!(d.build(), Err(FormError::FileTooLarge { size: 2048, limit: 1024, .. })));
    }

    #[test]
    fn retain_keeps_companions_for_partial_updates() {
        let mut d = FormDraft::new(&GALLERY);
        d.set_text("title", "Banner").unwrap()
            .set_bool("isActive", true).unwrap()
            .set_json("existingImages", &["a.png"]).unwrap();
        d.retain(|f| f.name == "isActive" || f.companion);
        let Payload::Multipart(p) = d.encode() else { panic!("expected multipart") };
        assert_eq!(p.text("title"), None);
        assert_eq!(p.text("isActive"), Some("true"));
        assert_eq!(p.text("existingImages"), Some(r#"["a.png"]"#));
    }

    #[tokio::test]
    async fn upload_reads_file_and_guesses_mime() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logo.svg");
        tokio::fs::write(&path, b"<svg/>").await.unwrap();
        let f = FileUpload::from_path(&path).await.unwrap();
        assert_eq!(f.file_name, "logo.svg");
        assert_eq!(f.mime, "image/svg+xml");
        assert_eq!(f.size(), 6);
    }
}
