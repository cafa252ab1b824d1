//! Validation gate for composite submissions.
//!
//! [`validate`] walks a raw JSON payload section by section, collecting every
//! violation into a [`FieldErrors`] map keyed by dotted field path
//! (`coords.latitude`, `images.0.data`). Nothing here touches the store.
//!
//! Checks are limited to presence, type conformance, and the format rules a
//! form serializer applies implicitly (email syntax, max length, decodable
//! image). There is no business validation.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;

use base64::Engine as _;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateLength};

use crate::models::{
    NewCoords, NewImage, NewLevel, NewPereval, NewSubmitter, ValidatedSubmission,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Max length of `fam`, `name` and `otc`.
pub const MAX_PERSON_NAME_LEN: u64 = 150;

/// Max length of `user.email` (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: u64 = 254;

pub const MAX_PHONE_LEN: u64 = 32;

/// Max length of report titles, `connect` and image titles.
pub const MAX_TITLE_LEN: u64 = 255;

/// Max length of a single seasonal grade (`1A`, `3B*`, ...).
pub const MAX_GRADE_LEN: u64 = 10;

/// Largest decoded image accepted, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const MSG_REQUIRED: &str = "This field is required.";
const MSG_NULL: &str = "This field may not be null.";
const MSG_BLANK: &str = "This field may not be blank.";
const MSG_NOT_STRING: &str = "Not a valid string.";
const MSG_NOT_NUMBER: &str = "A valid number is required.";
const MSG_NOT_INTEGER: &str = "A valid integer is required.";
const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
const MSG_EMPTY_LIST: &str = "This list may not be empty.";
const MSG_NOT_FILE: &str =
    "The submitted data was not a file. Check the encoding type on the form.";
const MSG_EMPTY_FILE: &str = "The submitted file is empty.";
const MSG_INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const MSG_DATETIME_FORMAT: &str = "Datetime has wrong format. Use one of these formats instead: \
     YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z], YYYY-MM-DD hh:mm:ss.";

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Field path → error messages. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with a single entry under `non_field_errors`.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate and normalize a raw composite payload.
///
/// Every section is checked even after the first failure so the caller gets
/// the complete error set in one round trip.
pub fn validate(payload: &Value) -> Result<ValidatedSubmission, FieldErrors> {
    let Some(root) = payload.as_object() else {
        return Err(FieldErrors::non_field(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            json_type(payload)
        )));
    };

    let mut errors = FieldErrors::new();
    let top = Fields::root(root);

    let pereval = pereval_fields(&top, &mut errors);
    let submitter = top
        .section("user", &mut errors)
        .and_then(|user| submitter_fields(&user, &mut errors));
    let coords = top
        .section("coords", &mut errors)
        .and_then(|coords| coords_fields(&coords, &mut errors));
    let level = top
        .section("level", &mut errors)
        .and_then(|level| level_fields(&level, &mut errors));
    let images = image_entries(&top, &mut errors);

    match (submitter, pereval, coords, level, images) {
        (Some(submitter), Some(pereval), Some(coords), Some(level), Some(images))
            if errors.is_empty() =>
        {
            Ok(ValidatedSubmission {
                submitter,
                pereval,
                coords,
                level,
                images,
            })
        }
        _ => Err(errors),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn pereval_fields(top: &Fields<'_>, errors: &mut FieldErrors) -> Option<NewPereval> {
    let title = top.string("title", StrRule::required(MAX_TITLE_LEN), errors);
    let beauty_title = top.string("beauty_title", StrRule::optional(MAX_TITLE_LEN), errors);
    let other_titles = top.string("other_titles", StrRule::optional(MAX_TITLE_LEN), errors);
    let connect = top.string("connect", StrRule::optional(MAX_TITLE_LEN), errors);
    let add_time = top.timestamp("add_time", errors);

    Some(NewPereval {
        beauty_title: beauty_title?,
        title: title?,
        other_titles: other_titles?,
        connect: connect?,
        add_time: add_time?,
    })
}

fn submitter_fields(user: &Fields<'_>, errors: &mut FieldErrors) -> Option<NewSubmitter> {
    let last_name = user.string("fam", StrRule::required(MAX_PERSON_NAME_LEN), errors);
    let first_name = user.string("name", StrRule::required(MAX_PERSON_NAME_LEN), errors);
    let patronymic = user.string("otc", StrRule::optional(MAX_PERSON_NAME_LEN), errors);
    let phone = user.string("phone", StrRule::required(MAX_PHONE_LEN), errors);
    let email = user
        .string("email", StrRule::required(MAX_EMAIL_LEN), errors)
        .and_then(|email| {
            if email.validate_email() {
                Some(email)
            } else {
                errors.add(user.path("email"), MSG_INVALID_EMAIL);
                None
            }
        });

    Some(NewSubmitter {
        email: email?,
        last_name: last_name?,
        first_name: first_name?,
        patronymic: patronymic?,
        phone: phone?,
    })
}

fn coords_fields(coords: &Fields<'_>, errors: &mut FieldErrors) -> Option<NewCoords> {
    let latitude = coords.number("latitude", errors);
    let longitude = coords.number("longitude", errors);
    let height = coords.integer("height", errors);

    Some(NewCoords {
        latitude: latitude?,
        longitude: longitude?,
        height: height?,
    })
}

fn level_fields(level: &Fields<'_>, errors: &mut FieldErrors) -> Option<NewLevel> {
    let rule = StrRule::grade(MAX_GRADE_LEN);
    let winter = level.string("winter", rule, errors);
    let summer = level.string("summer", rule, errors);
    let spring = level.string("spring", rule, errors);
    let autumn = level.string("autumn", rule, errors);

    Some(NewLevel {
        winter: winter?,
        summer: summer?,
        spring: spring?,
        autumn: autumn?,
    })
}

/// `images` may be a single object or a non-empty array of objects. Both are
/// normalized to a sequence.
fn image_entries(top: &Fields<'_>, errors: &mut FieldErrors) -> Option<Vec<NewImage>> {
    let path = top.path("images");
    match top.get("images") {
        None => {
            errors.add(path, MSG_REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(path, MSG_NULL);
            None
        }
        Some(Value::Object(entry)) => {
            let fields = Fields::nested(entry, path);
            image_fields(&fields, errors).map(|image| vec![image])
        }
        Some(Value::Array(items)) if items.is_empty() => {
            errors.add(path, MSG_EMPTY_LIST);
            None
        }
        Some(Value::Array(items)) => {
            let mut images = Vec::with_capacity(items.len());
            let mut all_valid = true;
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}.{index}");
                match item.as_object() {
                    Some(entry) => {
                        match image_fields(&Fields::nested(entry, item_path), errors) {
                            Some(image) => images.push(image),
                            None => all_valid = false,
                        }
                    }
                    None => {
                        errors.add(item_path, expected_object(item));
                        all_valid = false;
                    }
                }
            }
            all_valid.then_some(images)
        }
        Some(other) => {
            errors.add(
                path,
                format!(
                    "Invalid data. Expected a dictionary or a list of dictionaries, but got {}.",
                    json_type(other)
                ),
            );
            None
        }
    }
}

fn image_fields(entry: &Fields<'_>, errors: &mut FieldErrors) -> Option<NewImage> {
    let title = entry.string("title", StrRule::required(MAX_TITLE_LEN), errors);
    let data = entry.image_data("data", errors);
    let (data, inspected) = data?;

    Some(NewImage {
        title: title?,
        data,
        mime_type: inspected.mime_type.to_string(),
        width: inspected.width,
        height: inspected.height,
    })
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct StrRule {
    required: bool,
    allow_blank: bool,
    max_len: u64,
}

impl StrRule {
    fn required(max_len: u64) -> Self {
        Self {
            required: true,
            allow_blank: false,
            max_len,
        }
    }

    /// Absent or `null` reads as an empty string.
    fn optional(max_len: u64) -> Self {
        Self {
            required: false,
            allow_blank: true,
            max_len,
        }
    }

    /// Key must be present, but an empty grade is allowed.
    fn grade(max_len: u64) -> Self {
        Self {
            required: true,
            allow_blank: true,
            max_len,
        }
    }
}

/// A JSON object plus the dotted path it lives at.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn root(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            prefix: String::new(),
        }
    }

    fn nested(map: &'a Map<String, Value>, prefix: String) -> Self {
        Self { map, prefix }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    /// A required nested object.
    fn section(&self, key: &str, errors: &mut FieldErrors) -> Option<Fields<'a>> {
        let path = self.path(key);
        match self.get(key) {
            None => {
                errors.add(path, MSG_REQUIRED);
                None
            }
            Some(Value::Null) => {
                errors.add(path, MSG_NULL);
                None
            }
            Some(Value::Object(map)) => Some(Fields::nested(map, path)),
            Some(other) => {
                errors.add(path, expected_object(other));
                None
            }
        }
    }

    /// Read a string, trimming surrounding whitespace.
    fn string(&self, key: &str, rule: StrRule, errors: &mut FieldErrors) -> Option<String> {
        let path = self.path(key);
        let raw = match self.get(key) {
            None | Some(Value::Null) if !rule.required => return Some(String::new()),
            None => {
                errors.add(path, MSG_REQUIRED);
                return None;
            }
            Some(Value::Null) => {
                errors.add(path, MSG_NULL);
                return None;
            }
            Some(Value::String(s)) => s,
            Some(_) => {
                errors.add(path, MSG_NOT_STRING);
                return None;
            }
        };

        let value = raw.trim().to_string();
        if value.is_empty() && !rule.allow_blank {
            errors.add(path, MSG_BLANK);
            return None;
        }
        if !value.validate_length(None, Some(rule.max_len), None) {
            errors.add(
                path,
                format!(
                    "Ensure this field has no more than {} characters.",
                    rule.max_len
                ),
            );
            return None;
        }
        Some(value)
    }

    /// A required JSON number. Numeric strings are rejected.
    fn number(&self, key: &str, errors: &mut FieldErrors) -> Option<f64> {
        let path = self.path(key);
        match self.get(key) {
            None => {
                errors.add(path, MSG_REQUIRED);
                None
            }
            Some(Value::Null) => {
                errors.add(path, MSG_NULL);
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => Some(v),
                None => {
                    errors.add(path, MSG_NOT_NUMBER);
                    None
                }
            },
            Some(_) => {
                errors.add(path, MSG_NOT_NUMBER);
                None
            }
        }
    }

    /// A required integer that fits in `i32`. Integral floats (`1200.0`) are
    /// accepted.
    fn integer(&self, key: &str, errors: &mut FieldErrors) -> Option<i32> {
        let path = self.path(key);
        let number = match self.get(key) {
            None => {
                errors.add(path, MSG_REQUIRED);
                return None;
            }
            Some(Value::Null) => {
                errors.add(path, MSG_NULL);
                return None;
            }
            Some(Value::Number(n)) => n,
            Some(_) => {
                errors.add(path, MSG_NOT_INTEGER);
                return None;
            }
        };

        let wide = match number.as_i64() {
            Some(v) => v,
            None => match number.as_f64() {
                Some(v) if v.fract() == 0.0 && v.abs() <= i64::MAX as f64 => v as i64,
                _ => {
                    errors.add(path, MSG_NOT_INTEGER);
                    return None;
                }
            },
        };

        if wide > i64::from(i32::MAX) {
            errors.add(
                path,
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            return None;
        }
        if wide < i64::from(i32::MIN) {
            errors.add(
                path,
                format!("Ensure this value is greater than or equal to {}.", i32::MIN),
            );
            return None;
        }
        i32::try_from(wide).ok()
    }

    /// Optional timestamp. Absent or `null` defaults to now.
    fn timestamp(&self, key: &str, errors: &mut FieldErrors) -> Option<DateTime<Utc>> {
        match self.get(key) {
            None | Some(Value::Null) => Some(Utc::now()),
            Some(Value::String(s)) => match parse_timestamp(s.trim()) {
                Some(ts) => Some(ts),
                None => {
                    errors.add(self.path(key), MSG_DATETIME_FORMAT);
                    None
                }
            },
            Some(_) => {
                errors.add(self.path(key), MSG_DATETIME_FORMAT);
                None
            }
        }
    }

    /// A required base64-encoded image. Returns the decoded bytes and what
    /// the header says about them.
    fn image_data(
        &self,
        key: &str,
        errors: &mut FieldErrors,
    ) -> Option<(Vec<u8>, InspectedImage)> {
        let path = self.path(key);
        let encoded = match self.get(key) {
            None => {
                errors.add(path, MSG_REQUIRED);
                return None;
            }
            Some(Value::Null) => {
                errors.add(path, MSG_NULL);
                return None;
            }
            Some(Value::String(s)) => s.trim(),
            Some(_) => {
                errors.add(path, MSG_NOT_FILE);
                return None;
            }
        };

        if encoded.is_empty() {
            errors.add(path, MSG_EMPTY_FILE);
            return None;
        }

        let bytes = match base64::engine::general_purpose::STANDARD.decode(strip_data_uri(encoded))
        {
            Ok(bytes) => bytes,
            Err(_) => {
                errors.add(path, MSG_NOT_FILE);
                return None;
            }
        };

        if bytes.is_empty() {
            errors.add(path, MSG_EMPTY_FILE);
            return None;
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            errors.add(
                path,
                format!("Ensure this file is no larger than {MAX_IMAGE_BYTES} bytes."),
            );
            return None;
        }

        match inspect_image(&bytes) {
            Some(inspected) => Some((bytes, inspected)),
            None => {
                errors.add(path, MSG_INVALID_IMAGE);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InspectedImage {
    mime_type: &'static str,
    width: i32,
    height: i32,
}

/// Sniff the format from magic bytes and read dimensions from the header
/// without decoding pixel data. `None` for anything unrecognized, corrupt,
/// or of a format this build cannot read.
fn inspect_image(bytes: &[u8]) -> Option<InspectedImage> {
    let format = image::guess_format(bytes).ok()?;
    let (width, height) = image::ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .ok()?;
    Some(InspectedImage {
        mime_type: format.to_mime_type(),
        width: i32::try_from(width).ok()?,
        height: i32::try_from(height).ok()?,
    })
}

/// Accept `data:image/png;base64,....` as well as bare base64.
fn strip_data_uri(encoded: &str) -> &str {
    match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map_or(encoded, |(_, payload)| payload),
        None => encoded,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn expected_object(value: &Value) -> String {
    format!(
        "Invalid data. Expected a dictionary, but got {}.",
        json_type(value)
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
