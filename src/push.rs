// Push request builder: turns a type tag plus the loose set of fields
// collected from prompts or flags into exactly one `PushRequest` variant.
// Everything here is pure apart from the file existence check.

use crate::error::{PushError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::{Host, Url};

/// The five kinds of push the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushType {
    Note,
    Link,
    Address,
    List,
    File,
}

/// A single input field. Each push type needs a fixed subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Body,
    Url,
    Name,
    Address,
    Items,
    Filename,
}

impl Field {
    /// Prompt text shown by the interactive wizard.
    pub fn prompt(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Body => "Body",
            Field::Url => "URL",
            Field::Name => "Place Name",
            Field::Address => "Address",
            Field::Items => "List Items (comma-delimited)",
            Field::Filename => "Filename",
        }
    }
}

impl PushType {
    pub const ALL: [PushType; 5] = [
        PushType::Note,
        PushType::Link,
        PushType::Address,
        PushType::List,
        PushType::File,
    ];

    /// Tag used on the wire (`type` field).
    pub fn as_str(self) -> &'static str {
        match self {
            PushType::Note => "note",
            PushType::Link => "link",
            PushType::Address => "address",
            PushType::List => "list",
            PushType::File => "file",
        }
    }

    /// Capitalized name for menus.
    pub fn label(self) -> &'static str {
        match self {
            PushType::Note => "Note",
            PushType::Link => "Link",
            PushType::Address => "Address",
            PushType::List => "List",
            PushType::File => "File",
        }
    }

    /// Fields this push type is built from, in prompt order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            PushType::Note => &[Field::Title, Field::Body],
            PushType::Link => &[Field::Title, Field::Url],
            PushType::Address => &[Field::Name, Field::Address],
            PushType::List => &[Field::Title, Field::Items],
            PushType::File => &[Field::Filename],
        }
    }

    /// Build the variant for this type from `fields`.
    pub fn build(self, fields: &PushFields) -> Result<PushRequest> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let request = match self {
            PushType::Note => PushRequest::Note {
                title: text(&fields.title),
                body: text(&fields.body),
            },
            PushType::Link => {
                let url = fields
                    .url
                    .as_deref()
                    .ok_or_else(|| PushError::invalid("a link push needs a URL"))?;
                validate_url(url)?;
                PushRequest::Link {
                    title: text(&fields.title),
                    url: url.to_string(),
                }
            }
            PushType::Address => PushRequest::Address {
                name: text(&fields.name),
                address: text(&fields.address),
            },
            PushType::List => PushRequest::List {
                title: text(&fields.title),
                items: fields.items.as_deref().map(split_items).unwrap_or_default(),
            },
            PushType::File => {
                let filename = fields
                    .filename
                    .as_deref()
                    .ok_or_else(|| PushError::invalid("a file push needs a filename"))?;
                let path = resolve_file(filename)?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filename.to_string());
                PushRequest::File { file_name, path }
            }
        };
        Ok(request)
    }
}

impl fmt::Display for PushType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PushType {
    type Err = PushError;

    /// Case-insensitive: `Note`, `note` and `NOTE` are the same tag.
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        PushType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| {
                PushError::invalid(format!(
                    "unknown push type '{tag}' (expected Note, Link, Address, List or File)"
                ))
            })
    }
}

/// Raw field values as collected, before validation. Absent means the
/// user was never asked or did not pass the flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushFields {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    /// Comma-delimited.
    pub items: Option<String>,
    pub filename: Option<String>,
}

impl PushFields {
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Body => &mut self.body,
            Field::Url => &mut self.url,
            Field::Name => &mut self.name,
            Field::Address => &mut self.address,
            Field::Items => &mut self.items,
            Field::Filename => &mut self.filename,
        };
        *slot = Some(value);
    }
}

/// A validated push. Serializes to the JSON body the service expects,
/// except for `File`, which is sent as a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushRequest {
    Note {
        title: String,
        body: String,
    },
    Link {
        title: String,
        url: String,
    },
    Address {
        name: String,
        address: String,
    },
    List {
        title: String,
        items: Vec<String>,
    },
    #[serde(skip_serializing)]
    File {
        file_name: String,
        /// Absolute path on the local disk.
        path: PathBuf,
    },
}

impl PushRequest {
    pub fn push_type(&self) -> PushType {
        match self {
            PushRequest::Note { .. } => PushType::Note,
            PushRequest::Link { .. } => PushType::Link,
            PushRequest::Address { .. } => PushType::Address,
            PushRequest::List { .. } => PushType::List,
            PushRequest::File { .. } => PushType::File,
        }
    }

    /// JSON body for a non-file push, with `device_iden` added when the
    /// push targets one device.
    pub fn to_json(&self, target: Option<&str>) -> Result<Value> {
        if let PushRequest::File { .. } = self {
            return Err(PushError::invalid("file pushes are sent as multipart uploads"));
        }
        let mut body = serde_json::to_value(self)?;
        if let (Some(device), Value::Object(map)) = (target, &mut body) {
            map.insert("device_iden".to_string(), Value::String(device.to_string()));
        }
        Ok(body)
    }
}

/// Build a push from a type tag such as `"note"` or `"Link"`.
pub fn build(type_tag: &str, fields: &PushFields) -> Result<PushRequest> {
    type_tag.parse::<PushType>()?.build(fields)
}

/// Split a comma-delimited list, trimming each item. Blank input is an
/// empty list.
pub fn split_items(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// Accepts http, https and ftp URLs with a dotted domain or an IP host.
/// A missing scheme is read as http, so `example.com` passes.
pub fn validate_url(raw: &str) -> Result<()> {
    let invalid = || PushError::invalid(format!("'{raw}' is not a valid URL"));

    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    // Without `://`, `example.com:8080` would parse with `example.com` as
    // the scheme.
    let url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("http://{raw}"))
    }
    .map_err(|_| invalid())?;

    if !matches!(url.scheme(), "http" | "https" | "ftp") {
        return Err(invalid());
    }

    match url.host() {
        Some(Host::Domain(domain))
            if domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') =>
        {
            Ok(())
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(()),
        _ => Err(invalid()),
    }
}

/// Resolve `raw` against the working directory and require it to exist.
pub fn resolve_file(raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(PushError::invalid("filename is empty"));
    }
    let path = PathBuf::from(raw);
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    if !path.exists() {
        return Err(PushError::invalid(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(path)
}
