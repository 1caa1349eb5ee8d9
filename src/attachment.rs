use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// Tried in order; the first capture wins
    static ref FILE_ID_PATTERNS: Vec<Regex> = vec![
        // share link: /d/FILE_ID/view
        Regex::new(r"/d/([a-zA-Z0-9_-]+)(?:/view)?").unwrap(),
        // query parameter: ?id=FILE_ID
        Regex::new(r"id=([a-zA-Z0-9_-]+)").unwrap(),
        // open link: /open?id=FILE_ID
        Regex::new(r"/open\?id=([a-zA-Z0-9_-]+)").unwrap(),
        // direct download: uc?id=FILE_ID&export=download
        Regex::new(r"uc\?id=([a-zA-Z0-9_-]+)").unwrap(),
        // embed: /file/d/FILE_ID/preview
        Regex::new(r"/file/d/([a-zA-Z0-9_-]+)/preview").unwrap(),
    ];
}

const THUMBNAIL_BASE: &str = "https://drive.google.com/thumbnail";
const THUMBNAIL_SIZE: &str = "w300";

/// Extract the hosted file identifier from a shared attachment URL
pub fn resolve_file_id(url: &str) -> Option<&str> {
    if url.is_empty() {
        return None;
    }
    FILE_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn thumbnail_url(file_id: &str) -> String {
    format!("{THUMBNAIL_BASE}?id={file_id}&sz={THUMBNAIL_SIZE}")
}

/// An attachment slot ready for display. `thumbnail: None` means the generic icon.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttachmentRef {
    /// 1-based slot number, used in the "เอกสารแนบ N" caption
    pub index: usize,
    pub url: String,
    pub thumbnail: Option<String>,
}

impl AttachmentRef {
    pub fn new(index: usize, url: &str) -> Self {
        AttachmentRef {
            index,
            url: url.to_string(),
            thumbnail: resolve_file_id(url).map(thumbnail_url),
        }
    }

    pub fn caption(&self) -> String {
        format!("{} {}", crate::record::labels::ATTACHMENT, self.index)
    }
}
