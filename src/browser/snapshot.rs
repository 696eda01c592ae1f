use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// PageSnapshot — the single fetched view of a page shared by all phases
// ============================================================================

/// Best-effort rendering of a target page.
///
/// Built once per scan and only ever read afterwards. When the fetch failed,
/// `loaded` is false, `error` explains why and the content fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub html: String,
    pub title: String,
    /// `name`/`property` → `content`, case-sensitive, last write wins
    pub meta_tags: BTreeMap<String, String>,
    /// `<script src>` values in document order, not deduplicated
    pub scripts: Vec<String>,
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageSnapshot {
    /// Build a loaded snapshot by extracting title, meta tags and scripts from `html`.
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            title: extract_title(&html),
            meta_tags: extract_meta_tags(&html),
            scripts: extract_script_srcs(&html),
            html,
            loaded: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            loaded: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta_tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Failure reason suitable for a finding's details.
    pub fn error_details(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "page did not load".to_string())
    }

    /// SHA-1 of the HTML, used to correlate trace lines with a snapshot.
    pub fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(self.html.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// HTML extraction
// ============================================================================

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid regex"));
// Opening tags skip over quoted attribute values, which may contain `>`
static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid regex")
});
static SCRIPT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid regex")
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid regex")
});
static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b(?:[^>"']|"[^"]*"|'[^']*')*>.*?</script\s*>"#)
        .expect("valid regex")
});
static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static NOSCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>").expect("valid regex")
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z][A-Za-z0-9]{1,7}));")
        .expect("valid regex")
});
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("valid regex"));

/// Parse the attributes of a single opening tag. Names are lowercased.
fn tag_attributes(tag: &str) -> Vec<(String, String)> {
    // Skip the tag name itself so `<meta` never parses as an attribute
    let body = tag
        .trim_start_matches('<')
        .split_once(|c: char| c.is_whitespace())
        .map(|(_, rest)| rest)
        .unwrap_or("");

    ATTR_RE
        .captures_iter(body)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

pub fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .map(|caps| collapse_whitespace(&decode_entities(&caps[1])))
        .unwrap_or_default()
}

/// Collect `<meta>` tags keyed by `name`, falling back to `property`.
pub fn extract_meta_tags(html: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for tag in META_RE.find_iter(html) {
        let attrs = tag_attributes(tag.as_str());
        let key = attribute(&attrs, "name").or_else(|| attribute(&attrs, "property"));
        if let (Some(key), Some(content)) = (key, attribute(&attrs, "content")) {
            if !key.is_empty() {
                tags.insert(key.to_string(), content.to_string());
            }
        }
    }
    tags
}

pub fn extract_script_srcs(html: &str) -> Vec<String> {
    SCRIPT_TAG_RE
        .find_iter(html)
        .filter_map(|tag| {
            let attrs = tag_attributes(tag.as_str());
            attribute(&attrs, "src")
                .filter(|src| !src.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Visible text of the document: scripts, styles, comments and tags removed,
/// whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let text = SCRIPT_BLOCK_RE.replace_all(html, " ");
    let text = STYLE_BLOCK_RE.replace_all(&text, " ");
    let text = NOSCRIPT_BLOCK_RE.replace_all(&text, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Text content of every `<h1>` on the page.
pub fn h1_texts(html: &str) -> Vec<String> {
    H1_RE
        .captures_iter(html)
        .map(|caps| {
            let inner = TAG_RE.replace_all(&caps[1], " ");
            collapse_whitespace(&decode_entities(&inner))
        })
        .collect()
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "euro" => '\u{20AC}',
        "pound" => '\u{00A3}',
        "times" => '\u{00D7}',
        _ => return None,
    };
    Some(c)
}

/// Decode numeric and common named character references in one pass.
/// Unknown or invalid references are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|m| named_entity(m.as_str()))
            };
            match decoded {
                // NUL is never valid in text content
                Some(c) if c != '\0' => c.to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
