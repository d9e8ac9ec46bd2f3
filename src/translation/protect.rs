/*!
 * Token protection for game-mechanics text.
 *
 * Free text headed for the translation backend often embeds mechanics tokens
 * (dice formulas, DCs, modifiers, fractions, unit measures) that must come
 * back byte-for-byte. This module excises those substrings behind positional
 * markers before the external call and restores them afterwards, with an
 * XML transport encoding the backend is instructed to leave alone.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::TranslationError;

/// Mechanics-recognition patterns, applied in this order.
///
/// The order is a contract: dice before modifiers so "1d4 + 2" is one token,
/// and miles/yards/inches before feet so the feet pattern cannot falsely
/// consume the tail of a rarer unit name.
static PROTECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b\d+d\d+(?:\s*[+\-]\s*\d+)?\b",           // dice: 3d8, 1d4 + 2
        r"(?i)\bDC\s*\d+\b",                             // DC 15
        r"(?i)\b[+\-]\d+\b",                             // +7, -1
        r"(?i)\b\d+/\d+\b",                              // 1/2
        r"(?i)\b\d+(?:\.\d+)?\s*(?:mi|mile|miles)\.?\b", // distances (miles)
        r"(?i)\b\d+(?:\.\d+)?\s*(?:yd|yard|yards)\.?\b", // distances (yards)
        r"(?i)\b\d+(?:\.\d+)?\s*(?:in|inch|inches)\.?\b", // distances (inches)
        r"(?i)\b\d+(?:\.\d+)?\s*(?:ft|feet|foot)\.?\b",  // distances (feet)
        r"(?i)\b\d+(?:\.\d+)?\s*(?:lb|lbs)\.?\b",        // weights
    ]
    .iter()
    .map(|p| Regex::new(p).expect("protect pattern must compile"))
    .collect()
});

/// Marker left in the masked text for each excised token
static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__TOK(\d+)__").unwrap());

/// Placeholder element in the XML transport form
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<ph\s+id=['"](\d+)['"]\s*/\s*>"#).unwrap());

static OPEN_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<t>\s*").unwrap());
static CLOSE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*</t>$").unwrap());

/// A text with its mechanics tokens excised.
///
/// `masked` holds `__TOKn__` markers in place of each protected substring;
/// `tokens` holds the originals in encounter order.
#[derive(Debug, Clone)]
pub struct ProtectedText {
    /// Text with markers substituted for mechanics tokens
    pub masked: String,

    /// Excised substrings, indexed by marker number
    pub tokens: Vec<String>,
}

/// Excise mechanics tokens from `text`, left-to-right, non-overlapping.
pub fn protect(text: &str) -> ProtectedText {
    let mut tokens: Vec<String> = Vec::new();
    let mut masked = text.to_string();

    for pattern in PROTECT_PATTERNS.iter() {
        masked = pattern
            .replace_all(&masked, |caps: &Captures| {
                tokens.push(caps[0].to_string());
                format!("__TOK{}__", tokens.len() - 1)
            })
            .into_owned();
    }

    ProtectedText { masked, tokens }
}

impl ProtectedText {
    /// Encode the masked text for transport to the translation backend.
    ///
    /// The surrounding text is escaped for the three XML metacharacters and
    /// each marker becomes a self-closing `<ph id='n'/>` element, which the
    /// backend is told (via XML tag handling) to pass through untouched.
    pub fn to_transport(&self) -> String {
        let escaped = escape_xml(&self.masked);
        let with_placeholders = MARKER_RE.replace_all(&escaped, "<ph id='$1'/>");
        format!("<t>{}</t>", with_placeholders)
    }

    /// Decode a translated transport text and restore every token.
    ///
    /// Fails with [`TranslationError::MarkerMismatch`] when the backend lost
    /// or duplicated a placeholder, and [`TranslationError::UnknownMarker`]
    /// when it invented one; both mean the output would be corrupt and must
    /// not be written.
    pub fn restore_transport(&self, translated: &str) -> Result<String, TranslationError> {
        let trimmed = translated.trim();
        let without_open = OPEN_TAG_RE.replace(trimmed, "");
        let without_close = CLOSE_TAG_RE.replace(&without_open, "");
        let unescaped = unescape_xml(&without_close);
        self.substitute(&PLACEHOLDER_RE, &unescaped)
    }

    /// Restore tokens directly into a masked (`__TOKn__`) text.
    pub fn restore_masked(&self, masked: &str) -> Result<String, TranslationError> {
        self.substitute(&MARKER_RE, masked)
    }

    fn substitute(&self, pattern: &Regex, text: &str) -> Result<String, TranslationError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut restored = 0usize;
        let mut seen = vec![false; self.tokens.len()];

        for caps in pattern.captures_iter(text) {
            let whole = caps.get(0).expect("capture 0 always present");
            let id: usize = caps[1].parse().map_err(|_| TranslationError::UnknownMarker {
                id: caps[1].to_string(),
            })?;
            let token = self
                .tokens
                .get(id)
                .ok_or_else(|| TranslationError::UnknownMarker {
                    id: caps[1].to_string(),
                })?;
            // A duplicated id means some other token was dropped in its place
            if std::mem::replace(&mut seen[id], true) {
                return Err(TranslationError::MarkerMismatch {
                    sent: self.tokens.len(),
                    restored,
                });
            }

            out.push_str(&text[last..whole.start()]);
            out.push_str(token);
            last = whole.end();
            restored += 1;
        }
        out.push_str(&text[last..]);

        if restored != self.tokens.len() {
            return Err(TranslationError::MarkerMismatch {
                sent: self.tokens.len(),
                restored,
            });
        }
        Ok(out)
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_xml(text: &str) -> String {
    // &amp; last, so an escaped ampersand cannot re-form another entity
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
