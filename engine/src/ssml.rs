//! SSML and speech text helpers
//!
//! Every spoken string the engine produces is a `<speak>` document. These
//! helpers normalize documents, join several into one, and annotate joined
//! documents with marks the canvas listens for to advance slides.

use regex::Regex;
use std::sync::OnceLock;

/// Default pause inserted between merged fragments, in milliseconds
pub const DEFAULT_BREAK_MS: u64 = 750;

/// Marks emitted by `Ssml::merge_with_mark`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsMark {
    Start,
    End,
    Error,
    Flip,
}

impl TtsMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsMark::Start => "START",
            TtsMark::End => "END",
            TtsMark::Error => "ERROR",
            TtsMark::Flip => "FLIP",
        }
    }

    fn tag(&self) -> String {
        format!("<mark name=\"{}\"/>", self.as_str())
    }
}

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static TAG: OnceLock<Regex> = OnceLock::new();
static EMOJI: OnceLock<Regex> = OnceLock::new();

fn whitespace() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"))
}

fn tag() -> &'static Regex {
    TAG.get_or_init(|| {
        Regex::new(r"<\s*(/?)\s*([A-Za-z][\w:-]*)\s*([^<>]*?)\s*(/?)\s*>").expect("Invalid tag pattern")
    })
}

fn emoji() -> &'static Regex {
    // Pictographs plus the joiners, selectors and modifiers that glue them
    EMOJI.get_or_init(|| {
        Regex::new(
            r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\x{FE0F}\x{200D}\x{20E3}\x{1F1E6}-\x{1F1FF}]",
        )
        .expect("Invalid emoji pattern")
    })
}

/// Normalize a speech document
///
/// Whitespace runs collapse to one space, tags lose stray inner spaces, and
/// the content of `<speak>` is trimmed.
///
/// ```
/// use persona_engine::ssml::clean;
/// assert_eq!(clean("<speak >   a   </speak>"), "<speak>a</speak>");
/// ```
pub fn clean(speech: &str) -> String {
    let collapsed = whitespace().replace_all(speech, " ");
    let tidy = tag().replace_all(&collapsed, |caps: &regex::Captures| {
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        format!(
            "<{}{}{}{}{}>",
            &caps[1],
            &caps[2],
            if attrs.is_empty() { "" } else { " " },
            attrs,
            &caps[4]
        )
    });
    tidy.replace("<speak> ", "<speak>")
        .replace(" </speak>", "</speak>")
        .trim()
        .to_string()
}

/// Content of a speech document without its `<speak>` wrapper
pub fn inner(speech: &str) -> &str {
    let s = speech.trim();
    let s = match s.strip_prefix("<speak>") {
        Some(rest) => rest,
        None => s,
    };
    let s = match s.strip_suffix("</speak>") {
        Some(rest) => rest,
        None => s,
    };
    s.trim()
}

/// Wrap plain content in `<speak>`
pub fn wrap(content: &str) -> String {
    format!("<speak>{}</speak>", content)
}

/// Remove emoji from a string, leaving surrounding text untouched
pub fn strip_emoji(text: &str) -> String {
    emoji().replace_all(text, "").into_owned()
}

/// Joins speech fragments with a fixed pause between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ssml {
    break_ms: u64,
}

impl Default for Ssml {
    fn default() -> Self {
        Self::new(DEFAULT_BREAK_MS)
    }
}

impl Ssml {
    pub fn new(break_ms: u64) -> Self {
        Self { break_ms }
    }

    fn pause(&self) -> String {
        format!("<break time=\"{}ms\"/>", self.break_ms)
    }

    /// Merge fragments into one document; empty fragments are skipped
    pub fn merge<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let inners: Vec<&str> = parts
            .iter()
            .map(|p| inner(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        wrap(&inners.join(&self.pause()))
    }

    /// Merge fragments with a `FLIP` mark at every fragment boundary
    ///
    /// The canvas flips to the next slide on each `FLIP`, so every non-empty
    /// fragment must line up with one slide.
    pub fn merge_with_mark<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let inners: Vec<&str> = parts
            .iter()
            .map(|p| inner(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        let separator = format!("{}{}", self.pause(), TtsMark::Flip.tag());
        wrap(&format!(
            "{}{}{}",
            TtsMark::Start.tag(),
            inners.join(&separator),
            TtsMark::End.tag()
        ))
    }
}
