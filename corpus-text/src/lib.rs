//! Arabic text normalization.
//!
//! [`normalize`] runs four stages in a fixed order; each later stage assumes the
//! character set left by the earlier ones:
//!
//! 1. [`strip_non_arabic`]: anything outside the Arabic-script blocks, ASCII digits,
//!    `.`, `,` and whitespace becomes a space
//! 2. [`strip_punctuation`]: ASCII punctuation (except `.` and `,`), tatweel and the
//!    Arabic semicolon, question mark and comma become a space
//! 3. [`unify_whitespace`]: runs of newline/carriage-return/tab become one space
//! 4. [`collapse_spaces`]: any whitespace run becomes one space, ends are trimmed
//!
//! Every stage maps a missing value to `""`. No Unicode normalization is applied and
//! diacritics (tashkeel) are kept, since they sit inside the Arabic block.
//!
//! ```
//! use corpus_text::normalize;
//!
//! assert_eq!(normalize("Hello مرحبا، كيف  حالك؟\n"), "مرحبا كيف حالك");
//! assert_eq!(normalize(None::<&str>), "");
//! ```
use regex::Regex;
use std::sync::LazyLock;

static NON_ARABIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[^\x{0600}-\x{06FF}\x{0750}-\x{077F}\x{08A0}-\x{08FF}\x{FB50}-\x{FDFF}\x{FE70}-\x{FEFF}0-9.,\s]",
    )
    .expect("static script-filter pattern")
});

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[!"#$%&'()*+\-/:;<=>?@\[\\\]^_`{|}~ـ؛؟،]"##).expect("static punctuation pattern")
});

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\t]+").expect("static line-break pattern"));

static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Replace every character outside the allowed set with a space.
pub fn strip_non_arabic<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        Some(t) => NON_ARABIC.replace_all(t, " ").into_owned(),
        None => String::new(),
    }
}

pub fn strip_punctuation<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        Some(t) => PUNCTUATION.replace_all(t, " ").into_owned(),
        None => String::new(),
    }
}

pub fn unify_whitespace<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        Some(t) => LINE_BREAKS.replace_all(t, " ").into_owned(),
        None => String::new(),
    }
}

pub fn collapse_spaces<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        Some(t) => SPACE_RUNS.replace_all(t, " ").trim().to_string(),
        None => String::new(),
    }
}

/// Full cleaning pipeline. Deterministic and idempotent.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };
    let text = strip_non_arabic(text);
    let text = strip_punctuation(text.as_str());
    let text = unify_whitespace(text.as_str());
    collapse_spaces(text.as_str())
}
