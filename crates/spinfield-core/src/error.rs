use thiserror::Error;

/// Failure to resolve a locale tag into number symbols.
///
/// Parsing itself never fails (it yields `NaN`); only building the locale
/// data that a parser or formatter needs can.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocaleError {
    #[error("malformed locale tag {0:?}")]
    InvalidTag(String),
    #[error("no number symbols for language {language:?} (tag {tag:?})")]
    UnsupportedLanguage { tag: String, language: String },
    #[error("unknown numbering system {0:?}")]
    UnknownNumberingSystem(String),
    #[error("locale {tag:?} produced no {part} part when formatting {probe}")]
    MissingPart {
        tag: String,
        part: &'static str,
        probe: f64,
    },
    #[error("could not build glyph matcher: {0}")]
    Pattern(String),
}
