//! # Locale number parsing
//!
//! A [`NumberParser`] turns text typed in a locale's own notation back into
//! an `f64`:
//!
//! ```rust
//! use spinfield_core::NumberParser;
//!
//! let de = NumberParser::new("de-DE").unwrap();
//! assert_eq!(de.parse("1.234,5"), 1234.5);
//!
//! let ar = NumberParser::new("ar-EG").unwrap();
//! assert_eq!(ar.parse("١٢٫٥"), 12.5);
//!
//! assert!(de.parse("   ").is_nan());
//! ```
//!
//! The locale's separators and numerals are not hard-coded here. They are
//! recovered by formatting two probe numbers with [`NumberFormatter`] and
//! reading the parts back, so parsing always agrees with formatting.
//!
//! Descriptors are derived once per tag and shared through a process-wide
//! cache. Two locales whose group and decimal glyphs coincide cannot be
//! parsed unambiguously: group stripping runs first and eats the decimal
//! point. That is a known limitation of the data, not something the parser
//! tries to guess around.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use regex::{Captures, Regex};

use crate::error::LocaleError;
use crate::format::{NumberFormatter, PartKind};
use crate::locale::Locale;
use crate::locals;

/// Formatted with grouping to expose the group and decimal literals.
const GROUPED_PROBE: f64 = 12345.6;
/// Formatted without grouping; reversed it lists the numerals 0..=9.
const DIGIT_PROBE: f64 = 9876543210.0;

const SPACE_SEPARATORS: &[char] = &[' ', '\u{00A0}', '\u{2009}', '\u{202F}'];
const BIDI_MARKS: &[char] = &['\u{200E}', '\u{200F}', '\u{061C}'];

/// Matchers recovered from one locale's number formatting.
#[derive(Debug)]
pub struct LocaleDescriptor {
    locale: String,
    group: String,
    decimal: String,
    group_pattern: Regex,
    decimal_pattern: Regex,
    numeral_pattern: Regex,
    minus_pattern: Option<Regex>,
    numeral_index: HashMap<char, u32>,
}

impl LocaleDescriptor {
    pub fn derive(locale: &Locale) -> Result<Self, LocaleError> {
        let formatter = NumberFormatter::new(locale)?;
        Self::from_formatter(locale.tag(), &formatter)
    }

    pub fn from_formatter(tag: &str, formatter: &NumberFormatter) -> Result<Self, LocaleError> {
        let parts = formatter.format_to_parts(GROUPED_PROBE);
        let literal = |kind: PartKind, part: &'static str| {
            parts
                .iter()
                .find(|p| p.kind == kind)
                .map(|p| p.value.clone())
                .ok_or_else(|| LocaleError::MissingPart {
                    tag: tag.to_string(),
                    part,
                    probe: GROUPED_PROBE,
                })
        };
        let group = literal(PartKind::Group, "group")?;
        let decimal = literal(PartKind::Decimal, "decimal")?;

        let numerals: Vec<char> = formatter
            .clone()
            .grouping(false)
            .format(DIGIT_PROBE)
            .chars()
            .rev()
            .collect();
        if numerals.len() != 10 {
            return Err(LocaleError::MissingPart {
                tag: tag.to_string(),
                part: "integer",
                probe: DIGIT_PROBE,
            });
        }
        let numeral_index = numerals
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i as u32))
            .collect();

        if group == decimal {
            log::warn!(
                "locale {tag}: group and decimal separators are both {group:?}; parsing is ambiguous"
            );
        }

        let minus = formatter.symbols().minus;
        let descriptor = Self {
            locale: tag.to_string(),
            group_pattern: compile(&group_class(&group))?,
            decimal_pattern: compile(&regex::escape(&decimal))?,
            numeral_pattern: compile(&char_class(numerals.iter().copied()))?,
            minus_pattern: minus_pattern(minus).map(|p| compile(&p)).transpose()?,
            numeral_index,
            group,
            decimal,
        };
        log::debug!(
            "derived number descriptor for {}: group={:?} decimal={:?} numerals={:?}",
            descriptor.locale,
            descriptor.group,
            descriptor.decimal,
            numerals
        );
        Ok(descriptor)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn decimal(&self) -> &str {
        &self.decimal
    }

    /// Value of a locale numeral glyph, if `c` is one.
    pub fn numeral_value(&self, c: char) -> Option<u32> {
        self.numeral_index.get(&c).copied()
    }

    /// Parses locale-formatted `text`. Returns `NaN` for anything that is not
    /// a number once normalized, including empty and whitespace-only input.
    pub fn parse(&self, text: &str) -> f64 {
        let trimmed = text.trim();
        let ungrouped = self.group_pattern.replace_all(trimmed, "").into_owned();
        let signed = match &self.minus_pattern {
            Some(p) => p.replace_all(&ungrouped, "-").into_owned(),
            None => ungrouped,
        };
        let pointed = self.decimal_pattern.replace_all(&signed, ".");
        let ascii = self.numeral_pattern.replace_all(&pointed, |caps: &Captures| {
            caps[0]
                .chars()
                .map(|c| match self.numeral_value(c).and_then(|d| char::from_digit(d, 10)) {
                    Some(d) => d,
                    None => c,
                })
                .collect::<String>()
        });
        if ascii.is_empty() {
            return f64::NAN;
        }
        coerce_numeric_literal(&ascii)
    }
}

fn compile(pattern: &str) -> Result<Regex, LocaleError> {
    Regex::new(pattern).map_err(|e| LocaleError::Pattern(e.to_string()))
}

fn char_class(chars: impl IntoIterator<Item = char>) -> String {
    let mut class = String::from("[");
    for c in chars {
        class.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
    }
    class.push(']');
    class
}

fn group_class(group: &str) -> String {
    if group.chars().all(|c| SPACE_SEPARATORS.contains(&c)) {
        char_class(SPACE_SEPARATORS.iter().copied())
    } else {
        char_class(group.chars())
    }
}

fn minus_pattern(minus: &str) -> Option<String> {
    if minus == "-" {
        return None;
    }
    let sign: String = minus.chars().filter(|c| !BIDI_MARKS.contains(c)).collect();
    Some(format!(
        "{}*{}",
        char_class(BIDI_MARKS.iter().copied()),
        regex::escape(&sign)
    ))
}

/// Numeric-literal coercion for already-ASCII text: optional sign, digits,
/// optional fraction and exponent, or `Infinity`.
pub fn coerce_numeric_literal(s: &str) -> f64 {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // f64::from_str also takes "inf" and "nan"; those are not numbers here.
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

static DESCRIPTORS: OnceLock<Mutex<HashMap<String, Arc<LocaleDescriptor>>>> = OnceLock::new();

/// Cached descriptor for `locale`, derived on first use of its canonical tag.
pub fn descriptor_for(locale: &Locale) -> Result<Arc<LocaleDescriptor>, LocaleError> {
    let cache = DESCRIPTORS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = cache.lock();
    if let Some(d) = map.get(locale.tag()) {
        return Ok(d.clone());
    }
    let d = Arc::new(LocaleDescriptor::derive(locale)?);
    map.insert(locale.tag().to_string(), d.clone());
    Ok(d)
}

/// Parser bound to one locale; cheap to clone and safe to share.
#[derive(Clone, Debug)]
pub struct NumberParser {
    descriptor: Arc<LocaleDescriptor>,
}

impl NumberParser {
    pub fn new(tag: &str) -> Result<Self, LocaleError> {
        Self::for_locale(&Locale::parse(tag)?)
    }

    pub fn for_locale(locale: &Locale) -> Result<Self, LocaleError> {
        Ok(Self {
            descriptor: descriptor_for(locale)?,
        })
    }

    /// Parser for the ambient [`locals::locale`], falling back to `en-US`.
    pub fn from_ambient() -> Self {
        let locale = locals::locale();
        match Self::for_locale(&locale) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("{e}; falling back to en-US number parsing");
                Self {
                    descriptor: fallback_descriptor(),
                }
            }
        }
    }

    pub fn locale(&self) -> &str {
        self.descriptor.locale()
    }

    pub fn descriptor(&self) -> &LocaleDescriptor {
        &self.descriptor
    }

    /// Switches locale. Returns `Ok(true)` when the tag changed and the
    /// descriptor was swapped, `Ok(false)` when it was already active.
    pub fn set_locale(&mut self, tag: &str) -> Result<bool, LocaleError> {
        let locale = Locale::parse(tag)?;
        if self.descriptor.locale() == locale.tag() {
            return Ok(false);
        }
        self.descriptor = descriptor_for(&locale)?;
        Ok(true)
    }

    pub fn parse(&self, text: &str) -> f64 {
        self.descriptor.parse(text)
    }
}

fn fallback_descriptor() -> Arc<LocaleDescriptor> {
    match descriptor_for(&Locale::default()) {
        Ok(d) => d,
        // en-US is in the built-in table and has both probe parts
        Err(e) => unreachable!("en-US number data is built in: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::NumberSymbols;

    fn parser(tag: &str) -> NumberParser {
        NumberParser::new(tag).unwrap()
    }

    #[test]
    fn empty_and_blank_input_is_nan() {
        let p = parser("en-US");
        assert!(p.parse("").is_nan());
        assert!(p.parse("   ").is_nan());
        assert!(p.parse("\t\n").is_nan());
        assert!(p.parse(",,,").is_nan());
    }

    #[test]
    fn strips_groups_and_normalizes_decimal() {
        assert_eq!(parser("en-US").parse(" 12,345.6 "), 12345.6);
        assert_eq!(parser("de-DE").parse("12.345,6"), 12345.6);
        assert_eq!(parser("de-CH").parse("12\u{2019}345.6"), 12345.6);
        assert_eq!(parser("fr-FR").parse("12\u{202F}345,6"), 12345.6);
        // typed with a plain space
        assert_eq!(parser("fr-FR").parse("12 345,6"), 12345.6);
    }

    #[test]
    fn substitutes_locale_numerals() {
        assert_eq!(parser("ar-EG").parse("١٢٬٣٤٥٫٦"), 12345.6);
        assert_eq!(parser("fa-IR").parse("۴۲"), 42.0);
        assert_eq!(parser("hi-IN-u-nu-deva").parse("१,२३४"), 1234.0);
        assert_eq!(parser("zh-CN-u-nu-hanidec").parse("一〇"), 10.0);
        // ASCII digits still pass through
        assert_eq!(parser("ar-EG").parse("42"), 42.0);
    }

    #[test]
    fn sign_and_exponent_are_accepted_after_normalization() {
        let p = parser("en-US");
        assert_eq!(p.parse("-5"), -5.0);
        assert_eq!(p.parse("+5"), 5.0);
        assert_eq!(p.parse("1e3"), 1000.0);
        assert_eq!(p.parse(".5"), 0.5);
        assert_eq!(p.parse("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parser("sv-SE").parse("\u{2212}3,5"), -3.5);
        assert_eq!(parser("ar-EG").parse("\u{061C}-٣"), -3.0);
    }

    #[test]
    fn garbage_is_nan() {
        let p = parser("en-US");
        for input in ["abc", "1.2.3", "--1", "inf", "nan", "12px", "0x1F", "-", "."] {
            assert!(p.parse(input).is_nan(), "{input:?} should be NaN");
        }
        // de-DE: a dot is a group separator, so this is 1234 not 1.234
        assert_eq!(parser("de-DE").parse("1.234"), 1234.0);
    }

    #[test]
    fn canonical_ascii_is_idempotent() {
        let p = parser("en-US");
        for v in [0.0, 1.0, -42.0, 3.25, 1234567.0, -0.5] {
            assert_eq!(p.parse(&v.to_string()), v);
        }
    }

    #[test]
    fn round_trips_locale_formatting() {
        let values = [0.0, 7.0, -12.0, 1234.0, 12345.6, -98765.432, 1234567.0, 0.125];
        for tag in [
            "en-US", "de-DE", "fr-FR", "es-ES", "en-IN", "ar-EG", "fa-IR", "sv-SE", "de-CH",
            "pt-PT", "th-TH-u-nu-thai", "ja-JP-u-nu-fullwide", "bn-BD",
        ] {
            let locale = Locale::parse(tag).unwrap();
            let fmt = NumberFormatter::new(&locale).unwrap();
            let p = NumberParser::for_locale(&locale).unwrap();
            for v in values {
                let text = fmt.format(v);
                assert_eq!(p.parse(&text), v, "{tag}: {text:?}");
            }
        }
    }

    #[test]
    fn descriptor_numerals_are_in_value_order() {
        let p = parser("ar-EG");
        let d = p.descriptor();
        assert_eq!(d.numeral_value('\u{0660}'), Some(0));
        assert_eq!(d.numeral_value('\u{0669}'), Some(9));
        assert_eq!(d.group(), "\u{066C}");
        assert_eq!(d.decimal(), "\u{066B}");
    }

    #[test]
    fn cache_shares_descriptors_per_tag() {
        let a = descriptor_for(&Locale::parse("it-IT").unwrap()).unwrap();
        let b = descriptor_for(&Locale::parse("it-IT").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn tag_spelling_does_not_split_the_cache() {
        let a = descriptor_for(&Locale::parse("nl-NL").unwrap()).unwrap();
        let b = descriptor_for(&Locale::parse("nl_nl").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let mut p = parser("de-DE");
        assert!(!p.set_locale("de-de").unwrap());
        assert!(!p.set_locale(" DE_de ").unwrap());
        assert_eq!(p.locale(), "de-DE");
    }

    #[test]
    fn set_locale_recomputes_only_on_change() {
        let mut p = parser("en-US");
        assert!(!p.set_locale("en-US").unwrap());
        assert_eq!(p.parse("1,5"), 15.0);
        assert!(p.set_locale("de-DE").unwrap());
        assert_eq!(p.parse("1,5"), 1.5);
        assert!(p.set_locale("tlh").is_err());
        assert_eq!(p.locale(), "de-DE");
    }

    #[test]
    fn ambient_locale_and_fallback() {
        let p = locals::with_locale(Locale::parse("de-DE").unwrap(), NumberParser::from_ambient);
        assert_eq!(p.locale(), "de-DE");

        let p = locals::with_locale(Locale::parse("xx-XX").unwrap(), NumberParser::from_ambient);
        assert_eq!(p.locale(), "en-US");
    }

    #[test]
    fn coinciding_separators_are_ambiguous() {
        let symbols = NumberSymbols {
            decimal: ",",
            group: ",",
            ..NumberSymbols::default()
        };
        let d =
            LocaleDescriptor::from_formatter("x-degenerate", &NumberFormatter::with_symbols(symbols))
                .unwrap();
        // the decimal comma is stripped as a group separator
        assert_eq!(d.parse("1,5"), 15.0);
    }

    #[test]
    fn parsers_can_be_shared_across_threads() {
        let p = parser("de-DE");
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let p = p.clone();
                std::thread::spawn(move || p.parse(&format!("{i},5")))
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), i as f64 + 0.5);
        }
    }
}
