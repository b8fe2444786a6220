//! Locale tags and the number symbols they resolve to.
//!
//! Only the subset of BCP 47 needed for numbers is understood:
//! `language[-Script][-REGION][-u-nu-<numbering system>]`. Everything else
//! (variants, other extensions, private use) is accepted and ignored.

use crate::error::LocaleError;
use crate::locals::TextDirection;

/// A parsed locale tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
    language: String,
    script: Option<String>,
    region: Option<String>,
    numbering_system: Option<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            tag: "en-US".to_string(),
            language: "en".to_string(),
            script: None,
            region: Some("US".to_string()),
            numbering_system: None,
        }
    }
}

impl Locale {
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let trimmed = tag.trim();
        let invalid = || LocaleError::InvalidTag(tag.to_string());
        let mut subtags = trimmed.split(['-', '_']);

        let language = match subtags.next() {
            Some(l) if (2..=3).contains(&l.len()) && l.chars().all(|c| c.is_ascii_alphabetic()) => {
                l.to_ascii_lowercase()
            }
            _ => return Err(invalid()),
        };

        let mut script = None;
        let mut region = None;
        let mut numbering_system = None;
        // Which singleton extension we are inside, if any.
        let mut extension: Option<char> = None;
        let mut pending_key: Option<String> = None;

        for sub in subtags {
            if sub.is_empty() || !sub.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
            if sub.len() == 1 {
                let singleton = sub.chars().next().map(|c| c.to_ascii_lowercase());
                if singleton == Some('x') {
                    break;
                }
                extension = singleton;
                pending_key = None;
                continue;
            }
            match extension {
                None => {
                    if script.is_none()
                        && region.is_none()
                        && sub.len() == 4
                        && sub.chars().all(|c| c.is_ascii_alphabetic())
                    {
                        let mut s = sub.to_ascii_lowercase();
                        s[..1].make_ascii_uppercase();
                        script = Some(s);
                    } else if region.is_none()
                        && ((sub.len() == 2 && sub.chars().all(|c| c.is_ascii_alphabetic()))
                            || (sub.len() == 3 && sub.chars().all(|c| c.is_ascii_digit())))
                    {
                        region = Some(sub.to_ascii_uppercase());
                    }
                    // variants are ignored
                }
                Some('u') => {
                    if sub.len() == 2 {
                        pending_key = Some(sub.to_ascii_lowercase());
                    } else if pending_key.as_deref() == Some("nu") {
                        numbering_system = Some(sub.to_ascii_lowercase());
                        pending_key = None;
                    }
                }
                Some(_) => {}
            }
        }

        let mut canonical = language.clone();
        for part in [script.as_deref(), region.as_deref()].into_iter().flatten() {
            canonical.push('-');
            canonical.push_str(part);
        }
        if let Some(nu) = &numbering_system {
            canonical.push_str("-u-nu-");
            canonical.push_str(nu);
        }

        Ok(Self {
            tag: canonical,
            language,
            script,
            region,
            numbering_system,
        })
    }

    /// Canonical tag: lowercase language, title-case script, uppercase
    /// region, `_` read as `-`, and only the `-u-nu-` extension kept.
    /// Equal tags name the same number symbols.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Explicit `-u-nu-` override, if the tag carried one.
    pub fn numbering_system(&self) -> Option<&str> {
        self.numbering_system.as_deref()
    }

    pub fn direction(&self) -> TextDirection {
        match self.language.as_str() {
            "ar" | "fa" | "he" | "ur" | "ps" | "yi" => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    /// Resolves the symbols used to format numbers in this locale.
    pub fn number_symbols(&self) -> Result<NumberSymbols, LocaleError> {
        let rule = lookup_rule(&self.language, self.region.as_deref()).ok_or_else(|| {
            LocaleError::UnsupportedLanguage {
                tag: self.tag.clone(),
                language: self.language.clone(),
            }
        })?;

        let system_name = self
            .numbering_system
            .as_deref()
            .unwrap_or_else(|| default_numbering_system(&self.language, self.region.as_deref(), rule));
        let system = NumberingSystem::by_name(system_name)
            .ok_or_else(|| LocaleError::UnknownNumberingSystem(system_name.to_string()))?;

        let (decimal, group, minus) = match system.name {
            "arab" => ("\u{066B}", "\u{066C}", "\u{061C}-"),
            "arabext" => ("\u{066B}", "\u{066C}", "\u{200E}\u{2212}"),
            _ => (rule.decimal, rule.group, rule.minus),
        };

        Ok(NumberSymbols {
            decimal,
            group,
            minus,
            digits: system.digits(),
            grouping: rule.grouping,
            min_grouping_digits: rule.min_grouping_digits,
        })
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

/// How integer digits are grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Groups of three: `1,234,567`.
    #[default]
    Standard,
    /// First group of three, then twos: `12,34,567`.
    Indian,
}

/// Literals and digits a locale formats numbers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: &'static str,
    pub group: &'static str,
    pub minus: &'static str,
    /// `digits[i]` is the glyph for the value `i`.
    pub digits: [char; 10],
    pub grouping: Grouping,
    /// Integers with fewer digits than `3 + min_grouping_digits - 1` are not grouped.
    pub min_grouping_digits: u8,
}

impl Default for NumberSymbols {
    fn default() -> Self {
        Self {
            decimal: ".",
            group: ",",
            minus: "-",
            digits: LATN,
            grouping: Grouping::Standard,
            min_grouping_digits: 1,
        }
    }
}

const LATN: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

#[derive(Clone, Copy, Debug)]
enum DigitSet {
    /// Ten consecutive code points starting at zero.
    Contiguous(u32),
    Listed([char; 10]),
}

/// A CLDR numbering system.
#[derive(Clone, Copy, Debug)]
pub struct NumberingSystem {
    pub name: &'static str,
    set: DigitSet,
}

const NUMBERING_SYSTEMS: &[NumberingSystem] = &[
    NumberingSystem { name: "latn", set: DigitSet::Listed(LATN) },
    NumberingSystem { name: "arab", set: DigitSet::Contiguous(0x0660) },
    NumberingSystem { name: "arabext", set: DigitSet::Contiguous(0x06F0) },
    NumberingSystem { name: "deva", set: DigitSet::Contiguous(0x0966) },
    NumberingSystem { name: "beng", set: DigitSet::Contiguous(0x09E6) },
    NumberingSystem { name: "tamldec", set: DigitSet::Contiguous(0x0BE6) },
    NumberingSystem { name: "thai", set: DigitSet::Contiguous(0x0E50) },
    NumberingSystem { name: "mymr", set: DigitSet::Contiguous(0x1040) },
    NumberingSystem { name: "khmr", set: DigitSet::Contiguous(0x17E0) },
    NumberingSystem { name: "fullwide", set: DigitSet::Contiguous(0xFF10) },
    NumberingSystem {
        name: "hanidec",
        set: DigitSet::Listed(['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九']),
    },
];

impl NumberingSystem {
    pub fn by_name(name: &str) -> Option<NumberingSystem> {
        NUMBERING_SYSTEMS.iter().copied().find(|s| s.name == name)
    }

    pub fn digits(&self) -> [char; 10] {
        match self.set {
            DigitSet::Listed(d) => d,
            DigitSet::Contiguous(base) => {
                let mut out = LATN;
                for (i, slot) in out.iter_mut().enumerate() {
                    // all bases above are valid, non-surrogate ranges
                    if let Some(c) = char::from_u32(base + i as u32) {
                        *slot = c;
                    }
                }
                out
            }
        }
    }
}

struct SymbolRule {
    language: &'static str,
    region: Option<&'static str>,
    decimal: &'static str,
    group: &'static str,
    minus: &'static str,
    grouping: Grouping,
    min_grouping_digits: u8,
    numbering_system: &'static str,
}

const fn rule(
    language: &'static str,
    region: Option<&'static str>,
    decimal: &'static str,
    group: &'static str,
) -> SymbolRule {
    SymbolRule {
        language,
        region,
        decimal,
        group,
        minus: "-",
        grouping: Grouping::Standard,
        min_grouping_digits: 1,
        numbering_system: "latn",
    }
}

const fn with_minus(mut r: SymbolRule, minus: &'static str) -> SymbolRule {
    r.minus = minus;
    r
}

const fn indian(mut r: SymbolRule) -> SymbolRule {
    r.grouping = Grouping::Indian;
    r
}

const fn min_grouping(mut r: SymbolRule, digits: u8) -> SymbolRule {
    r.min_grouping_digits = digits;
    r
}

const fn native(mut r: SymbolRule, system: &'static str) -> SymbolRule {
    r.numbering_system = system;
    r
}

const NBSP: &str = "\u{00A0}";
const NNBSP: &str = "\u{202F}";
const APOS: &str = "\u{2019}";

// Region-specific rules come before the language default.
const RULES: &[SymbolRule] = &[
    indian(rule("en", Some("IN"), ".", ",")),
    rule("en", Some("ZA"), ",", NBSP),
    rule("en", Some("CH"), ".", APOS),
    rule("en", None, ".", ","),
    rule("de", Some("CH"), ".", APOS),
    rule("de", Some("LI"), ".", APOS),
    rule("de", Some("AT"), ",", NBSP),
    rule("de", None, ",", "."),
    rule("fr", Some("CA"), ",", NBSP),
    rule("fr", None, ",", NNBSP),
    rule("es", Some("MX"), ".", ","),
    rule("es", Some("US"), ".", ","),
    rule("es", Some("419"), ".", ","),
    min_grouping(rule("es", None, ",", "."), 2),
    rule("it", Some("CH"), ".", APOS),
    rule("it", None, ",", "."),
    min_grouping(rule("pt", Some("PT"), ",", NBSP), 2),
    rule("pt", None, ",", "."),
    rule("nl", None, ",", "."),
    rule("da", None, ",", "."),
    rule("tr", None, ",", "."),
    rule("ru", None, ",", NBSP),
    rule("uk", None, ",", NBSP),
    rule("cs", None, ",", NBSP),
    min_grouping(rule("pl", None, ",", NBSP), 2),
    with_minus(rule("sv", None, ",", NBSP), "\u{2212}"),
    with_minus(rule("nb", None, ",", NBSP), "\u{2212}"),
    with_minus(rule("fi", None, ",", NBSP), "\u{2212}"),
    rule("ja", None, ".", ","),
    rule("zh", None, ".", ","),
    rule("ko", None, ".", ","),
    rule("th", None, ".", ","),
    indian(rule("hi", None, ".", ",")),
    native(indian(rule("mr", None, ".", ",")), "deva"),
    native(indian(rule("bn", None, ".", ",")), "beng"),
    with_minus(rule("he", None, ".", ","), "\u{200E}-"),
    native(with_minus(rule("ar", None, ".", ","), "\u{200E}-"), "arab"),
    native(with_minus(rule("fa", None, ".", ","), "\u{200E}-"), "arabext"),
];

// Arabic locales whose CLDR default is Latin digits.
const ARABIC_LATN_REGIONS: &[&str] = &["AE", "DZ", "EH", "LY", "MA", "TN"];

fn lookup_rule(language: &str, region: Option<&str>) -> Option<&'static SymbolRule> {
    RULES
        .iter()
        .find(|r| r.language == language && r.region.is_some() && r.region == region)
        .or_else(|| {
            RULES
                .iter()
                .find(|r| r.language == language && r.region.is_none())
        })
}

fn default_numbering_system(
    language: &str,
    region: Option<&str>,
    rule: &SymbolRule,
) -> &'static str {
    if language == "ar" && region.is_some_and(|r| ARABIC_LATN_REGIONS.contains(&r)) {
        return "latn";
    }
    rule.numbering_system
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_region_and_numbering() {
        let l = Locale::parse("en-US-u-nu-arab").unwrap();
        assert_eq!(l.language(), "en");
        assert_eq!(l.region(), Some("US"));
        assert_eq!(l.numbering_system(), Some("arab"));
        assert_eq!(l.tag(), "en-US-u-nu-arab");

        let l = Locale::parse("zh_Hant_TW").unwrap();
        assert_eq!(l.script(), Some("Hant"));
        assert_eq!(l.region(), Some("TW"));

        let l = Locale::parse("es-419").unwrap();
        assert_eq!(l.region(), Some("419"));
    }

    #[test]
    fn tag_is_canonical() {
        assert_eq!(Locale::parse(" de-de ").unwrap().tag(), "de-DE");
        assert_eq!(Locale::parse("DE_de").unwrap().tag(), "de-DE");
        assert_eq!(Locale::parse("zh-hant-tw").unwrap().tag(), "zh-Hant-TW");
        assert_eq!(Locale::parse("th-TH-u-ca-buddhist-nu-THAI").unwrap().tag(), "th-TH-u-nu-thai");
        assert_eq!(Locale::parse("en-US-x-private").unwrap(), Locale::default());
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(matches!(Locale::parse(""), Err(LocaleError::InvalidTag(_))));
        assert!(matches!(Locale::parse("english"), Err(LocaleError::InvalidTag(_))));
        assert!(matches!(Locale::parse("en--US"), Err(LocaleError::InvalidTag(_))));
    }

    #[test]
    fn region_rule_wins_over_language_default() {
        let ch = Locale::parse("de-CH").unwrap().number_symbols().unwrap();
        assert_eq!(ch.group, "\u{2019}");
        assert_eq!(ch.decimal, ".");

        let de = Locale::parse("de-DE").unwrap().number_symbols().unwrap();
        assert_eq!(de.group, ".");
        assert_eq!(de.decimal, ",");
    }

    #[test]
    fn arabic_digits_follow_region_and_override() {
        let eg = Locale::parse("ar-EG").unwrap().number_symbols().unwrap();
        assert_eq!(eg.digits[0], '\u{0660}');
        assert_eq!(eg.decimal, "\u{066B}");

        let ae = Locale::parse("ar-AE").unwrap().number_symbols().unwrap();
        assert_eq!(ae.digits, LATN);

        let forced = Locale::parse("en-US-u-nu-deva").unwrap().number_symbols().unwrap();
        assert_eq!(forced.digits[9], '\u{096F}');
        assert_eq!(forced.group, ",");
    }

    #[test]
    fn unknown_language_and_system_are_errors() {
        let err = Locale::parse("xx-YY").unwrap().number_symbols().unwrap_err();
        assert!(matches!(err, LocaleError::UnsupportedLanguage { .. }));

        let err = Locale::parse("en-u-nu-klingon").unwrap().number_symbols().unwrap_err();
        assert_eq!(err, LocaleError::UnknownNumberingSystem("klingon".into()));
    }

    #[test]
    fn direction_from_language() {
        assert_eq!(Locale::parse("ar-EG").unwrap().direction(), TextDirection::Rtl);
        assert_eq!(Locale::parse("fr-FR").unwrap().direction(), TextDirection::Ltr);
    }
}
