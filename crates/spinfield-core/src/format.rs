use smallvec::SmallVec;

use crate::error::LocaleError;
use crate::locale::{Grouping, Locale, NumberSymbols};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    MinusSign,
    Integer,
    Group,
    Decimal,
    Fraction,
    Nan,
    Infinity,
}

/// One structural piece of a formatted number, e.g. `Group(",")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberPart {
    pub kind: PartKind,
    pub value: String,
}

impl NumberPart {
    fn new(kind: PartKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

pub type NumberParts = SmallVec<[NumberPart; 8]>;

/// Locale-aware decimal formatter.
///
/// Rounds to at most `max_fraction_digits` (default 3), drops trailing zeros
/// down to `min_fraction_digits`, and groups integer digits per the locale.
#[derive(Clone, Debug)]
pub struct NumberFormatter {
    symbols: NumberSymbols,
    use_grouping: bool,
    min_fraction_digits: u8,
    max_fraction_digits: u8,
}

impl NumberFormatter {
    pub fn new(locale: &Locale) -> Result<Self, LocaleError> {
        Ok(Self::with_symbols(locale.number_symbols()?))
    }

    pub fn with_symbols(symbols: NumberSymbols) -> Self {
        Self {
            symbols,
            use_grouping: true,
            min_fraction_digits: 0,
            max_fraction_digits: 3,
        }
    }

    pub fn grouping(mut self, on: bool) -> Self {
        self.use_grouping = on;
        self
    }

    pub fn fraction_digits(mut self, min: u8, max: u8) -> Self {
        self.min_fraction_digits = min.min(max);
        self.max_fraction_digits = max;
        self
    }

    pub fn symbols(&self) -> &NumberSymbols {
        &self.symbols
    }

    pub fn format(&self, value: f64) -> String {
        self.format_to_parts(value)
            .into_iter()
            .map(|p| p.value)
            .collect()
    }

    pub fn format_to_parts(&self, value: f64) -> NumberParts {
        let mut parts = NumberParts::new();
        if value.is_nan() {
            parts.push(NumberPart::new(PartKind::Nan, "NaN"));
            return parts;
        }
        if value < 0.0 {
            parts.push(NumberPart::new(PartKind::MinusSign, self.symbols.minus));
        }
        if value.is_infinite() {
            parts.push(NumberPart::new(PartKind::Infinity, "∞"));
            return parts;
        }

        let fixed = format!("{:.*}", self.max_fraction_digits as usize, value.abs());
        let (int_digits, frac_digits) = match fixed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (fixed.as_str(), ""),
        };
        let mut frac = frac_digits.trim_end_matches('0').to_string();
        while frac.len() < self.min_fraction_digits as usize {
            frac.push('0');
        }

        for (i, chunk) in self.group_integer(int_digits).into_iter().enumerate() {
            if i > 0 {
                parts.push(NumberPart::new(PartKind::Group, self.symbols.group));
            }
            parts.push(NumberPart::new(PartKind::Integer, self.localize_digits(chunk)));
        }
        if !frac.is_empty() {
            parts.push(NumberPart::new(PartKind::Decimal, self.symbols.decimal));
            parts.push(NumberPart::new(PartKind::Fraction, self.localize_digits(&frac)));
        }
        parts
    }

    fn group_integer<'a>(&self, digits: &'a str) -> SmallVec<[&'a str; 4]> {
        let mut chunks = SmallVec::new();
        let threshold = 3 + self.symbols.min_grouping_digits.max(1) as usize - 1;
        if !self.use_grouping || digits.len() <= threshold {
            chunks.push(digits);
            return chunks;
        }

        // Walk from the right: first group is 3, later groups 3 or 2.
        let secondary = match self.symbols.grouping {
            Grouping::Standard => 3,
            Grouping::Indian => 2,
        };
        let mut end = digits.len();
        let mut size = 3;
        while end > size {
            chunks.push(&digits[end - size..end]);
            end -= size;
            size = secondary;
        }
        chunks.push(&digits[..end]);
        chunks.reverse();
        chunks
    }

    fn localize_digits(&self, ascii: &str) -> String {
        ascii
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) => self.symbols.digits[d as usize],
                None => c,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(tag: &str) -> NumberFormatter {
        NumberFormatter::new(&Locale::parse(tag).unwrap()).unwrap()
    }

    #[test]
    fn probe_parts_en_us() {
        let parts = fmt("en-US").format_to_parts(12345.6);
        let kinds: Vec<_> = parts.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PartKind::Integer,
                PartKind::Group,
                PartKind::Integer,
                PartKind::Decimal,
                PartKind::Fraction
            ]
        );
        assert_eq!(fmt("en-US").format(12345.6), "12,345.6");
    }

    #[test]
    fn locale_separators_and_digits() {
        assert_eq!(fmt("de-DE").format(1234567.891), "1.234.567,891");
        assert_eq!(fmt("fr-FR").format(-1234.5), "-1\u{202F}234,5");
        assert_eq!(fmt("ar-EG").format(12.5), "١٢٫٥");
        assert_eq!(fmt("en-IN").format(12345678.0), "1,23,45,678");
    }

    #[test]
    fn minimum_grouping_digits() {
        assert_eq!(fmt("es-ES").format(1234.0), "1234");
        assert_eq!(fmt("es-ES").format(12345.0), "12.345");
        assert_eq!(fmt("en-US").format(1234.0), "1,234");
    }

    #[test]
    fn grouping_disabled_and_rounding() {
        let f = fmt("en-US").grouping(false);
        assert_eq!(f.format(9876543210.0), "9876543210");
        assert_eq!(f.format(1.23456), "1.235");
        assert_eq!(f.format(2.0), "2");
        assert_eq!(fmt("en-US").fraction_digits(2, 2).format(2.5), "2.50");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(fmt("en-US").format(f64::NAN), "NaN");
        assert_eq!(fmt("en-US").format(f64::NEG_INFINITY), "-∞");
    }
}
