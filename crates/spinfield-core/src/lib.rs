//! # Locale numbers, input, and timers
//!
//! `spinfield-core` holds everything a numeric spin control needs that is
//! not interaction policy:
//!
//! - `Locale` / `NumberFormatter`: locale tags, their number symbols, and
//!   formatting into parts (`Integer`, `Group`, `Decimal`, ...).
//! - `NumberParser`: the inverse, from typed, locale-formatted text back to `f64`.
//! - `with_locale` / `locale()`: the ambient locale for a subtree.
//! - `Key`, `Modifiers`, `KeyEvent`: keyboard input as hosts deliver it.
//! - `Role` / `Semantics`: accessibility attributes.
//! - `Scheduler` / `TimerQueue`: cancellable deferred tasks on a clock.
//!
//! ## Parsing
//!
//! ```rust
//! use spinfield_core::*;
//!
//! let fr = Locale::parse("fr-FR").unwrap();
//! let fmt = NumberFormatter::new(&fr).unwrap();
//! let parser = NumberParser::for_locale(&fr).unwrap();
//!
//! let text = fmt.format(-12345.6); // "-12 345,6" with a narrow no-break space
//! assert_eq!(parser.parse(&text), -12345.6);
//! assert!(parser.parse("douze").is_nan());
//! ```
//!
//! `parse` never fails loudly: anything that is not a number yields `NaN`,
//! and callers treat `NaN` as "do not commit".
//!
//! ## Ambient locale
//!
//! ```rust
//! use spinfield_core::*;
//!
//! let p = with_locale(Locale::parse("de-DE").unwrap(), NumberParser::from_ambient);
//! assert_eq!(p.parse("1.000,25"), 1000.25);
//! ```

pub mod clock;
pub mod error;
pub mod format;
pub mod input;
pub mod locale;
pub mod locals;
pub mod parser;
pub mod prelude;
pub mod semantics;
pub mod timer;

pub use error::*;
pub use format::*;
pub use input::*;
pub use locale::*;
pub use locals::*;
pub use parser::*;
pub use semantics::*;
pub use timer::*;
