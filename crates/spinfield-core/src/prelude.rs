pub use crate::clock::{Clock, SystemClock, TestClock, set_clock};
pub use crate::error::LocaleError;
pub use crate::format::{NumberFormatter, NumberPart, PartKind};
pub use crate::input::{Key, KeyEvent, Modifiers};
pub use crate::locale::{Locale, NumberSymbols};
pub use crate::locals::{TextDirection, locale, text_direction, with_locale, with_text_direction};
pub use crate::parser::{LocaleDescriptor, NumberParser};
pub use crate::semantics::{Role, Semantics};
pub use crate::timer::{Scheduler, TimerId, TimerQueue};
