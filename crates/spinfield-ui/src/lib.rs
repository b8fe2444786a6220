//! Spin button interaction and the number field built on it.
//!
//! - [`SpinButton`]: keyboard, focus and press-and-hold handling that calls
//!   host callbacks and announces value changes.
//! - [`RepeatStepper`]: the auto-repeat state machine behind the step buttons.
//! - [`NumberField`]: a [`SpinButton`] driving a locale-aware
//!   [`NumberFieldState`].
//!
//! ```rust
//! use std::rc::Rc;
//! use spinfield_core::{Key, KeyEvent, Locale, TimerQueue};
//! use spinfield_ui::*;
//!
//! let queue = TimerQueue::new();
//! let field = NumberField::new(
//!     &Locale::parse("de-DE").unwrap(),
//!     NumberFieldOptions { max_value: Some(5000.0), ..Default::default() },
//!     Some(1234.0),
//!     Rc::new(queue.clone()),
//!     Rc::new(NoopAnnouncer),
//! )
//! .unwrap();
//!
//! field.on_key_down(&KeyEvent::new(Key::ArrowUp));
//! assert_eq!(field.state().input_text(), "1.235");
//! field.on_key_down(&KeyEvent::new(Key::End));
//! assert_eq!(field.state().value(), Some(5000.0));
//! ```

use std::rc::Rc;

pub mod a11y;
pub mod number_field;
pub mod repeat;
pub mod spin_button;

pub use a11y::{Announcer, LogAnnouncer, NoopAnnouncer, RecordingAnnouncer, TextInputFocus};
pub use number_field::{NumberField, NumberFieldOptions, NumberFieldState};
pub use repeat::{RepeatConfig, RepeatState, RepeatStepper, StepDirection, WeakStepper};
pub use spin_button::{
    EMPTY_VALUE_TEXT, KeyDisposition, PressHandlers, SpinButton, SpinButtonConfig,
    SpinButtonProps,
};

pub type Callback = Rc<dyn Fn()>;
