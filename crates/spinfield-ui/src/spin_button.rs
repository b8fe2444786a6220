//! # Spin button interaction
//!
//! [`SpinButton`] turns keys, focus changes and press-and-hold on the
//! increment/decrement buttons into calls on host-supplied callbacks. It
//! never changes the value itself: clamping, stepping and committing typed
//! text are the host's job (see [`NumberFieldState`](crate::NumberFieldState)).
//!
//! | Key              | Calls                                                |
//! |------------------|------------------------------------------------------|
//! | Enter            | `on_validate`                                        |
//! | PageUp           | `on_increment_page`, else `on_increment`             |
//! | ArrowUp          | `on_increment`                                       |
//! | PageDown         | `on_decrement_page`, else `on_decrement`             |
//! | ArrowDown        | `on_decrement`                                       |
//! | Home             | `on_decrement_to_min`, only with a minimum           |
//! | End              | `on_increment_to_max`, only with a maximum           |
//!
//! Keys with any modifier held, and every key on a read-only control, pass
//! through untouched so the text field still sees them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spinfield_core::{Key, KeyEvent, Role, Scheduler, Semantics};

use crate::Callback;
use crate::a11y::{Announcer, TextInputFocus};
use crate::repeat::{RepeatConfig, RepeatState, RepeatStepper, StepDirection, WeakStepper};

/// Spoken when there is no value.
pub const EMPTY_VALUE_TEXT: &str = "Empty";

/// Host callbacks. Every field is optional; a missing one makes its key or
/// button a no-op.
#[derive(Clone, Default)]
pub struct SpinButtonConfig {
    /// Step up once (ArrowUp, increment button).
    pub on_increment: Option<Callback>,
    /// Step up by a page (PageUp).
    pub on_increment_page: Option<Callback>,
    /// Step down once (ArrowDown, decrement button).
    pub on_decrement: Option<Callback>,
    /// Step down by a page (PageDown).
    pub on_decrement_page: Option<Callback>,
    /// Jump to the minimum (Home).
    pub on_decrement_to_min: Option<Callback>,
    /// Jump to the maximum (End).
    pub on_increment_to_max: Option<Callback>,
    /// Commit the typed text (Enter, blur).
    pub on_validate: Option<Callback>,
}

/// Value and flags the host currently displays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpinButtonProps {
    pub value: Option<f64>,
    /// Overrides the stringified value in `aria-valuetext` and announcements.
    pub text_value: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub is_disabled: bool,
    pub is_read_only: bool,
    pub is_required: bool,
}

impl SpinButtonProps {
    /// Text that is announced for the current value.
    pub fn value_text(&self) -> String {
        match &self.text_value {
            Some(t) if !t.is_empty() => t.clone(),
            _ => match self.value {
                Some(v) if !v.is_nan() => v.to_string(),
                _ => EMPTY_VALUE_TEXT.to_string(),
            },
        }
    }

    fn min(&self) -> Option<f64> {
        self.min_value.filter(|v| !v.is_nan())
    }

    fn max(&self) -> Option<f64> {
        self.max_value.filter(|v| !v.is_nan())
    }
}

/// Whether the platform's default handling of a key should still run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The control acted on the key.
    PreventDefault,
    /// Not ours; let the text field have it.
    Continue,
}

impl KeyDisposition {
    pub fn is_default_prevented(self) -> bool {
        self == KeyDisposition::PreventDefault
    }
}

/// Press handlers for one of the step buttons.
#[derive(Clone)]
pub struct PressHandlers {
    pub direction: StepDirection,
    pub on_press_start: Callback,
    pub on_press_end: Callback,
    pub initial_delay: Duration,
    pub is_disabled: bool,
}

impl PressHandlers {
    fn new(stepper: WeakStepper, direction: StepDirection, initial_delay: Duration, is_disabled: bool) -> Self {
        let start = stepper.clone();
        Self {
            direction,
            on_press_start: Rc::new(move || start.press_start(initial_delay)),
            on_press_end: Rc::new(move || stepper.press_end()),
            initial_delay,
            is_disabled,
        }
    }
}

/// Interaction controller for one spin control.
///
/// All handlers take `&self` so host callbacks may call back into the
/// controller (typically `set_props`) while a handler is running.
pub struct SpinButton {
    props: RefCell<SpinButtonProps>,
    config: RefCell<SpinButtonConfig>,
    focused: Cell<bool>,
    /// Last value text seen, to detect changes.
    value_text: RefCell<String>,
    announcer: Rc<dyn Announcer>,
    input: RefCell<Option<Rc<dyn TextInputFocus>>>,
    repeat: RepeatConfig,
    increment: RepeatStepper,
    decrement: RepeatStepper,
}

impl SpinButton {
    pub fn new(
        props: SpinButtonProps,
        config: SpinButtonConfig,
        scheduler: Rc<dyn Scheduler>,
        announcer: Rc<dyn Announcer>,
    ) -> Self {
        Self::with_repeat(props, config, RepeatConfig::default(), scheduler, announcer)
    }

    pub fn with_repeat(
        props: SpinButtonProps,
        config: SpinButtonConfig,
        repeat: RepeatConfig,
        scheduler: Rc<dyn Scheduler>,
        announcer: Rc<dyn Announcer>,
    ) -> Self {
        let increment = RepeatStepper::new(
            StepDirection::Increment,
            repeat.interval(StepDirection::Increment),
            scheduler.clone(),
        );
        let decrement = RepeatStepper::new(
            StepDirection::Decrement,
            repeat.interval(StepDirection::Decrement),
            scheduler,
        );
        let spin = Self {
            value_text: RefCell::new(props.value_text()),
            props: RefCell::new(props),
            config: RefCell::new(SpinButtonConfig::default()),
            focused: Cell::new(false),
            announcer,
            input: RefCell::new(None),
            repeat,
            increment,
            decrement,
        };
        spin.set_config(config);
        spin
    }

    pub fn props(&self) -> SpinButtonProps {
        self.props.borrow().clone()
    }

    /// Applies new props from the host. Announces the value text if it
    /// changed while focused.
    pub fn set_props(&self, props: SpinButtonProps) {
        let text = props.value_text();
        *self.props.borrow_mut() = props;
        let changed = {
            let mut last = self.value_text.borrow_mut();
            if *last == text {
                false
            } else {
                *last = text.clone();
                true
            }
        };
        if changed && self.focused.get() {
            self.announcer.announce(&text);
        }
    }

    pub fn set_config(&self, config: SpinButtonConfig) {
        self.increment.set_step(config.on_increment.clone());
        self.decrement.set_step(config.on_decrement.clone());
        *self.config.borrow_mut() = config;
    }

    pub fn set_text_input(&self, input: Option<Rc<dyn TextInputFocus>>) {
        *self.input.borrow_mut() = input;
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn repeat_config(&self) -> RepeatConfig {
        self.repeat
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> KeyDisposition {
        let (read_only, min, max) = {
            let p = self.props.borrow();
            (p.is_read_only, p.min(), p.max())
        };
        if event.modifiers.any() || read_only {
            return KeyDisposition::Continue;
        }

        let action = {
            let cfg = self.config.borrow();
            match event.key {
                Key::Enter => cfg.on_validate.clone(),
                Key::PageUp => cfg
                    .on_increment_page
                    .clone()
                    .or_else(|| cfg.on_increment.clone()),
                Key::ArrowUp => cfg.on_increment.clone(),
                Key::PageDown => cfg
                    .on_decrement_page
                    .clone()
                    .or_else(|| cfg.on_decrement.clone()),
                Key::ArrowDown => cfg.on_decrement.clone(),
                Key::Home if min.is_some() => cfg.on_decrement_to_min.clone(),
                Key::End if max.is_some() => cfg.on_increment_to_max.clone(),
                _ => None,
            }
        };

        match action {
            Some(cb) => {
                log::trace!("spin button handled {:?}", event.key);
                cb();
                KeyDisposition::PreventDefault
            }
            None => KeyDisposition::Continue,
        }
    }

    pub fn on_focus(&self) {
        self.focused.set(true);
        let input = self.input.borrow().clone();
        if let Some(input) = input {
            input.select_all();
        }
    }

    pub fn on_blur(&self) {
        self.focused.set(false);
        let validate = self.config.borrow().on_validate.clone();
        if let Some(validate) = validate {
            validate();
        }
    }

    pub fn increment_button(&self) -> PressHandlers {
        PressHandlers::new(
            self.increment.downgrade(),
            StepDirection::Increment,
            self.repeat.initial_delay,
            self.props.borrow().is_disabled,
        )
    }

    pub fn decrement_button(&self) -> PressHandlers {
        PressHandlers::new(
            self.decrement.downgrade(),
            StepDirection::Decrement,
            self.repeat.initial_delay,
            self.props.borrow().is_disabled,
        )
    }

    pub fn repeat_state(&self, direction: StepDirection) -> RepeatState {
        match direction {
            StepDirection::Increment => self.increment.state(),
            StepDirection::Decrement => self.decrement.state(),
        }
    }

    /// Stops both repeat sequences, e.g. when the control is hidden without
    /// being dropped. Dropping the controller does the same.
    pub fn cancel_repeats(&self) {
        self.increment.press_end();
        self.decrement.press_end();
    }

    pub fn semantics(&self) -> Semantics {
        let p = self.props.borrow();
        Semantics {
            focused: self.focused.get(),
            enabled: !p.is_disabled,
            read_only: p.is_read_only,
            required: p.is_required,
            value_now: p.value.filter(|v| !v.is_nan()),
            value_text: Some(p.value_text()),
            value_min: p.min(),
            value_max: p.max(),
            ..Semantics::new(Role::SpinButton)
        }
    }
}
