//! Number field state: the host side of a spin button.
//!
//! [`NumberFieldState`] keeps the typed text and the committed value for one
//! locale, and implements the stepping the spin button only asks for:
//! snapping to `step`, clamping to the bounds, and committing typed text
//! through a [`NumberParser`]. [`NumberField`] wires the two together.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use spinfield_core::{
    KeyEvent, Locale, LocaleError, NumberFormatter, NumberParser, Scheduler, Semantics,
};

use crate::Callback;
use crate::a11y::{Announcer, TextInputFocus};
use crate::spin_button::{
    KeyDisposition, PressHandlers, SpinButton, SpinButtonConfig, SpinButtonProps,
};

#[derive(Clone, Debug, PartialEq)]
pub struct NumberFieldOptions {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Single step; values snap to multiples of it from `min_value` (or 0).
    pub step: f64,
    /// PageUp/PageDown step, `10 * step` when unset.
    pub page_step: Option<f64>,
    pub is_disabled: bool,
    pub is_read_only: bool,
    pub is_required: bool,
}

impl Default for NumberFieldOptions {
    fn default() -> Self {
        Self {
            min_value: None,
            max_value: None,
            step: 1.0,
            page_step: None,
            is_disabled: false,
            is_read_only: false,
            is_required: false,
        }
    }
}

pub struct NumberFieldState {
    options: NumberFieldOptions,
    parser: RefCell<NumberParser>,
    formatter: RefCell<NumberFormatter>,
    value: Cell<Option<f64>>,
    input: RefCell<String>,
    selection: RefCell<Range<usize>>,
}

impl NumberFieldState {
    pub fn new(
        locale: &Locale,
        options: NumberFieldOptions,
        initial: Option<f64>,
    ) -> Result<Self, LocaleError> {
        let state = Self {
            parser: RefCell::new(NumberParser::for_locale(locale)?),
            formatter: RefCell::new(NumberFormatter::new(locale)?),
            options,
            value: Cell::new(None),
            input: RefCell::new(String::new()),
            selection: RefCell::new(0..0),
        };
        state.set_value(initial.filter(|v| !v.is_nan()));
        Ok(state)
    }

    pub fn options(&self) -> &NumberFieldOptions {
        &self.options
    }

    pub fn value(&self) -> Option<f64> {
        self.value.get()
    }

    pub fn input_text(&self) -> String {
        self.input.borrow().clone()
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.borrow().clone()
    }

    pub fn locale(&self) -> String {
        self.parser.borrow().locale().to_string()
    }

    pub fn format(&self, value: f64) -> String {
        self.formatter.borrow().format(value)
    }

    /// Typed text; nothing is committed until [`commit`](Self::commit).
    pub fn set_input_text(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
        *self.selection.borrow_mut() = text.len()..text.len();
    }

    /// Current text parsed in the field's locale; `NaN` if it is not a number.
    pub fn parsed_input(&self) -> f64 {
        self.parser.borrow().parse(&self.input.borrow())
    }

    pub fn can_increment(&self) -> bool {
        self.can_step(|v, max| v < max, self.options.max_value)
    }

    pub fn can_decrement(&self) -> bool {
        self.can_step(|v, min| v > min, self.options.min_value)
    }

    fn can_step(&self, within: impl Fn(f64, f64) -> bool, bound: Option<f64>) -> bool {
        if self.options.is_disabled || self.options.is_read_only {
            return false;
        }
        match (self.parsed_input(), bound) {
            (v, Some(b)) if !v.is_nan() => within(v, b),
            _ => true,
        }
    }

    pub fn increment(&self) {
        self.step_by(self.options.step, self.options.min_value);
    }

    pub fn decrement(&self) {
        self.step_by(-self.options.step, self.options.max_value);
    }

    pub fn increment_by_page(&self) {
        self.step_by(self.page_step(), self.options.min_value);
    }

    pub fn decrement_by_page(&self) {
        self.step_by(-self.page_step(), self.options.max_value);
    }

    pub fn increment_to_max(&self) {
        if let Some(max) = self.options.max_value {
            self.set_value(Some(max));
        }
    }

    pub fn decrement_to_min(&self) {
        if let Some(min) = self.options.min_value {
            self.set_value(Some(min));
        }
    }

    /// Parses the typed text and commits it, snapped and clamped. Text that
    /// does not parse is replaced by the last committed value; blank text
    /// clears the value.
    pub fn commit(&self) {
        let text = self.input_text();
        if text.trim().is_empty() {
            self.set_value(None);
            return;
        }
        let parsed = self.parsed_input();
        if parsed.is_nan() {
            log::debug!("number field: {text:?} is not a number, reverting");
            self.set_value(self.value.get());
            return;
        }
        self.set_value(Some(self.snap(parsed)));
    }

    /// Switches locale and reformats the committed value.
    pub fn set_locale(&self, tag: &str) -> Result<bool, LocaleError> {
        let changed = self.parser.borrow_mut().set_locale(tag)?;
        if changed {
            *self.formatter.borrow_mut() = NumberFormatter::new(&Locale::parse(tag)?)?;
            self.set_value(self.value.get());
        }
        Ok(changed)
    }

    pub fn spin_button_props(&self) -> SpinButtonProps {
        let value = self.value.get();
        SpinButtonProps {
            value,
            text_value: value.map(|v| self.format(v)),
            min_value: self.options.min_value,
            max_value: self.options.max_value,
            is_disabled: self.options.is_disabled,
            is_read_only: self.options.is_read_only,
            is_required: self.options.is_required,
        }
    }

    fn page_step(&self) -> f64 {
        self.options.page_step.unwrap_or(self.options.step * 10.0)
    }

    fn set_value(&self, value: Option<f64>) {
        self.value.set(value);
        let text = value.map(|v| self.format(v)).unwrap_or_default();
        self.set_input_text(&text);
    }

    /// Steps from the typed value, or starts from `fallback` (or 0) when the
    /// text is not a number. An off-grid or out-of-range value that snaps
    /// in the step's direction counts as the step itself.
    fn step_by(&self, delta: f64, fallback: Option<f64>) {
        let prev = self.parsed_input();
        let next = if prev.is_nan() {
            self.snap(fallback.unwrap_or(0.0))
        } else {
            let snapped = self.snap(prev);
            if (delta > 0.0 && snapped > prev) || (delta < 0.0 && snapped < prev) {
                snapped
            } else {
                self.snap(prev + delta)
            }
        };
        self.set_value(Some(next));
    }

    fn snap(&self, value: f64) -> f64 {
        let NumberFieldOptions {
            min_value,
            max_value,
            step,
            ..
        } = self.options;
        let base = min_value.unwrap_or(0.0);

        let mut snapped = value;
        if step > 0.0 {
            let rem = (value - base) % step;
            snapped = if rem.abs() * 2.0 >= step {
                value + rem.signum() * (step - rem.abs())
            } else {
                value - rem
            };
        }
        if let Some(min) = min_value
            && snapped < min
        {
            snapped = min;
        } else if let Some(max) = max_value
            && snapped > max
        {
            snapped = if step > 0.0 {
                base + ((max - base) / step).floor() * step
            } else {
                max
            };
        }
        round_to(snapped, decimals(step).max(min_value.map(decimals).unwrap_or(0)))
    }
}

impl TextInputFocus for NumberFieldState {
    fn select_all(&self) {
        let len = self.input.borrow().len();
        *self.selection.borrow_mut() = 0..len;
    }
}

fn decimals(v: f64) -> i32 {
    let s = v.to_string();
    s.split_once('.').map_or(0, |(_, frac)| frac.len() as i32)
}

fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

/// A number field: [`NumberFieldState`] driven by a [`SpinButton`].
pub struct NumberField {
    state: Rc<NumberFieldState>,
    spin: Rc<SpinButton>,
}

impl NumberField {
    pub fn new(
        locale: &Locale,
        options: NumberFieldOptions,
        initial: Option<f64>,
        scheduler: Rc<dyn Scheduler>,
        announcer: Rc<dyn Announcer>,
    ) -> Result<Self, LocaleError> {
        let state = Rc::new(NumberFieldState::new(locale, options, initial)?);
        let spin = Rc::new(SpinButton::new(
            state.spin_button_props(),
            SpinButtonConfig::default(),
            scheduler,
            announcer,
        ));
        spin.set_text_input(Some(state.clone()));
        spin.set_config(SpinButtonConfig {
            on_increment: Some(bind(&state, &spin, NumberFieldState::increment)),
            on_increment_page: Some(bind(&state, &spin, NumberFieldState::increment_by_page)),
            on_decrement: Some(bind(&state, &spin, NumberFieldState::decrement)),
            on_decrement_page: Some(bind(&state, &spin, NumberFieldState::decrement_by_page)),
            on_decrement_to_min: Some(bind(&state, &spin, NumberFieldState::decrement_to_min)),
            on_increment_to_max: Some(bind(&state, &spin, NumberFieldState::increment_to_max)),
            on_validate: Some(bind(&state, &spin, NumberFieldState::commit)),
        });
        Ok(Self { state, spin })
    }

    pub fn state(&self) -> &NumberFieldState {
        &self.state
    }

    pub fn spin_button(&self) -> &SpinButton {
        &self.spin
    }

    pub fn type_text(&self, text: &str) {
        self.state.set_input_text(text);
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> KeyDisposition {
        self.spin.on_key_down(event)
    }

    pub fn on_focus(&self) {
        self.spin.on_focus();
    }

    pub fn on_blur(&self) {
        self.spin.on_blur();
    }

    pub fn increment_button(&self) -> PressHandlers {
        let mut handlers = self.spin.increment_button();
        handlers.is_disabled = !self.state.can_increment();
        handlers
    }

    pub fn decrement_button(&self) -> PressHandlers {
        let mut handlers = self.spin.decrement_button();
        handlers.is_disabled = !self.state.can_decrement();
        handlers
    }

    pub fn semantics(&self) -> Semantics {
        self.spin.semantics()
    }

    pub fn set_locale(&self, tag: &str) -> Result<bool, LocaleError> {
        let changed = self.state.set_locale(tag)?;
        if changed {
            self.spin.set_props(self.state.spin_button_props());
        }
        Ok(changed)
    }
}

fn bind(
    state: &Rc<NumberFieldState>,
    spin: &Rc<SpinButton>,
    op: fn(&NumberFieldState),
) -> Callback {
    let (state, spin) = (Rc::downgrade(state), Rc::downgrade(spin));
    Rc::new(move || {
        let (Some(state), Some(spin)) = (state.upgrade(), spin.upgrade()) else {
            return;
        };
        op(&state);
        spin.set_props(state.spin_button_props());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a11y::RecordingAnnouncer;
    use spinfield_core::{Key, TimerQueue};
    use std::time::Duration;

    fn state(tag: &str, options: NumberFieldOptions, initial: Option<f64>) -> NumberFieldState {
        NumberFieldState::new(&Locale::parse(tag).unwrap(), options, initial).unwrap()
    }

    fn bounded() -> NumberFieldOptions {
        NumberFieldOptions {
            min_value: Some(0.0),
            max_value: Some(10.0),
            ..NumberFieldOptions::default()
        }
    }

    #[test]
    fn steps_clamp_to_bounds() {
        let s = state("en-US", bounded(), Some(9.0));
        s.increment();
        assert_eq!(s.value(), Some(10.0));
        s.increment();
        assert_eq!(s.value(), Some(10.0));
        s.decrement_by_page();
        assert_eq!(s.value(), Some(0.0));
        s.decrement();
        assert_eq!(s.value(), Some(0.0));
        s.increment_to_max();
        assert_eq!(s.input_text(), "10");
    }

    #[test]
    fn steps_from_typed_text_and_snaps() {
        let s = state(
            "de-DE",
            NumberFieldOptions {
                step: 0.1,
                ..NumberFieldOptions::default()
            },
            None,
        );
        s.set_input_text("0,2");
        s.increment();
        assert_eq!(s.value(), Some(0.3));
        assert_eq!(s.input_text(), "0,3");

        s.set_input_text("1,26");
        s.decrement();
        assert_eq!(s.value(), Some(1.2));
    }

    #[test]
    fn typed_value_past_a_bound_steps_back_inside() {
        let s = state("en-US", bounded(), None);
        s.set_input_text("150");
        s.increment();
        assert_eq!(s.value(), Some(10.0));

        s.set_input_text("-20");
        s.decrement();
        assert_eq!(s.value(), Some(0.0));

        s.set_input_text("150");
        s.decrement();
        assert_eq!(s.value(), Some(10.0));

        s.set_input_text("-20");
        s.increment_by_page();
        assert_eq!(s.value(), Some(0.0));
    }

    #[test]
    fn off_grid_value_steps_to_the_neighbouring_grid_point() {
        let s = state("en-US", NumberFieldOptions::default(), None);
        s.set_input_text("2.6");
        s.increment();
        assert_eq!(s.value(), Some(3.0));

        s.set_input_text("2.4");
        s.decrement();
        assert_eq!(s.value(), Some(2.0));

        s.set_input_text("2.4");
        s.increment();
        assert_eq!(s.value(), Some(3.0));

        s.set_input_text("2.6");
        s.decrement();
        assert_eq!(s.value(), Some(2.0));
    }

    #[test]
    fn empty_input_starts_from_bound() {
        let s = state("en-US", bounded(), None);
        s.decrement();
        assert_eq!(s.value(), Some(10.0));

        let s = state("en-US", bounded(), None);
        s.increment();
        assert_eq!(s.value(), Some(0.0));

        let s = state("en-US", NumberFieldOptions::default(), None);
        s.increment();
        assert_eq!(s.value(), Some(0.0));
    }

    #[test]
    fn commit_parses_reverts_or_clears() {
        let s = state("fr-FR", NumberFieldOptions::default(), Some(3.0));
        s.set_input_text("1 234");
        s.commit();
        assert_eq!(s.value(), Some(1234.0));
        assert_eq!(s.input_text(), "1\u{202F}234");

        s.set_input_text("abc");
        s.commit();
        assert_eq!(s.value(), Some(1234.0));
        assert_eq!(s.input_text(), "1\u{202F}234");

        s.set_input_text("   ");
        s.commit();
        assert_eq!(s.value(), None);
        assert_eq!(s.input_text(), "");
    }

    #[test]
    fn commit_clamps() {
        let s = state("en-US", bounded(), None);
        s.set_input_text("42");
        s.commit();
        assert_eq!(s.value(), Some(10.0));
        s.set_input_text("-3");
        s.commit();
        assert_eq!(s.value(), Some(0.0));
    }

    #[test]
    fn locale_change_reformats() {
        let s = state("en-US", NumberFieldOptions::default(), Some(1234.5));
        assert_eq!(s.input_text(), "1,234.5");
        assert!(s.set_locale("de-DE").unwrap());
        assert_eq!(s.input_text(), "1.234,5");
        assert!(!s.set_locale("de-DE").unwrap());
        assert!(s.set_locale("zz").is_err());
        assert_eq!(s.locale(), "de-DE");
    }

    #[test]
    fn select_all_covers_input() {
        let s = state("en-US", NumberFieldOptions::default(), Some(12345.0));
        assert_eq!(s.selection(), 6..6);
        s.select_all();
        assert_eq!(s.selection(), 0..6);
    }

    fn field(options: NumberFieldOptions, initial: Option<f64>) -> (NumberField, TimerQueue, Rc<RecordingAnnouncer>) {
        let queue = TimerQueue::new();
        let announcer = Rc::new(RecordingAnnouncer::new());
        let f = NumberField::new(
            &Locale::parse("de-DE").unwrap(),
            options,
            initial,
            Rc::new(queue.clone()),
            announcer.clone(),
        )
        .unwrap();
        (f, queue, announcer)
    }

    #[test]
    fn keyboard_drives_the_field_and_announces() {
        let (f, _q, announcer) = field(bounded(), Some(5.0));
        f.on_focus();
        assert_eq!(f.state().selection(), 0..1);

        f.on_key_down(&KeyEvent::new(Key::ArrowUp));
        f.on_key_down(&KeyEvent::new(Key::End));
        f.on_key_down(&KeyEvent::new(Key::Home));
        assert_eq!(f.state().value(), Some(0.0));
        assert_eq!(announcer.take(), vec!["6", "10", "0"]);

        f.type_text("7,5");
        f.on_key_down(&KeyEvent::new(Key::Enter));
        // snapped to the whole step
        assert_eq!(f.state().value(), Some(8.0));
        assert_eq!(f.semantics().value_now, Some(8.0));
    }

    #[test]
    fn blur_commits_typed_text() {
        let (f, _q, announcer) = field(NumberFieldOptions::default(), None);
        f.on_focus();
        f.type_text("1.500");
        f.on_blur();
        assert_eq!(f.state().value(), Some(1500.0));
        assert_eq!(f.semantics().value_text.as_deref(), Some("1.500"));
        // unfocused by the time the value changes
        assert!(announcer.take().is_empty());
    }

    #[test]
    fn hold_increment_until_max() {
        let (f, q, _a) = field(bounded(), Some(0.0));
        let up = f.increment_button();
        assert!(!up.is_disabled);
        (up.on_press_start)();
        q.advance(Duration::from_millis(400 + 60 * 20));
        (up.on_press_end)();
        assert_eq!(f.state().value(), Some(10.0));
        assert!(f.increment_button().is_disabled);
        assert!(!f.decrement_button().is_disabled);
    }
}
