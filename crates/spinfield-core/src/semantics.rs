/// Accessibility role, named after the matching ARIA role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Text,
    Button,
    TextField,
    Container,
    Slider,
    SpinButton,
}

/// Semantics attached to a control, used to build the accessibility tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Semantics {
    pub role: Role,
    /// Accessible name (`aria-label`).
    pub label: Option<String>,
    pub focused: bool,
    /// Disabled controls stay in the tree with `enabled: false`.
    pub enabled: bool,
    pub read_only: bool,
    pub required: bool,
    /// Current numeric value (`aria-valuenow`). Unset when empty or NaN.
    pub value_now: Option<f64>,
    /// Text spoken for the value (`aria-valuetext`).
    pub value_text: Option<String>,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
}

impl Semantics {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            label: None,
            focused: false,
            enabled: true,
            read_only: false,
            required: false,
            value_now: None,
            value_text: None,
            value_min: None,
            value_max: None,
        }
    }
}
