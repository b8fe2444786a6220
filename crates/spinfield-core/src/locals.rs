//! # Ambient locals
//!
//! Spinfield uses thread‑local “locals” for parameters supplied by the
//! surrounding UI rather than by each control:
//!
//! - `Locale`: the active locale tag, used to build number parsers and
//!   formatters.
//! - `TextDirection`: LTR or RTL. Defaults to the active locale's direction.
//!
//! Override them for a subtree using `with_locale` and `with_text_direction`:
//!
//! ```rust
//! use spinfield_core::*;
//!
//! with_locale(Locale::parse("de-DE").unwrap(), || {
//!     assert_eq!(locale().tag(), "de-DE");
//! });
//! assert_eq!(locale().tag(), "en-US");
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::locale::Locale;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        } else {
            // no frame: create a temporary one
            let mut m = HashMap::new();
            m.insert(t, v);
            st.borrow_mut().push(m);
        }
    });
}

fn lookup<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

pub fn with_locale<R>(locale: Locale, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<Locale>(), Box::new(locale));
        f()
    })
}

pub fn with_text_direction<R>(dir: TextDirection, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<TextDirection>(), Box::new(dir));
        f()
    })
}

/// Active locale, `en-US` when nothing was provided.
pub fn locale() -> Locale {
    lookup::<Locale>().unwrap_or_default()
}

pub fn text_direction() -> TextDirection {
    lookup::<TextDirection>().unwrap_or_else(|| locale().direction())
}
