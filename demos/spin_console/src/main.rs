use std::rc::Rc;
use std::time::Duration;

use spinfield_core::prelude::*;
use spinfield_ui::{LogAnnouncer, NumberField, NumberFieldOptions};

fn press(field: &NumberField, name: &str) {
    let Some(key) = Key::from_name(name) else {
        log::warn!("unknown key {name}");
        return;
    };
    let handled = field.on_key_down(&KeyEvent::new(key));
    println!(
        "{name:>9} -> {:<12} {}",
        field.state().input_text(),
        if handled.is_default_prevented() { "" } else { "(passed through)" }
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    spinfield_core::clock::ensure_system_clock();

    let tag = std::env::args().nth(1).unwrap_or_else(|| "de-DE".to_string());
    let queue = TimerQueue::new();
    let field = NumberField::new(
        &Locale::parse(&tag)?,
        NumberFieldOptions {
            min_value: Some(0.0),
            max_value: Some(100_000.0),
            step: 0.5,
            ..Default::default()
        },
        Some(1234.5),
        Rc::new(queue.clone()),
        Rc::new(LogAnnouncer),
    )?;

    field.on_focus();
    println!("{tag}: {}", field.state().input_text());
    for name in ["ArrowUp", "Up", "PageDown", "Down", "End", "Home", "Tab"] {
        press(&field, name);
    }

    let typed = field.state().format(98765.25);
    field.type_text(&typed);
    press(&field, "Enter");

    // hold the decrement button for a little over a second
    let down = field.decrement_button();
    (down.on_press_start)();
    let until = spinfield_core::clock::now() + Duration::from_millis(1100);
    while spinfield_core::clock::now() < until {
        std::thread::sleep(Duration::from_millis(10));
        queue.tick_now();
    }
    (down.on_press_end)();
    println!("after hold: {}", field.state().input_text());

    field.on_blur();
    Ok(())
}
