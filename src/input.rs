use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use rdpaint::SharedPointer;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    Reset,
    Clear,
    Speed(i32),
    Brush(f32),
    Feed(f32),
    Kill(f32),
    SwapColors,
    ToggleHud,
}

#[derive(Debug, Default)]
pub(crate) struct InputBatch {
    pub(crate) actions: Vec<Action>,
    pub(crate) resized: bool,
}

/// Drain pending terminal events without blocking the frame. Mouse events
/// go straight to `pointer`; keys become actions.
pub(crate) fn collect_input_nonblocking(
    pointer: &SharedPointer,
    hud_rows: u16,
) -> anyhow::Result<InputBatch> {
    let mut out = InputBatch::default();
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                if let Some(a) = map_key(k.code, k.modifiers) {
                    out.actions.push(a);
                }
            }
            Event::Mouse(m) => apply_mouse(pointer, m, hud_rows),
            Event::Resize(..) => out.resized = true,
            _ => {}
        }
        if out.actions.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    let big = mods.contains(KeyModifiers::SHIFT);
    let rate_step = if big { 0.002 } else { 0.0005 };
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reset),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Clear),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::Speed(5)),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::Speed(-5)),
        KeyCode::Char(']') => Some(Action::Brush(0.005)),
        KeyCode::Char('[') => Some(Action::Brush(-0.005)),
        KeyCode::Up => Some(Action::Feed(rate_step)),
        KeyCode::Down => Some(Action::Feed(-rate_step)),
        KeyCode::Right => Some(Action::Kill(rate_step)),
        KeyCode::Left => Some(Action::Kill(-rate_step)),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Action::SwapColors),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHud),
        _ => None,
    }
}

/// Surface pixel under a terminal cell. Each cell stacks two pixels, so
/// the pointer sits between them.
pub(crate) fn cell_to_pixel(column: u16, row: u16, hud_rows: u16) -> Option<(f32, f32)> {
    if row < hud_rows {
        return None;
    }
    let x = column as f32 + 0.5;
    let y = (row - hud_rows) as f32 * 2.0 + 1.0;
    Some((x, y))
}

/// Left button drives the B brush, right button the A brush.
pub(crate) fn apply_mouse(pointer: &SharedPointer, m: MouseEvent, hud_rows: u16) {
    let Some((x, y)) = cell_to_pixel(m.column, m.row, hud_rows) else {
        // over the HUD counts as leaving the surface
        pointer.release_all();
        return;
    };
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            pointer.move_to(x, y);
            pointer.set_secondary(true);
        }
        MouseEventKind::Down(MouseButton::Right) | MouseEventKind::Drag(MouseButton::Right) => {
            pointer.move_to(x, y);
            pointer.set_primary(true);
        }
        MouseEventKind::Up(MouseButton::Left) => pointer.set_secondary(false),
        MouseEventKind::Up(MouseButton::Right) => pointer.set_primary(false),
        MouseEventKind::Moved => pointer.move_to(x, y),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(map_key(KeyCode::Char('q'), KeyModifiers::NONE), Some(Action::Quit));
        assert_eq!(map_key(KeyCode::Char('r'), KeyModifiers::NONE), Some(Action::Reset));
        assert_eq!(map_key(KeyCode::Char('c'), KeyModifiers::NONE), Some(Action::Clear));
        assert_eq!(
            map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(map_key(KeyCode::Up, KeyModifiers::NONE), Some(Action::Feed(0.0005)));
        assert_eq!(map_key(KeyCode::Left, KeyModifiers::SHIFT), Some(Action::Kill(-0.002)));
        assert_eq!(map_key(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }

    #[test]
    fn cell_to_pixel_skips_hud() {
        assert_eq!(cell_to_pixel(4, 1, 2), None);
        assert_eq!(cell_to_pixel(4, 2, 2), Some((4.5, 1.0)));
        assert_eq!(cell_to_pixel(0, 5, 2), Some((0.5, 7.0)));
    }

    #[test]
    fn left_drag_presses_secondary() {
        let p = SharedPointer::new();
        apply_mouse(&p, mouse(MouseEventKind::Down(MouseButton::Left), 10, 3), 1);
        let s = p.snapshot();
        assert!(s.secondary_pressed && !s.primary_pressed);
        assert_eq!((s.x, s.y), (10.5, 5.0));

        apply_mouse(&p, mouse(MouseEventKind::Drag(MouseButton::Left), 12, 3), 1);
        assert_eq!(p.snapshot().x, 12.5);

        apply_mouse(&p, mouse(MouseEventKind::Up(MouseButton::Left), 12, 3), 1);
        assert!(!p.snapshot().is_pressed());
    }

    #[test]
    fn right_button_presses_primary() {
        let p = SharedPointer::new();
        apply_mouse(&p, mouse(MouseEventKind::Down(MouseButton::Right), 1, 1), 1);
        assert!(p.snapshot().primary_pressed);
        apply_mouse(&p, mouse(MouseEventKind::Up(MouseButton::Right), 1, 1), 1);
        assert!(!p.snapshot().primary_pressed);
    }

    #[test]
    fn moving_over_hud_releases() {
        let p = SharedPointer::new();
        apply_mouse(&p, mouse(MouseEventKind::Down(MouseButton::Left), 5, 5), 2);
        apply_mouse(&p, mouse(MouseEventKind::Drag(MouseButton::Left), 5, 0), 2);
        let s = p.snapshot();
        assert!(!s.is_pressed());
        assert_eq!((s.x, s.y), (5.5, 7.0));
    }
}
