use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.input_mode == InputMode::Editing {
                app.insert_str(&text);
            }
        }
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('s') => {
                app.submit();
                return;
            }
            KeyCode::Char('r') => {
                app.clear_form();
                return;
            }
            _ => {}
        }
    }
    if key.code == KeyCode::F(5) {
        app.check_health();
        return;
    }

    match app.input_mode {
        InputMode::Normal => match app.focus {
            FocusPane::Form => handle_form_normal(app, key),
            FocusPane::Results => handle_results_normal(app, key),
        },
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_form_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down => app.next_field(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_field(),

        KeyCode::Enter | KeyCode::Char('i') => app.start_editing(),

        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('C') => app.clear_form(),

        KeyCode::Tab => {
            if app.controller.results_visible() {
                app.focus = FocusPane::Results;
            }
        }

        _ => {}
    }
}

fn handle_results_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down => app.panel_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.panel_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_panel(),

        KeyCode::Char('d') | KeyCode::PageDown => {
            for _ in 0..5 {
                app.scroll_results_down();
            }
        }
        KeyCode::Char('u') | KeyCode::PageUp => {
            for _ in 0..5 {
                app.scroll_results_up();
            }
        }

        KeyCode::Tab | KeyCode::Esc | KeyCode::Char('h') => app.focus = FocusPane::Form,
        KeyCode::Char('i') => app.start_editing(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Enter => {
            if app.selected_field().is_multiline() && !key.modifiers.contains(KeyModifiers::ALT) {
                app.insert_char('\n');
            } else {
                app.next_field();
            }
        }
        KeyCode::Tab => app.next_field(),
        KeyCode::BackTab => app.prev_field(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_results = app.results_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let clicked_field = app.field_areas.iter().position(|r| point_in_rect(x, y, *r));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(idx) = clicked_field {
                app.select_field(idx);
                app.start_editing();
            } else if in_results {
                app.stop_editing();
                app.focus = FocusPane::Results;
            }
        }
        MouseEventKind::ScrollDown if in_results => {
            app.scroll_results_down();
            app.scroll_results_down();
            app.scroll_results_down();
        }
        MouseEventKind::ScrollUp if in_results => {
            app.scroll_results_up();
            app.scroll_results_up();
            app.scroll_results_up();
        }
        _ => {}
    }
}
