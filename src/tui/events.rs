use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;

use crate::config::KeyBindings;
use crate::tui::app::{Mode, ShiftField, Tab};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;
use crate::utils::parse_key_binding;

/// Guard that ensures terminal state is restored even on panic.
/// A terminal left in raw mode or on the alternate screen is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored here, we are already cleaning up
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size().map_err(TuiError::IoError)?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();

        terminal.draw(|f| {
            let size = f.area();
            let layout = Layout::calculate(Rect::new(0, 0, size.width, size.height));
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, so Windows does not see every key twice
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    Ok(())
}

/// Dispatch a key press by mode. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.ui.mode {
        Mode::Confirm => handle_confirm_mode(app, key_event),
        Mode::Input => handle_input_mode(app, key_event),
        Mode::ShiftEditor => handle_shift_editor_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::DayDetail => handle_day_detail_mode(app, key_event),
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn pressed(binding: &str, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(parsed.matches(key_event))
}

fn handle_confirm_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
            app.modals.confirm_selection = 1 - app.modals.confirm_selection.min(1);
        }
        KeyCode::Enter => app.resolve_confirm(),
        KeyCode::Char('y') => {
            app.modals.confirm_selection = 0;
            app.resolve_confirm();
        }
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_confirm(),
        _ => {}
    }
    Ok(false)
}

fn handle_input_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        _ => {
            if let Some(input) = app.modals.input.as_mut() {
                input.editor.handle_key(&key_event);
            }
        }
    }
    Ok(false)
}

fn handle_shift_editor_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => {
            app.cancel_shift_editor();
            return Ok(false);
        }
        KeyCode::Enter => {
            app.save_shift_form();
            return Ok(false);
        }
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.modals.shift_form.as_mut() {
                form.current_field = form.current_field.next();
            }
            return Ok(false);
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.modals.shift_form.as_mut() {
                form.current_field = form.current_field.prev();
            }
            return Ok(false);
        }
        _ => {}
    }

    let field = app.modals.shift_form.as_ref().map(|f| f.current_field);
    match field {
        Some(ShiftField::Type) => match key_event.code {
            KeyCode::Right | KeyCode::Char(' ') => app.cycle_shift_type(true),
            KeyCode::Left => app.cycle_shift_type(false),
            _ => {}
        },
        Some(ShiftField::Hours) => {
            if let Some(form) = app.modals.shift_form.as_mut() {
                form.hours.handle_key(&key_event);
            }
        }
        Some(ShiftField::Notes) => {
            if let Some(form) = app.modals.shift_form.as_mut() {
                form.notes.handle_key(&key_event);
            }
        }
        None => app.cancel_shift_editor(),
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let bindings = &app.config.key_bindings;
    if key_event.code == KeyCode::Esc
        || pressed(&bindings.help, &key_event)?
        || pressed(&bindings.quit, &key_event)?
    {
        app.toggle_help();
    }
    Ok(false)
}

fn handle_day_detail_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let bindings = app.config.key_bindings.clone();
    if key_event.code == KeyCode::Esc
        || pressed(&bindings.select, &key_event)?
        || pressed(&bindings.quit, &key_event)?
    {
        app.ui.mode = Mode::View;
    } else if pressed(&bindings.edit, &key_event)? {
        app.open_shift_editor();
    }
    Ok(false)
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let bindings = app.config.key_bindings.clone();

    if pressed(&bindings.quit, &key_event)? {
        return Ok(true);
    }
    if pressed(&bindings.help, &key_event)? {
        app.toggle_help();
        return Ok(false);
    }
    if pressed(&bindings.toggle_theme, &key_event)? {
        app.toggle_theme();
        return Ok(false);
    }

    let tabs = [
        (&bindings.tab_1, Tab::Personal),
        (&bindings.tab_2, Tab::General),
        (&bindings.tab_3, Tab::Tasks),
        (&bindings.tab_4, Tab::Employees),
    ];
    for (binding, tab) in tabs {
        if pressed(binding, &key_event)? {
            app.switch_tab(tab);
            return Ok(false);
        }
    }
    if pressed(&bindings.next_tab, &key_event)? {
        app.next_tab();
        return Ok(false);
    }
    if pressed(&bindings.prev_tab, &key_event)? {
        app.prev_tab();
        return Ok(false);
    }
    if pressed(&bindings.next_employee, &key_event)? {
        app.cycle_employee(true);
        return Ok(false);
    }
    if pressed(&bindings.prev_employee, &key_event)? {
        app.cycle_employee(false);
        return Ok(false);
    }

    match app.ui.current_tab {
        Tab::Personal | Tab::General => handle_calendar_keys(app, &bindings, key_event)?,
        Tab::Tasks => handle_task_keys(app, &bindings, key_event)?,
        Tab::Employees => handle_employee_keys(app, &bindings, key_event)?,
    }
    Ok(false)
}

/// Month navigation shared by the calendar and task tabs
fn handle_date_keys(app: &mut App, bindings: &KeyBindings, key_event: &KeyEvent) -> Result<bool, TuiError> {
    if pressed(&bindings.prev_month, key_event)? {
        app.prev_month();
    } else if pressed(&bindings.next_month, key_event)? {
        app.next_month();
    } else if pressed(&bindings.today, key_event)? {
        app.go_today();
    } else {
        match key_event.code {
            KeyCode::Left => app.move_cursor(-1),
            KeyCode::Right => app.move_cursor(1),
            _ => return Ok(false),
        }
    }
    Ok(true)
}

fn handle_calendar_keys(app: &mut App, bindings: &KeyBindings, key_event: KeyEvent) -> Result<(), TuiError> {
    if handle_date_keys(app, bindings, &key_event)? {
        return Ok(());
    }
    match key_event.code {
        KeyCode::Up => app.move_cursor(-7),
        KeyCode::Down => app.move_cursor(7),
        _ => {
            if pressed(&bindings.select, &key_event)? {
                match app.ui.current_tab {
                    Tab::General => app.open_day_detail(),
                    _ => app.open_shift_editor(),
                }
            } else if pressed(&bindings.edit, &key_event)? {
                app.open_shift_editor();
            } else if pressed(&bindings.delete, &key_event)? {
                app.request_delete_shift();
            }
        }
    }
    Ok(())
}

fn handle_task_keys(app: &mut App, bindings: &KeyBindings, key_event: KeyEvent) -> Result<(), TuiError> {
    if handle_date_keys(app, bindings, &key_event)? {
        return Ok(());
    }
    if key_event.code == KeyCode::Up || pressed(&bindings.list_up, &key_event)? {
        app.task_list_move(false);
    } else if key_event.code == KeyCode::Down || pressed(&bindings.list_down, &key_event)? {
        app.task_list_move(true);
    } else if pressed(&bindings.new, &key_event)? {
        app.start_add_task();
    } else if pressed(&bindings.toggle, &key_event)? {
        app.toggle_selected_task();
    } else if pressed(&bindings.edit, &key_event)? || pressed(&bindings.select, &key_event)? {
        app.start_task_report();
    } else if pressed(&bindings.delete, &key_event)? {
        app.request_delete_task();
    }
    Ok(())
}

fn handle_employee_keys(app: &mut App, bindings: &KeyBindings, key_event: KeyEvent) -> Result<(), TuiError> {
    if key_event.code == KeyCode::Up || pressed(&bindings.list_up, &key_event)? {
        app.employee_list_move(false);
    } else if key_event.code == KeyCode::Down || pressed(&bindings.list_down, &key_event)? {
        app.employee_list_move(true);
    } else if pressed(&bindings.select, &key_event)? {
        app.select_highlighted_employee();
    } else if pressed(&bindings.new, &key_event)? {
        app.start_add_employee();
    } else if pressed(&bindings.edit, &key_event)? {
        app.start_edit_employee();
    } else if pressed(&bindings.delete, &key_event)? {
        app.request_delete_employee();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::gateway::{Gateway, LoadSource};
    use crate::{AppState, Config, ShiftType};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, key(code)).unwrap()
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new();
        state.add_employee("Ivan Petrov", Some(500.0)).unwrap();
        let gateway = Gateway::new(Database::open_in_memory().unwrap()).seed_demo(false);
        let app = App::new(
            Config::default(),
            dir.path().join("config.toml"),
            gateway,
            state,
            LoadSource::Local,
        );
        (app, dir)
    }

    #[test]
    fn quit_only_from_view_mode() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Input);
        // 'q' is text while typing
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.modals.input.as_ref().unwrap().editor.text(), "q");
        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn number_keys_switch_tabs() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.ui.current_tab, Tab::Tasks);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.ui.current_tab, Tab::Employees);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.ui.current_tab, Tab::Personal);
    }

    #[test]
    fn arrows_move_the_calendar_cursor() {
        let (mut app, _dir) = test_app();
        let start = app.ui.cursor;
        press(&mut app, KeyCode::Down);
        assert_eq!((app.ui.cursor - start).num_days(), 7);
        press(&mut app, KeyCode::Left);
        assert_eq!((app.ui.cursor - start).num_days(), 6);
    }

    #[test]
    fn shift_editor_by_keyboard() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.mode, Mode::ShiftEditor);

        // Type field: Day -> Night
        press(&mut app, KeyCode::Right);
        // Notes field
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "late");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ui.mode, Mode::View);
        let id = app.state.selected_employee().unwrap().id.clone();
        let shift = app.state.shift(&id, app.ui.cursor).unwrap();
        assert_eq!(shift.kind, ShiftType::Night);
        assert_eq!(shift.notes, "late");
    }

    #[test]
    fn delete_shift_asks_first() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        let id = app.state.selected_employee().unwrap().id.clone();
        assert!(app.state.shift(&id, app.ui.cursor).is_some());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.ui.mode, Mode::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.state.shift(&id, app.ui.cursor).is_some());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.state.shift(&id, app.ui.cursor).is_none());
    }

    #[test]
    fn task_keys_on_tasks_tab() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Count stock");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_tasks().len(), 1);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.current_tasks()[0].completed);
    }

    #[test]
    fn help_toggles_with_its_binding() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Help);
        // Other keys are ignored while help is open
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.ui.current_tab, Tab::Personal);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.mode, Mode::View);
    }

    #[test]
    fn general_tab_enter_opens_day_detail() {
        let (mut app, _dir) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.mode, Mode::DayDetail);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.mode, Mode::View);
    }

    #[test]
    fn bad_binding_is_reported() {
        let (mut app, _dir) = test_app();
        app.config.key_bindings.quit = "Hyper+q".to_string();
        assert!(matches!(
            handle_key_event(&mut app, key(KeyCode::Char('q'))),
            Err(TuiError::KeyBindingError(_))
        ));
    }
}
