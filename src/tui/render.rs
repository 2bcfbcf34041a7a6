use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::tui::app::{Mode, Tab};
use crate::tui::widgets::{
    calendar::render_calendar,
    color::parse_color,
    confirm::render_confirm,
    dashboard::render_dashboard,
    day_detail::render_day_detail,
    employee_list::{render_employee_details, render_employee_list},
    help::render_help,
    input::render_input,
    shift_editor::render_shift_editor,
    status_bar::render_status_bar,
    summary::render_summary,
    tabs::render_tabs,
    task_panel::{render_day_tasks, render_task_list},
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(" WorkShift ")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.ui.current_tab, &app.config);

    match app.ui.current_tab {
        Tab::Personal => {
            render_calendar(f, layout.main_area, app);
            render_summary(f, layout.side_area, app);
        }
        Tab::General => {
            render_calendar(f, layout.main_area, app);
            render_dashboard(f, layout.side_area, app);
        }
        Tab::Tasks => {
            render_task_list(f, layout.main_area, app);
            render_day_tasks(f, layout.side_area, app);
        }
        Tab::Employees => {
            render_employee_list(f, layout.main_area, app);
            render_employee_details(f, layout.side_area, app);
        }
    }

    // Popups draw over the normal content
    match app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::DayDetail => render_day_detail(f, f.area(), app),
        Mode::ShiftEditor => {
            if let Some(form) = &app.modals.shift_form {
                render_shift_editor(f, f.area(), form, &app.config);
            }
        }
        Mode::Input => {
            if let Some(input) = &app.modals.input {
                render_input(f, f.area(), input, &app.config);
            }
        }
        Mode::Confirm => {
            if let Some(action) = &app.modals.confirm {
                render_confirm(f, f.area(), action, app.modals.confirm_selection, &app.config);
            }
        }
        Mode::View => {}
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.config);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", display(&kb.help))],
        Mode::DayDetail => vec!["Esc: Close".to_string(), format!("{}: Edit shift", display(&kb.edit))],
        Mode::ShiftEditor => vec![
            "Tab/Shift+Tab: Field".to_string(),
            "←/→: Type".to_string(),
            "Enter: Save".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::Input => vec!["Enter: OK".to_string(), "Esc: Cancel".to_string()],
        Mode::Confirm => vec!["y/Enter: Confirm".to_string(), "n/Esc: Cancel".to_string()],
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", display(&kb.quit))];
            match app.ui.current_tab {
                Tab::Personal | Tab::General => {
                    hints.push(format!("{}/{}: Month", display(&kb.prev_month), display(&kb.next_month)));
                    hints.push(format!("{}: Today", display(&kb.today)));
                    hints.push(format!("{}: Shift", display(&kb.edit)));
                    if app.ui.current_tab == Tab::General {
                        hints.push(format!("{}: Day", display(&kb.select)));
                    }
                    hints.push(format!("{}: Remove", display(&kb.delete)));
                }
                Tab::Tasks => {
                    hints.push(format!("{}: New", display(&kb.new)));
                    hints.push(format!("{}: Report", display(&kb.edit)));
                    hints.push(format!("{}: Done", display(&kb.toggle)));
                    hints.push(format!("{}: Delete", display(&kb.delete)));
                    hints.push("←/→: Day".to_string());
                }
                Tab::Employees => {
                    hints.push(format!("{}: Select", display(&kb.select)));
                    hints.push(format!("{}: New", display(&kb.new)));
                    hints.push(format!("{}: Edit", display(&kb.edit)));
                    hints.push(format!("{}: Delete", display(&kb.delete)));
                }
            }
            hints.push(format!("{}/{}: Employee", display(&kb.prev_employee), display(&kb.next_employee)));
            hints.push(format!("{}: Theme", display(&kb.toggle_theme)));
            hints.push(format!("{}: Help", display(&kb.help)));
            hints
        }
    }
}
