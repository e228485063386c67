use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::api::TaskRepository;
use crate::app::dashboard::{self, DashboardState, LoadState, ToastKind};
use crate::app::detail::{DetailScreen, DetailState};
use crate::app::models::TaskStatus;
use crate::app::task_form::{self, FormMode, TaskFormState};
use crate::app::theme::{Palette, ThemeService};
use crate::app::view;

/// Which controller currently owns the keyboard.
pub enum Screen {
    Dashboard,
    Detail(DetailScreen),
    Form(TaskFormState),
}

pub struct App<R: TaskRepository> {
    pub repo: R,
    pub dashboard: DashboardState,
    pub screen: Screen,
    pub theme: ThemeService,
}

impl<R: TaskRepository> App<R> {
    pub fn new(repo: R, theme: ThemeService) -> App<R> {
        App {
            repo,
            dashboard: DashboardState::new(),
            screen: Screen::Dashboard,
            theme,
        }
    }
}

pub fn run_app<B: Backend, R: TaskRepository>(
    terminal: &mut Terminal<B>,
    app: &mut App<R>,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        app.dashboard.tick(Instant::now());
        terminal.draw(|f| draw_ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code) {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

/// Routes a key press to the active screen. Returns `true` to quit.
fn handle_key<R: TaskRepository>(app: &mut App<R>, code: KeyCode) -> bool {
    match &app.screen {
        Screen::Dashboard => handle_dashboard_key(app, code),
        Screen::Detail(_) => {
            handle_detail_key(app, code);
            false
        }
        Screen::Form(_) => {
            handle_form_key(app, code);
            false
        }
    }
}

fn handle_dashboard_key<R: TaskRepository>(app: &mut App<R>, code: KeyCode) -> bool {
    // The confirmation prompt swallows everything except its two answers.
    if app.dashboard.confirm.is_some() {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => app.dashboard.confirm_delete(&app.repo),
            KeyCode::Char('n') | KeyCode::Esc => app.dashboard.cancel_delete(),
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('r') => app.dashboard.load(&app.repo),
        KeyCode::Char('a') => app.screen = Screen::Form(TaskFormState::for_create()),
        KeyCode::Char('e') => {
            if let Some(task) = app.dashboard.selected_task().cloned() {
                app.screen = Screen::Form(TaskFormState::for_edit(&task));
            }
        }
        KeyCode::Enter => {
            if let Some(id) = app.dashboard.selected_task().map(|t| t.id.clone()) {
                app.screen = Screen::Detail(DetailScreen::open(&app.repo, id));
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = app.dashboard.selected_task().map(|t| t.id.clone()) {
                app.dashboard.request_delete(id);
            }
        }
        KeyCode::Char('f') => app.dashboard.cycle_filter(),
        KeyCode::Char('s') => app.dashboard.toggle_sort(),
        KeyCode::Char('n') => app.dashboard.next_page(),
        KeyCode::Char('p') => app.dashboard.prev_page(),
        KeyCode::Char('t') => app.theme.toggle(),
        KeyCode::Down => app.dashboard.select_next(),
        KeyCode::Up => app.dashboard.select_previous(),
        KeyCode::Left => app.dashboard.unselect(),
        KeyCode::Esc => app.dashboard.dismiss_toast(),
        _ => {}
    }
    false
}

fn handle_detail_key<R: TaskRepository>(app: &mut App<R>, code: KeyCode) {
    let Screen::Detail(detail) = &mut app.screen else {
        return;
    };

    if detail.confirm_delete {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let id = detail.id.clone();
                if detail.delete(&app.repo) {
                    app.dashboard.remove_local(&id);
                    app.dashboard
                        .notify("Task deleted successfully!", ToastKind::Success);
                    app.screen = Screen::Dashboard;
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => detail.confirm_delete = false,
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('b') => app.screen = Screen::Dashboard,
        KeyCode::Char('e') => {
            if let Some(task) = detail.task().cloned() {
                app.screen = Screen::Form(TaskFormState::for_edit(&task));
            }
        }
        KeyCode::Char('x') => {
            if detail.task().is_some() {
                detail.confirm_delete = true;
            }
        }
        KeyCode::Char('r') => detail.refresh(&app.repo),
        _ => {}
    }
}

fn handle_form_key<R: TaskRepository>(app: &mut App<R>, code: KeyCode) {
    let Screen::Form(form) = &mut app.screen else {
        return;
    };

    match code {
        KeyCode::Esc => app.screen = Screen::Dashboard,
        KeyCode::Enter => {
            if let Some(saved) = form.submit(&app.repo) {
                let message = if matches!(form.mode, FormMode::Create) {
                    "Task created successfully!"
                } else {
                    "Task updated successfully!"
                };
                app.dashboard.upsert(saved);
                app.dashboard.notify(message, ToastKind::Success);
                app.screen = Screen::Dashboard;
            }
        }
        KeyCode::Down => form.move_cursor_down(),
        KeyCode::Up => form.move_cursor_up(),
        KeyCode::Left => form.move_cursor_left(),
        KeyCode::Right => form.move_cursor_right(),
        KeyCode::Backspace => form.delete_char(),
        KeyCode::Char(ch) => form.input(ch),
        _ => {}
    }
}

// Draws the whole user interface for the active screen.
fn draw_ui<R: TaskRepository>(f: &mut Frame, app: &mut App<R>) {
    let palette = app.theme.palette();
    match &app.screen {
        Screen::Detail(detail) => {
            draw_detail(f, detail, &palette);
            return;
        }
        Screen::Form(form) => {
            draw_form(f, form, &palette);
            return;
        }
        Screen::Dashboard => {}
    }
    draw_dashboard(f, app, &palette);
}

fn draw_dashboard<R: TaskRepository>(f: &mut Frame, app: &mut App<R>, palette: &Palette) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(outer[0]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(chunks[0]);

    f.render_widget(
        Paragraph::new(dashboard::header_line(&app.dashboard, palette)),
        left[0],
    );

    let list_block = Block::default().borders(Borders::ALL).title("Tasks");
    match app.dashboard.load_state.clone() {
        LoadState::Loading => {
            f.render_widget(
                Paragraph::new("Loading tasks...")
                    .style(Style::default().fg(palette.dim))
                    .block(list_block),
                left[1],
            );
        }
        LoadState::Failed(message) => {
            let text = vec![
                Line::from(Span::styled(message, Style::default().fg(palette.danger))),
                Line::from(Span::styled(
                    "Press 'r' to retry",
                    Style::default().fg(palette.dim),
                )),
            ];
            f.render_widget(Paragraph::new(text).block(list_block), left[1]);
        }
        LoadState::Loaded => {
            let visible = view::visible_page(&app.dashboard.tasks, &app.dashboard.params);
            if visible.is_empty() {
                let text = vec![
                    Line::from("No tasks found"),
                    Line::from(Span::styled(
                        "Press 'a' to create your first task",
                        Style::default().fg(palette.dim),
                    )),
                ];
                f.render_widget(Paragraph::new(text).block(list_block), left[1]);
            } else {
                let list = List::new(dashboard::list_items(&visible, palette))
                    .block(list_block)
                    .highlight_style(
                        Style::default()
                            .bg(palette.selection_bg)
                            .fg(palette.selection_fg)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol(">> ");
                f.render_stateful_widget(list, left[1], &mut app.dashboard.list_state);
            }
        }
    }

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let stats = Paragraph::new(dashboard::stats_ui(app.dashboard.stats(), palette))
        .block(Block::default().borders(Borders::ALL).title("Overview"))
        .style(Style::default().fg(palette.text));
    f.render_widget(stats, right[0]);
    let instructions = Paragraph::new(dashboard::instructions_ui())
        .block(Block::default().borders(Borders::ALL).title("Commands"))
        .style(Style::default().fg(palette.text));
    f.render_widget(instructions, right[1]);

    if let Some(toast) = &app.dashboard.toast {
        let line = Line::from(Span::styled(
            toast.message.clone(),
            Style::default()
                .fg(dashboard::toast_color(toast.kind, palette))
                .add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(line), outer[1]);
    }

    if let Some(confirm) = &app.dashboard.confirm {
        draw_confirm_modal(f, confirm.in_flight, palette);
    }
}

fn draw_detail(f: &mut Frame, screen: &DetailScreen, palette: &Palette) {
    let area = centered_rect(70, 60, f.area());
    let block = Block::default().borders(Borders::ALL).title("Task");
    f.render_widget(Clear, area);

    match &screen.state {
        DetailState::Loaded(task) => {
            let status_color = match task.status {
                TaskStatus::Completed => palette.success,
                TaskStatus::InProgress => palette.accent,
                TaskStatus::Pending => palette.warning,
            };
            let mut text = vec![
                Line::from(Span::styled(
                    task.title.clone(),
                    Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
                )),
                Line::raw(""),
                Line::from(vec![
                    Span::styled("Status:   ", Style::default().fg(palette.text)),
                    Span::styled(task.status.to_string(), Style::default().fg(status_color)),
                ]),
                Line::from(format!(
                    "Due date: {}",
                    dashboard::format_due_date(&task.due_date)
                )),
                Line::from(format!("ID:       {}", task.id)),
                Line::raw(""),
                Line::from(Span::styled("Description:", Style::default().fg(palette.text))),
                Line::from(Span::styled(
                    task.description.clone(),
                    Style::default().fg(palette.dim),
                )),
                Line::raw(""),
            ];
            if let Some(message) = &screen.error_message {
                text.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(palette.danger),
                )));
            }
            text.push(Line::from(Span::styled(
                "e - edit   x - delete   r - refresh   Esc - back",
                Style::default().fg(palette.dim),
            )));
            f.render_widget(
                Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
                area,
            );
        }
        DetailState::NotFound => {
            let text = vec![
                Line::from(Span::styled(
                    "Task not found",
                    Style::default().fg(palette.warning),
                )),
                Line::from(Span::styled(
                    "It may have been deleted on the server.",
                    Style::default().fg(palette.dim),
                )),
                Line::raw(""),
                Line::from(Span::styled("Esc - back", Style::default().fg(palette.dim))),
            ];
            f.render_widget(Paragraph::new(text).block(block), area);
        }
        DetailState::Failed(message) => {
            let text = vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(palette.danger),
                )),
                Line::from(Span::styled(
                    "r - retry   Esc - back",
                    Style::default().fg(palette.dim),
                )),
            ];
            f.render_widget(Paragraph::new(text).block(block), area);
        }
    }

    if screen.confirm_delete {
        draw_confirm_modal(f, false, palette);
    }
}

fn draw_form(f: &mut Frame, form: &TaskFormState, palette: &Palette) {
    let area = centered_rect(60, 50, f.area());
    let block = Block::default().borders(Borders::ALL).title(form.heading());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(task_form::form_ui(form, palette)).block(block),
        area,
    );
}

fn draw_confirm_modal(f: &mut Frame, in_flight: bool, palette: &Palette) {
    let area = centered_rect(44, 30, f.area());
    f.render_widget(Clear, area);
    let text = vec![
        Line::raw(""),
        Line::from("Are you sure you want to delete this task?"),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(palette.dim),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            if in_flight {
                "Deleting..."
            } else {
                "y / Enter - delete   n / Esc - cancel"
            },
            Style::default().fg(palette.warning),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Delete Task")
        .border_style(Style::default().fg(palette.danger));
    f.render_widget(
        Paragraph::new(text).block(block).alignment(Alignment::Center),
        area,
    );
}

// Copied shape of the classic popup helper: a rect centered in `r` taking
// the given percentages of each axis.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
