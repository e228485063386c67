use std::time::{Duration, Instant};

use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, ListState};
use tracing::{info, warn};

use crate::app::api::TaskRepository;
use crate::app::models::{StatusFilter, Task, TaskStatus};
use crate::app::theme::Palette;
use crate::app::view::{self, ViewParams};

/// How long a toast stays on screen unless dismissed earlier.
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Outcome of the initial (or re-triggered) list load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient notification. Only one exists at a time; a newer one
/// replaces the current one.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Toast {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// The delete-confirmation prompt, holding its target until the user
/// decides. `in_flight` gates re-entry while the delete call runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDelete {
    pub target_id: String,
    pub in_flight: bool,
}

/// Counts shown in the stats panel, always over the full cached list,
/// not the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Owns the cached task list and every view parameter. The remote service
/// is the source of truth; this cache is refreshed on load and reconciled
/// locally after each successful mutation, never re-fetched implicitly.
pub struct DashboardState {
    pub tasks: Vec<Task>,
    pub load_state: LoadState,
    pub params: ViewParams,
    pub list_state: ListState,
    pub confirm: Option<ConfirmDelete>,
    pub toast: Option<Toast>,
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState {
            tasks: Vec::new(),
            load_state: LoadState::Loading,
            params: ViewParams::default(),
            list_state: ListState::default(),
            confirm: None,
            toast: None,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        DashboardState::default()
    }

    /// Fetches the full list from the service. Any failure becomes an
    /// inline message; the dashboard stays interactive and `load` can be
    /// re-triggered.
    pub fn load(&mut self, repo: &dyn TaskRepository) {
        self.load_state = LoadState::Loading;
        match repo.list_tasks() {
            Ok(tasks) => {
                info!(count = tasks.len(), "task list loaded");
                self.tasks = tasks;
                self.load_state = LoadState::Loaded;
                self.clamp_view();
            }
            Err(err) => {
                warn!(error = %err, "task list load failed");
                self.load_state = LoadState::Failed("Failed to load tasks".into());
            }
        }
    }

    pub fn stats(&self) -> TaskStats {
        let count = |status| {
            self.tasks
                .iter()
                .filter(|t: &&Task| t.status == status)
                .count()
        };
        TaskStats {
            total: self.tasks.len(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }

    /// Number of pages under the current filter.
    pub fn page_count(&self) -> usize {
        view::total_pages(view::filter_tasks(&self.tasks, self.params.filter).len())
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.params.set_filter(filter);
        self.list_state.select(None);
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.params.filter.next());
    }

    pub fn toggle_sort(&mut self) {
        self.params.toggle_sort();
        self.list_state.select(None);
    }

    pub fn next_page(&mut self) {
        if self.params.page < self.page_count() {
            self.params.page += 1;
            self.list_state.select(None);
        }
    }

    pub fn prev_page(&mut self) {
        if self.params.page > 1 {
            self.params.page -= 1;
            self.list_state.select(None);
        }
    }

    fn visible_len(&self) -> usize {
        view::visible_page(&self.tasks, &self.params).len()
    }

    // Selection movement, wrapping within the visible page.
    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.list_state.select(None);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let visible = view::visible_page(&self.tasks, &self.params);
        self.list_state.selected().and_then(|i| visible.get(i).copied())
    }

    /// Opens the confirmation prompt for one task.
    pub fn request_delete(&mut self, target_id: String) {
        self.confirm = Some(ConfirmDelete {
            target_id,
            in_flight: false,
        });
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = None;
    }

    /// Runs the confirmed delete. On success the record is spliced out of
    /// the cache locally, without a re-fetch; on failure the cache is left
    /// untouched. Either way the prompt closes and a toast reports the
    /// outcome.
    pub fn confirm_delete(&mut self, repo: &dyn TaskRepository) {
        let Some(confirm) = self.confirm.as_mut() else {
            return;
        };
        if confirm.in_flight {
            return;
        }
        confirm.in_flight = true;
        let target_id = confirm.target_id.clone();

        match repo.delete_task(&target_id) {
            Ok(()) => {
                self.remove_local(&target_id);
                self.notify("Task deleted successfully!", ToastKind::Success);
            }
            Err(err) => {
                warn!(id = %target_id, error = %err, "delete failed");
                self.notify("Failed to delete task", ToastKind::Error);
            }
        }
        self.confirm = None;
    }

    /// Splices one record out of the cache and keeps the view in range.
    pub fn remove_local(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
        self.clamp_view();
    }

    /// Local reconciliation after create/update: replace the record with a
    /// matching id, or append a new one.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.clamp_view();
    }

    fn clamp_view(&mut self) {
        let pages = self.page_count();
        if self.params.page > pages {
            self.params.page = pages.max(1);
        }
        let len = self.visible_len();
        if let Some(i) = self.list_state.selected() {
            if len == 0 {
                self.list_state.select(None);
            } else if i >= len {
                self.list_state.select(Some(len - 1));
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind));
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Called on every event-loop tick to age out the toast.
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.expired(now)) {
            self.toast = None;
        }
    }
}

// Build the UI (list) for the visible page of tasks.
pub fn list_items<'a>(tasks: &[&'a Task], palette: &Palette) -> Vec<ListItem<'a>> {
    tasks
        .iter()
        .map(|t| {
            let status_color = match t.status {
                TaskStatus::Completed => palette.success,
                TaskStatus::InProgress => palette.accent,
                TaskStatus::Pending => palette.warning,
            };
            let lines = vec![
                Line::from(vec![
                    Span::from(t.title.as_str()).fg(palette.text).bold(),
                    Span::raw(" "),
                    Span::styled(format!("[{}]", t.status), Style::default().fg(status_color)),
                ]),
                Line::from(vec![
                    Span::styled(
                        format!("    Due: {}", format_due_date(&t.due_date)),
                        Style::default().fg(palette.dim),
                    ),
                    Span::styled(
                        format!("  {}", t.description),
                        Style::default().fg(palette.dim),
                    ),
                ]),
            ];
            ListItem::new(lines)
        })
        .collect()
}

/// "2024-01-10" -> "10 Jan 2024"; anything unparseable is shown as-is.
pub fn format_due_date(due_date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(due_date, "%Y-%m-%d") {
        Ok(date) => date.format("%d %b %Y").to_string(),
        Err(_) => due_date.to_string(),
    }
}

// Build the UI (line) for the filter tabs, sort direction and page indicator.
pub fn header_line(state: &DashboardState, palette: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    for filter in StatusFilter::TABS {
        let style = if filter == state.params.filter {
            Style::default().fg(palette.selection_fg).bg(palette.accent)
        } else {
            Style::default().fg(palette.dim)
        };
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }
    let arrow = if state.params.sort_ascending { "^" } else { "v" };
    spans.push(Span::styled(
        format!(" Due date {arrow} "),
        Style::default().fg(palette.text),
    ));
    spans.push(Span::styled(
        format!(" Page {}/{} ", state.params.page, state.page_count().max(1)),
        Style::default().fg(palette.dim),
    ));
    Line::from(spans)
}

// Build the UI (lines) for the statistics infobox.
pub fn stats_ui(stats: TaskStats, palette: &Palette) -> Vec<Line<'static>> {
    let percent = if stats.total > 0 {
        stats.completed * 100 / stats.total
    } else {
        0
    };
    vec![
        Line::from(format!("Total tasks: {}", stats.total)),
        Line::from(vec![
            Span::raw("Completed:   "),
            Span::styled(stats.completed.to_string(), Style::default().fg(palette.success)),
        ]),
        Line::from(vec![
            Span::raw("In progress: "),
            Span::styled(stats.in_progress.to_string(), Style::default().fg(palette.accent)),
        ]),
        Line::from(vec![
            Span::raw("Pending:     "),
            Span::styled(stats.pending.to_string(), Style::default().fg(palette.warning)),
        ]),
        Line::from(format!("Progress:    {percent}%")),
    ]
}

// Build the UI (lines) for the instructions infobox.
pub fn instructions_ui() -> Vec<Line<'static>> {
    vec![
        "Enter - view task".into(),
        "a - add a task".into(),
        "e - edit a task".into(),
        "x - delete a task".into(),
        "f - cycle status filter".into(),
        "s - toggle due-date sort".into(),
        "n / p - next / previous page".into(),
        "r - reload from server".into(),
        "t - toggle theme".into(),
        "q - quit".into(),
    ]
}

pub fn toast_color(kind: ToastKind, palette: &Palette) -> Color {
    match kind {
        ToastKind::Success => palette.success,
        ToastKind::Error => palette.danger,
        ToastKind::Info => palette.accent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::StatusFilter;
    use crate::app::testing::{task, FakeRepository};

    fn loaded_dashboard(repo: &FakeRepository) -> DashboardState {
        let mut dash = DashboardState::new();
        dash.load(repo);
        assert_eq!(dash.load_state, LoadState::Loaded);
        dash
    }

    fn sample_repo() -> FakeRepository {
        FakeRepository::with_tasks(vec![
            task("a", "2024-01-10", TaskStatus::Pending),
            task("b", "2024-01-05", TaskStatus::Completed),
            task("c", "2024-02-01", TaskStatus::InProgress),
        ])
    }

    #[test]
    fn load_failure_shows_inline_message() {
        let repo = sample_repo();
        repo.fail_list.set(true);
        let mut dash = DashboardState::new();
        dash.load(&repo);
        assert_eq!(dash.load_state, LoadState::Failed("Failed to load tasks".into()));
        assert!(dash.tasks.is_empty());
    }

    #[test]
    fn confirmed_delete_splices_locally_without_refetch() {
        let repo = sample_repo();
        let mut dash = loaded_dashboard(&repo);
        assert_eq!(repo.list_calls.get(), 1);

        dash.request_delete("b".into());
        dash.confirm_delete(&repo);

        let ids: Vec<&str> = dash.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(repo.list_calls.get(), 1, "delete must not re-fetch the list");
        assert!(dash.confirm.is_none());
        let toast = dash.toast.expect("success toast");
        assert_eq!(toast.kind, ToastKind::Success);
    }

    #[test]
    fn failed_delete_leaves_cache_untouched_and_closes_prompt() {
        let repo = sample_repo();
        let mut dash = loaded_dashboard(&repo);
        repo.fail_mutations.set(true);

        dash.request_delete("b".into());
        dash.confirm_delete(&repo);

        assert_eq!(dash.tasks.len(), 3);
        assert!(dash.confirm.is_none());
        let toast = dash.toast.expect("error toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Failed to delete task");
    }

    #[test]
    fn cancel_closes_prompt_without_calling_the_service() {
        let repo = sample_repo();
        let mut dash = loaded_dashboard(&repo);
        dash.request_delete("a".into());
        dash.cancel_delete();
        assert!(dash.confirm.is_none());
        assert_eq!(repo.delete_calls.get(), 0);
        assert_eq!(dash.tasks.len(), 3);
    }

    #[test]
    fn changing_filter_resets_to_first_page() {
        let repo = FakeRepository::with_tasks(
            (0..20)
                .map(|i| task(&format!("t{i}"), "2024-01-01", TaskStatus::Pending))
                .collect(),
        );
        let mut dash = loaded_dashboard(&repo);
        dash.next_page();
        assert_eq!(dash.params.page, 2);
        dash.set_filter(StatusFilter::Only(TaskStatus::Completed));
        assert_eq!(dash.params.page, 1);
    }

    #[test]
    fn deleting_the_last_task_of_the_last_page_clamps_the_page() {
        let repo = FakeRepository::with_tasks(
            (0..7)
                .map(|i| task(&format!("t{i}"), "2024-01-01", TaskStatus::Pending))
                .collect(),
        );
        let mut dash = loaded_dashboard(&repo);
        dash.next_page();
        assert_eq!(dash.params.page, 2);

        dash.request_delete("t6".into());
        dash.confirm_delete(&repo);
        assert_eq!(dash.tasks.len(), 6);
        assert_eq!(dash.params.page, 1);
    }

    #[test]
    fn upsert_replaces_matching_id_and_appends_new() {
        let repo = sample_repo();
        let mut dash = loaded_dashboard(&repo);

        let mut edited = task("a", "2024-03-01", TaskStatus::Completed);
        edited.title = "Edited".into();
        dash.upsert(edited);
        assert_eq!(dash.tasks.len(), 3);
        assert_eq!(dash.tasks[0].title, "Edited");

        dash.upsert(task("z", "2024-04-01", TaskStatus::Pending));
        assert_eq!(dash.tasks.len(), 4);
    }

    #[test]
    fn newer_toast_replaces_current_and_expires_after_delay() {
        let mut dash = DashboardState::new();
        dash.notify("first", ToastKind::Info);
        dash.notify("second", ToastKind::Error);
        assert_eq!(dash.toast.as_ref().unwrap().message, "second");

        let later = Instant::now() + TOAST_DURATION + Duration::from_millis(1);
        dash.tick(later);
        assert!(dash.toast.is_none());
    }

    #[test]
    fn selection_wraps_within_visible_page() {
        let repo = sample_repo();
        let mut dash = loaded_dashboard(&repo);
        dash.select_next();
        assert_eq!(dash.list_state.selected(), Some(0));
        dash.select_previous();
        assert_eq!(dash.list_state.selected(), Some(2));
        dash.select_next();
        assert_eq!(dash.list_state.selected(), Some(0));
    }

    #[test]
    fn stats_count_over_the_full_cache() {
        let repo = sample_repo();
        let dash = loaded_dashboard(&repo);
        let stats = dash.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
    }
}
