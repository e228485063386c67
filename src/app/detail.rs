// Single-record detail screen: fetch-on-open, with delete (behind its own
// confirmation) and an edit entry point handled by the UI shell.

use tracing::warn;

use crate::app::api::TaskRepository;
use crate::app::models::Task;

/// What the detail screen shows for its id. "Not found" is a valid state
/// of its own, distinct from a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loaded(Task),
    NotFound,
    Failed(String),
}

pub struct DetailScreen {
    pub id: String,
    pub state: DetailState,
    pub confirm_delete: bool,
    pub error_message: Option<String>,
}

impl DetailScreen {
    pub fn open(repo: &dyn TaskRepository, id: String) -> Self {
        let state = fetch(repo, &id);
        DetailScreen {
            id,
            state,
            confirm_delete: false,
            error_message: None,
        }
    }

    pub fn refresh(&mut self, repo: &dyn TaskRepository) {
        self.state = fetch(repo, &self.id);
        self.error_message = None;
    }

    pub fn task(&self) -> Option<&Task> {
        match &self.state {
            DetailState::Loaded(task) => Some(task),
            _ => None,
        }
    }

    /// Runs the confirmed delete for this record. Returns `true` when the
    /// record is gone and the caller should navigate back; on failure the
    /// screen stays up with an inline message.
    pub fn delete(&mut self, repo: &dyn TaskRepository) -> bool {
        self.confirm_delete = false;
        match repo.delete_task(&self.id) {
            Ok(()) => true,
            Err(err) => {
                warn!(id = %self.id, error = %err, "delete from detail failed");
                self.error_message = Some("Failed to delete task".into());
                false
            }
        }
    }
}

fn fetch(repo: &dyn TaskRepository, id: &str) -> DetailState {
    match repo.get_task(id) {
        Ok(Some(task)) => DetailState::Loaded(task),
        Ok(None) => DetailState::NotFound,
        Err(err) => {
            warn!(id, error = %err, "task fetch failed");
            DetailState::Failed("Failed to load task".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::TaskStatus;
    use crate::app::testing::{task, FakeRepository};

    #[test]
    fn missing_id_is_not_found_not_an_error() {
        let repo = FakeRepository::with_tasks(vec![task("a", "2024-01-10", TaskStatus::Pending)]);
        let screen = DetailScreen::open(&repo, "missing-id".into());
        assert_eq!(screen.state, DetailState::NotFound);
    }

    #[test]
    fn fetch_failure_is_reported_inline() {
        let repo = FakeRepository::default();
        repo.fail_list.set(true);
        let screen = DetailScreen::open(&repo, "a".into());
        assert_eq!(screen.state, DetailState::Failed("Failed to load task".into()));
    }

    #[test]
    fn failed_delete_keeps_the_screen_up() {
        let repo = FakeRepository::with_tasks(vec![task("a", "2024-01-10", TaskStatus::Pending)]);
        let mut screen = DetailScreen::open(&repo, "a".into());
        repo.fail_mutations.set(true);
        screen.confirm_delete = true;

        assert!(!screen.delete(&repo));
        assert!(!screen.confirm_delete);
        assert_eq!(screen.error_message.as_deref(), Some("Failed to delete task"));
        assert!(screen.task().is_some());
    }

    #[test]
    fn successful_delete_signals_navigation() {
        let repo = FakeRepository::with_tasks(vec![task("a", "2024-01-10", TaskStatus::Pending)]);
        let mut screen = DetailScreen::open(&repo, "a".into());
        assert!(screen.delete(&repo));
        assert!(repo.tasks.borrow().is_empty());
    }
}
