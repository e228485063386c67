//! In-memory repository fake and fixture helpers shared by controller tests.

use std::cell::{Cell, RefCell};

use crate::app::api::{ApiError, TaskRepository};
use crate::app::models::{Task, TaskDraft, TaskStatus};

pub fn task(id: &str, due_date: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        description: format!("Description of {id}"),
        status,
        due_date: due_date.to_string(),
    }
}

pub fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "Something to do".into(),
        status: TaskStatus::Pending,
        due_date: "2024-06-01".into(),
    }
}

/// Stands in for the remote service: a `Vec<Task>` behind the
/// [`TaskRepository`] trait, with switches to simulate failures and
/// counters to assert how often the network would have been hit.
#[derive(Default)]
pub struct FakeRepository {
    pub tasks: RefCell<Vec<Task>>,
    pub fail_list: Cell<bool>,
    pub fail_mutations: Cell<bool>,
    pub list_calls: Cell<usize>,
    pub create_calls: Cell<usize>,
    pub update_calls: Cell<usize>,
    pub delete_calls: Cell<usize>,
    next_id: Cell<u32>,
}

impl FakeRepository {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        FakeRepository {
            tasks: RefCell::new(tasks),
            next_id: Cell::new(1000),
            ..FakeRepository::default()
        }
    }

    fn server_error() -> ApiError {
        ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl TaskRepository for FakeRepository {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_list.get() {
            return Err(Self::server_error());
        }
        Ok(self.tasks.borrow().clone())
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, ApiError> {
        if self.fail_list.get() {
            return Err(Self::server_error());
        }
        Ok(self.tasks.borrow().iter().find(|t| t.id == id).cloned())
    }

    fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.create_calls.set(self.create_calls.get() + 1);
        if self.fail_mutations.get() {
            return Err(Self::server_error());
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let created = Task {
            id: id.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            due_date: draft.due_date.clone(),
        };
        self.tasks.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.update_calls.set(self.update_calls.get() + 1);
        if self.fail_mutations.get() {
            return Err(Self::server_error());
        }
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::Status(reqwest::StatusCode::NOT_FOUND))?;
        task.title = draft.title.clone();
        task.description = draft.description.clone();
        task.status = draft.status;
        task.due_date = draft.due_date.clone();
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.delete_calls.set(self.delete_calls.get() + 1);
        if self.fail_mutations.get() {
            return Err(Self::server_error());
        }
        self.tasks.borrow_mut().retain(|t| t.id != id);
        Ok(())
    }
}
