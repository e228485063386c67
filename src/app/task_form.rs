// State object for the create/edit form dialog. One controller serves both
// modes: `Create` POSTs a new record, `Edit` PUTs a full replacement.
// Validation runs synchronously before any remote call.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use tracing::warn;

use crate::app::api::TaskRepository;
use crate::app::models::{Task, TaskDraft, TaskStatus};
use crate::app::theme::Palette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

const ROW_TITLE: usize = 0;
const ROW_DESCRIPTION: usize = 1;
const ROW_DUE_DATE: usize = 2;
const ROW_STATUS: usize = 3;
const LAST_ROW: usize = ROW_STATUS;

pub struct TaskFormState {
    pub mode: FormMode,
    title: String,
    description: String,
    due_date: String,
    status: TaskStatus,
    // (column in chars, row)
    cursor: (usize, usize),
    pub error_message: Option<String>,
    saving: bool,
}

impl TaskFormState {
    pub fn for_create() -> Self {
        TaskFormState {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            status: TaskStatus::Pending,
            cursor: (0, ROW_TITLE),
            error_message: None,
            saving: false,
        }
    }

    pub fn for_edit(task: &Task) -> Self {
        TaskFormState {
            mode: FormMode::Edit { id: task.id.clone() },
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.clone(),
            status: task.status,
            cursor: (0, ROW_TITLE),
            error_message: None,
            saving: false,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Task",
            FormMode::Edit { .. } => "Edit Task",
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    fn row_value(&self, row: usize) -> String {
        match row {
            ROW_TITLE => self.title.clone(),
            ROW_DESCRIPTION => self.description.clone(),
            ROW_DUE_DATE => self.due_date.clone(),
            ROW_STATUS => self.status.to_string(),
            _ => String::new(),
        }
    }

    fn row_len(&self, row: usize) -> usize {
        match row {
            ROW_TITLE => self.title.chars().count(),
            ROW_DESCRIPTION => self.description.chars().count(),
            ROW_DUE_DATE => self.due_date.chars().count(),
            _ => 0,
        }
    }

    fn field_mut(&mut self, row: usize) -> Option<&mut String> {
        match row {
            ROW_TITLE => Some(&mut self.title),
            ROW_DESCRIPTION => Some(&mut self.description),
            ROW_DUE_DATE => Some(&mut self.due_date),
            _ => None,
        }
    }

    // Cursor movement preserves the column where the target row allows it.
    pub fn move_cursor_down(&mut self) {
        let row = (self.cursor.1 + 1).min(LAST_ROW);
        self.cursor = (self.cursor.0.min(self.row_len(row)), row);
    }

    pub fn move_cursor_up(&mut self) {
        let row = self.cursor.1.saturating_sub(1);
        self.cursor = (self.cursor.0.min(self.row_len(row)), row);
    }

    /// On text rows moves the cursor; on the status row cycles the value.
    pub fn move_cursor_right(&mut self) {
        if self.cursor.1 == ROW_STATUS {
            self.status = self.status.next();
            return;
        }
        self.cursor.0 = (self.cursor.0 + 1).min(self.row_len(self.cursor.1));
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor.1 == ROW_STATUS {
            self.status = self.status.next().next();
            return;
        }
        self.cursor.0 = self.cursor.0.saturating_sub(1);
    }

    /// Inserts a char at the cursor. On the status row a space cycles the
    /// value instead; other chars are ignored there.
    pub fn input(&mut self, ch: char) {
        if self.cursor.1 == ROW_STATUS {
            if ch == ' ' {
                self.status = self.status.next();
            }
            return;
        }
        let col = self.cursor.0;
        if let Some(field) = self.field_mut(self.cursor.1) {
            let at = byte_index(field, col);
            field.insert(at, ch);
            self.cursor.0 += 1;
        }
    }

    /// Removes the char before the cursor, if any.
    pub fn delete_char(&mut self) {
        let col = self.cursor.0;
        if col == 0 {
            return;
        }
        if let Some(field) = self.field_mut(self.cursor.1) {
            let at = byte_index(field, col - 1);
            field.remove(at);
            self.cursor.0 -= 1;
        }
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date: self.due_date.clone(),
        }
    }

    /// Validates and, if the draft is sound, performs the one remote call
    /// for this form. Returns the persisted record on success so the
    /// dashboard can reconcile its cache; on any failure the form stays
    /// open with an inline message and the field contents intact.
    pub fn submit(&mut self, repo: &dyn TaskRepository) -> Option<Task> {
        if self.saving {
            return None;
        }
        let draft = self.draft();
        if let Err(err) = draft.validate() {
            self.error_message = Some(err.to_string());
            return None;
        }

        self.saving = true;
        let result = match &self.mode {
            FormMode::Create => repo.create_task(&draft),
            FormMode::Edit { id } => repo.update_task(id, &draft),
        };
        self.saving = false;

        match result {
            Ok(task) => {
                self.error_message = None;
                Some(task)
            }
            Err(err) => {
                warn!(error = %err, "saving task failed");
                let message = match self.mode {
                    FormMode::Create => "Failed to create task",
                    FormMode::Edit { .. } => "Failed to update task",
                };
                self.error_message = Some(message.into());
                None
            }
        }
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

// Returns the UI content for the form dialog.
pub fn form_ui<'a>(state: &'a TaskFormState, palette: &Palette) -> Vec<Line<'a>> {
    let rows = [
        ("Title:       ", "My task name"),
        ("Description: ", "What needs doing"),
        ("Due date:    ", "2024-11-23"),
        ("Status:      ", ""),
    ];

    let mut text = Vec::new();
    for (row, (prefix, placeholder)) in rows.iter().enumerate() {
        let mut spans = vec![Span::styled(*prefix, Style::default().fg(palette.text))];
        let value = state.row_value(row);
        let selected = state.cursor.1 == row;

        if row == ROW_STATUS {
            let style = if selected {
                Style::default().fg(palette.selection_fg).bg(palette.accent)
            } else {
                Style::default().fg(palette.text)
            };
            spans.push(Span::styled(format!("< {value} >"), style));
        } else if value.is_empty() {
            let style = if selected {
                Style::default().fg(palette.dim).add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(palette.dim)
            };
            spans.push(Span::styled(placeholder.to_string(), style));
        } else if selected {
            let col = state.cursor.0;
            let before: String = value.chars().take(col).collect();
            let at: String = value.chars().skip(col).take(1).collect();
            let after: String = value.chars().skip(col + 1).collect();
            spans.push(Span::styled(before, Style::default().fg(palette.text)));
            spans.push(Span::styled(
                if at.is_empty() { " ".to_string() } else { at },
                Style::default().fg(palette.selection_fg).bg(palette.text),
            ));
            spans.push(Span::styled(after, Style::default().fg(palette.text)));
        } else {
            spans.push(Span::styled(value, Style::default().fg(palette.text)));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));
    if let Some(ref message) = state.error_message {
        text.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(palette.danger),
        )));
        text.push(Line::raw(""));
    }
    if state.is_saving() {
        text.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(palette.dim),
        )));
    }
    text.push(Line::from(Span::styled(
        "Enter - save, Esc - cancel, Space - cycle status",
        Style::default().fg(palette.dim),
    )));
    text
}
