pub mod api;
pub mod dashboard;
pub mod detail;
pub mod models;
pub mod task_form;
pub mod theme;
pub mod ui;
pub mod view;

#[cfg(test)]
pub mod testing;
