//! The derived-view pipeline: filter, then sort, then paginate. All pure
//! functions over the dashboard's cached task list; recomputed on every
//! draw, never touching the network.

use crate::app::models::{StatusFilter, Task};

/// Tasks shown per dashboard page.
pub const PAGE_SIZE: usize = 6;

/// The view parameters the dashboard owns: which status tab is active,
/// the due-date sort direction, and the 1-indexed current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParams {
    pub filter: StatusFilter,
    pub sort_ascending: bool,
    pub page: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        ViewParams {
            filter: StatusFilter::All,
            sort_ascending: true,
            page: 1,
        }
    }
}

impl ViewParams {
    /// Switches the status tab. A changed filter snaps back to page 1 so a
    /// narrowed result set can never leave the view on an out-of-range page.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn toggle_sort(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }
}

/// Keeps every task under `All`, otherwise exactly those whose status
/// equals the filtered one. Preserves input order.
pub fn filter_tasks(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Orders by `due_date` with a plain lexicographic comparison, which for
/// ISO dates matches chronological order. Stable, no secondary key.
pub fn sort_tasks(mut tasks: Vec<&Task>, ascending: bool) -> Vec<&Task> {
    if ascending {
        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    } else {
        tasks.sort_by(|a, b| b.due_date.cmp(&a.due_date));
    }
    tasks
}

/// The contiguous slice for a 1-indexed page. A page past the end yields
/// an empty vec rather than an error.
pub fn paginate<'a>(tasks: &[&'a Task], page: usize) -> Vec<&'a Task> {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    tasks.iter().skip(start).take(PAGE_SIZE).copied().collect()
}

/// Number of pages the filtered set occupies; zero when it is empty.
pub fn total_pages(filtered_len: usize) -> usize {
    filtered_len.div_ceil(PAGE_SIZE)
}

/// The whole pipeline: the page of tasks currently visible.
pub fn visible_page<'a>(tasks: &'a [Task], params: &ViewParams) -> Vec<&'a Task> {
    let filtered = filter_tasks(tasks, params.filter);
    let sorted = sort_tasks(filtered, params.sort_ascending);
    paginate(&sorted, params.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::TaskStatus;
    use crate::app::testing::task;
    use rstest::rstest;

    fn sample() -> Vec<Task> {
        vec![
            task("a", "2024-01-10", TaskStatus::Pending),
            task("b", "2024-01-05", TaskStatus::Completed),
            task("c", "2024-02-01", TaskStatus::InProgress),
            task("d", "2024-01-20", TaskStatus::Pending),
        ]
    }

    #[test]
    fn all_filter_keeps_everything_in_order() {
        let tasks = sample();
        let kept = filter_tasks(&tasks, StatusFilter::All);
        let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[rstest]
    #[case(TaskStatus::Pending)]
    #[case(TaskStatus::InProgress)]
    #[case(TaskStatus::Completed)]
    fn status_filter_keeps_only_matching(#[case] status: TaskStatus) {
        let tasks = sample();
        let kept = filter_tasks(&tasks, StatusFilter::Only(status));
        assert!(!kept.is_empty());
        assert!(kept.iter().all(|t| t.status == status));
    }

    #[test]
    fn ascending_sort_is_non_decreasing() {
        let tasks = sample();
        let sorted = sort_tasks(filter_tasks(&tasks, StatusFilter::All), true);
        assert!(sorted.windows(2).all(|w| w[0].due_date <= w[1].due_date));
    }

    #[test]
    fn descending_is_reverse_of_ascending_without_ties() {
        let tasks = sample();
        let asc = sort_tasks(filter_tasks(&tasks, StatusFilter::All), true);
        let mut desc = sort_tasks(filter_tasks(&tasks, StatusFilter::All), false);
        desc.reverse();
        let asc_ids: Vec<&str> = asc.iter().map(|t| t.id.as_str()).collect();
        let desc_ids: Vec<&str> = desc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(asc_ids, desc_ids);
    }

    #[test]
    fn equal_due_dates_keep_filter_order() {
        let tasks = vec![
            task("x", "2024-01-01", TaskStatus::Pending),
            task("y", "2024-01-01", TaskStatus::Pending),
            task("z", "2024-01-01", TaskStatus::Pending),
        ];
        let sorted = sort_tasks(filter_tasks(&tasks, StatusFilter::All), true);
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["x", "y", "z"]);
    }

    #[test]
    fn pages_concatenate_back_to_the_full_sequence() {
        let tasks: Vec<Task> = (0..14)
            .map(|i| task(&format!("t{i}"), "2024-01-01", TaskStatus::Pending))
            .collect();
        let refs: Vec<&Task> = tasks.iter().collect();
        assert_eq!(total_pages(refs.len()), 3);

        let mut joined = Vec::new();
        for page in 1..=total_pages(refs.len()) {
            let slice = paginate(&refs, page);
            assert!(slice.len() <= PAGE_SIZE);
            joined.extend(slice);
        }
        assert_eq!(joined, refs);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let tasks = sample();
        let refs: Vec<&Task> = tasks.iter().collect();
        assert!(paginate(&refs, 2).is_empty());
        assert!(paginate(&refs, 99).is_empty());
    }

    #[test]
    fn empty_set_has_zero_pages() {
        assert_eq!(total_pages(0), 0);
        assert!(paginate(&[], 1).is_empty());
    }

    #[test]
    fn changing_filter_resets_page() {
        let mut params = ViewParams::default();
        params.page = 3;
        params.set_filter(StatusFilter::Only(TaskStatus::Pending));
        assert_eq!(params.page, 1);
    }

    #[test]
    fn reselecting_the_same_filter_keeps_the_page() {
        let mut params = ViewParams::default();
        params.page = 2;
        params.set_filter(StatusFilter::All);
        assert_eq!(params.page, 2);
    }

    #[test]
    fn two_task_ordering_scenario() {
        let tasks = vec![
            task("a", "2024-01-10", TaskStatus::Pending),
            task("b", "2024-01-05", TaskStatus::Completed),
        ];
        let params = ViewParams::default();
        let visible = visible_page(&tasks, &params);
        let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);

        let mut pending_only = ViewParams::default();
        pending_only.set_filter(StatusFilter::Only(TaskStatus::Pending));
        let visible = visible_page(&tasks, &pending_only);
        let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }
}
