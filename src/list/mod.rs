//! Filterable, fuzzy-ranked selection lists.

pub mod fuzzy;

pub use fuzzy::{rank, rank_with_pinned_last, Rank};

use crate::catalog::DisplayEntry;

/// The text an entry is matched on.
pub trait ListEntry {
    fn filter_value(&self) -> &str;
}

impl ListEntry for String {
    fn filter_value(&self) -> &str {
        self
    }
}

impl ListEntry for DisplayEntry {
    fn filter_value(&self) -> &str {
        match self {
            DisplayEntry::Task { name, .. } => name,
            DisplayEntry::Generate => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterList<T> {
    entries: Vec<T>,
    pin_last: bool,
    filter: String,
    filtering: bool,
    visible: Vec<Rank>,
    selected: usize,
}

impl<T: ListEntry> FilterList<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self::build(entries, false)
    }

    /// The last entry stays visible, ranked last, under every filter.
    pub fn with_pinned_last(entries: Vec<T>) -> Self {
        Self::build(entries, true)
    }

    fn build(entries: Vec<T>, pin_last: bool) -> Self {
        let mut list = Self {
            entries,
            pin_last,
            filter: String::new(),
            filtering: false,
            visible: Vec::new(),
            selected: 0,
        };
        list.refilter();
        list
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    /// Appends to the filter, entering filter mode first if needed.
    pub fn push_filter_char(&mut self, ch: char) {
        self.filtering = true;
        self.filter.push(ch);
        self.refilter();
    }

    /// Removes the last filter character; on an empty filter this leaves
    /// filter mode instead. Outside filter mode it does nothing.
    pub fn pop_filter_char(&mut self) {
        if !self.filtering {
            return;
        }
        if self.filter.pop().is_none() {
            self.filtering = false;
        }
        self.refilter();
    }

    pub fn reset_filter(&mut self) {
        self.filter.clear();
        self.filtering = false;
        self.refilter();
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn visible(&self) -> impl Iterator<Item = (&T, &Rank)> {
        self.visible
            .iter()
            .filter_map(|rank| self.entries.get(rank.index).map(|entry| (entry, rank)))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Position of the selection within the visible rows.
    pub fn selected_position(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.visible
            .get(self.selected)
            .and_then(|rank| self.entries.get(rank.index))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn refilter(&mut self) {
        let targets: Vec<&str> = self.entries.iter().map(ListEntry::filter_value).collect();
        self.visible = if self.pin_last {
            rank_with_pinned_last(&self.filter, &targets)
        } else {
            rank(&self.filter, &targets)
        };
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_entries() -> Vec<DisplayEntry> {
        ["build", "deploy", "test"]
            .into_iter()
            .map(|name| DisplayEntry::Task {
                name: name.to_string(),
                description: None,
            })
            .chain(std::iter::once(DisplayEntry::Generate))
            .collect()
    }

    #[test]
    fn first_character_opens_and_seeds_the_filter() {
        let mut list = FilterList::with_pinned_last(catalog_entries());
        assert!(!list.is_filtering());

        list.push_filter_char('d');
        assert!(list.is_filtering());
        assert_eq!(list.filter_text(), "d");
        assert_eq!(
            list.selected().and_then(DisplayEntry::task_name),
            Some("deploy")
        );
    }

    #[test]
    fn generate_entry_survives_non_matching_filters() {
        let mut list = FilterList::with_pinned_last(catalog_entries());
        for ch in "zzz".chars() {
            list.push_filter_char(ch);
        }
        assert_eq!(list.visible_len(), 1);
        assert_eq!(list.selected(), Some(&DisplayEntry::Generate));
    }

    #[test]
    fn backspace_on_empty_filter_leaves_filter_mode() {
        let mut list = FilterList::with_pinned_last(catalog_entries());
        list.push_filter_char('t');
        list.pop_filter_char();
        assert!(list.is_filtering());
        assert_eq!(list.visible_len(), 4);
        list.pop_filter_char();
        assert!(!list.is_filtering());
    }

    #[test]
    fn backspace_outside_filter_mode_keeps_the_selection() {
        let mut list = FilterList::with_pinned_last(catalog_entries());
        list.select_next();
        list.select_next();
        list.pop_filter_char();
        assert!(!list.is_filtering());
        assert_eq!(list.selected_position(), 2);
        assert_eq!(list.selected().and_then(DisplayEntry::task_name), Some("test"));
    }

    #[test]
    fn selection_is_clamped_and_reset_on_filter_change() {
        let mut list = FilterList::new(vec!["a".to_string(), "b".to_string()]);
        list.select_prev();
        assert_eq!(list.selected_position(), 0);
        list.select_next();
        list.select_next();
        assert_eq!(list.selected_position(), 1);

        list.push_filter_char('a');
        assert_eq!(list.selected_position(), 0);
        assert_eq!(list.selected().map(String::as_str), Some("a"));

        list.reset_filter();
        assert_eq!(list.visible_len(), 2);
        assert!(!list.is_filtering());
    }

    #[test]
    fn unpinned_list_can_filter_to_nothing() {
        let mut list = FilterList::new(vec!["gpt-4o".to_string()]);
        list.push_filter_char('x');
        assert_eq!(list.visible_len(), 0);
        assert_eq!(list.selected(), None);
    }
}
