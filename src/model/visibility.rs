use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::item::TimelineItem;
use super::window::TimelineWindow;

/// Id → position lookup built once per pass over the item list.
pub struct ItemIndex<'a> {
    items: &'a [TimelineItem],
    by_id: HashMap<&'a str, usize>,
    parents: HashSet<&'a str>,
}

impl<'a> ItemIndex<'a> {
    pub fn new(items: &'a [TimelineItem]) -> Self {
        let by_id: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.as_str(), i))
            .collect();
        let parents = items
            .iter()
            .filter_map(|item| item.parent_id.as_deref())
            .filter(|pid| by_id.contains_key(pid))
            .collect();
        Self {
            items,
            by_id,
            parents,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a TimelineItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Whether any item in the list names `id` as its parent.
    pub fn has_children(&self, id: &str) -> bool {
        self.parents.contains(id)
    }

    /// Position of the item's parent, or `None` for roots and dangling
    /// references.
    fn parent_position(&self, i: usize) -> Option<usize> {
        self.items[i]
            .parent_id
            .as_deref()
            .and_then(|pid| self.position(pid))
    }
}

/// Ids of the rows whose children are currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    /// Default state for a freshly loaded list: every item that has at least
    /// one child is expanded.
    pub fn for_items(items: &[TimelineItem]) -> Self {
        let index = ItemIndex::new(items);
        Self {
            expanded: items
                .iter()
                .filter(|item| index.has_children(&item.id))
                .map(|item| item.id.clone())
                .collect(),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flip one row. Returns the new expanded flag.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn expand_all(&mut self, items: &[TimelineItem]) {
        *self = Self::for_items(items);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

/// Rows to draw, in input order. An item is hidden iff some ancestor that is
/// present in the list is collapsed; a dangling `parent_id` makes the item a
/// root, and so does membership in a `parent_id` cycle.
pub fn visible_items<'a>(
    index: &ItemIndex<'a>,
    expansion: &ExpansionState,
) -> Vec<&'a TimelineItem> {
    let items = index.items;
    // open[i] == every present ancestor of i is expanded
    let mut open: Vec<Option<bool>> = vec![None; items.len()];
    let mut on_chain = vec![false; items.len()];
    let mut chain: Vec<usize> = Vec::new();

    for i in 0..items.len() {
        if open[i].is_some() {
            continue;
        }

        chain.clear();
        let mut cur = i;
        let base = loop {
            if let Some(v) = open[cur] {
                break v;
            }
            if on_chain[cur] {
                // parent cycle: every item on the loop is a root
                let start = chain.iter().position(|&c| c == cur).unwrap_or(0);
                for c in chain.split_off(start) {
                    open[c] = Some(true);
                    on_chain[c] = false;
                }
                break true;
            }
            match index.parent_position(cur) {
                Some(p) => {
                    on_chain[cur] = true;
                    chain.push(cur);
                    cur = p;
                }
                None => {
                    open[cur] = Some(true);
                    break true;
                }
            }
        };

        let mut parent_open = base;
        let mut parent = cur;
        for &c in chain.iter().rev() {
            let v = parent_open && expansion.is_expanded(&items[parent].id);
            open[c] = Some(v);
            on_chain[c] = false;
            parent_open = v;
            parent = c;
        }
    }

    items
        .iter()
        .zip(open)
        .filter(|(_, o)| o.unwrap_or(true))
        .map(|(item, _)| item)
        .collect()
}

/// Everything the chart needs for one frame.
pub struct Normalized<'a> {
    pub window: TimelineWindow,
    pub index: ItemIndex<'a>,
    pub visible: Vec<&'a TimelineItem>,
}

pub fn normalize<'a>(
    items: &'a [TimelineItem],
    expansion: &ExpansionState,
    today: NaiveDate,
) -> Normalized<'a> {
    let index = ItemIndex::new(items);
    let visible = visible_items(&index, expansion);
    Normalized {
        window: TimelineWindow::from_items(items, today),
        index,
        visible,
    }
}
