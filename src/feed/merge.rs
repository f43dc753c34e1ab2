use crate::api::Recipe;
use std::collections::{HashSet, VecDeque};

/// How many deleted ids [`RecentDeletes`] remembers.
pub const RECENT_DELETES_CAP: usize = 32;

/// Appends the recipes of `incoming` whose id is not already in `existing`.
///
/// Server pages can overlap when recipes are inserted between page fetches
/// (offsets shift), so a later page may repeat items already shown. Repeats
/// are dropped silently; `existing` is never reordered and `incoming` keeps
/// its relative order. Duplicates *within* `incoming` are kept as-is: the
/// server is responsible for a single page being unique.
pub fn merge(mut existing: Vec<Recipe>, incoming: Vec<Recipe>) -> Vec<Recipe> {
    if incoming.is_empty() {
        return existing;
    }

    let seen: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
    existing.extend(incoming.into_iter().filter(|r| !seen.contains(&r.id)));
    existing
}

/// Ids of recipes deleted in this session, oldest first.
///
/// A list request sent before a delete succeeded may still return the
/// deleted recipe. Results are passed through [`filter`](Self::filter) before
/// they are committed so it does not come back.
#[derive(Debug, Clone, Default)]
pub struct RecentDeletes {
    ids: VecDeque<String>,
}

impl RecentDeletes {
    pub fn record(&mut self, id: &str) {
        if self.contains(id) {
            return;
        }
        if self.ids.len() == RECENT_DELETES_CAP {
            self.ids.pop_front();
        }
        self.ids.push_back(id.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|deleted| deleted == id)
    }

    pub fn filter(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        if self.ids.is_empty() {
            return recipes;
        }
        recipes
            .into_iter()
            .filter(|r| !self.contains(&r.id))
            .collect()
    }
}
