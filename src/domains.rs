//! This module implements the domain store: the per-variable candidate word sets that the
//! consistency engine shrinks and the search engine reads. This is the only state the solving
//! engine mutates between the puzzle model (fixed) and the assignment (owned by search).

use std::collections::HashSet;

use crate::puzzle::Puzzle;
use crate::types::{GlobalWordId, VariableId};
use crate::word_list::WordList;

/// The current candidate word set for each variable, indexed by `VariableId`. Every domain
/// starts as the full vocabulary and only shrinks; deciding *what* to remove is the consistency
/// engine's job, not ours.
#[derive(Debug, Clone)]
pub struct DomainStore {
    domains: Vec<HashSet<GlobalWordId>>,
}

impl DomainStore {
    /// Build a store with every variable's domain initialized to the complete vocabulary.
    #[must_use]
    pub fn new(puzzle: &Puzzle, word_list: &WordList) -> DomainStore {
        let full_vocabulary: HashSet<GlobalWordId> = word_list
            .words
            .iter()
            .enumerate()
            .flat_map(|(length, bucket)| (0..bucket.len()).map(move |word_id| (length, word_id)))
            .collect();

        DomainStore {
            domains: puzzle
                .variables
                .iter()
                .map(|_| full_vocabulary.clone())
                .collect(),
        }
    }

    /// The current candidate set for the given variable.
    #[must_use]
    pub fn words(&self, variable_id: VariableId) -> &HashSet<GlobalWordId> {
        &self.domains[variable_id]
    }

    /// Remove a specific word from a variable's domain, reporting whether it was present.
    pub fn remove(&mut self, variable_id: VariableId, word: GlobalWordId) -> bool {
        self.domains[variable_id].remove(&word)
    }

    /// The number of candidates remaining for the given variable.
    #[must_use]
    pub fn len(&self, variable_id: VariableId) -> usize {
        self.domains[variable_id].len()
    }

    /// Has the given variable's domain been wiped out?
    #[must_use]
    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.domains[variable_id].is_empty()
    }

    /// The number of variables covered by the store.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::DomainStore;
    use crate::puzzle::Puzzle;
    use crate::word_list::WordList;

    #[test]
    fn test_initializes_every_domain_to_the_full_vocabulary() {
        let puzzle = Puzzle::from_template("...#...").unwrap();
        let word_list = WordList::from_words(vec!["cat", "ace", "skate"]);

        let domains = DomainStore::new(&puzzle, &word_list);

        assert_eq!(domains.variable_count(), 2);
        for variable_id in 0..domains.variable_count() {
            assert_eq!(domains.len(variable_id), 3);
            assert!(domains
                .words(variable_id)
                .contains(&word_list.word_id_for_string("skate").unwrap()));
        }
    }

    #[test]
    fn test_remove_shrinks_a_single_domain() {
        let puzzle = Puzzle::from_template("...#...").unwrap();
        let word_list = WordList::from_words(vec!["cat", "ace"]);
        let cat = word_list.word_id_for_string("cat").unwrap();

        let mut domains = DomainStore::new(&puzzle, &word_list);

        assert!(domains.remove(0, cat));
        assert!(!domains.remove(0, cat));

        assert_eq!(domains.len(0), 1);
        assert_eq!(domains.len(1), 2);
        assert!(!domains.is_empty(0));
    }
}
