//! This module implements puzzle solving using recursive backtracking search over partial
//! assignments. Variables are ordered with the minimum-remaining-values heuristic (ties broken
//! by degree), candidate words with the least-constraining-value heuristic, and the entry point
//! prunes domains with node consistency and AC-3 before searching. All heuristics are
//! deterministic, so repeated solves of the same puzzle yield the same assignment.

use itertools::Itertools;
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::consistency::{enforce_node_consistency, establish_arc_consistency};
use crate::domains::DomainStore;
use crate::puzzle::{Choice, Puzzle};
use crate::types::{GlobalWordId, VariableId};
use crate::util::build_glyph_counts_by_cell;
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// A struct tracking stats about the solving process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub total_time: Duration,
}

/// A partial mapping from variables to chosen words, built incrementally during search. Each
/// recursive frame removes exactly what it added before returning on failure, so the structure
/// is shared down the stack rather than cloned.
#[derive(Debug, Clone)]
pub struct Assignment {
    words: Vec<Option<GlobalWordId>>,
    assigned_count: usize,
}

impl Assignment {
    #[must_use]
    pub fn new(variable_count: usize) -> Assignment {
        Assignment {
            words: vec![None; variable_count],
            assigned_count: 0,
        }
    }

    /// The word assigned to the given variable, if any.
    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> Option<GlobalWordId> {
        self.words[variable_id]
    }

    #[must_use]
    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.words[variable_id].is_some()
    }

    /// Is every variable assigned a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words.len()
    }

    /// Tentatively assign a word to an unassigned variable.
    pub fn insert(&mut self, variable_id: VariableId, word: GlobalWordId) {
        if CHECK_INVARIANTS && self.words[variable_id].is_some() {
            panic!("Assigning a word to an already-assigned variable?");
        }

        self.words[variable_id] = Some(word);
        self.assigned_count += 1;
    }

    /// Undo the assignment for the given variable.
    pub fn remove(&mut self, variable_id: VariableId) {
        if CHECK_INVARIANTS && self.words[variable_id].is_none() {
            panic!("Unassigning a variable with no word?");
        }

        self.words[variable_id] = None;
        self.assigned_count -= 1;
    }

    /// Iterate over the assigned (variable, word) pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, GlobalWordId)> + Clone + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(variable_id, word)| word.map(|word| (variable_id, word)))
    }
}

/// A struct representing the result of a successful solve.
#[derive(Debug)]
pub struct Solution {
    pub choices: Vec<Choice>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveFailure {
    /// The search space was exhausted without finding a complete assignment. This is an
    /// expected outcome for an unsatisfiable puzzle, not an error.
    NoSolution,
    Timeout,
    Aborted,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            SolveFailure::NoSolution => "no solution",
            SolveFailure::Timeout => "timed out before finding a solution",
            SolveFailure::Aborted => "solve was aborted",
        };
        write!(f, "{string}")
    }
}

/// Optional bounds on a solve: a wall-clock deadline and/or an abort flag that another thread
/// can set. Both are checked at each node-selection step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions<'a> {
    pub deadline: Option<Instant>,
    pub abort: Option<&'a AtomicBool>,
}

/// Is the partial assignment consistent? Every assigned word must fit its variable's length,
/// all assigned words must be pairwise distinct, and every pair of assigned variables with an
/// overlap must agree on the shared cell.
#[must_use]
pub fn consistent(puzzle: &Puzzle, word_list: &WordList, assignment: &Assignment) -> bool {
    // The length check can't fail after node consistency, but it's part of the definition of
    // consistency and guards against domains maintained by hand.
    if assignment
        .iter()
        .any(|(variable_id, (length, _))| length != puzzle.variables[variable_id].length)
    {
        return false;
    }

    let mut seen: HashSet<GlobalWordId> = HashSet::new();
    if !assignment.iter().all(|(_, word)| seen.insert(word)) {
        return false;
    }

    assignment.iter().tuple_combinations().all(|(a, b)| {
        let Some((i, j)) = puzzle.overlap_between(a.0, b.0) else {
            return true;
        };
        word_list.get_word(a.1).glyphs[i] == word_list.get_word(b.1).glyphs[j]
    })
}

/// Choose the unassigned variable with the fewest remaining domain values, breaking ties by
/// the most neighbors and then by the lowest id. Returns `None` when every variable is
/// assigned.
#[must_use]
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<VariableId> {
    (0..puzzle.variables.len())
        .filter(|&variable_id| !assignment.is_assigned(variable_id))
        .min_by_key(|&variable_id| {
            (
                domains.len(variable_id),
                Reverse(puzzle.degree(variable_id)),
                variable_id,
            )
        })
}

/// Order the given variable's domain ascending by the number of words each candidate would
/// rule out across the domains of unassigned crossing neighbors, breaking ties by word id.
/// This is a pure ordering heuristic: it reads the domain store but never mutates it.
#[must_use]
pub fn order_domain_values(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &DomainStore,
    assignment: &Assignment,
    variable_id: VariableId,
) -> Vec<GlobalWordId> {
    let variable = &puzzle.variables[variable_id];

    // For each cell with an unassigned crossing neighbor, precompute the neighbor's glyph
    // counts at the shared cell so that the number of conflicting neighbor words for a
    // candidate is a constant-time lookup.
    let crossing_counts: Vec<Option<(u32, _)>> = variable
        .crossings
        .iter()
        .map(|crossing| {
            let crossing = crossing.as_ref()?;
            if assignment.is_assigned(crossing.other_variable_id) {
                return None;
            }

            let other = &puzzle.variables[crossing.other_variable_id];
            let counts = build_glyph_counts_by_cell(
                word_list,
                other.length,
                domains.words(crossing.other_variable_id),
            );
            let counts_at_cell = counts[crossing.other_variable_cell].clone();
            let total: u32 = counts_at_cell.iter().sum();

            Some((total, counts_at_cell))
        })
        .collect();

    let mut candidates: Vec<(u32, GlobalWordId)> = domains
        .words(variable_id)
        .iter()
        .map(|&word_id| {
            let word = word_list.get_word(word_id);

            let ruled_out: u32 = crossing_counts
                .iter()
                .enumerate()
                .filter_map(|(cell_idx, counts)| {
                    let (total, counts_at_cell) = counts.as_ref()?;
                    let &glyph = word.glyphs.get(cell_idx)?;
                    Some(total - counts_at_cell[glyph])
                })
                .sum();

            (ruled_out, word_id)
        })
        .collect();

    candidates.sort_unstable();

    candidates.into_iter().map(|(_, word_id)| word_id).collect()
}

struct Search<'a> {
    puzzle: &'a Puzzle,
    word_list: &'a WordList,
    domains: &'a DomainStore,
    options: SolveOptions<'a>,
    statistics: Statistics,
}

impl Search<'_> {
    /// Recursive backtracking step. `Ok(true)` means `assignment` now holds a complete,
    /// consistent solution; `Ok(false)` means this subtree is exhausted; `Err` means the
    /// deadline passed or the abort flag was set.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, SolveFailure> {
        self.statistics.states += 1;

        if let Some(deadline) = self.options.deadline {
            if Instant::now() > deadline {
                return Err(SolveFailure::Timeout);
            }
        }
        if let Some(abort) = self.options.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(SolveFailure::Aborted);
            }
        }

        if assignment.is_complete() {
            return Ok(true);
        }

        let variable_id = select_unassigned_variable(self.puzzle, self.domains, assignment)
            .expect("incomplete assignment must leave a variable unassigned");

        for word in order_domain_values(
            self.puzzle,
            self.word_list,
            self.domains,
            assignment,
            variable_id,
        ) {
            trace!("trying variable {variable_id} = {word:?}");
            assignment.insert(variable_id, word);

            if consistent(self.puzzle, self.word_list, assignment) && self.backtrack(assignment)? {
                return Ok(true);
            }

            assignment.remove(variable_id);
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }
}

/// Solve the puzzle: enforce node consistency, prune with AC-3, and run backtracking search
/// over the resulting domains. An unsatisfiable puzzle is reported as
/// `SolveFailure::NoSolution`, never as a panic or a distinct error channel.
pub fn solve(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &mut DomainStore,
    options: SolveOptions,
) -> Result<Solution, SolveFailure> {
    let start = Instant::now();

    enforce_node_consistency(puzzle, domains);

    // A wipeout here already proves unsatisfiability, but backtracking runs regardless and
    // surfaces the same observable outcome from the root.
    if let Err(wipeout) = establish_arc_consistency(puzzle, word_list, domains, None) {
        debug!(
            "proceeding to search despite wipeout of variable {}",
            wipeout.variable_id
        );
    }

    let mut search = Search {
        puzzle,
        word_list,
        domains,
        options,
        statistics: Statistics::default(),
    };
    let mut assignment = Assignment::new(puzzle.variables.len());

    let found = search.backtrack(&mut assignment)?;

    let mut statistics = search.statistics;
    statistics.total_time = start.elapsed();
    debug!(
        "search visited {} states with {} backtracks in {:?}",
        statistics.states, statistics.backtracks, statistics.total_time
    );

    if !found {
        return Err(SolveFailure::NoSolution);
    }

    Ok(Solution {
        choices: assignment
            .iter()
            .map(|(variable_id, word)| Choice { variable_id, word })
            .collect(),
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::{solve, SolveFailure, SolveOptions};
    use crate::domains::DomainStore;
    use crate::puzzle::{Choice, Puzzle};
    use crate::word_list::WordList;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};

    fn solve_template(template: &str, words: &[&str]) -> Result<Vec<Choice>, SolveFailure> {
        let puzzle = Puzzle::from_template(template).unwrap();
        let word_list = WordList::from_words(words.iter().copied());
        let mut domains = DomainStore::new(&puzzle, &word_list);

        solve(&puzzle, &word_list, &mut domains, SolveOptions::default())
            .map(|solution| solution.choices)
    }

    /// Check the solution-validity property: complete, pairwise-distinct words of the right
    /// lengths, agreeing on every shared cell.
    fn assert_valid(template: &str, words: &[&str], choices: &[Choice]) {
        let puzzle = Puzzle::from_template(template).unwrap();
        let word_list = WordList::from_words(words.iter().copied());

        assert_eq!(choices.len(), puzzle.variables.len());

        let mut seen = HashSet::new();
        for choice in choices {
            assert_eq!(choice.word.0, puzzle.variables[choice.variable_id].length);
            assert!(seen.insert(choice.word), "word assigned twice");
        }

        for a in choices {
            for b in choices {
                let Some((i, j)) = puzzle.overlap_between(a.variable_id, b.variable_id) else {
                    continue;
                };
                assert_eq!(
                    word_list.get_word(a.word).glyphs[i],
                    word_list.get_word(b.word).glyphs[j],
                    "variables {} and {} disagree on their shared cell",
                    a.variable_id,
                    b.variable_id
                );
            }
        }
    }

    const CROSSING_PAIR: &str = "
        ...
        #.#
        #.#
        ";

    #[test]
    fn test_solves_two_crossing_variables() {
        let words = ["cat", "ace"];
        let choices = solve_template(CROSSING_PAIR, &words).unwrap();
        assert_valid(CROSSING_PAIR, &words, &choices);
    }

    #[test]
    fn test_reports_no_solution_when_no_word_matches_a_length() {
        // Node consistency empties both domains; search fails cleanly from the root.
        assert_eq!(
            solve_template(CROSSING_PAIR, &["ab", "abcd"]),
            Err(SolveFailure::NoSolution)
        );
    }

    #[test]
    fn test_reports_no_solution_when_no_pairing_satisfies_the_overlap() {
        // Both words start with 'c' but neither has 'c' in the across slot's shared cell.
        assert_eq!(
            solve_template(CROSSING_PAIR, &["cat", "cow"]),
            Err(SolveFailure::NoSolution)
        );
    }

    #[test]
    fn test_reports_no_solution_when_words_would_have_to_repeat() {
        // The only candidate fits both disjoint variables, but words can't be reused.
        assert_eq!(
            solve_template("...#...", &["cat"]),
            Err(SolveFailure::NoSolution)
        );
    }

    #[test]
    fn test_solves_disjoint_variables_independently() {
        let words = ["cat", "dog"];
        let choices = solve_template("...#...", &words).unwrap();
        assert_valid("...#...", &words, &choices);
    }

    #[test]
    fn test_solves_a_3x3_word_square() {
        let template = "
            ...
            ...
            ...
            ";
        let words = ["oat", "rye", "sea", "ors", "aye", "tea"];

        let choices = solve_template(template, &words).unwrap();
        assert_valid(template, &words, &choices);
    }

    #[test]
    fn test_repeated_solves_are_deterministic() {
        let template = "
            ...
            ...
            ...
            ";
        let words = [
            "oat", "rye", "sea", "ors", "aye", "tea", "eat", "tan", "ant", "ate",
        ];

        let first = solve_template(template, &words).unwrap();
        let second = solve_template(template, &words).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_an_expired_deadline_surfaces_as_timeout() {
        let puzzle = Puzzle::from_template(CROSSING_PAIR).unwrap();
        let word_list = WordList::from_words(vec!["cat", "ace"]);
        let mut domains = DomainStore::new(&puzzle, &word_list);

        let result = solve(
            &puzzle,
            &word_list,
            &mut domains,
            SolveOptions {
                deadline: Some(Instant::now() - Duration::from_secs(1)),
                abort: None,
            },
        );

        assert_eq!(result.unwrap_err(), SolveFailure::Timeout);
    }

    #[test]
    fn test_a_set_abort_flag_surfaces_as_aborted() {
        let puzzle = Puzzle::from_template(CROSSING_PAIR).unwrap();
        let word_list = WordList::from_words(vec!["cat", "ace"]);
        let mut domains = DomainStore::new(&puzzle, &word_list);
        let abort = AtomicBool::new(true);

        let result = solve(
            &puzzle,
            &word_list,
            &mut domains,
            SolveOptions {
                deadline: None,
                abort: Some(&abort),
            },
        );

        assert_eq!(result.unwrap_err(), SolveFailure::Aborted);
    }

    #[test]
    fn test_a_puzzle_with_no_variables_solves_trivially() {
        let choices = solve_template("#", &["cat"]).unwrap();
        assert!(choices.is_empty());
    }
}
