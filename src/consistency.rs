//! This module implements the consistency engine: node consistency (length filtering) and the
//! AC-3 algorithm for establishing arc consistency over the domain store. A puzzle is
//! arc-consistent when, for every pair of crossing variables, every candidate word for one has
//! at least one candidate for the other that agrees on the shared cell.
//!
//! Support checking uses per-cell glyph counts rather than scanning the crossing domain for
//! each candidate; the set of words removed is identical to the textbook pairwise scan.

use log::{debug, trace};
use std::collections::VecDeque;

use crate::domains::DomainStore;
use crate::puzzle::Puzzle;
use crate::types::{GlobalWordId, VariableId};
use crate::util::build_glyph_counts_by_cell;
use crate::word_list::WordList;

/// Signal that propagation emptied a variable's domain, proving the puzzle unsatisfiable along
/// the current path. This is an internal outcome, not a user-facing error; the solving entry
/// point still runs backtracking afterwards and surfaces a plain "no solution".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainWipeout {
    pub variable_id: VariableId,
}

/// Remove from each variable's domain every word whose length differs from the variable's slot
/// length. Single pass, idempotent; a variable may legitimately end up with an empty domain,
/// which search will surface as unsolvable later.
pub fn enforce_node_consistency(puzzle: &Puzzle, domains: &mut DomainStore) {
    for variable in &puzzle.variables {
        let wrong_length: Vec<GlobalWordId> = domains
            .words(variable.id)
            .iter()
            .filter(|&&(length, _)| length != variable.length)
            .copied()
            .collect();

        for word in wrong_length {
            domains.remove(variable.id, word);
        }

        trace!(
            "node consistency: variable {} has {} candidates of length {}",
            variable.id,
            domains.len(variable.id),
            variable.length
        );
    }
}

/// Make variable `x` arc-consistent with variable `y`: remove every word from x's domain with
/// no supporting word in y's domain agreeing at the shared cell. Returns whether any removal
/// occurred; a no-op reporting no change when x and y don't overlap.
pub fn revise(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &mut DomainStore,
    x: VariableId,
    y: VariableId,
) -> bool {
    let Some((i, j)) = puzzle.overlap_between(x, y) else {
        return false;
    };

    let y_glyph_counts =
        build_glyph_counts_by_cell(word_list, puzzle.variables[y].length, domains.words(y));

    let unsupported: Vec<GlobalWordId> = domains
        .words(x)
        .iter()
        .filter(|&&word_id| {
            // A word too short to reach the shared cell can't satisfy the constraint at all;
            // this only arises if AC-3 is run before node consistency.
            word_list
                .get_word(word_id)
                .glyphs
                .get(i)
                .map_or(true, |&glyph| y_glyph_counts[j][glyph] == 0)
        })
        .copied()
        .collect();

    if unsupported.is_empty() {
        return false;
    }

    for word in &unsupported {
        domains.remove(x, *word);
    }

    trace!(
        "revise: removed {} candidates from variable {} against variable {}",
        unsupported.len(),
        x,
        y
    );

    true
}

/// Run the AC-3 propagation loop over a FIFO worklist of ordered variable pairs until the
/// domains reach a consistent fixed point. If `arcs` is `None`, the worklist starts with every
/// ordered pair of distinct variables. Whenever a revision shrinks x's domain, every pair
/// `(z, x)` for each neighbor z of x other than y is re-enqueued, since the previously
/// established consistency of z with x may no longer hold.
pub fn establish_arc_consistency(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &mut DomainStore,
    arcs: Option<Vec<(VariableId, VariableId)>>,
) -> Result<(), DomainWipeout> {
    let mut queue: VecDeque<(VariableId, VariableId)> = match arcs {
        Some(arcs) => arcs.into(),
        None => {
            let variable_count = puzzle.variables.len();
            (0..variable_count)
                .flat_map(|x| (0..variable_count).filter(move |&y| y != x).map(move |y| (x, y)))
                .collect()
        }
    };

    while let Some((x, y)) = queue.pop_front() {
        if revise(puzzle, word_list, domains, x, y) {
            if domains.is_empty(x) {
                debug!("arc consistency: domain wipeout for variable {x}");
                return Err(DomainWipeout { variable_id: x });
            }

            for z in puzzle.neighbors(x) {
                if z != y {
                    queue.push_back((z, x));
                }
            }
        }
    }

    Ok(())
}
