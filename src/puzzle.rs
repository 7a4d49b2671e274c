//! This module implements the puzzle model for a solving operation, independent of the solving
//! algorithm: the variables (unfilled slots) of a grid, the overlap table relating them, and
//! text rendering of a completed assignment.

use std::collections::HashMap;
use std::fmt;

use crate::types::{GlobalWordId, VariableId};
use crate::word_list::WordList;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// The direction that a variable's slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one variable and another, referencing the other
/// variable's id and the location of the shared cell within the other variable's slot.
#[derive(Debug, Clone)]
pub struct Crossing {
    pub other_variable_id: VariableId,
    pub other_variable_cell: usize,
}

/// A struct representing one variable of the puzzle: a maximal run of open cells that needs a
/// word. Variables are constructed once from the grid geometry and never mutated.
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of this variable's slot, the crossing with the perpendicular variable
    /// sharing that cell, if there is one. This is the overlap table from this variable's side:
    /// an entry at index `i` with `other_variable_cell` `j` means our word's char at `i` must
    /// equal the other word's char at `j`.
    pub crossings: Vec<Option<Crossing>>,
}

impl Variable {
    /// Generate the coords for each cell of this variable's slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum PuzzleError {
    EmptyGrid,
    RaggedRows,
    InvalidCell(char),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            PuzzleError::EmptyGrid => "Grid must have at least one row".to_string(),
            PuzzleError::RaggedRows => "Rows in grid must all be the same length".to_string(),
            PuzzleError::InvalidCell(ch) => format!("Invalid character in grid: “{ch}”"),
        };
        write!(f, "{string}")
    }
}

/// A struct describing the static geometry of a puzzle: its dimensions, which cells are open,
/// and its variables with their crossings.
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub variables: Vec<Variable>,
    pub width: usize,
    pub height: usize,

    /// A flat array of cells in order of row and then column; true means the cell is open
    /// (takes a letter), false means it's blocked.
    pub open_cells: Vec<bool>,
}

impl Puzzle {
    /// Parse a `Puzzle` from a template string with `#` representing blocked cells and `.` or
    /// `_` representing open cells. Variables are maximal horizontal and vertical runs of at
    /// least two open cells.
    pub fn from_template(template: &str) -> Result<Puzzle, PuzzleError> {
        let rows: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                Some(
                    line.chars()
                        .map(|ch| match ch {
                            '.' | '_' => Ok(true),
                            '#' => Ok(false),
                            other => Err(PuzzleError::InvalidCell(other)),
                        })
                        .collect(),
                )
            })
            .collect::<Result<_, _>>()?;

        if rows.is_empty() {
            return Err(PuzzleError::EmptyGrid);
        }

        let width = rows[0].len();
        let height = rows.len();

        if rows.iter().any(|row| row.len() != width) {
            return Err(PuzzleError::RaggedRows);
        }

        // Identify maximal runs of open cells, first along rows and then along the transposed
        // grid for the down variables.
        fn build_runs(grid: &[Vec<bool>]) -> Vec<Vec<GridCoord>> {
            let mut result: Vec<Vec<GridCoord>> = vec![];

            for (y, line) in grid.iter().enumerate() {
                let mut current_run: Vec<GridCoord> = vec![];

                for (x, &open) in line.iter().enumerate() {
                    if open {
                        current_run.push((x, y));
                    } else {
                        if current_run.len() > 1 {
                            result.push(current_run);
                        }
                        current_run = vec![];
                    }
                }

                if current_run.len() > 1 {
                    result.push(current_run);
                }
            }

            result
        }

        let mut slots: Vec<(GridCoord, Direction, usize)> = vec![];

        for coords in build_runs(&rows) {
            slots.push((coords[0], Direction::Across, coords.len()));
        }

        let transposed: Vec<Vec<bool>> = (0..width)
            .map(|x| (0..height).map(|y| rows[y][x]).collect())
            .collect();

        for coords in build_runs(&transposed) {
            // Coords come back (y, x) because we transposed the grid.
            let coords: Vec<GridCoord> = coords.iter().map(|&(y, x)| (x, y)).collect();
            slots.push((coords[0], Direction::Down, coords.len()));
        }

        // Build a map from cell location to the variables involved, which we can then use to
        // calculate crossings.
        let mut entries_by_loc: HashMap<GridCoord, Vec<(usize, usize)>> = HashMap::new();

        let cell_coords = |&(start_cell, direction, length): &(GridCoord, Direction, usize)| {
            (0..length)
                .map(move |cell_idx| match direction {
                    Direction::Across => (start_cell.0 + cell_idx, start_cell.1),
                    Direction::Down => (start_cell.0, start_cell.1 + cell_idx),
                })
                .collect::<Vec<_>>()
        };

        for (variable_idx, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in cell_coords(slot).into_iter().enumerate() {
                entries_by_loc
                    .entry(loc)
                    .or_default()
                    .push((variable_idx, cell_idx));
            }
        }

        let variables: Vec<Variable> = slots
            .iter()
            .enumerate()
            .map(|(variable_idx, slot)| {
                let crossings: Vec<Option<Crossing>> = cell_coords(slot)
                    .iter()
                    .map(|loc| {
                        let crossing_idxs: Vec<_> = entries_by_loc[loc]
                            .iter()
                            .filter(|&&(e, _)| e != variable_idx)
                            .collect();

                        if crossing_idxs.is_empty() {
                            None
                        } else if crossing_idxs.len() > 1 {
                            panic!("More than two variables crossing in cell?");
                        } else {
                            let &(other_variable_id, other_variable_cell) = crossing_idxs[0];
                            Some(Crossing {
                                other_variable_id,
                                other_variable_cell,
                            })
                        }
                    })
                    .collect();

                Variable {
                    id: variable_idx,
                    start_cell: slot.0,
                    direction: slot.1,
                    length: slot.2,
                    crossings,
                }
            })
            .collect();

        Ok(Puzzle {
            variables,
            width,
            height,
            open_cells: rows.into_iter().flatten().collect(),
        })
    }

    /// If variables x and y share a cell, return the pair of character offsets `(i, j)` meaning
    /// "char at offset i of x's word must equal char at offset j of y's word".
    #[must_use]
    pub fn overlap_between(&self, x: VariableId, y: VariableId) -> Option<(usize, usize)> {
        self.variables[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_variable_id == y => {
                    Some((cell_idx, crossing.other_variable_cell))
                }
                _ => None,
            })
    }

    /// All variables sharing a cell with the given one.
    #[must_use]
    pub fn neighbors(&self, variable_id: VariableId) -> Vec<VariableId> {
        self.variables[variable_id]
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_variable_id)
            .collect()
    }

    /// The number of variables sharing a cell with the given one.
    #[must_use]
    pub fn degree(&self, variable_id: VariableId) -> usize {
        self.variables[variable_id]
            .crossings
            .iter()
            .flatten()
            .count()
    }
}

/// A struct recording a word chosen for a variable during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub variable_id: VariableId,
    pub word: GlobalWordId,
}

/// Turn the given puzzle and word choices into a rendered string, with `█` for blocked cells.
#[must_use]
pub fn render_solution(puzzle: &Puzzle, word_list: &WordList, choices: &[Choice]) -> String {
    let mut grid: Vec<Option<char>> = vec![None; puzzle.width * puzzle.height];

    for &Choice { variable_id, word } in choices {
        let variable = &puzzle.variables[variable_id];
        let word = word_list.get_word(word);

        for (coord, &glyph) in variable.cell_coords().iter().zip(&word.glyphs) {
            grid[coord.1 * puzzle.width + coord.0] = Some(word_list.glyphs[glyph]);
        }
    }

    grid.chunks(puzzle.width)
        .enumerate()
        .map(|(y, line)| {
            line.iter()
                .enumerate()
                .map(|(x, cell)| {
                    if puzzle.open_cells[y * puzzle.width + x] {
                        cell.unwrap_or(' ')
                    } else {
                        '█'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::puzzle::{render_solution, Choice, Direction, Puzzle, PuzzleError};
    use crate::word_list::WordList;

    #[test]
    fn test_parses_variables_from_template() {
        let puzzle = Puzzle::from_template(
            "
            ...
            #.#
            #.#
            ",
        )
        .unwrap();

        assert_eq!(puzzle.width, 3);
        assert_eq!(puzzle.height, 3);
        assert_eq!(puzzle.variables.len(), 2);

        let across = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Across)
            .unwrap();
        let down = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Down)
            .unwrap();

        assert_eq!(across.start_cell, (0, 0));
        assert_eq!(across.length, 3);
        assert_eq!(down.start_cell, (1, 0));
        assert_eq!(down.length, 3);
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let puzzle = Puzzle::from_template(
            "
            ...
            #.#
            #.#
            ",
        )
        .unwrap();

        let across = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Across)
            .unwrap()
            .id;
        let down = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Down)
            .unwrap()
            .id;

        assert_eq!(puzzle.overlap_between(across, down), Some((1, 0)));
        assert_eq!(puzzle.overlap_between(down, across), Some((0, 1)));

        assert_eq!(puzzle.neighbors(across), vec![down]);
        assert_eq!(puzzle.neighbors(down), vec![across]);
        assert_eq!(puzzle.degree(across), 1);
    }

    #[test]
    fn test_disjoint_variables_have_no_overlap() {
        let puzzle = Puzzle::from_template("...#...").unwrap();

        assert_eq!(puzzle.variables.len(), 2);
        assert_eq!(puzzle.overlap_between(0, 1), None);
        assert!(puzzle.neighbors(0).is_empty());
    }

    #[test]
    fn test_single_open_cells_form_no_variables() {
        let puzzle = Puzzle::from_template(
            "
            .#.
            ###
            ",
        )
        .unwrap();

        assert!(puzzle.variables.is_empty());
    }

    #[test]
    fn test_rejects_malformed_templates() {
        assert!(matches!(
            Puzzle::from_template(""),
            Err(PuzzleError::EmptyGrid)
        ));
        assert!(matches!(
            Puzzle::from_template("...\n.."),
            Err(PuzzleError::RaggedRows)
        ));
        assert!(matches!(
            Puzzle::from_template("..x"),
            Err(PuzzleError::InvalidCell('x'))
        ));
    }

    #[test]
    fn test_render_solution() {
        let puzzle = Puzzle::from_template(
            "
            ...
            #.#
            #.#
            ",
        )
        .unwrap();
        let word_list = WordList::from_words(vec!["cat", "ace"]);

        let across = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Across)
            .unwrap()
            .id;
        let down = puzzle
            .variables
            .iter()
            .find(|v| v.direction == Direction::Down)
            .unwrap()
            .id;

        let choices = vec![
            Choice {
                variable_id: across,
                word: word_list.word_id_for_string("cat").unwrap(),
            },
            Choice {
                variable_id: down,
                word: word_list.word_id_for_string("ace").unwrap(),
            },
        ];

        assert_eq!(
            render_solution(&puzzle, &word_list, &choices),
            "cat\n█c█\n█e█"
        );
    }
}
