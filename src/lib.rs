pub mod backtracking_search;
pub mod consistency;
pub mod domains;
pub mod puzzle;
pub mod types;
pub mod util;
pub mod word_list;

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of distinct characters appearing in a grid.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single word or slot.
pub const MAX_WORD_LENGTH: usize = 21;
