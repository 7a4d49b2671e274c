use smallvec::SmallVec;
use std::collections::HashSet;

use crate::types::GlobalWordId;
use crate::word_list::WordList;
use crate::MAX_GLYPH_COUNT;

/// Structure tracking, for each cell of a variable's slot, the number of occurrences of each
/// glyph at that cell across the variable's candidate words.
pub type GlyphCountsByCell = Vec<SmallVec<[u32; MAX_GLYPH_COUNT]>>;

/// Initialize the `glyph_counts_by_cell` structure for a variable with the given slot length
/// and domain. Candidates shorter than the slot (possible before node consistency has run)
/// only contribute counts for the cells they reach.
pub fn build_glyph_counts_by_cell(
    word_list: &WordList,
    slot_length: usize,
    domain: &HashSet<GlobalWordId>,
) -> GlyphCountsByCell {
    let mut result: GlyphCountsByCell = (0..slot_length)
        .map(|_| (0..word_list.glyphs.len()).map(|_| 0).collect())
        .collect();

    for &word_id in domain {
        let word = word_list.get_word(word_id);
        for (cell_idx, &glyph) in word.glyphs.iter().take(slot_length).enumerate() {
            result[cell_idx][glyph] += 1;
        }
    }

    result
}
