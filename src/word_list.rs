//! This module implements the vocabulary that crossword variables draw their candidate words
//! from. Words are interned as sequences of `GlyphId`s and bucketed by length, so that the
//! solving engine can compare shared cells with integer equality and so that a
//! `GlobalWordId` of `(length, word_id)` uniquely names any word.

use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlobalWordId, GlyphId};
use crate::{MAX_GLYPH_COUNT, MAX_WORD_LENGTH};

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- lowercase, NFC-normalized, no whitespace.
    pub normalized_string: String,

    /// The word as it appears in the user's word list, with arbitrary formatting.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_WORD_LENGTH]>,
}

/// Given a canonical word string from a word list file, turn it into the normalized form we'll
/// use in the actual solving engine.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone)]
pub enum WordListError {
    InvalidPath(String),
    EmptyList,
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            WordListError::InvalidPath(path) => format!("Can’t read file: “{path}”"),
            WordListError::EmptyList => "Word list contains no words".to_string(),
        };
        write!(f, "{string}")
    }
}

/// A struct representing the loaded vocabulary. This is static regardless of grid geometry or
/// our progress through a solve; the engine's domains reference words in it by id and never
/// modify it.
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// All loaded words, bucketed by length. An index into `words` is the length of the words
    /// in the bucket, so `words[0]` is always an empty vec.
    pub words: Vec<Vec<Word>>,

    /// A map from a normalized string to the id of the Word representing it.
    pub word_id_by_string: HashMap<String, GlobalWordId>,
}

impl WordList {
    /// Construct a `WordList` from raw word strings, one entry per item. Blank entries are
    /// skipped and duplicates (after normalization) are collapsed.
    pub fn from_words<'a>(raw_words: impl IntoIterator<Item = &'a str>) -> WordList {
        let mut instance = WordList {
            glyphs: smallvec![],
            glyph_id_by_char: HashMap::new(),
            words: vec![vec![]],
            word_id_by_string: HashMap::new(),
        };

        for canonical in raw_words {
            instance.add_word(canonical);
        }

        instance
    }

    /// Construct a `WordList` from a file with one word per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;

        let word_list = WordList::from_words(contents.lines());

        if word_list.word_id_by_string.is_empty() {
            return Err(WordListError::EmptyList);
        }

        Ok(word_list)
    }

    /// Add the given word to the list, returning its id. If the word normalizes to an empty
    /// string it is skipped; if it's already present, the existing id is returned.
    pub fn add_word(&mut self, canonical: &str) -> Option<GlobalWordId> {
        let normalized = normalize_word(canonical);
        if normalized.is_empty() {
            return None;
        }

        if let Some(&existing_id) = self.word_id_by_string.get(&normalized) {
            return Some(existing_id);
        }

        let glyphs: SmallVec<[GlyphId; MAX_WORD_LENGTH]> = normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        let word_length = glyphs.len();

        while self.words.len() < word_length + 1 {
            self.words.push(vec![]);
        }

        let word_id = self.words[word_length].len();

        self.words[word_length].push(Word {
            normalized_string: normalized.clone(),
            canonical_string: canonical.trim().to_string(),
            glyphs,
        });

        self.word_id_by_string
            .insert(normalized, (word_length, word_id));

        Some((word_length, word_id))
    }

    /// Borrow an existing word using its global id.
    #[must_use]
    pub fn get_word(&self, global_word_id: GlobalWordId) -> &Word {
        &self.words[global_word_id.0][global_word_id.1]
    }

    /// Look up the id of a normalized word, if it's in the list.
    #[must_use]
    pub fn word_id_for_string(&self, normalized_word: &str) -> Option<GlobalWordId> {
        self.word_id_by_string.get(normalized_word).copied()
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of just
    /// mapping every letter up front, because word list entries may also contain numbers,
    /// non-English letters, or punctuation.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field(
                "words",
                &self.words.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
