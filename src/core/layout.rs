//! Hebrew (SI-1452) <-> English (QWERTY) key-position tables

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Physical key pairs: (character on the English layout, character on the Hebrew layout).
///
/// Both lookup directions are derived from this single list, so they are
/// exact inverses of each other on their domains.
pub const KEY_PAIRS: &[(char, char)] = &[
    // Top row
    ('q', '/'),
    ('w', '\''),
    ('e', 'ק'),
    ('r', 'ר'),
    ('t', 'א'),
    ('y', 'ט'),
    ('u', 'ו'),
    ('i', 'ן'),
    ('o', 'ם'),
    ('p', 'פ'),
    // Home row
    ('a', 'ש'),
    ('s', 'ד'),
    ('d', 'ג'),
    ('f', 'כ'),
    ('g', 'ע'),
    ('h', 'י'),
    ('j', 'ח'),
    ('k', 'ל'),
    ('l', 'ך'),
    (';', 'ף'),
    ('\'', ','),
    // Bottom row
    ('z', 'ז'),
    ('x', 'ס'),
    ('c', 'ב'),
    ('v', 'ה'),
    ('b', 'נ'),
    ('n', 'מ'),
    ('m', 'צ'),
    (',', 'ת'),
    ('.', 'ץ'),
    ('/', '.'),
];

/// Bidirectional substitution table between the two layouts
#[derive(Debug, Clone)]
pub struct LayoutMap {
    he_to_en: HashMap<char, char>,
    en_to_he: HashMap<char, char>,
}

lazy_static! {
    /// The standard Hebrew/English table, built once on first use
    pub static ref STANDARD_LAYOUT: LayoutMap = LayoutMap::from_pairs(KEY_PAIRS);
}

impl LayoutMap {
    /// Build both directions from (english, hebrew) key pairs
    pub fn from_pairs(pairs: &[(char, char)]) -> Self {
        let mut he_to_en = HashMap::with_capacity(pairs.len());
        let mut en_to_he = HashMap::with_capacity(pairs.len());

        for &(en, he) in pairs {
            en_to_he.insert(en, he);
            he_to_en.insert(he, en);
        }

        Self { he_to_en, en_to_he }
    }

    /// Character produced by the same key on the English layout.
    /// Characters outside the table come back unchanged.
    pub fn hebrew_to_english(&self, c: char) -> char {
        self.he_to_en.get(&c).copied().unwrap_or(c)
    }

    /// Character produced by the same key on the Hebrew layout.
    ///
    /// The lookup is done on the lowercase form, so `'A'` and `'a'` both
    /// map to `'ש'`. Unmapped characters keep their original case.
    pub fn english_to_hebrew(&self, c: char) -> char {
        self.en_to_he
            .get(&c.to_ascii_lowercase())
            .copied()
            .unwrap_or(c)
    }

    /// Number of keys in the table
    pub fn len(&self) -> usize {
        self.en_to_he.len()
    }

    pub fn is_empty(&self) -> bool {
        self.en_to_he.is_empty()
    }
}

impl Default for LayoutMap {
    fn default() -> Self {
        STANDARD_LAYOUT.clone()
    }
}
