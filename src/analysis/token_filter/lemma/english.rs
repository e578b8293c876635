//! English noun lemmatizer.
//!
//! Maps plural nouns to their singular form using an irregular-form table
//! followed by suffix rules. Every output is a fixed point, so lemmatizing
//! twice gives the same result as lemmatizing once.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::Lemmatizer;

/// Words that end in `s` but are already singular.
const INVARIANT_WORDS: &[&str] = &[
    "physics",
    "mathematics",
    "economics",
    "politics",
    "genetics",
    "electronics",
    "mechanics",
    "dynamics",
    "thermodynamics",
    "linguistics",
    "athletics",
    "acoustics",
    "optics",
    "kinematics",
    "kinetics",
    "news",
    "lens",
    "series",
    "species",
    "means",
    "gas",
    "bias",
    "atlas",
    "canvas",
    "chaos",
    "cosmos",
    "pancreas",
];

/// Irregular plural forms.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("crises", "crisis"),
    ("axes", "axis"),
    ("phenomena", "phenomenon"),
    ("criteria", "criterion"),
    ("nuclei", "nucleus"),
    ("fungi", "fungus"),
    ("cacti", "cactus"),
    ("radii", "radius"),
    ("stimuli", "stimulus"),
    ("bacteria", "bacterium"),
    ("larvae", "larva"),
    ("formulae", "formula"),
    ("vertices", "vertex"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("appendices", "appendix"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("shelves", "shelf"),
    ("oxen", "ox"),
    ("lice", "louse"),
    ("dice", "die"),
    ("quizzes", "quiz"),
    ("viruses", "virus"),
    ("gases", "gas"),
    ("buses", "bus"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("heroes", "hero"),
    ("volcanoes", "volcano"),
    ("echoes", "echo"),
    ("tornadoes", "tornado"),
    ("headaches", "headache"),
    ("caches", "cache"),
    ("niches", "niche"),
];

static INVARIANT_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INVARIANT_WORDS.iter().copied().collect());

static IRREGULAR_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR_PLURALS.iter().copied().collect());

/// Rule-based English noun lemmatizer.
#[derive(Debug, Clone, Default)]
pub struct EnglishLemmatizer;

impl EnglishLemmatizer {
    /// Create a new English lemmatizer.
    pub fn new() -> Self {
        EnglishLemmatizer
    }

    fn strip_plural(word: &str) -> &str {
        if word.len() <= 3
            || word.ends_with("ss")
            || word.ends_with("us")
            || word.ends_with("is")
        {
            return word;
        }

        if word.ends_with("sses")
            || word.ends_with("ches")
            || word.ends_with("shes")
            || word.ends_with("xes")
        {
            return &word[..word.len() - 2];
        }

        if word.ends_with('s') {
            return &word[..word.len() - 1];
        }

        word
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(&lemma) = IRREGULAR_MAP.get(word) {
            return lemma.to_string();
        }
        if INVARIANT_SET.contains(word) {
            return word.to_string();
        }

        if word.len() > 4 && word.ends_with("ies") {
            return format!("{}y", &word[..word.len() - 3]);
        }

        let stripped = Self::strip_plural(word);
        // "mens" strips to "men", which is itself irregular
        match IRREGULAR_MAP.get(stripped) {
            Some(&lemma) => lemma.to_string(),
            None => stripped.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        let lemmatizer = EnglishLemmatizer::new();

        assert_eq!(lemmatizer.lemmatize("cells"), "cell");
        assert_eq!(lemmatizer.lemmatize("equations"), "equation");
        assert_eq!(lemmatizer.lemmatize("studies"), "study");
        assert_eq!(lemmatizer.lemmatize("classes"), "class");
        assert_eq!(lemmatizer.lemmatize("branches"), "branch");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("wishes"), "wish");
        assert_eq!(lemmatizer.lemmatize("houses"), "house");
        assert_eq!(lemmatizer.lemmatize("plates"), "plate");
    }

    #[test]
    fn test_words_left_alone() {
        let lemmatizer = EnglishLemmatizer::new();

        for word in [
            "physics",
            "mathematics",
            "species",
            "glass",
            "virus",
            "analysis",
            "photosynthesis",
            "dna",
            "was",
            "atom",
        ] {
            assert_eq!(lemmatizer.lemmatize(word), word);
        }
    }

    #[test]
    fn test_irregular_plurals() {
        let lemmatizer = EnglishLemmatizer::new();

        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("men"), "man");
        assert_eq!(lemmatizer.lemmatize("bacteria"), "bacterium");
        assert_eq!(lemmatizer.lemmatize("matrices"), "matrix");
        assert_eq!(lemmatizer.lemmatize("leaves"), "leaf");
        assert_eq!(lemmatizer.lemmatize("volcanoes"), "volcano");
        assert_eq!(lemmatizer.lemmatize("mens"), "man");
    }

    #[test]
    fn test_idempotent() {
        let lemmatizer = EnglishLemmatizer::new();

        let words = [
            "cells", "studies", "flies", "classes", "branches", "viruses", "hypotheses", "feets",
            "children", "childrens", "theorems", "physics", "lenses", "series", "quizzes",
            "analyses", "mens", "empires", "civilizations", "ss", "ies", "xes",
        ];
        for word in words {
            let once = lemmatizer.lemmatize(word);
            let twice = lemmatizer.lemmatize(&once);
            assert_eq!(once, twice, "lemmatizing {word} twice changed the result");
        }
    }
}
