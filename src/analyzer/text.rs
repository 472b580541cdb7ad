//! Stylometric analysis of text
//!
//! Scores a text on eight signals that separate machine-generated prose
//! from human writing. Every signal is an AI score in [0,1]: 0 means
//! human-like, 1 means machine-like, 0.5 means "not enough data".
//!
//! # How Text Analysis Works
//!
//! Language models write *smoothly*. Sentences come out at similar lengths,
//! vocabulary stays in a safe middle band, punctuation is mostly periods and
//! commas, and certain stock phrases ("it's important to note", "in
//! conclusion") show up far more often than in human text. Humans are
//! bursty: a topic word appears three times in a paragraph and then
//! vanishes, sentence lengths swing from 3 words to 30, contractions are
//! everywhere.
//!
//! ## Signals
//!
//! | Signal | Measures |
//! |--------|----------|
//! | sentence_variance | CV of words-per-sentence (uniform = AI) |
//! | vocabulary_richness | type-token ratio + share of uncommon words |
//! | burstiness | clustering of repeated content words |
//! | punctuation_variety | distinct punctuation marks used |
//! | ai_phrase_detection | weighted stock-phrase hits per 100 words |
//! | word_length_variance | CV of word lengths |
//! | contractions_usage | contractions per 100 words (few = AI) |
//! | repetition_penalty | repeated two-word sentence openers |
//!
//! None of these is conclusive alone. Short inputs fall back to 0.5 on most
//! signals, which keeps the combined score near the middle.

use super::aggregate::{aggregate, WeightTable};
use super::stats::{clamp01, coefficient_of_variation};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

pub const WEIGHTS: WeightTable = &[
    ("sentence_variance", 0.15),
    ("vocabulary_richness", 0.20),
    ("burstiness", 0.10),
    ("punctuation_variety", 0.10),
    ("ai_phrase_detection", 0.20),
    ("word_length_variance", 0.05),
    ("contractions_usage", 0.10),
    ("repetition_penalty", 0.10),
];

/// Stock phrases and their weights, in reporting order
const AI_PHRASES: &[(&str, f64)] = &[
    // Self-reference
    ("as an ai", 1.0),
    ("as a language model", 1.0),
    ("i don't have personal", 0.9),
    ("i cannot provide", 0.8),
    ("i'm unable to", 0.7),
    // Hedging
    ("it's important to note", 0.8),
    ("it is important to", 0.7),
    ("it's worth noting", 0.7),
    ("it should be noted", 0.7),
    ("keep in mind that", 0.6),
    // Transitions
    ("furthermore", 0.4),
    ("moreover", 0.4),
    ("additionally", 0.4),
    ("in conclusion", 0.5),
    ("to summarize", 0.5),
    ("in summary", 0.5),
    ("overall", 0.3),
    // Sign-offs
    ("i hope this helps", 0.7),
    ("feel free to", 0.5),
    ("don't hesitate to", 0.5),
    ("let me know if", 0.4),
    // Corporate vocabulary
    ("utilize", 0.3),
    ("facilitate", 0.3),
    ("leverage", 0.3),
    ("delve into", 0.6),
    ("dive into", 0.4),
    ("explore the", 0.3),
    // List openers
    ("here are some", 0.5),
    ("here's a list", 0.5),
    ("the following", 0.4),
];

const CONTRACTIONS: &[&str] = &[
    "i'm", "i'll", "i've", "i'd",
    "you're", "you'll", "you've", "you'd",
    "he's", "she's", "it's", "we're", "they're",
    "don't", "doesn't", "didn't", "won't", "wouldn't",
    "can't", "couldn't", "shouldn't", "isn't", "aren't",
    "wasn't", "weren't", "haven't", "hasn't", "hadn't",
    "let's", "that's", "there's", "here's", "what's",
    "who's", "how's", "where's", "when's",
];

const COMMON_WORDS: &[&str] = &[
    // Articles and pronouns
    "a", "an", "the", "i", "you", "he", "she", "it", "we", "they", "me", "him",
    "her", "us", "them", "my", "your", "his", "its", "our", "their", "this", "that",
    // Prepositions
    "in", "on", "at", "to", "for", "of", "with", "by", "from", "about", "into",
    "through", "during", "before", "after",
    // Conjunctions
    "and", "or", "but", "so", "yet", "if", "when", "while", "because", "although",
    // Verbs
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "can",
    "get", "got", "make", "made",
    // Everything else
    "not", "no", "yes", "just", "only", "also", "very", "more", "most", "some", "any",
    "all", "many", "much", "other", "such", "than", "then", "now", "here", "there",
    "where", "what", "which", "who", "how", "why", "each", "every", "both", "few",
    "new", "old", "good", "bad", "first", "last", "long", "little", "own", "same",
    "big", "high", "small", "large", "next", "early", "young", "important", "public",
    "able", "man", "woman", "time", "year", "people", "way", "day", "thing", "world",
    "life", "hand", "part", "place", "case", "week", "work", "fact", "group", "number",
    "night", "point", "home", "water", "room", "mother", "area", "money", "story",
    "month", "lot", "right", "study", "book", "eye", "job", "word", "business", "issue",
    "side", "kind", "head", "house", "service", "friend", "father", "power", "hour",
    "game", "line", "end", "member", "law", "car", "city", "community", "name",
];

/// Marks that only show up in deliberately punctuated prose
const INTERESTING_PUNCT: &[char] = &['!', '?', ';', ':', '-', '—', '(', ')', '"', '\''];

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextSignals {
    pub sentence_variance: f64,
    pub vocabulary_richness: f64,
    pub burstiness: f64,
    pub punctuation_variety: f64,
    pub ai_phrase_score: f64,
    pub word_length_variance: f64,
    pub contractions_usage: f64,
    pub repetition_score: f64,
}

impl TextSignals {
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("sentence_variance", self.sentence_variance),
            ("vocabulary_richness", self.vocabulary_richness),
            ("burstiness", self.burstiness),
            ("punctuation_variety", self.punctuation_variety),
            ("ai_phrase_detection", self.ai_phrase_score),
            ("word_length_variance", self.word_length_variance),
            ("contractions_usage", self.contractions_usage),
            ("repetition_penalty", self.repetition_score),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextStats {
    pub char_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub unique_words: usize,
    pub unique_ratio: f64,
    pub punctuation_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextAnalysis {
    pub ai_score: f64,
    pub signals: TextSignals,
    pub stats: TextStats,
    pub detected_ai_phrases: Vec<String>,
}

/// Run every text signal and combine them
pub fn analyze(text: &str) -> TextAnalysis {
    let words = tokenize(text);
    let sentences = split_sentences(text);
    let lower = text.to_lowercase();

    let (ai_phrase_score, detected_ai_phrases) = ai_phrases(&lower, words.len());

    let signals = TextSignals {
        sentence_variance: sentence_variance(&sentences),
        vocabulary_richness: vocabulary_richness(&words),
        burstiness: burstiness(&words),
        punctuation_variety: punctuation_variety(text),
        ai_phrase_score,
        word_length_variance: word_length_variance(&words),
        contractions_usage: contractions_usage(&lower, words.len()),
        repetition_score: repetition(&sentences),
    };

    TextAnalysis {
        ai_score: aggregate(&signals.pairs(), WEIGHTS),
        stats: stats(text, &words, &sentences),
        signals,
        detected_ai_phrases,
    }
}

// ============================================================================
// Tokenization
// ============================================================================

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-zA-Z']+").expect("word regex"))
}

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("sentence regex"))
}

fn common_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| COMMON_WORDS.iter().copied().collect())
}

pub fn tokenize(text: &str) -> Vec<&str> {
    word_re().find_iter(text).map(|m| m.as_str()).collect()
}

pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_re()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_common(word: &str) -> bool {
    common_words().contains(word)
}

/// Unicode punctuation (general category P*), excluding math/currency symbols
fn is_punct(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation() && !matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~');
    }
    matches!(
        c,
        '—' | '–' | '‐' | '…' | '‘' | '’' | '“' | '”' | '«' | '»' | '¡' | '¿' | '·' | '§' | '¶'
    )
}

// ============================================================================
// Signals
// ============================================================================

/// Uniform sentence lengths score high
fn sentence_variance(sentences: &[&str]) -> f64 {
    if sentences.len() < 3 {
        return 0.5;
    }

    // All-empty sentences have cv 0 and score as fully uniform
    let lengths: Vec<f64> = sentences.iter().map(|s| tokenize(s).len() as f64).collect();
    let cv = coefficient_of_variation(&lengths);
    1.0 - (cv / 0.8).min(1.0)
}

fn vocabulary_richness(words: &[&str]) -> f64 {
    if words.len() < 10 {
        return 0.5;
    }

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let ttr = unique.len() as f64 / words.len() as f64;

    let uncommon = unique.iter().filter(|w| !is_common(w) && w.len() > 3).count();
    let uncommon_ratio = uncommon as f64 / unique.len() as f64;

    let ttr_score = 1.0 - (ttr / 0.6).min(1.0);
    clamp01(ttr_score * 0.6 + (1.0 - uncommon_ratio) * 0.4)
}

/// Evenly spaced topic words score high
fn burstiness(words: &[&str]) -> f64 {
    if words.len() < 20 {
        return 0.5;
    }

    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, w) in words.iter().enumerate() {
        let w = w.to_lowercase();
        if w.len() > 4 && !is_common(&w) {
            positions.entry(w).or_default().push(i);
        }
    }

    let mut total = 0.0;
    let mut count = 0usize;

    for pos in positions.values().filter(|p| p.len() >= 2) {
        let gaps: Vec<f64> = pos.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        total += coefficient_of_variation(&gaps);
        count += 1;
    }

    if count == 0 {
        return 0.5;
    }

    let avg = total / count as f64;
    1.0 - (avg / 1.5).min(1.0)
}

fn punctuation_variety(text: &str) -> f64 {
    let marks: Vec<char> = text.chars().filter(|&c| is_punct(c)).collect();
    if marks.len() < 5 {
        return 0.5;
    }

    let unique: HashSet<char> = marks.iter().copied().collect();
    let interesting = INTERESTING_PUNCT.iter().filter(|c| unique.contains(c)).count();

    let variety = unique.len() as f64 / 8.0;
    let interesting = interesting as f64 / 5.0;

    clamp01(1.0 - (variety * 0.5 + interesting * 0.5))
}

/// Weighted stock-phrase density and the phrases that matched
fn ai_phrases(lower: &str, word_count: usize) -> (f64, Vec<String>) {
    let hits: Vec<&(&str, f64)> = AI_PHRASES.iter().filter(|(p, _)| lower.contains(p)).collect();
    if hits.is_empty() {
        return (0.0, Vec::new());
    }

    let weight: f64 = hits.iter().map(|(_, w)| w).sum();
    let per_hundred = word_count as f64 / 100.0;
    let score = if per_hundred > 0.0 { (weight / per_hundred).min(1.0) } else { 1.0 };

    (score, hits.iter().map(|(p, _)| p.to_string()).collect())
}

fn word_length_variance(words: &[&str]) -> f64 {
    if words.len() < 10 {
        return 0.5;
    }

    let lengths: Vec<f64> = words.iter().map(|w| w.len() as f64).collect();
    let cv = coefficient_of_variation(&lengths);
    1.0 - (cv / 0.6).min(1.0)
}

/// Few contractions score high
fn contractions_usage(lower: &str, word_count: usize) -> f64 {
    if word_count < 20 {
        return 0.5;
    }

    let count: usize = CONTRACTIONS.iter().map(|c| lower.matches(c).count()).sum();
    let rate = count as f64 / (word_count as f64 / 100.0);
    1.0 - (rate / 3.0).min(1.0)
}

/// Sentences that open with the same two words
fn repetition(sentences: &[&str]) -> f64 {
    if sentences.len() < 3 {
        return 0.5;
    }

    let mut starts: BTreeMap<String, usize> = BTreeMap::new();
    for s in sentences {
        let words = tokenize(s);
        if words.len() >= 2 {
            *starts.entry(format!("{} {}", words[0], words[1]).to_lowercase()).or_default() += 1;
        }
    }

    let repeats: usize = starts.values().map(|c| c - 1).sum();
    (repeats as f64 / sentences.len() as f64 * 2.0).min(1.0)
}

fn stats(text: &str, words: &[&str], sentences: &[&str]) -> TextStats {
    let mut s = TextStats {
        char_count: text.chars().count(),
        word_count: words.len(),
        sentence_count: sentences.len(),
        punctuation_count: text.chars().filter(|&c| is_punct(c)).count(),
        ..Default::default()
    };

    if s.sentence_count > 0 {
        let total: usize = sentences.iter().map(|x| tokenize(x).len()).sum();
        s.avg_sentence_length = total as f64 / s.sentence_count as f64;
    }

    if s.word_count > 0 {
        let letters: usize = words.iter().map(|w| w.len()).sum();
        s.avg_word_length = letters as f64 / s.word_count as f64;

        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
        s.unique_words = unique.len();
        s.unique_ratio = s.unique_words as f64 / s.word_count as f64;
    }

    s
}
