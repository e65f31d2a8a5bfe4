//! Rule-based emotion classification
//!
//! This module maps free text to an (emotion, intensity) pair using a fixed
//! taxonomy of weighted phrases and single words. High-weight phrases score
//! 3, single words score 1; the category with the highest total wins.
//!
//! The taxonomy order is load-bearing: ties resolve to the earliest declared
//! category, so `Calm` (declared first) is the default for unmatched or
//! evenly matched text. Reordering the table changes observable output.

use serde::{Deserialize, Serialize};

/// One emotion category with its match tables
struct EmotionCategory {
    label: &'static str,
    /// Multi-word cues, weight 3
    phrases: &'static [&'static str],
    /// Single-word cues, weight 1
    words: &'static [&'static str],
}

/// Fixed taxonomy, evaluated in declaration order
static TAXONOMY: &[EmotionCategory] = &[
    EmotionCategory {
        label: "Calm",
        phrases: &["at peace", "feeling calm", "nice and relaxed"],
        words: &[
            "calm", "relaxed", "peaceful", "serene", "content", "settled", "fine", "okay",
        ],
    },
    EmotionCategory {
        label: "Happy",
        phrases: &["can't wait", "over the moon", "really happy", "best day"],
        words: &[
            "happy", "joy", "glad", "great", "excited", "grateful", "amazing", "wonderful",
            "love",
        ],
    },
    EmotionCategory {
        label: "Sad",
        phrases: &["feel like crying", "down in the dumps", "really sad"],
        words: &[
            "sad", "cry", "crying", "lonely", "empty", "hopeless", "miserable", "grief", "down",
        ],
    },
    EmotionCategory {
        label: "Anxious",
        phrases: &["on edge", "panic attack", "can't stop worrying"],
        words: &[
            "anxious", "nervous", "worried", "worry", "afraid", "scared", "panic", "uneasy",
            "dread",
        ],
    },
    EmotionCategory {
        label: "Angry",
        phrases: &["fed up", "sick of", "so angry"],
        words: &[
            "angry", "mad", "furious", "annoyed", "irritated", "rage", "frustrated", "resentful",
        ],
    },
    EmotionCategory {
        label: "Stressed",
        phrases: &["too much to do", "under pressure", "burned out"],
        words: &[
            "stressed", "stress", "overwhelmed", "pressure", "deadline", "swamped", "overloaded",
        ],
    },
    EmotionCategory {
        label: "Tired",
        phrases: &["can't sleep", "no energy", "barely slept"],
        words: &[
            "tired", "sleepy", "fatigued", "drained", "exhausted", "weary", "insomnia",
        ],
    },
];

/// Classifier output: a Title-Case emotion label and a 0-10 intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub emotion: String,
    pub intensity: f64,
}

/// Emotion classifier over the fixed taxonomy
pub struct EmotionClassifier;

impl EmotionClassifier {
    /// Classify free text into an emotion and intensity. Pure function.
    ///
    /// Zero matches return the first taxonomy category at minimum
    /// intensity 3; intensity saturates at 10.
    pub fn classify(text: &str) -> Classification {
        let lowered = text.to_lowercase();

        let mut best_index = 0;
        let mut best_score = 0u32;
        for (index, category) in TAXONOMY.iter().enumerate() {
            let score = category_score(category, &lowered);
            // Strictly-greater keeps the earliest category on ties
            if score > best_score {
                best_score = score;
                best_index = index;
            }
        }

        Classification {
            emotion: TAXONOMY[best_index].label.to_string(),
            intensity: intensity_for(best_score),
        }
    }

    /// Position of a Title-Case label in the taxonomy, for deterministic
    /// tie-breaking in aggregates. Labels outside the taxonomy sort last.
    pub fn taxonomy_rank(label: &str) -> usize {
        TAXONOMY
            .iter()
            .position(|c| c.label == label)
            .unwrap_or(usize::MAX)
    }
}

/// Sum matched weights for one category over lower-cased text
fn category_score(category: &EmotionCategory, lowered: &str) -> u32 {
    let mut score = 0;
    for phrase in category.phrases {
        if lowered.contains(phrase) {
            score += 3;
        }
    }
    for word in category.words {
        if lowered.contains(word) {
            score += 1;
        }
    }
    score
}

/// Map a match score to intensity: `clamp(ceil(score * 1.5) + 3, 3, 10)`
fn intensity_for(score: u32) -> f64 {
    ((score as f64 * 1.5).ceil() + 3.0).clamp(3.0, 10.0)
}
