//! Emotional state — a fixed set of affect dimensions with intensities.
//!
//! The dimension set never grows or shrinks at runtime; updates only move
//! intensities within `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Intensities at or below this are left out of the rendered summary.
pub const SUMMARY_THRESHOLD: f32 = 0.1;

/// One affect dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happiness,
    Sadness,
    Anger,
    Excitement,
    Curiosity,
}

impl Emotion {
    /// All dimensions, in summary order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Happiness,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Excitement,
        Emotion::Curiosity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happiness => "happiness",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Excitement => "excitement",
            Emotion::Curiosity => "curiosity",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn default_intensity(self) -> f32 {
        match self {
            Emotion::Happiness => 0.5,
            Emotion::Sadness => 0.1,
            Emotion::Anger => 0.1,
            Emotion::Excitement => 0.3,
            Emotion::Curiosity => 0.4,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name is not one of the fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEmotion(pub String);

impl fmt::Display for UnknownEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown emotion dimension: {}", self.0)
    }
}

impl std::error::Error for UnknownEmotion {}

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    /// Exact, case-sensitive match on the lowercase dimension name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Intensity per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionalState {
    intensities: [f32; Emotion::ALL.len()],
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self {
            intensities: Emotion::ALL.map(Emotion::default_intensity),
        }
    }
}

impl EmotionalState {
    pub fn get(&self, emotion: Emotion) -> f32 {
        self.intensities[emotion.index()]
    }

    /// Store `value` clamped to `[0, 1]`. NaN leaves the dimension unchanged.
    pub fn set(&mut self, emotion: Emotion, value: f32) {
        if value.is_nan() {
            return;
        }
        self.intensities[emotion.index()] = value.clamp(0.0, 1.0);
    }

    /// Update a dimension by name. Unknown names are ignored.
    ///
    /// Returns whether a dimension was recognized.
    pub fn update(&mut self, dimension: &str, value: f32) -> bool {
        match dimension.parse::<Emotion>() {
            Ok(emotion) => {
                self.set(emotion, value);
                true
            }
            Err(_) => false,
        }
    }

    /// `(dimension, intensity)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.into_iter().map(|e| (e, self.get(e)))
    }

    /// `happiness: 0.50, curiosity: 0.40` — only dimensions above the threshold.
    pub fn summary(&self) -> String {
        self.iter()
            .filter(|(_, v)| *v > SUMMARY_THRESHOLD)
            .map(|(e, v)| format!("{e}: {v:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
