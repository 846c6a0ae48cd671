use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_MOOD: &str = "chill";
const DEFAULT_LEVEL: f64 = 0.5;

/// Coarse tempo bucket requested by the listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempoClass {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl TempoClass {
    /// Inclusive BPM band that counts as a tempo match
    pub fn bpm_range(self) -> (f64, f64) {
        match self {
            TempoClass::Slow => (0.0, 100.0),
            TempoClass::Medium => (90.0, 130.0),
            TempoClass::Fast => (120.0, 200.0),
        }
    }

    pub fn matches(self, bpm: f64) -> bool {
        let (low, high) = self.bpm_range();
        bpm >= low && bpm <= high
    }

    fn parse(raw: &str) -> Option<TempoClass> {
        match raw.trim().to_lowercase().as_str() {
            "slow" => Some(TempoClass::Slow),
            "medium" => Some(TempoClass::Medium),
            "fast" => Some(TempoClass::Fast),
            _ => None,
        }
    }
}

impl fmt::Display for TempoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TempoClass::Slow => "slow",
            TempoClass::Medium => "medium",
            TempoClass::Fast => "fast",
        };
        f.write_str(name)
    }
}

/// Structured interpretation of a free-text mood description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub mood: String,
    pub artist_names: Vec<String>,
    pub keywords_primary: Vec<String>, // English search terms
    pub keywords_native: Vec<String>,  // Terms in the request's own language, if not English
    pub energy: f64,
    pub valence: f64,
    pub tempo_class: TempoClass,
    pub genres: Vec<String>,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            mood: DEFAULT_MOOD.to_string(),
            artist_names: Vec::new(),
            keywords_primary: Vec::new(),
            keywords_native: Vec::new(),
            energy: DEFAULT_LEVEL,
            valence: DEFAULT_LEVEL,
            tempo_class: TempoClass::Medium,
            genres: Vec::new(),
        }
    }
}

/// Line labels the model is asked to answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mood,
    ArtistNames,
    KeywordsPrimary,
    KeywordsNative,
    Energy,
    Valence,
    Tempo,
    Genres,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Mood,
        Field::ArtistNames,
        Field::KeywordsPrimary,
        Field::KeywordsNative,
        Field::Energy,
        Field::Valence,
        Field::Tempo,
        Field::Genres,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Mood => "MOOD",
            Field::ArtistNames => "ARTIST_NAMES",
            Field::KeywordsPrimary => "KEYWORDS_EN",
            Field::KeywordsNative => "KEYWORDS_NATIVE",
            Field::Energy => "ENERGY",
            Field::Valence => "VALENCE",
            Field::Tempo => "TEMPO",
            Field::Genres => "GENRES",
        }
    }

    fn from_label(label: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(label))
    }
}

/// Raw field values as found in the reply, before defaults are applied
#[derive(Debug, Default, PartialEq)]
pub struct LabeledFields {
    pub mood: Option<String>,
    pub artist_names: Option<Vec<String>>,
    pub keywords_primary: Option<Vec<String>>,
    pub keywords_native: Option<Vec<String>>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo_class: Option<TempoClass>,
    pub genres: Option<Vec<String>>,
}

/// Parser for the `LABEL: value` reply format
pub struct PreferenceParser;

impl PreferenceParser {
    /// Interpret a model reply. Never fails: anything missing or malformed takes its default.
    pub fn parse(reply: &str) -> PreferenceRecord {
        Self::scan(reply).resolve()
    }

    /// Collect the first usable value for each label, one line at a time
    pub fn scan(reply: &str) -> LabeledFields {
        let mut fields = LabeledFields::default();

        for line in reply.lines() {
            let Some((field, value)) = Self::split_line(line) else {
                continue;
            };

            match field {
                Field::Mood => {
                    let mood = clean_item(value);
                    if fields.mood.is_none() && !mood.is_empty() {
                        fields.mood = Some(mood.to_string());
                    }
                }
                Field::ArtistNames => set_once(&mut fields.artist_names, Some(parse_list(value))),
                Field::KeywordsPrimary => {
                    set_once(&mut fields.keywords_primary, Some(parse_list(value)))
                }
                Field::KeywordsNative => {
                    set_once(&mut fields.keywords_native, Some(parse_list(value)))
                }
                Field::Energy => set_once(&mut fields.energy, parse_level(value)),
                Field::Valence => set_once(&mut fields.valence, parse_level(value)),
                Field::Tempo => set_once(&mut fields.tempo_class, TempoClass::parse(value)),
                Field::Genres => set_once(&mut fields.genres, Some(parse_list(value))),
            }
        }

        fields
    }

    /// Split `LABEL: value`, ignoring markdown decoration around the label
    fn split_line(line: &str) -> Option<(Field, &str)> {
        let (label, value) = line.split_once(':')?;
        let label = label.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '#' | '>'));
        let field = Field::from_label(label)?;
        Some((field, value.trim().trim_start_matches('*').trim()))
    }
}

impl LabeledFields {
    /// Fill every absent field with its default
    pub fn resolve(self) -> PreferenceRecord {
        let defaults = PreferenceRecord::default();

        PreferenceRecord {
            mood: self.mood.unwrap_or(defaults.mood),
            artist_names: self.artist_names.unwrap_or_default(),
            keywords_primary: self.keywords_primary.unwrap_or_default(),
            keywords_native: self.keywords_native.unwrap_or_default(),
            energy: self.energy.unwrap_or(defaults.energy),
            valence: self.valence.unwrap_or(defaults.valence),
            tempo_class: self.tempo_class.unwrap_or(defaults.tempo_class),
            genres: self.genres.unwrap_or_default(),
        }
    }
}

/// Keep the first value seen for a field
fn set_once<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Comma-separated list; a bare `none` means an empty list
fn parse_list(value: &str) -> Vec<String> {
    let value = clean_item(value);
    if value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    value
        .split(',')
        .map(clean_item)
        .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case("none"))
        .map(str::to_string)
        .collect()
}

/// A 0..1 level; non-numbers are rejected, out-of-range numbers are clamped
fn parse_level(value: &str) -> Option<f64> {
    let number = value
        .split_whitespace()
        .next()?
        .trim_end_matches([',', ';', '.'])
        .parse::<f64>()
        .ok()?;

    number.is_finite().then(|| number.clamp(0.0, 1.0))
}

fn clean_item(item: &str) -> &str {
    item.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*'))
        .trim()
}
