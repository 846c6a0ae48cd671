// Instruction sent to the language model for every generation request.
//
// The reply contract is the line-labeled format read back by `PreferenceParser`.

use super::preferences::Field;

const INSTRUCTION_TEMPLATE: &str = r#"You are a music curator. A listener described the playlist they want:

"{description}"

Analyze the request and answer with EXACTLY these eight lines and nothing else:

{contract}

Rules:
- ARTIST_NAMES: up to 3 artists that fit the request, comma-separated, or "none". Keep each name in its original language and script (for example Hebrew artists in Hebrew letters).
- KEYWORDS_EN: 3-5 short English search phrases describing the mood or theme, comma-separated.
- KEYWORDS_NATIVE: if the request is not in English, up to 3 search phrases in the request's language, comma-separated; otherwise "none".
- ENERGY and VALENCE: a number between 0.0 and 1.0 (valence: 0.0 = sad, 1.0 = happy).
- TEMPO: one of slow, medium, fast.
- GENRES: up to 3 Spotify genre names in lowercase, comma-separated."#;

/// Build the instruction for one listener description
pub fn build_instruction(description: &str) -> String {
    let contract = Field::ALL
        .iter()
        .map(|field| format!("{}: {}", field.label(), placeholder(*field)))
        .collect::<Vec<_>>()
        .join("\n");

    // Quotes inside the description would end the quoted block early
    let description = description.trim().replace('"', "'");

    INSTRUCTION_TEMPLATE
        .replace("{contract}", &contract)
        .replace("{description}", &description)
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::Mood => "<one or two words>",
        Field::ArtistNames => "<artist 1, artist 2, ... or none>",
        Field::KeywordsPrimary => "<phrase 1, phrase 2, ...>",
        Field::KeywordsNative => "<phrase 1, phrase 2, ... or none>",
        Field::Energy => "<0.0-1.0>",
        Field::Valence => "<0.0-1.0>",
        Field::Tempo => "<slow|medium|fast>",
        Field::Genres => "<genre 1, genre 2, ...>",
    }
}
