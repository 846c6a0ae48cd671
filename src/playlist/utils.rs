use chrono::{DateTime, Local};
use rand::seq::SliceRandom;

const NAME_SUFFIXES: [&str; 6] = ["vibes", "mix", "tunes", "jams", "grooves", "sounds"];
const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 300;

/// Helper trait for string formatting
pub trait ToTitleCase {
    fn to_title_case(&self) -> String;
}

impl ToTitleCase for str {
    fn to_title_case(&self) -> String {
        self.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Playlist naming utilities
pub struct PlaylistNaming;

impl PlaylistNaming {
    /// Title-cased mood plus a random suffix, e.g. "Rainy Day Grooves"
    pub fn generate_playlist_name(mood: &str) -> String {
        let mood = mood.trim();
        let mood = if mood.is_empty() { "chill" } else { mood };

        let mut rng = rand::thread_rng();
        let suffix = NAME_SUFFIXES.choose(&mut rng).copied().unwrap_or("mix");

        truncate_chars(&format!("{} {}", mood.to_title_case(), suffix.to_title_case()), MAX_NAME_LEN)
    }

    /// Description recording the original request and when it was generated
    pub fn generate_description(request: &str, generated_at: DateTime<Local>) -> String {
        let request = request.split_whitespace().collect::<Vec<_>>().join(" ");
        truncate_chars(
            &format!(
                "Generated {} from: \"{}\"",
                generated_at.format("%Y-%m-%d"),
                request
            ),
            MAX_DESCRIPTION_LEN,
        )
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
