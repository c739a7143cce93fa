use crate::chart::{DerivedEntry, Movement, PLACEHOLDER};

/// "hip-hop" -> "Hip Hop"
pub fn titleize(key: &str) -> String {
    key.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Move column text: `▲ 3`, `▼ 2`, `NEW`, or the placeholder for no change.
pub fn format_movement(entry: &DerivedEntry) -> String {
    match entry.movement() {
        Movement::New => "NEW".to_string(),
        Movement::Up(n) => format!("▲ {n}"),
        Movement::Down(n) => format!("▼ {n}"),
        Movement::Steady => PLACEHOLDER.to_string(),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
