//! Small case-conversion helpers for pack names and publisher display names.

fn split_words(content: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(content.len() + 4);
    let mut prev_lower = false;
    for ch in content.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            spaced.push(' ');
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        spaced.push(ch);
    }
    spaced
        .split([' ', '_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Convert a free-form name to kebab case, e.g. `"My ToolBox"` -> `"my-tool-box"`.
pub fn kebab_case(content: &str) -> String {
    split_words(content)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Convert a free-form name to start case, e.g. `"extension-pack"` -> `"Extension Pack"`.
pub fn start_case(content: &str) -> String {
    split_words(content)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
