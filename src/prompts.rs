use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DOCUMENT_DEFAULT: &str = include_str!("../data/prompts/document_default.txt");
pub const DOCUMENT_USER: &str = include_str!("../data/prompts/document_user.txt");
pub const IMAGE_DEFAULT: &str = include_str!("../data/prompts/image_default.txt");
pub const AUDIO_DEFAULT: &str = include_str!("../data/prompts/audio_default.txt");

/// Marker appended to documents cut at the extraction cap.
pub const TRUNCATION_MARKER: &str = "\n\n[... document truncated ...]";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is a single pass over the template, so placeholder-like text
/// inside a substituted value is left untouched. Unknown keys stay as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// The user's prompt as typed, or `default` when it is missing or blank.
pub fn or_default<'a>(prompt: Option<&'a str>, default: &'a str) -> &'a str {
    prompt.filter(|p| !p.trim().is_empty()).unwrap_or(default)
}

/// Prompt sent for a document upload: instruction first, document text after.
pub fn document(prompt: Option<&str>, text: &str) -> String {
    render(
        DOCUMENT_USER,
        &[
            ("prompt", or_default(prompt, DOCUMENT_DEFAULT)),
            ("document", text),
        ],
    )
}
