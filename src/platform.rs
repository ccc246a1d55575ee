//! Display names for distributor codes.
//!
//! Known codes map through a fixed table. Anything else drops its domain
//! suffix and is title-cased. `display_name` is total and idempotent.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const DOMAIN_SUFFIXES: [&str; 4] = [".COM", ".NET", ".ORG", ".IO"];

/// Bare upper-case code (suffix removed) to canonical display name.
static KNOWN_PLATFORMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("FACEBOOK", "Facebook"),
        ("INSTAGRAM", "Instagram"),
        ("TIKTOK", "TikTok"),
        ("X", "X (Twitter)"),
        ("TWITTER", "X (Twitter)"),
        ("PINTEREST", "Pinterest"),
        ("REDDIT", "Reddit"),
        ("SNAPCHAT", "Snapchat"),
        ("YOUTUBE", "YouTube"),
        ("LINKEDIN", "LinkedIn"),
        ("FB", "Facebook"),
        ("IG", "Instagram"),
    ])
});

pub fn display_name(code: &str) -> String {
    let code = code.trim();
    if KNOWN_PLATFORMS.values().any(|name| *name == code) {
        return code.to_string();
    }
    let bare = strip_domain_suffixes(code);
    if let Some(name) = KNOWN_PLATFORMS.get(bare.to_ascii_uppercase().as_str()) {
        return (*name).to_string();
    }
    if bare.is_empty() {
        return "Unknown".to_string();
    }
    title_case(bare)
}

fn strip_domain_suffixes(code: &str) -> &str {
    let mut rest = code;
    'outer: loop {
        for suffix in DOMAIN_SUFFIXES {
            let cut = rest.len().saturating_sub(suffix.len());
            if rest.len() > suffix.len()
                && rest.is_char_boundary(cut)
                && rest[cut..].eq_ignore_ascii_case(suffix)
            {
                rest = &rest[..cut];
                continue 'outer;
            }
        }
        return rest;
    }
}

/// Lower-case each word, then upper-case its first char. A first char whose
/// upper case is several chars (`ß` -> `SS`) stays lower-case, otherwise a
/// second pass would see a different word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            let Some(first) = chars.next() else {
                return String::new();
            };
            let mut upper = first.to_uppercase();
            let head = match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => first,
            };
            std::iter::once(head).chain(chars).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_canonical_names() {
        assert_eq!(display_name("FACEBOOK.COM"), "Facebook");
        assert_eq!(display_name("INSTAGRAM.COM"), "Instagram");
        assert_eq!(display_name("TIKTOK"), "TikTok");
        assert_eq!(display_name("TIKTOK.COM"), "TikTok");
        assert_eq!(display_name("X.COM"), "X (Twitter)");
        assert_eq!(display_name("reddit"), "Reddit");
    }

    #[test]
    fn unknown_codes_fall_back_to_cleanup() {
        assert_eq!(display_name("NEXTDOOR.COM"), "Nextdoor");
        assert_eq!(display_name("some network.net"), "Some Network");
        assert_eq!(display_name("WEIRD.COM.COM"), "Weird");
        assert_eq!(display_name(""), "Unknown");
        assert_eq!(display_name(".COM"), ".com");
        assert_eq!(display_name("ßETA.COM"), "ßeta");
        assert_eq!(display_name("ÉLAN.IO"), "Élan");
    }

    #[test]
    fn normalising_is_idempotent() {
        for code in [
            "FACEBOOK.COM",
            "X.COM",
            "TIKTOK",
            "NEXTDOOR.COM",
            "some network.net",
            "WEIRD.COM.COM",
            "",
            ".COM",
            "ÉLAN.IO",
            "ßETA.COM",
            "ſETA",
            "İSTANBUL ADS",
            "ǆUNGLA",
        ] {
            let once = display_name(code);
            assert_eq!(display_name(&once), once, "{code}");
        }
    }
}
