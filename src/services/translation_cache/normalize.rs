use std::sync::OnceLock;

use regex::Regex;

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]").expect("static pattern"))
}

/// Cache key for `text`: every character outside `[A-Za-z0-9]` becomes `.`.
///
/// Texts differing only in punctuation, whitespace or non-ASCII letters share
/// a key. The empty string maps to the empty key, which callers treat as
/// "do not cache".
pub fn normalize(text: &str) -> String {
    non_alnum().replace_all(text, ".").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_spaces_become_dots() {
        assert_eq!(normalize("Hello World!"), "Hello.World.");
        assert_eq!(normalize("a-b_c d"), "a.b.c.d");
    }

    #[test]
    fn case_and_digits_survive() {
        assert_eq!(normalize("Route66"), "Route66");
    }

    #[test]
    fn one_dot_per_character() {
        assert_eq!(normalize("café"), "caf.");
        assert_eq!(normalize("日本語"), "...");
        assert_eq!(normalize("!!!"), "...");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn idempotent() {
        for t in ["", "Hello World!", "  tabs\tand\nnewlines ", "ünïcödé", "..", "x.y"] {
            let once = normalize(t);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn colliding_sources_share_a_key() {
        assert_eq!(normalize("Hello, World"), normalize("Hello! World"));
    }
}
