//! Short human labels for long command lines.

use std::sync::OnceLock;

use regex::Regex;

/// Characters kept before the matched keyword.
const CONTEXT_BEFORE: usize = 20;
/// Characters kept after the matched keyword.
const CONTEXT_AFTER: usize = 30;
/// Maximum length of the fallback label.
const FALLBACK_MAX_CHARS: usize = 50;
/// Number of leading tokens used by the fallback label.
const FALLBACK_TOKENS: usize = 3;

/// Keyword groups, tried in order. The first group that matches anywhere in
/// the command line wins.
const KEYWORD_GROUPS: [&str; 4] = [
    // runtimes, bundlers and package managers
    r"(?i)\b(next|nuxt|vite|webpack|nodemon|ts-node|node|npm|yarn|pnpm|bun|deno)\b",
    // front-end frameworks
    r"(?i)\b(react|vue|angular|svelte|gatsby|remix|astro)\b",
    // server frameworks
    r"(?i)\b(express|fastify|koa|hapi|nest|strapi)\b",
    // generic verbs
    r"(?i)\b(dev|start|serve|watch|run)\b",
];

fn keyword_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        KEYWORD_GROUPS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Reduce a full command line to a short label.
///
/// On the first keyword match the label is the text from 20 characters
/// before the keyword to 30 characters after it, with whitespace runs
/// collapsed. Without a match it is the first three tokens, capped at 50
/// characters. Empty input gives an empty label.
pub fn extract_label(full_command: &str) -> String {
    if full_command.trim().is_empty() {
        return String::new();
    }

    for pattern in keyword_patterns() {
        if let Some(m) = pattern.find(full_command) {
            let window = context_window(full_command, m.start(), m.end());
            return collapse_whitespace(window);
        }
    }

    let head = full_command
        .split_whitespace()
        .take(FALLBACK_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");
    head.chars().take(FALLBACK_MAX_CHARS).collect()
}

/// Slice `text` from `CONTEXT_BEFORE` chars before `start` to
/// `CONTEXT_AFTER` chars after `end`, respecting char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_BEFORE - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_AFTER)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every path-like token with its last component.
///
/// `/usr/local/bin/node /srv/app/server.js` becomes `node server.js`.
/// Tokens ending in a separator are left alone.
pub fn shorten_paths(text: &str) -> String {
    text.split_whitespace()
        .map(|token| match token.rsplit_once(['/', '\\']) {
            Some((_, last)) if !last.is_empty() => last,
            _ => token,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_label(""), "");
        assert_eq!(extract_label("   "), "");
    }

    #[test]
    fn test_runtime_beats_generic_verb() {
        // "watch" is a generic verb but "node" is checked first.
        let label = extract_label("/usr/bin/node /app/server.js --watch");
        assert_eq!(label, "/usr/bin/node /app/server.js --watch");
        assert!(label.contains("node"));
    }

    #[test]
    fn test_window_is_bounded_around_match() {
        let cmd = format!(
            "{} vite --host 0.0.0.0 --port 5173 --strictPort --open false",
            "/very/long/prefix/path/that/goes/on/and/on"
        );
        let label = extract_label(&cmd);
        // 20 before + "vite" + 30 after
        assert_eq!(label.chars().count(), 54);
        assert!(label.contains("vite"));
        assert!(label.starts_with("that/goes"));
    }

    #[test]
    fn test_case_insensitive_match() {
        let label = extract_label("C:\\Program Files\\nodejs\\NODE.EXE C:\\app\\index.js");
        assert!(label.contains("NODE"));
    }

    #[test]
    fn test_framework_group() {
        let label = extract_label("/opt/ruby/bin/ruby /srv/app/bin/gatsby-cli build");
        assert!(label.contains("gatsby"));
    }

    #[test]
    fn test_generic_verb_fallback_group() {
        let label = extract_label("python3 manage.py runserver && make serve");
        assert!(label.contains("serve"));
    }

    #[test]
    fn test_whitespace_collapsed() {
        let label = extract_label("npm    run\t\tdev");
        assert_eq!(label, "npm run dev");
    }

    #[test]
    fn test_no_match_uses_first_three_tokens() {
        assert_eq!(
            extract_label("/usr/sbin/sshd -D -o ListenAddress=0.0.0.0"),
            "/usr/sbin/sshd -D -o"
        );
    }

    #[test]
    fn test_fallback_truncated_to_fifty_chars() {
        let long = format!("/{} -x -y", "a".repeat(80));
        let label = extract_label(&long);
        assert_eq!(label.chars().count(), 50);
    }

    #[test]
    fn test_shorten_paths() {
        assert_eq!(
            shorten_paths("/usr/local/bin/node /srv/app/server.js --port 3000"),
            "node server.js --port 3000"
        );
        assert_eq!(
            shorten_paths("C:\\Program Files\\nodejs\\node.exe index.js"),
            "Program node.exe index.js"
        );
        assert_eq!(shorten_paths("./dist/ serve"), "./dist/ serve");
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let label = extract_label("/home/ümlaut/ßerver/ñode/bin/node ./app.js — servé");
        assert!(label.contains("node"));
    }
}
