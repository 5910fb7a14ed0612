//! One-shot command handlers.

pub mod check;
pub mod kill;
pub mod list;

/// Shorten `s` to at most `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("node", 10), "node");
        assert_eq!(truncate("node server.js", 6), "node …");
        assert_eq!(truncate("ñññññ", 3), "ññ…");
    }
}
