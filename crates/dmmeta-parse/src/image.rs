//! Preview image maximization.
//!
//! Mirrors the site's own `preview_src` normalization: thumbnails and
//! gallery images are served in several sizes and the large variant is
//! reachable by rewriting the file name.

use std::sync::LazyLock;

use regex::Regex;

/// How a matching rule rewrites the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace every regex match, `$n` expands to capture groups.
    Matches(&'static str),
    /// Replace every literal occurrence of `from` with `to`.
    Literal { from: &'static str, to: &'static str },
}

/// A single entry of the maximization table.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub name: &'static str,
    /// `None` matches every input.
    pub pattern: Option<&'static str>,
    pub rewrite: Rewrite,
}

/// Ordered maximization rules. First match wins, the last rule always matches.
pub static MAXIMIZE_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "size-suffix",
        pattern: Some(r"(p[a-z]\.)jpg"),
        rewrite: Rewrite::Matches("pl.jpg"),
    },
    RewriteRule {
        name: "consumer-game",
        pattern: Some(r"consumer_game"),
        rewrite: Rewrite::Literal { from: "js-", to: "-" },
    },
    RewriteRule {
        name: "js-serial",
        pattern: Some(r"js-(\d+)\.jpg$"),
        rewrite: Rewrite::Literal { from: "js-", to: "jp-" },
    },
    RewriteRule {
        name: "ts-serial",
        pattern: Some(r"ts-(\d+)\.jpg$"),
        rewrite: Rewrite::Literal { from: "ts-", to: "tl-" },
    },
    RewriteRule {
        name: "bare-serial",
        pattern: Some(r"(-\d+\.)jpg$"),
        rewrite: Rewrite::Matches("jp${1}jpg"),
    },
    RewriteRule {
        name: "hyphen",
        pattern: None,
        rewrite: Rewrite::Literal { from: "-", to: "jp-" },
    },
];

static COMPILED: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    MAXIMIZE_RULES
        .iter()
        .map(|rule| rule.pattern.map(|p| Regex::new(p).unwrap()))
        .collect()
});

/// Rewrite a preview image path to its largest available variant.
pub fn maximize(path: &str) -> String {
    for (rule, re) in MAXIMIZE_RULES.iter().zip(COMPILED.iter()) {
        match re {
            Some(re) if !re.is_match(path) => continue,
            _ => {}
        }
        return match (rule.rewrite, re) {
            (Rewrite::Matches(rep), Some(re)) => re.replace_all(path, rep).into_owned(),
            (Rewrite::Literal { from, to }, _) => path.replace(from, to),
            // Matches without a pattern has nothing to expand.
            (Rewrite::Matches(_), None) => path.to_string(),
        };
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_is_stable() {
        let names: Vec<_> = MAXIMIZE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "size-suffix",
                "consumer-game",
                "js-serial",
                "ts-serial",
                "bare-serial",
                "hyphen"
            ]
        );
    }

    #[test]
    fn only_last_rule_is_unconditional() {
        let (last, rest) = MAXIMIZE_RULES.split_last().unwrap();
        assert!(last.pattern.is_none());
        assert!(rest.iter().all(|r| r.pattern.is_some()));
    }

    #[test]
    fn all_patterns_compile() {
        assert_eq!(COMPILED.len(), MAXIMIZE_RULES.len());
    }

    #[test]
    fn small_package_to_large() {
        assert_eq!(
            maximize("https://pics.dmm.co.jp/digital/video/abc00123/abc00123ps.jpg"),
            "https://pics.dmm.co.jp/digital/video/abc00123/abc00123pl.jpg"
        );
        assert_eq!(maximize("abc00123pt.jpg"), "abc00123pl.jpg");
    }

    #[test]
    fn consumer_game_drops_js() {
        assert_eq!(
            maximize("https://pics.dmm.com/digital/consumer_game/xyz/xyzjs-001.jpg"),
            "https://pics.dmm.com/digital/consumer_game/xyz/xyz-001.jpg"
        );
    }

    #[test]
    fn js_serial() {
        assert_eq!(maximize("abc00123js-1.jpg"), "abc00123jp-1.jpg");
    }

    #[test]
    fn ts_serial() {
        assert_eq!(maximize("abc00123ts-12.jpg"), "abc00123tl-12.jpg");
    }

    #[test]
    fn bare_serial_inserts_jp() {
        assert_eq!(maximize("foo-123.jpg"), "foojp-123.jpg");
        assert_eq!(
            maximize("https://pics.dmm.co.jp/digital/video/abc00123/abc00123-1.jpg"),
            "https://pics.dmm.co.jp/digital/video/abc00123/abc00123jp-1.jpg"
        );
    }

    #[test]
    fn earlier_rule_wins_over_fallback() {
        assert_eq!(maximize("abc-ps.jpg"), "abc-pl.jpg");
        assert_eq!(maximize("abc-js-1.jpg"), "abc-jp-1.jpg");
    }

    #[test]
    fn fallback_hyphen() {
        assert_eq!(maximize("foo-bar.png"), "foojp-bar.png");
    }

    #[test]
    fn fallback_without_hyphen_is_identity() {
        assert_eq!(maximize("cover.png"), "cover.png");
        assert_eq!(maximize(""), "");
    }
}
