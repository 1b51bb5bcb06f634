//! Pattern-based comment removal.
//!
//! This is a textual heuristic over `//`, `#` and `/* */` markers. It does not
//! know about string literals, nesting, or per-language exceptions.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

struct StripRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

// Applied in order: block, full-line, inline. CRLF mode keeps `\r` out of
// the comment tail so stripped lines keep their line endings.
static STRIP_RULES: Lazy<Vec<StripRule>> = Lazy::new(|| {
    vec![
        StripRule {
            name: "block",
            pattern: Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern"),
            replacement: "",
        },
        StripRule {
            name: "full-line",
            pattern: Regex::new(r"(?mR)^[ \t]*(?://|#).*$").expect("full-line comment pattern"),
            replacement: "",
        },
        StripRule {
            name: "inline",
            pattern: Regex::new(r#"(?mR)^(?P<code>[^"':\r\n]*?[^"':\s])[ \t]*(?://|#).*$"#)
                .expect("inline comment pattern"),
            replacement: "${code}",
        },
    ]
});

/// Returns `content` with comments removed when `strip` is set, otherwise
/// the input unchanged.
pub fn strip_comments(content: &str, strip: bool) -> Cow<'_, str> {
    if !strip {
        return Cow::Borrowed(content);
    }
    let mut current = Cow::Borrowed(content);
    for rule in STRIP_RULES.iter() {
        let next = match rule.pattern.replace_all(&current, rule.replacement) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(next) => next,
        };
        log::trace!("Comment rule '{}' modified content", rule.name);
        current = Cow::Owned(next);
    }
    current
}
