//! Code normalization and glob matching.
//!
//! Both functions are pure and never panic: unrecognized shapes pass
//! through after trim/upper/dash-collapse rather than erroring, so a
//! malformed location code becomes an `INVALID_LOCATION` anomaly downstream
//! instead of aborting the evaluation.

use regex::Regex;
use std::sync::OnceLock;

fn tenant_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(USER_[A-Z0-9]+_|WH_|DEFAULT_)").expect("valid regex"))
}

fn underscore_or_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[_\s]+").expect("valid regex"))
}

fn multi_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,}").expect("valid regex"))
}

fn structured_shape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})-([A-Z])-(\d{1,3})-?([A-Z])$").expect("valid regex"))
}

/// Canonicalize a raw location code.
///
/// `canonical(canonical(x)) == canonical(x)` for all `x`.
pub fn canonical(raw: &str) -> String {
    let trimmed = raw.trim().to_ascii_uppercase();

    // Tenant prefixes are generated with underscores (e.g. `WH_`, `USER_ABC1_`);
    // strip them before underscores elsewhere get collapsed into dashes, or
    // the prefix regex would never see them again.
    let stripped = tenant_prefix_re().replace(&trimmed, "").into_owned();

    let dashed = underscore_or_space_re().replace_all(&stripped, "-");
    let collapsed = multi_dash_re().replace_all(&dashed, "-");
    let collapsed = collapsed.trim_matches('-');

    if let Some(caps) = structured_shape_re().captures(collapsed) {
        let aisle: u32 = caps[1].parse().unwrap_or(0);
        let rack = &caps[2];
        let position: u32 = caps[3].parse().unwrap_or(0);
        let level = &caps[4];
        return format!("{:02}-{}-{:03}-{}", aisle, rack, position, level);
    }

    collapsed.to_string()
}

/// A canonical code decoded into its storage-structure dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCode {
    pub aisle: u32,
    pub rack: String,
    pub position: u32,
    pub level: String,
}

/// Decode a canonicalized code matching the `AA-R-PPP-L` storage shape.
/// Consumed by INVALID_LOCATION's "impossible" check and
/// LOCATION_MAPPING_ERROR. Codes of any other shape decode to `None`.
pub fn decode_structured(canonical_code: &str) -> Option<StructuredCode> {
    let caps = structured_shape_re().captures(canonical_code)?;
    Some(StructuredCode {
        aisle: caps[1].parse().ok()?,
        rack: caps[2].to_string(),
        position: caps[3].parse().ok()?,
        level: caps[4].to_string(),
    })
}

/// Match `code` against a shell-style glob: `*` = any run (incl. empty),
/// `?` = exactly one char, `[...]` = a character class (supports `a-z`
/// ranges and a leading `!`/`^` for negation). The match is anchored —
/// the whole `code` must match, not a substring.
pub fn glob_match(pattern: &str, code: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = code.chars().collect();
    match_here(&pat, 0, &text, 0)
}

fn match_here(pat: &[char], pi: usize, text: &[char], ti: usize) -> bool {
    if pi == pat.len() {
        return ti == text.len();
    }

    match pat[pi] {
        '*' => {
            // Try consuming 0..=remaining chars of text for this '*'.
            for skip in 0..=(text.len() - ti) {
                if match_here(pat, pi + 1, text, ti + skip) {
                    return true;
                }
            }
            false
        },
        '?' => ti < text.len() && match_here(pat, pi + 1, text, ti + 1),
        '[' => {
            let Some(close) = pat[pi..].iter().position(|&c| c == ']').map(|p| p + pi) else {
                // Unterminated class: treat '[' as a literal.
                return ti < text.len() && text[ti] == '[' && match_here(pat, pi + 1, text, ti + 1);
            };
            if ti >= text.len() {
                return false;
            }
            let class_matches = char_class_matches(&pat[pi + 1..close], text[ti]);
            class_matches && match_here(pat, close + 1, text, ti + 1)
        },
        c => ti < text.len() && text[ti] == c && match_here(pat, pi + 1, text, ti + 1),
    }
}

fn char_class_matches(class: &[char], c: char) -> bool {
    let (negate, class) = match class.first() {
        Some('!') | Some('^') => (true, &class[1..]),
        _ => (false, class),
    };

    let mut matched = false;
    let mut i = 0;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == '-' {
            let (lo, hi) = (class[i], class[i + 2]);
            if lo <= c && c <= hi {
                matched = true;
            }
            i += 3;
        } else {
            if class[i] == c {
                matched = true;
            }
            i += 1;
        }
    }

    matched != negate
}
