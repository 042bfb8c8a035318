//! Index name normalization
//!
//! Indices may be declared with a date-math or rollover expression such as
//! `<logs-{now/d}-000001>`. The cluster resolves those at creation time, so a
//! later existence probe on the literal expression can miss a differently
//! dated member of the same family. Probes therefore go through
//! [`normalize`], which turns the expression into a wildcard pattern
//! (`logs-*-*`). Creation always uses the literal expression.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// `<interior>` markers of a date-math expression
fn angle_markers() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([^<>]*)>").expect("valid angle marker regex"))
}

/// Six digit rollover counter at the very end of the name
fn rollover_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-[0-9]{6}$").expect("valid rollover suffix regex"))
}

/// Percent-decode a name, keeping it as-is when the result is not UTF-8
pub fn decode(name: &str) -> Cow<'_, str> {
    urlencoding::decode(name).unwrap_or(Cow::Borrowed(name))
}

/// Percent-decode until nothing is left to decode
///
/// Names stored in a resource tree may have been encoded more than once.
pub fn decode_fully(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let next = decode(&current).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Turn an index specification into the wildcard pattern used for existence checks
///
/// Steps, in order: percent-decode (repeatedly), replace each `{...}` date-math token
/// (nested braces included) with `*`, strip the `<...>` markers, replace a
/// trailing `-NNNNNN` rollover counter with `-*`.
///
/// Unbalanced `<>` or `{}` fail closed: the decoded literal is returned
/// without any wildcard.
pub fn normalize(expr: &str) -> String {
    let decoded = decode_fully(expr);

    if !is_balanced(&decoded, '{', '}') || !is_balanced(&decoded, '<', '>') {
        tracing::warn!(
            "Index name [{}] has unbalanced date-math markers, using it literally",
            expr
        );
        return decoded;
    }

    let mut stripped = replace_date_math(&decoded);
    loop {
        // Innermost markers first, until none are left
        let next = angle_markers().replace_all(&stripped, "$1").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }
    let normalized = rollover_suffix().replace(&stripped, "-*").into_owned();

    tracing::trace!("normalize({}) = [{}]", expr, normalized);
    normalized
}

/// Whether the specification uses date-math or rollover syntax at all
pub fn is_dynamic(expr: &str) -> bool {
    normalize(expr) != decode_fully(expr)
}

/// Encode a name as a single URL path segment
///
/// The name is decoded first so that names stored percent-encoded (directory
/// names cannot contain `/`) are not encoded twice. `*` and `,` stay literal
/// so wildcard patterns and index lists keep their meaning.
pub fn path_segment(name: &str) -> String {
    let decoded = decode(name);
    let mut encoded = String::with_capacity(decoded.len());
    let mut run = String::new();

    for c in decoded.chars() {
        if c == '*' || c == ',' {
            encoded.push_str(&urlencoding::encode(&run));
            run.clear();
            encoded.push(c);
        } else {
            run.push(c);
        }
    }
    encoded.push_str(&urlencoding::encode(&run));

    encoded
}

fn is_balanced(s: &str, open: char, close: char) -> bool {
    let mut depth = 0usize;
    for c in s.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return false;
            }
            depth -= 1;
        }
    }
    depth == 0
}

/// Replace every outermost `{...}` span with a single `*`
fn replace_date_math(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '{' => {
                if depth == 0 {
                    out.push('*');
                }
                depth += 1;
            }
            '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out
}
