use std::ffi::OsStr;

use globset::{GlobBuilder, GlobMatcher};

/// Always excluded, whatever the configuration says.
pub const VFS_RSRC_STREAMS: &str = ".vfs_rsrc_streams_*";

/// Compiled exclusion globs, matched against base names only.
///
/// Patterns follow `fnmatch(3)` rules, not globset's own dialect: `*` and `?`
/// also match a leading dot, backslash and braces are ordinary characters,
/// and a `[` without a closing `]` is a literal. Any string is a valid
/// pattern.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    matchers: Vec<GlobMatcher>,
    patterns: Vec<String>,
}

impl ExcludeSet {
    /// Compile `patterns` plus [`VFS_RSRC_STREAMS`].
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        patterns.push(VFS_RSRC_STREAMS.to_string());

        let matchers = patterns.iter().filter_map(|p| compile(p)).collect();
        Self { matchers, patterns }
    }

    pub fn is_excluded(&self, name: &OsStr) -> bool {
        self.matchers.iter().any(|m| m.is_match(name))
    }

    /// The patterns in effect, including the implicit one.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// `None` for patterns that can never match, like `[z-a]`.
fn compile(pattern: &str) -> Option<GlobMatcher> {
    let glob = translate(pattern)?;
    match build(&glob) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "exclusion pattern matched literally");
            let literal: String = pattern.chars().map(literal).collect();
            build(&literal).ok()
        }
    }
}

fn build(glob: &str) -> Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(glob)
        .backslash_escape(false)
        .build()
        .map(|g| g.compile_matcher())
}

/// Rewrite an `fnmatch` pattern into globset syntax.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Runs of stars mean the same as one
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
                out.push('*');
            }
            '?' => out.push('?'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i + 1..end])?;
                    i = end;
                }
                None => out.push_str(&literal('[')),
            },
            c => out.push_str(&literal(c)),
        }
        i += 1;
    }
    Some(out)
}

/// Index of the `]` closing the class opened at `open`, by `fnmatch` rules:
/// a `]` right after `[` or `[!` belongs to the class.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

#[derive(Clone, Copy, PartialEq)]
enum Member {
    Char(char),
    Range(char, char),
}

impl Member {
    fn first(self) -> char {
        match self {
            Member::Char(c) | Member::Range(c, _) => c,
        }
    }

    fn push_to(self, out: &mut String) {
        match self {
            Member::Char(c) => out.push(c),
            Member::Range(lo, hi) => {
                out.push(lo);
                out.push('-');
                out.push(hi);
            }
        }
    }
}

/// Append the class with member list `body`. `None` when the class is empty
/// and not negated, so nothing can match it.
fn push_class(out: &mut String, body: &[char]) -> Option<()> {
    let (negated, rest) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };
    let mut members = members(rest);

    if members.is_empty() {
        return if negated {
            out.push('?');
            Some(())
        } else {
            None
        };
    }

    // A lone `-` only stays literal at the end of a globset class
    if let Some(pos) = members.iter().position(|m| *m == Member::Char('-')) {
        let dash = members.remove(pos);
        members.push(dash);
    }

    if !negated {
        // A leading `^` or `!` would negate the class in globset
        match members.iter().position(|m| !matches!(m.first(), '^' | '!')) {
            Some(0) => {}
            Some(pos) => {
                let safe = members.remove(pos);
                members.insert(0, safe);
            }
            None => {
                push_alternation(out, &members);
                return Some(());
            }
        }
    }

    out.push('[');
    if negated {
        out.push('!');
    }
    for m in members {
        m.push_to(out);
    }
    out.push(']');
    Some(())
}

/// Split a class body into members. Reversed ranges match nothing and are
/// dropped.
fn members(body: &[char]) -> Vec<Member> {
    let mut members = Vec::with_capacity(body.len());
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            let (lo, hi) = (body[k], body[k + 2]);
            if lo <= hi {
                members.push(Member::Range(lo, hi));
            }
            k += 3;
        } else {
            members.push(Member::Char(body[k]));
            k += 1;
        }
    }
    members
}

/// Members that all start with `^` or `!`, written as `{^,!,[_-z]}`.
fn push_alternation(out: &mut String, members: &[Member]) {
    let mut arms = Vec::new();
    for m in members {
        match *m {
            Member::Char(c) => arms.push(c.to_string()),
            Member::Range(lo, hi) => {
                arms.push(lo.to_string());
                if let Some(next) = char::from_u32(lo as u32 + 1).filter(|&n| n <= hi) {
                    arms.push(format!("[{next}-{hi}]"));
                }
            }
        }
    }

    if arms.len() == 1 {
        out.push_str(&arms[0]);
    } else {
        out.push('{');
        out.push_str(&arms.join(","));
        out.push('}');
    }
}

/// Characters globset treats specially are wrapped in a one-member class.
fn literal(c: char) -> String {
    match c {
        '*' | '?' | '[' | ']' | '{' | '}' | ',' => format!("[{c}]"),
        c => c.to_string(),
    }
}
