//! Compiled source patterns.
//!
//! A manifest pattern is split on `/` into tokens:
//!
//! ```text
//! Sounds/sub/*.wav   ->  [Literal("Sounds"), Literal("sub"), Glob("*.wav")]
//! Sounds/**          ->  [Literal("Sounds"), Recursive]
//! **/*.dll           ->  [Recursive, Glob("*.dll")]
//! ```
//!
//! Matching works on root-relative path segments and never touches the
//! filesystem, so the match and arcname rules can be tested in isolation.
//! Wildcard segments are compiled with `globset`, one matcher per segment.

pub mod arcname;

pub use arcname::arcname;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::PackError;

/// One segment-level token of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Token {
    /// Matches one segment exactly.
    Literal(String),
    /// Matches one segment; `*` is any run of characters, `?` exactly one.
    Glob(GlobMatcher),
    /// `**`: zero or more whole segments (one or more when trailing).
    Recursive,
}

impl Token {
    fn is_wildcard(&self) -> bool {
        !matches!(self, Token::Literal(_))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Literal(a), Token::Literal(b)) => a == b,
            (Token::Glob(a), Token::Glob(b)) => a.glob() == b.glob(),
            (Token::Recursive, Token::Recursive) => true,
            _ => false,
        }
    }
}

impl Eq for Token {}

/// A source pattern compiled into segment tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compile a `/`-separated pattern. Empty and `.` segments are dropped,
    /// so `./Debug//x.dll` and `/Debug/x.dll` are both `Debug/x.dll`.
    pub fn compile(text: &str) -> Result<Self, PackError> {
        let mut tokens: Vec<Token> = Vec::new();
        for segment in split_segments(text) {
            let token = if segment == "**" {
                // a/**/**/b is a/**/b
                if tokens.last() == Some(&Token::Recursive) {
                    continue;
                }
                Token::Recursive
            } else if has_glob_chars(segment) {
                Token::Glob(compile_segment(text, segment)?)
            } else {
                Token::Literal(segment.to_string())
            };
            tokens.push(token);
        }
        Ok(Self {
            text: text.to_string(),
            tokens,
        })
    }

    /// The pattern as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True if the pattern contains a `**` segment.
    pub fn is_recursive(&self) -> bool {
        self.tokens.contains(&Token::Recursive)
    }

    /// True if any segment is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.tokens.iter().any(Token::is_wildcard)
    }

    /// Number of segments the pattern spans when it has no `**`.
    pub fn fixed_depth(&self) -> Option<usize> {
        (!self.is_recursive()).then_some(self.tokens.len())
    }

    /// Number of segments before the first `**`.
    ///
    /// Each of them matches exactly one path segment, so stripping this many
    /// segments from a match yields the part covered by the wildcard.
    pub fn recursive_offset(&self) -> usize {
        self.tokens
            .iter()
            .position(|t| *t == Token::Recursive)
            .unwrap_or(self.tokens.len())
    }

    /// Leading literal segments: the deepest directory every match lives under.
    pub fn literal_prefix(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .map_while(|t| match t {
                Token::Literal(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Test a root-relative, `/`-separated path.
    pub fn matches(&self, rel_path: &str) -> bool {
        let segments: Vec<&str> = split_segments(rel_path).collect();
        self.matches_segments(&segments)
    }

    /// Test a path already split into segments.
    pub fn matches_segments(&self, segments: &[&str]) -> bool {
        !self.tokens.is_empty() && match_tokens(&self.tokens, segments)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split on `/`, dropping empty and `.` segments.
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

fn has_glob_chars(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// Build the matcher for one wildcard segment of `pattern`.
fn compile_segment(pattern: &str, segment: &str) -> Result<GlobMatcher, PackError> {
    GlobBuilder::new(&collapse_stars(segment))
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| PackError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Inside a segment `**` means the same as `*`.
fn collapse_stars(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

fn match_tokens(tokens: &[Token], segments: &[&str]) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return segments.is_empty();
    };
    match first {
        Token::Recursive if rest.is_empty() => !segments.is_empty(),
        Token::Recursive => (0..=segments.len()).any(|skip| match_tokens(rest, &segments[skip..])),
        Token::Literal(lit) => match segments.split_first() {
            Some((seg, tail)) => seg == lit && match_tokens(rest, tail),
            None => false,
        },
        Token::Glob(glob) => match segments.split_first() {
            Some((seg, tail)) => glob.is_match(*seg) && match_tokens(rest, tail),
            None => false,
        },
    }
}
