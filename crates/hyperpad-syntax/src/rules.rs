//! Token rule sets for HTML, CSS and JavaScript.
//!
//! ## Learning: Static Data, Compiled Once
//!
//! A rule set is pure data. The regexes are compiled the first time a
//! language is highlighted and shared afterwards through a
//! [`once_cell::sync::Lazy`], so concurrent passes read the same immutable
//! rules without any locking.
//!
//! Order inside a set matters: later rules paint over earlier ones.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use crate::language::Language;
use crate::theme::ColorRole;
use crate::words::{CSS_PROPERTIES, HTML_ATTRIBUTES, HTML_TAGS, JS_DATATYPES, word_pattern};
use crate::{SyntaxError, SyntaxResult};

const STRINGS: &str = r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#;
const HTML_COMMENTS: &str = r"/\**?\*/|<!--(?s:.*?)(?:-->|\z)";
const BLOCK_AND_LINE_COMMENTS: &str = r"/\*(?s:.*?)(?:\*/|\z)|//.*";
const CSS_UNITS: &str = r"(em|rem|px|pt|%)";
const JS_SYMBOLS: &str = r"(&|=|throw|new|for|if|else|>|<|^|\+|-|\s\|\s|break|try|catch|do|!|finally|default|case|switch|native|let|super|throws|return)";
const JS_CALLS: &str = r"n\((.*?)\)";
const NUMBERS: &str = r"\b(\d*[.]?\d+)\b";
const BOOLEANS: &str = r"\b(true|false)\b";

static HTML_RULES: Lazy<SyntaxResult<Vec<TokenRule>>> = Lazy::new(html_rules);
static CSS_RULES: Lazy<SyntaxResult<Vec<TokenRule>>> = Lazy::new(css_rules);
static JS_RULES: Lazy<SyntaxResult<Vec<TokenRule>>> = Lazy::new(js_rules);

/// Returns the ordered rule set for a language.
pub fn rules_for(language: Language) -> SyntaxResult<&'static [TokenRule]> {
    let rules = match language {
        Language::Html => &*HTML_RULES,
        Language::Css => &*CSS_RULES,
        Language::Js => &*JS_RULES,
    };
    rules.as_deref().map_err(|err| err.clone())
}

/// How a rule finds the spans it paints.
#[derive(Debug)]
pub enum Matcher {
    /// Every non-overlapping regex match, shrunk by `inset` bytes at each end.
    Pattern { regex: Regex, inset: (usize, usize) },
    /// From just after each `open` up to the next `close`.
    ///
    /// An `open` with no `close` after it paints nothing.
    Span { open: char, close: char },
    /// Every occurrence of a literal string.
    Literal(&'static str),
}

/// A check on the characters around a match.
///
/// A neighbour outside the text always fails the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The character before the match is one of these.
    PrecededBy(&'static [char]),
    /// The character after the match is this one.
    FollowedBy(char),
    /// Both neighbours match.
    Between { before: char, after: char },
}

impl Guard {
    /// Evaluates the guard for the byte range `start..end` of `text`.
    pub fn allows(&self, text: &str, start: usize, end: usize) -> bool {
        let before = || text.get(..start).and_then(|head| head.chars().next_back());
        let after = || text.get(end..).and_then(|tail| tail.chars().next());

        match *self {
            Guard::PrecededBy(set) => before().is_some_and(|c| set.contains(&c)),
            Guard::FollowedBy(expected) => after() == Some(expected),
            Guard::Between {
                before: b,
                after: a,
            } => before() == Some(b) && after() == Some(a),
        }
    }
}

/// A named highlighting rule.
#[derive(Debug)]
pub struct TokenRule {
    /// Name for logging
    pub name: &'static str,
    pub matcher: Matcher,
    /// Role painted on matched spans
    pub role: ColorRole,
    pub guard: Option<Guard>,
}

impl TokenRule {
    /// Creates a regex rule.
    pub fn pattern(name: &'static str, pattern: &str, role: ColorRole) -> SyntaxResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|source| SyntaxError::InvalidPattern { rule: name, source })?;
        Ok(Self {
            name,
            matcher: Matcher::Pattern {
                regex,
                inset: (0, 0),
            },
            role,
            guard: None,
        })
    }

    /// Creates a literal-scan rule painting from each `open` to the next `close`.
    pub fn span(name: &'static str, open: char, close: char, role: ColorRole) -> Self {
        Self {
            name,
            matcher: Matcher::Span { open, close },
            role,
            guard: None,
        }
    }

    /// Creates a rule painting every occurrence of `literal`.
    pub fn literal(name: &'static str, literal: &'static str, role: ColorRole) -> Self {
        Self {
            name,
            matcher: Matcher::Literal(literal),
            role,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Shrinks every regex match by `leading` and `trailing` bytes.
    pub fn with_inset(mut self, leading: usize, trailing: usize) -> Self {
        if let Matcher::Pattern { inset, .. } = &mut self.matcher {
            *inset = (leading, trailing);
        }
        self
    }

    /// Returns the byte ranges this rule paints in `text`.
    ///
    /// Empty ranges are never returned.
    pub fn matches(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges = match &self.matcher {
            Matcher::Pattern { regex, inset } => regex
                .find_iter(text)
                .filter(|m| {
                    self.guard
                        .is_none_or(|guard| guard.allows(text, m.start(), m.end()))
                })
                .map(|m| (m.start() + inset.0)..m.end().saturating_sub(inset.1))
                .collect::<Vec<_>>(),
            Matcher::Span { open, close } => span_ranges(text, *open, *close),
            Matcher::Literal(literal) => text
                .match_indices(literal)
                .map(|(idx, found)| idx..idx + found.len())
                .collect(),
        };
        ranges.retain(|range| range.start < range.end);
        ranges
    }
}

fn span_ranges(text: &str, open: char, close: char) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut next_close: Option<usize> = None;

    for (idx, _) in text.match_indices(open) {
        let from = idx + open.len_utf8();
        if next_close.is_none_or(|at| at < from) {
            match text[from..].find(close) {
                Some(offset) => next_close = Some(from + offset),
                // No later opener can find one either
                None => break,
            }
        }
        if let Some(to) = next_close {
            ranges.push(from..to);
        }
    }
    ranges
}

fn html_rules() -> SyntaxResult<Vec<TokenRule>> {
    Ok(vec![
        TokenRule::pattern("tags", &word_pattern(HTML_TAGS), ColorRole::Keyword)?
            .with_guard(Guard::PrecededBy(&['<', '/'])),
        TokenRule::pattern("attributes", &word_pattern(HTML_ATTRIBUTES), ColorRole::Builtin)?
            .with_guard(Guard::Between {
                before: ' ',
                after: '=',
            }),
        TokenRule::pattern("strings", STRINGS, ColorRole::Strings)?,
        TokenRule::pattern("comments", HTML_COMMENTS, ColorRole::Comment)?,
    ])
}

fn css_rules() -> SyntaxResult<Vec<TokenRule>> {
    Ok(vec![
        TokenRule::pattern("tags", &word_pattern(HTML_TAGS), ColorRole::Keyword)?,
        TokenRule::pattern("properties", &word_pattern(CSS_PROPERTIES), ColorRole::Params)?
            .with_guard(Guard::FollowedBy(':')),
        TokenRule::span("values", ':', ';', ColorRole::Ending),
        TokenRule::span("class-selectors", '.', '{', ColorRole::Builtin),
        TokenRule::span("id-selectors", '#', '{', ColorRole::Builtin),
        TokenRule::pattern("units", CSS_UNITS, ColorRole::Ending)?,
        TokenRule::pattern("strings", STRINGS, ColorRole::Strings)?,
        TokenRule::pattern("comments", BLOCK_AND_LINE_COMMENTS, ColorRole::Comment)?,
    ])
}

fn js_rules() -> SyntaxResult<Vec<TokenRule>> {
    Ok(vec![
        TokenRule::pattern("datatypes", &word_pattern(JS_DATATYPES), ColorRole::Params)?
            .with_guard(Guard::FollowedBy(' ')),
        TokenRule::pattern("calls", JS_CALLS, ColorRole::Functions)?.with_inset(2, 1),
        TokenRule::pattern("symbols", JS_SYMBOLS, ColorRole::Keyword)?,
        TokenRule::literal("null", "null", ColorRole::Ending),
        TokenRule::pattern("numbers", NUMBERS, ColorRole::Builtin)?,
        TokenRule::pattern("booleans", BOOLEANS, ColorRole::Builtin)?,
        TokenRule::pattern("strings", STRINGS, ColorRole::Strings)?,
        TokenRule::pattern("comments", BLOCK_AND_LINE_COMMENTS, ColorRole::Comment)?,
    ])
}
