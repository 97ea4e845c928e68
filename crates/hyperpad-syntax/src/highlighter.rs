//! The full-buffer highlighter.
//!
//! ## Learning: Fail-Soft Passes
//!
//! A highlight pass must never take the editor down with it. Each rule's
//! spans go through a [`Painter`] that validates them; the first invalid
//! span stops the pass, and a panic anywhere inside the rule loop is caught
//! with [`std::panic::catch_unwind`]. Either way the caller gets the
//! annotations painted so far and a `warn!` in the log.
//!
//! Regex offsets are bytes; everything leaving this module is in chars.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::language::Language;
use crate::rules::{TokenRule, rules_for};
use crate::theme::{Color, ColorRole, Theme};
use crate::{SyntaxError, SyntaxResult};

/// One painted span, as recorded by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Rule that painted it
    pub rule: &'static str,
    pub role: ColorRole,
    pub color: Color,
    /// Char range, half-open
    pub range: Range<usize>,
}

/// A flattened span: no two spans of a result overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub role: ColorRole,
    pub color: Color,
}

impl HighlightSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The complete coloring of one text snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightResult {
    layers: Vec<Annotation>,
    spans: Vec<HighlightSpan>,
    len_chars: usize,
}

impl HighlightResult {
    /// A result with nothing painted.
    pub fn empty(len_chars: usize) -> Self {
        Self {
            layers: Vec::new(),
            spans: Vec::new(),
            len_chars,
        }
    }

    fn from_layers(layers: Vec<Annotation>, len_chars: usize) -> Self {
        let spans = flatten(&layers, len_chars);
        Self {
            layers,
            spans,
            len_chars,
        }
    }

    /// Every annotation in the order it was painted.
    pub fn layers(&self) -> &[Annotation] {
        &self.layers
    }

    /// Non-overlapping spans sorted by offset. A char painted by several
    /// rules belongs to the last one.
    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Length in chars of the text this result describes.
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Returns the role painted at a char offset, if any.
    pub fn role_at(&self, offset: usize) -> Option<ColorRole> {
        let idx = self.spans.partition_point(|span| span.end <= offset);
        self.spans
            .get(idx)
            .filter(|span| span.start <= offset)
            .map(|span| span.role)
    }

    /// Keeps annotations attached to their text across an insertion.
    ///
    /// Annotations are exclusive at both ends: text inserted at a boundary
    /// stays uncolored, text inserted strictly inside takes the color.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        if len == 0 {
            return;
        }
        for annotation in &mut self.layers {
            let range = &mut annotation.range;
            if at <= range.start {
                range.start += len;
                range.end += len;
            } else if at < range.end {
                range.end += len;
            }
        }
        self.len_chars += len;
        self.spans = flatten(&self.layers, self.len_chars);
    }

    /// Keeps annotations attached to their text across a deletion.
    /// Annotations that become empty are dropped.
    pub fn shift_for_delete(&mut self, removed: Range<usize>) {
        if removed.is_empty() {
            return;
        }
        let width = removed.end - removed.start;
        let shift = |offset: usize| {
            if offset >= removed.end {
                offset - width
            } else if offset > removed.start {
                removed.start
            } else {
                offset
            }
        };
        for annotation in &mut self.layers {
            annotation.range = shift(annotation.range.start)..shift(annotation.range.end);
        }
        self.layers.retain(|annotation| !annotation.range.is_empty());
        self.len_chars = self.len_chars.saturating_sub(width);
        self.spans = flatten(&self.layers, self.len_chars);
    }
}

/// Highlights `text` with one language and theme.
#[derive(Debug, Clone)]
pub struct Highlighter {
    language: Language,
    theme: Theme,
}

impl Highlighter {
    pub fn new(language: Language, theme: Theme) -> Self {
        Self { language, theme }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swaps the palette. Existing results keep their old colors.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Runs a full pass over `text`.
    pub fn highlight(&self, text: &str) -> HighlightResult {
        highlight(text, self.language, &self.theme)
    }
}

/// Runs a full highlight pass. Never fails; see the module docs.
pub fn highlight(text: &str, language: Language, theme: &Theme) -> HighlightResult {
    if text.is_empty() {
        return HighlightResult::empty(0);
    }

    let mut painter = Painter::new(text, theme);
    let rules = match rules_for(language) {
        Ok(rules) => rules,
        Err(err) => {
            warn!(%language, error = %err, "rule set unavailable, text left uncolored");
            return painter.finish();
        }
    };

    paint_guarded(&mut painter, language, |painter| painter.paint_all(rules));

    let result = painter.finish();
    debug!(
        %language,
        annotations = result.layers.len(),
        spans = result.spans.len(),
        "highlight pass finished"
    );
    result
}

/// Runs `pass`, keeping whatever it painted before an error or a panic.
fn paint_guarded<'t, F>(painter: &mut Painter<'t>, language: Language, pass: F)
where
    F: FnOnce(&mut Painter<'t>) -> SyntaxResult<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| pass(painter))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(%language, error = %err, "highlight pass stopped early"),
        Err(_) => warn!(%language, "highlight rule panicked, pass stopped early"),
    }
}

/// Collects annotations for one pass and converts byte offsets to chars.
struct Painter<'t> {
    text: &'t str,
    theme: &'t Theme,
    /// Byte offset of every char start
    char_starts: Vec<usize>,
    layers: Vec<Annotation>,
}

impl<'t> Painter<'t> {
    fn new(text: &'t str, theme: &'t Theme) -> Self {
        Self {
            text,
            theme,
            char_starts: text.char_indices().map(|(idx, _)| idx).collect(),
            layers: Vec::new(),
        }
    }

    fn paint_all(&mut self, rules: &[TokenRule]) -> SyntaxResult<()> {
        for rule in rules {
            for range in rule.matches(self.text) {
                self.paint(rule, range)?;
            }
        }
        Ok(())
    }

    fn paint(&mut self, rule: &TokenRule, bytes: Range<usize>) -> SyntaxResult<()> {
        if bytes.start > bytes.end || bytes.end > self.text.len() {
            return Err(SyntaxError::RangeOutOfBounds {
                rule: rule.name,
                start: bytes.start,
                end: bytes.end,
                len: self.text.len(),
            });
        }
        let range = self.char_offset(bytes.start)..self.char_offset(bytes.end);
        if !range.is_empty() {
            self.layers.push(Annotation {
                rule: rule.name,
                role: rule.role,
                color: self.theme.color(rule.role),
                range,
            });
        }
        Ok(())
    }

    fn char_offset(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&start| start < byte)
    }

    fn finish(self) -> HighlightResult {
        HighlightResult::from_layers(self.layers, self.char_starts.len())
    }
}

/// Paints layers onto a per-char canvas and reads back the runs.
fn flatten(layers: &[Annotation], len_chars: usize) -> Vec<HighlightSpan> {
    let mut canvas: Vec<Option<usize>> = vec![None; len_chars];
    for (idx, annotation) in layers.iter().enumerate() {
        if let Some(cells) = canvas.get_mut(annotation.range.clone()) {
            cells.fill(Some(idx));
        }
    }

    let mut spans = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    for (offset, cell) in canvas.iter().copied().chain(std::iter::once(None)).enumerate() {
        match (run, cell) {
            (Some((layer, _)), Some(current)) if layer == current => {}
            _ => {
                if let Some((layer, start)) = run.take() {
                    let annotation = &layers[layer];
                    spans.push(HighlightSpan {
                        start,
                        end: offset,
                        role: annotation.role,
                        color: annotation.color,
                    });
                }
                run = cell.map(|layer| (layer, offset));
            }
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn css(text: &str) -> HighlightResult {
        highlight(text, Language::Css, &Theme::light())
    }

    #[test]
    fn test_html_pass() {
        let result = highlight("<p class=\"x\">hi</p>", Language::Html, &Theme::light());
        assert_eq!(result.role_at(1), Some(ColorRole::Keyword));
        assert_eq!(result.role_at(3), Some(ColorRole::Builtin));
        assert_eq!(result.role_at(9), Some(ColorRole::Strings));
        assert_eq!(result.role_at(13), None);
        assert_eq!(result.role_at(17), Some(ColorRole::Keyword));
    }

    #[test]
    fn test_attribute_at_offset_zero_is_not_painted() {
        let result = highlight("class=\"x\"", Language::Html, &Theme::light());
        assert_eq!(result.role_at(0), None);
        assert_eq!(result.role_at(6), Some(ColorRole::Strings));
    }

    #[test]
    fn test_html_comment_covers_every_line_until_closed() {
        let text = "<!-- <b>\n<i> -->\n<p>";
        let result = highlight(text, Language::Html, &Theme::light());
        assert_eq!(result.role_at(6), Some(ColorRole::Comment));
        assert_eq!(result.role_at(10), Some(ColorRole::Comment));
        assert_eq!(result.role_at(15), Some(ColorRole::Comment));
        assert_eq!(result.role_at(17), None);
        assert_eq!(result.role_at(18), Some(ColorRole::Keyword));
    }

    #[test]
    fn test_unterminated_css_value_is_skipped() {
        let result = css("color: red");
        assert_eq!(result.role_at(0), Some(ColorRole::Params));
        assert!(result.spans().iter().all(|span| span.role != ColorRole::Ending));
    }

    #[test]
    fn test_css_value_and_units() {
        let result = css("p { margin: 2px; }");
        // the value scan paints " 2px", then the unit rule repaints "px"
        assert_eq!(result.role_at(11), Some(ColorRole::Ending));
        assert_eq!(result.role_at(13), Some(ColorRole::Ending));
        assert_eq!(result.role_at(4), Some(ColorRole::Params));
    }

    #[test]
    fn test_js_pass() {
        let text = "function run(n) { return null; }";
        let result = highlight(text, Language::Js, &Theme::dark());
        assert_eq!(result.role_at(0), Some(ColorRole::Params));
        assert_eq!(result.role_at(text.find("return").unwrap()), Some(ColorRole::Keyword));
        assert_eq!(result.role_at(text.find("null").unwrap()), Some(ColorRole::Ending));
        assert_eq!(result.role_at(13), Some(ColorRole::Functions));
    }

    #[test]
    fn test_offsets_are_chars() {
        let result = highlight("é <b>", Language::Html, &Theme::light());
        assert_eq!(result.spans()[0].range(), 3..4);
        assert_eq!(result.len_chars(), 5);
    }

    #[test]
    fn test_colors_follow_theme() {
        let light = highlight("<b>", Language::Html, &Theme::light());
        let dark = highlight("/* x */", Language::Css, &Theme::dark());
        assert_eq!(light.spans()[0].color, Theme::light().syntax.keyword);
        assert_eq!(dark.spans()[0].color, Theme::dark().syntax.comment);
    }

    #[test]
    fn test_shift_for_insert_is_exclusive() {
        let mut result = highlight("<div>", Language::Html, &Theme::light());
        assert_eq!(result.spans()[0].range(), 1..4);

        result.shift_for_insert(4, 3);
        assert_eq!(result.spans()[0].range(), 1..4);

        result.shift_for_insert(2, 1);
        assert_eq!(result.spans()[0].range(), 1..5);

        result.shift_for_insert(1, 2);
        assert_eq!(result.spans()[0].range(), 3..7);
        assert_eq!(result.len_chars(), 11);
    }

    #[test]
    fn test_shift_for_delete() {
        let mut result = highlight("<div>", Language::Html, &Theme::light());
        result.shift_for_delete(0..2);
        assert_eq!(result.spans()[0].range(), 0..2);

        result.shift_for_delete(0..2);
        assert!(result.is_empty());
        assert!(result.spans().is_empty());
    }

    #[test]
    fn test_out_of_range_span_stops_pass_but_keeps_layers() {
        let text = "<b>x</b>";
        let theme = Theme::light();
        let tags = &rules_for(Language::Html).unwrap()[0];

        let mut painter = Painter::new(text, &theme);
        paint_guarded(&mut painter, Language::Html, |painter| {
            for range in tags.matches(text) {
                painter.paint(tags, range)?;
            }
            let err = painter.paint(tags, 5..99).unwrap_err();
            assert!(matches!(
                err,
                SyntaxError::RangeOutOfBounds { start: 5, end: 99, len: 8, .. }
            ));
            Err(err)
        });

        let result = painter.finish();
        assert_eq!(result.layers().len(), 2);
        assert_eq!(result.role_at(1), Some(ColorRole::Keyword));
        assert_eq!(result.role_at(6), Some(ColorRole::Keyword));
        assert_eq!(result.len_chars(), 8);
    }

    #[test]
    fn test_panicking_rule_yields_partial_result() {
        let text = "<b>x</b>";
        let theme = Theme::light();
        let tags = &rules_for(Language::Html).unwrap()[0];

        let mut painter = Painter::new(text, &theme);
        paint_guarded(&mut painter, Language::Html, |painter| {
            painter.paint(tags, 1..2)?;
            panic!("rule exploded");
        });

        let result = painter.finish();
        assert_eq!(result.spans().len(), 1);
        assert_eq!(result.spans()[0].range(), 1..2);
        assert_eq!(result.role_at(6), None);
    }

    #[test]
    fn test_highlighter_struct() {
        let mut highlighter = Highlighter::new(Language::Css, Theme::light());
        let before = highlighter.highlight("a { }");
        highlighter.set_theme(Theme::dark());
        let after = highlighter.highlight("a { }");
        assert_eq!(before.spans()[0].range(), after.spans()[0].range());
        assert_eq!(highlighter.language(), Language::Css);
    }

    fn any_language() -> impl Strategy<Value = Language> {
        prop_oneof![Just(Language::Html), Just(Language::Css), Just(Language::Js)]
    }

    proptest! {
        #[test]
        fn spans_are_sorted_and_disjoint(
            text in "[<>/a-z \"':;{}.#()=\n*!-]{0,80}",
            language in any_language(),
        ) {
            let result = highlight(&text, language, &Theme::light());
            let len = text.chars().count();
            for pair in result.spans().windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
            for span in result.spans() {
                prop_assert!(span.start < span.end && span.end <= len);
            }
        }

        #[test]
        fn highlight_is_idempotent(text in "\\PC{0,60}", language in any_language()) {
            let first = highlight(&text, language, &Theme::dark());
            let second = highlight(&text, language, &Theme::dark());
            prop_assert_eq!(first, second);
        }
    }
}
