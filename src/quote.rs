// src/quote.rs
//! Quote-markup rewriter.
//!
//! Feed mirrors embed a quoted post as
//! `<div class="rsshub-quote"><br><br>Name: text</div>`. The rewriter turns that
//! into `<blockquote><cite>Name</cite><br>text</blockquote>` through three ordered
//! step tables:
//!
//! 1. [`quote_steps`]: always applied, in order;
//! 2. [`repair_steps`]: applied only when the text contains `<blockquote>`;
//! 3. [`inner_steps`]: applied to the inner content of every
//!    `<blockquote>…</blockquote>` span (the last repair step).
//!
//! Each step sees the cumulative output of the previous ones. Re-running the
//! rewriter on its own output is a no-op.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const OPEN_TAG: &str = "<blockquote>";
pub const CLOSE_TAG: &str = "</blockquote>";

/// Opening quote characters stripped right after `<blockquote>`.
const OPENING_QUOTES: &str = r#"["“「]"#;

/// What a step does to its input.
pub enum StepAction {
    /// Regex substitution. `limit == 0` replaces every match.
    Replace {
        pattern: Regex,
        replacement: &'static str,
        limit: usize,
    },
    /// Structural edit that a single regex cannot express.
    Apply(fn(&str) -> String),
}

pub struct RewriteStep {
    pub name: &'static str,
    pub action: StepAction,
}

impl RewriteStep {
    fn replace(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self::replace_n(name, pattern, replacement, 0)
    }

    fn replace_n(name: &'static str, pattern: &str, replacement: &'static str, limit: usize) -> Self {
        Self {
            name,
            action: StepAction::Replace {
                pattern: Regex::new(pattern).expect("quote rewrite regex"),
                replacement,
                limit,
            },
        }
    }

    fn apply_fn(name: &'static str, f: fn(&str) -> String) -> Self {
        Self {
            name,
            action: StepAction::Apply(f),
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match &self.action {
            StepAction::Replace {
                pattern,
                replacement,
                limit,
            } => pattern.replacen(input, *limit, *replacement).into_owned(),
            StepAction::Apply(f) => f(input),
        }
    }
}

impl std::fmt::Debug for RewriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteStep").field("name", &self.name).finish()
    }
}

/// Run `steps` in order over `input`.
pub fn apply_steps(steps: &[RewriteStep], input: &str) -> String {
    steps
        .iter()
        .fold(input.to_string(), |acc, step| step.apply(&acc))
}

// `NAME:` right after the open tag. The character after the colon must not be
// `/`, so a leading `https://…` is never taken for a name.
const CITE_PATTERN: &str = r"<blockquote>\s*([^<>:\r\n]{1,50}?)\s*:\s*([^/\s])";
const CITE_REPLACEMENT: &str = "<blockquote><cite>${1}</cite><br>${2}";
const BR_AFTER_OPEN: &str = r"<blockquote>(?:\s*<br\s*/?>)+\s*";

static QUOTE_STEPS: Lazy<Vec<RewriteStep>> = Lazy::new(|| {
    vec![
        RewriteStep::replace(
            "open_quote_div",
            r#"<div\s+class\s*=\s*["']rsshub-quote["']\s*>"#,
            OPEN_TAG,
        ),
        RewriteStep::replace("collapse_breaks_after_open", BR_AFTER_OPEN, OPEN_TAG),
        RewriteStep::replace("wrap_cite", CITE_PATTERN, CITE_REPLACEMENT),
        RewriteStep::apply_fn("strip_enclosing_quotes", strip_enclosing_quotes),
        RewriteStep::replace("tighten_cite_break", r"</cite>\s+<br", "</cite><br"),
    ]
});

static REPAIR_STEPS: Lazy<Vec<RewriteStep>> = Lazy::new(|| {
    vec![
        RewriteStep::apply_fn("close_last_div", close_unmatched_divs),
        RewriteStep::replace_n("strip_leading_quote", &format!("^{OPENING_QUOTES}"), "", 1),
        RewriteStep::replace("repair_double_gt", r"<blockquote>>", OPEN_TAG),
        RewriteStep::replace("strip_breaks_after_open", BR_AFTER_OPEN, OPEN_TAG),
        RewriteStep::apply_fn("tidy_blockquotes", tidy_blockquotes),
    ]
});

static INNER_STEPS: Lazy<Vec<RewriteStep>> = Lazy::new(|| {
    vec![
        RewriteStep::replace("strip_images", r"<img\b[^>]*>", ""),
        RewriteStep::replace_n("strip_leading_breaks", r"^(?:\s*<br\s*/?>)+\s*", "", 1),
        RewriteStep::replace_n("strip_zero_width_entity", r"&#(?:8203|[xX]200[bB]);", "", 1),
        RewriteStep::replace_n("strip_trailing_breaks", r"(?:\s*<br\s*/?>)*\s*$", "", 1),
        RewriteStep::replace_n("strip_opening_quotes", &format!("^{OPENING_QUOTES}+"), "", 1),
        RewriteStep::apply_fn("strip_unpaired_closing_quotes", strip_unpaired_closing),
        RewriteStep::apply_fn("wrap_inner_cite", wrap_inner_cite),
    ]
});

pub fn quote_steps() -> &'static [RewriteStep] {
    &QUOTE_STEPS
}

pub fn repair_steps() -> &'static [RewriteStep] {
    &REPAIR_STEPS
}

pub fn inner_steps() -> &'static [RewriteStep] {
    &INNER_STEPS
}

/// Rewrite embedded quoted-post markup. Empty input is returned as is.
pub fn rewrite_quote_markup(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let out = apply_steps(quote_steps(), html);
    if out.contains(OPEN_TAG) {
        apply_steps(repair_steps(), &out)
    } else {
        out
    }
}

/// `None` stays `None`.
pub fn rewrite_optional(html: Option<&str>) -> Option<String> {
    html.map(rewrite_quote_markup)
}

static RE_OPEN_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("<blockquote>{OPENING_QUOTES}")).expect("open quote regex"));

fn strip_enclosing_quotes(s: &str) -> String {
    let s = RE_OPEN_QUOTE.replace_all(s, OPEN_TAG);
    RE_SPAN
        .replace_all(&s, |caps: &Captures| {
            format!("{OPEN_TAG}{}{CLOSE_TAG}", strip_unpaired_closing(&caps[1]))
        })
        .into_owned()
}

/// Whether the last character is a closing quote without an opening partner
/// in `body`.
fn ends_with_unpaired_quote(body: &str) -> bool {
    match body.chars().last() {
        Some('"') => body.matches('"').count() % 2 == 1,
        Some('”') => body.matches('”').count() > body.matches('“').count(),
        Some('」') => body.matches('」').count() > body.matches('「').count(),
        _ => false,
    }
}

/// Drop closing quotes right before the close tag whose opening quote was
/// stripped. Paired quotes inside the body are kept.
fn strip_unpaired_closing(body: &str) -> String {
    let mut out = body;
    while ends_with_unpaired_quote(out) {
        let cut = out.char_indices().last().map_or(0, |(i, _)| i);
        out = &out[..cut];
    }
    out.to_string()
}

static RE_DIV_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").expect("div tag regex"));

/// Turn the last `</div>` without an opening `<div>` into `</blockquote>`, once
/// for every `<blockquote>` that is still open.
fn close_unmatched_divs(s: &str) -> String {
    let open = s.matches(OPEN_TAG).count();
    let closed = s.matches(CLOSE_TAG).count();
    let unclosed = open.saturating_sub(closed);
    if unclosed == 0 {
        return s.to_string();
    }

    let mut depth = 0usize;
    let mut unmatched = Vec::new();
    for m in RE_DIV_TAG.find_iter(s) {
        if m.as_str().starts_with("</") {
            if depth == 0 {
                unmatched.push(m.range());
            } else {
                depth -= 1;
            }
        } else {
            depth += 1;
        }
    }

    let mut out = s.to_string();
    for range in unmatched.into_iter().rev().take(unclosed) {
        out.replace_range(range, CLOSE_TAG);
    }
    out
}

static RE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<blockquote>(.*?)</blockquote>").expect("span regex"));

fn tidy_blockquotes(s: &str) -> String {
    RE_SPAN
        .replace_all(s, |caps: &Captures| {
            format!("{OPEN_TAG}{}{CLOSE_TAG}", apply_steps(inner_steps(), &caps[1]))
        })
        .into_owned()
}

static RE_INNER_CITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^<>:\r\n]{1,50}?)\s*:\s*([^/\s])").expect("inner cite regex")
});

fn wrap_inner_cite(inner: &str) -> String {
    if inner.trim_start().starts_with("<cite>") {
        return inner.to_string();
    }
    RE_INNER_CITE
        .replace(inner, "<cite>${1}</cite><br>${2}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step<'a>(steps: &'a [RewriteStep], name: &str) -> &'a RewriteStep {
        steps.iter().find(|s| s.name == name).expect("step exists")
    }

    #[test]
    fn step_tables_keep_their_order() {
        let names: Vec<_> = quote_steps().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                "open_quote_div",
                "collapse_breaks_after_open",
                "wrap_cite",
                "strip_enclosing_quotes",
                "tighten_cite_break"
            ]
        );
        assert_eq!(repair_steps().last().unwrap().name, "tidy_blockquotes");
    }

    #[test]
    fn open_div_becomes_blockquote() {
        let s = step(quote_steps(), "open_quote_div");
        assert_eq!(
            s.apply(r#"a<div class="rsshub-quote">b</div>"#),
            "a<blockquote>b</div>"
        );
        assert_eq!(s.apply(r#"<div class="other">b</div>"#), r#"<div class="other">b</div>"#);
    }

    #[test]
    fn breaks_after_open_collapse() {
        let s = step(quote_steps(), "collapse_breaks_after_open");
        assert_eq!(s.apply("<blockquote><br><br/>\n <br />x"), "<blockquote>x");
    }

    #[test]
    fn cite_wraps_name_but_not_urls() {
        let s = step(quote_steps(), "wrap_cite");
        assert_eq!(
            s.apply("<blockquote>Bob :  hi"),
            "<blockquote><cite>Bob</cite><br>hi"
        );
        assert_eq!(
            s.apply("<blockquote>https://example.test/x"),
            "<blockquote>https://example.test/x"
        );
    }

    #[test]
    fn enclosing_quotes_are_stripped() {
        let s = step(quote_steps(), "strip_enclosing_quotes");
        assert_eq!(
            s.apply("<blockquote>“hi”</blockquote>"),
            "<blockquote>hi</blockquote>"
        );
    }

    #[test]
    fn only_last_unmatched_div_closes() {
        let s = step(repair_steps(), "close_last_div");
        assert_eq!(
            s.apply("<blockquote>a<div>b</div>c</div></div>"),
            "<blockquote>a<div>b</div>c</div></blockquote>"
        );
        // nothing open, nothing to close
        assert_eq!(s.apply("x</div>"), "x</div>");
    }

    #[test]
    fn inner_steps_strip_images_entities_and_breaks() {
        assert_eq!(
            apply_steps(inner_steps(), r#"<img src="a.jpg"><br>&#8203;Bob: hi<br><br> "#),
            "<cite>Bob</cite><br>hi"
        );
    }

    #[test]
    fn only_unpaired_closing_quotes_are_stripped() {
        let s = step(inner_steps(), "strip_unpaired_closing_quotes");
        assert_eq!(s.apply(r#"hello""#), "hello");
        assert_eq!(s.apply("hi””"), "hi");
        assert_eq!(s.apply(r#"<cite>A</cite><br>"x" and "y""#), r#"<cite>A</cite><br>"x" and "y""#);
        assert_eq!(s.apply("<cite>Bob</cite><br>「a」と「b」"), "<cite>Bob</cite><br>「a」と「b」");
    }

    #[test]
    fn opening_quotes_strip_only_at_the_start() {
        let s = step(inner_steps(), "strip_opening_quotes");
        assert_eq!(s.apply("「「hi"), "hi");
        assert_eq!(s.apply("<cite>Bob</cite><br>「hi」"), "<cite>Bob</cite><br>「hi」");
    }

    #[test]
    fn double_gt_is_repaired() {
        let s = step(repair_steps(), "repair_double_gt");
        assert_eq!(s.apply("<blockquote>>x"), "<blockquote>x");
    }
}
