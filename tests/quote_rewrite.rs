// tests/quote_rewrite.rs
use dashboard_contents::{rewrite_optional, rewrite_quote_markup};

const FIXTURES: &[(&str, &str)] = &[
    (
        r#"<div class="rsshub-quote">Alice: hello</div>"#,
        "<blockquote><cite>Alice</cite><br>hello</blockquote>",
    ),
    (
        r#"おやすみ<br><div class="rsshub-quote"><br><br>Kaho: 「また明日！」</div>"#,
        "おやすみ<br><blockquote><cite>Kaho</cite><br>「また明日！」</blockquote>",
    ),
    (
        r#"見て！<div class="rsshub-quote"><br>Sayaka: 新曲です<br><img src="https://pbs.twimg.com/media/x.jpg"><br></div>"#,
        "見て！<blockquote><cite>Sayaka</cite><br>新曲です</blockquote>",
    ),
    (
        r#"<div class="rsshub-quote">&#8203;Rurino : “えへへ”</div>"#,
        "<blockquote><cite>Rurino</cite><br>“えへへ”</blockquote>",
    ),
    (
        r#"<div class="rsshub-quote">https://example.test/a</div>"#,
        "<blockquote>https://example.test/a</blockquote>",
    ),
    (
        r#"a<div class="rsshub-quote">X: one</div>b<div class="rsshub-quote">Y: two</div>"#,
        "a<blockquote><cite>X</cite><br>one</blockquote>b<blockquote><cite>Y</cite><br>two</blockquote>",
    ),
    (
        r#"<div class="rsshub-quote">"hello"</div>"#,
        "<blockquote>hello</blockquote>",
    ),
    (
        r#"<div class="rsshub-quote">「hello」</div>"#,
        "<blockquote>hello</blockquote>",
    ),
    (
        r#"<div class="rsshub-quote">A: "x" and "y"</div>"#,
        r#"<blockquote><cite>A</cite><br>"x" and "y"</blockquote>"#,
    ),
    (
        r#"<div class="rsshub-quote">Bob: 「a」と「b」</div>"#,
        "<blockquote><cite>Bob</cite><br>「a」と「b」</blockquote>",
    ),
];

#[test]
fn quoted_posts_become_cited_blockquotes() {
    for (input, expected) in FIXTURES {
        assert_eq!(&rewrite_quote_markup(input), expected, "input: {input}");
    }
}

#[test]
fn rewrite_is_idempotent() {
    for (input, _) in FIXTURES {
        let once = rewrite_quote_markup(input);
        assert_eq!(rewrite_quote_markup(&once), once, "input: {input}");
    }
}

#[test]
fn empty_and_absent_pass_through() {
    assert_eq!(rewrite_quote_markup(""), "");
    assert_eq!(rewrite_optional(None), None);
    assert_eq!(rewrite_optional(Some("")), Some(String::new()));
}

#[test]
fn text_without_quotes_is_untouched() {
    let html = r#"<p>plain <a href="https://x.com/a">link</a>: fine</p><div>x</div>"#;
    assert_eq!(rewrite_quote_markup(html), html);
}
