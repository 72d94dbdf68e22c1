use crate::filters::{filter_href, FilterKey};
use crate::models::Note;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default length for shortened link labels.
pub const URL_TEXT_MAX: usize = 50;

/// `#` followed by 3..=50 non-space characters whose first one is not a digit
/// or one of `&%$-`.
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([^\d&%$\-\s]\S{2,49})").expect("hashtag pattern is valid"));

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render note text as HTML with every hashtag linked to its tag filter.
///
/// Everything outside the generated anchors is escaped, so the output is safe
/// for `inner_html`.
pub fn hashtag_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in HASHTAG_RE.captures_iter(text) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&escape_html(&text[last..whole.start()]));
        out.push_str(&format!(
            r#"<a href="/notes?tag={}">#{}</a>"#,
            urlencoding::encode(tag.as_str()),
            escape_html(tag.as_str())
        ));
        last = whole.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Shorten `text` to `max_len` characters, marking the cut with `...`.
pub fn url_text(text: &str, max_len: usize) -> String {
    let mut chars = text.chars();
    let short: String = chars.by_ref().take(max_len).collect();
    if chars.next().is_some() {
        format!("{short}...")
    } else {
        short
    }
}

/// Popup HTML for a note marker: creator filter link and a shortened link to
/// the note's URL. Notes without a creator get no popup.
pub fn note_popup(note: &Note) -> Option<String> {
    if note.creator.is_empty() {
        return None;
    }
    Some(format!(
        r#"<p><b>creator</b>: <a href="{}">{}</a></p><span><b>link</b>: </span><a target="_blank" rel="noopener" href="{}">{}</a>"#,
        escape_html(&filter_href(FilterKey::Creator, &note.creator)),
        escape_html(&note.creator),
        escape_html(&note.url),
        escape_html(&url_text(&note.url, URL_TEXT_MAX)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtag_links() {
        assert_eq!(
            hashtag_links("trip to #tehran today"),
            r#"trip to <a href="/notes?tag=tehran">#tehran</a> today"#
        );
    }

    #[test]
    fn test_hashtag_rules() {
        // too short, leading digit, leading dash
        assert_eq!(hashtag_links("#ab #1abc #-abc"), "#ab #1abc #-abc");
        // 50 characters max after '#'
        let out = hashtag_links(&format!("#{}", "a".repeat(60)));
        assert!(out.starts_with(&format!(r#"<a href="/notes?tag={}">"#, "a".repeat(50))));
        assert!(out.ends_with(&format!("</a>{}", "a".repeat(10))));
    }

    #[test]
    fn test_hashtag_text_is_escaped() {
        let out = hashtag_links("<b>#bold</b>");
        assert!(out.starts_with("&lt;b&gt;<a "));
        assert!(out.contains("#bold&lt;/b&gt;</a>"));
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn test_tags_are_url_encoded() {
        assert_eq!(
            hashtag_links("#café!"),
            r#"<a href="/notes?tag=caf%C3%A9%21">#café!</a>"#
        );
    }

    #[test]
    fn test_url_text() {
        assert_eq!(url_text("https://a.io", URL_TEXT_MAX), "https://a.io");
        let long = format!("https://example.com/{}", "x".repeat(60));
        let short = url_text(&long, URL_TEXT_MAX);
        assert_eq!(short.chars().count(), URL_TEXT_MAX + 3);
        assert!(short.ends_with("..."));
        assert_eq!(url_text("abcdef", 6), "abcdef");
    }

    #[test]
    fn test_note_popup() {
        let mut note = Note {
            code: "c".into(),
            creator: "ali".into(),
            url: "https://a.io/?q=<x>".into(),
            ..Default::default()
        };
        let html = note_popup(&note).expect("creator present");
        assert!(html.contains(r#"<a href="/notes?creator=ali">ali</a>"#));
        assert!(html.contains(r#"href="https://a.io/?q=&lt;x&gt;""#));

        note.creator.clear();
        assert_eq!(note_popup(&note), None);
    }
}
