//! Input sanitizing.
//!
//! Strips script blocks, script-capable URI schemes and inline event
//! handler attributes from every string field of a submission, before any
//! other check looks at it.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?script\b[^>]*>").expect("valid regex"));
static SCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:javascript|vbscript)\s*:").expect("valid regex"));
static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdata\s*:\s*[a-z]+/[a-z0-9.+-]+[;,]?").expect("valid regex")
});
/// Only inside a tag: group 1 keeps everything from `<` up to the attribute.
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<[^>]*?[\s"'/])on[a-z]{3,}\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid regex")
});

/// Removes dangerous fragments, repeating until nothing changes so that
/// fragments reassembled by an earlier removal are caught too.
pub fn strip_dangerous(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let rules: [(&Regex, &str); 5] = [
            (&*SCRIPT_BLOCK, ""),
            (&*SCRIPT_TAG, ""),
            (&*SCRIPT_SCHEME, ""),
            (&*DATA_URI, ""),
            (&*EVENT_HANDLER, "${1}"),
        ];
        let next = rules.iter().fold(current.clone(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        });
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Something carrying user-supplied strings.
pub trait Scrub {
    /// Sanitize every string field in place.
    fn scrub(&mut self);

    /// Visit every string field.
    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str));
}

impl Scrub for String {
    fn scrub(&mut self) {
        *self = strip_dangerous(self);
    }

    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        visit(self)
    }
}

impl<T: Scrub> Scrub for Option<T> {
    fn scrub(&mut self) {
        if let Some(inner) = self {
            inner.scrub();
        }
    }

    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        if let Some(inner) = self {
            inner.visit_strs(visit);
        }
    }
}

impl<T: Scrub> Scrub for Vec<T> {
    fn scrub(&mut self) {
        self.iter_mut().for_each(Scrub::scrub);
    }

    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        for item in self {
            item.visit_strs(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_blocks_and_tags() {
        assert_eq!(
            strip_dangerous("hi <script type=\"text/javascript\">alert(1)</script> there"),
            "hi  there"
        );
        assert_eq!(strip_dangerous("open <SCRIPT src=x.js> only"), "open  only");
    }

    #[test]
    fn strips_nested_reassembly() {
        assert_eq!(
            strip_dangerous("<scr<script></script>ipt>alert(1)</scr<script></script>ipt>"),
            "alert(1)"
        );
        assert_eq!(strip_dangerous("javajavascript:script:go"), "go");
    }

    #[test]
    fn strips_schemes_and_handlers() {
        assert_eq!(
            strip_dangerous("<a href=\"javascript:evil()\">x</a>"),
            "<a href=\"evil()\">x</a>"
        );
        assert_eq!(strip_dangerous("<img src=x onerror=\"steal()\">"), "<img src=x >");
        assert_eq!(strip_dangerous("<svg/onload=go()>"), "<svg/>");
        assert_eq!(
            strip_dangerous("<img src=\"a\"onerror='x' onload=y>"),
            "<img src=\"a\" >"
        );
        assert_eq!(strip_dangerous("go to data:text/html;base64,AAAA"), "go to base64,AAAA");
        assert_eq!(strip_dangerous("VBScript: msgbox"), " msgbox");
    }

    #[test]
    fn leaves_ordinary_prose_alone() {
        let text = "Someone = person, data: see below. Online games are fun.";
        assert_eq!(strip_dangerous(text), text);
    }

    #[test]
    fn on_words_outside_tags_survive() {
        for text in [
            "the ongoing = debate",
            "going online=cheaper than stores",
            "<b>bold</b> and onward='forever'",
        ] {
            assert_eq!(strip_dangerous(text), text);
        }
    }

    #[test]
    fn scrubs_nested_containers() {
        let mut tags = Some(vec!["ok".to_string(), "<script>x</script>tag".to_string()]);
        tags.scrub();
        assert_eq!(tags, Some(vec!["ok".to_string(), "tag".to_string()]));

        let mut seen = Vec::new();
        tags.visit_strs(&mut |s| seen.push(s));
        assert_eq!(seen, vec!["ok", "tag"]);
    }
}
