//! Spam heuristics over a post's title and body.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest run of one character tolerated.
const MAX_CHAR_RUN: usize = 10;
const MAX_LINKS: usize = 2;
const MAX_PHRASE_UNIT: usize = 20;
const PHRASE_REPEATS: usize = 4;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhttps?://\S+").expect("valid regex"));
// 20+ characters of capitals and spaces, starting and ending on a capital
static SHOUTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][A-Z ]{18,}[A-Z]").expect("valid regex"));

const BLOCKED_PHRASES: &[&str] = &[
    "buy now",
    "click here",
    "free money",
    "make money fast",
    "limited time offer",
    "act now",
    "100% free",
    "work from home",
    "earn cash",
    "double your bitcoin",
    "crypto giveaway",
    "viagra",
    "casino bonus",
    "weight loss pills",
];

/// Which heuristic fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamSignal {
    RepeatedCharacter,
    TooManyLinks,
    Shouting,
    RepeatedPhrase,
    BlockedPhrase(&'static str),
}

impl fmt::Display for SpamSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepeatedCharacter => {
                write!(f, "character repeated more than {MAX_CHAR_RUN} times")
            }
            Self::TooManyLinks => write!(f, "more than {MAX_LINKS} links"),
            Self::Shouting => write!(f, "long all-caps run"),
            Self::RepeatedPhrase => write!(f, "phrase repeated {PHRASE_REPEATS}+ times"),
            Self::BlockedPhrase(p) => write!(f, "blocked phrase '{p}'"),
        }
    }
}

/// Check a title/body pair.
pub fn detect_spam(title: &str, body: &str) -> Option<SpamSignal> {
    detect_in(&format!("{title}\n{body}"))
}

/// Check a single piece of text.
pub fn detect_in(text: &str) -> Option<SpamSignal> {
    let chars: Vec<char> = text.chars().collect();

    if longest_run(&chars) > MAX_CHAR_RUN {
        return Some(SpamSignal::RepeatedCharacter);
    }
    if LINK.find_iter(text).count() > MAX_LINKS {
        return Some(SpamSignal::TooManyLinks);
    }
    if SHOUTING.is_match(text) {
        return Some(SpamSignal::Shouting);
    }
    if has_repeated_phrase(&chars) {
        return Some(SpamSignal::RepeatedPhrase);
    }

    let lowered = text.to_lowercase();
    BLOCKED_PHRASES
        .iter()
        .copied()
        .find(|p| lowered.contains(p))
        .map(SpamSignal::BlockedPhrase)
}

fn longest_run(chars: &[char]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev = None;
    for &c in chars {
        run = if prev == Some(c) { run + 1 } else { 1 };
        prev = Some(c);
        longest = longest.max(run);
    }
    longest
}

/// True when some unit of 2 to 20 characters appears back to back at least
/// four times. Units made of a single repeated character (runs are judged by
/// `MAX_CHAR_RUN`) or only of whitespace are ignored.
fn has_repeated_phrase(chars: &[char]) -> bool {
    for unit in 2..=MAX_PHRASE_UNIT {
        if unit * PHRASE_REPEATS > chars.len() {
            break;
        }
        // `run` counts consecutive positions where chars[i] == chars[i + unit];
        // a stretch of unit * (k - 1) such positions is k copies of the unit.
        let mut run = 0;
        for i in 0..chars.len() - unit {
            if chars[i] != chars[i + unit] {
                run = 0;
                continue;
            }
            run += 1;
            if run >= unit * (PHRASE_REPEATS - 1) {
                let start = i + 1 - run;
                let copy = &chars[start..start + unit];
                let uniform = copy.iter().all(|&c| c == copy[0]);
                if !uniform && !copy.iter().all(|c| c.is_whitespace()) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes() {
        assert_eq!(detect_spam("Hello World", "0123456789"), None);
        assert_eq!(
            detect_spam(
                "Anyone else tired of meetings?",
                "Three stand-ups a day is too much. See https://example.com for my rant."
            ),
            None
        );
    }

    #[test]
    fn character_runs() {
        assert_eq!(detect_in(&"a".repeat(10)), None);
        assert_eq!(detect_in(&"a".repeat(11)), Some(SpamSignal::RepeatedCharacter));
        assert_eq!(
            detect_in(&format!("so{}", "o".repeat(11))),
            Some(SpamSignal::RepeatedCharacter)
        );
    }

    #[test]
    fn short_runs_in_prose_pass() {
        for text in [
            "I paid 100000 dollars for this car and regret it",
            "Wait.... what just happened here",
            "Bug id 11111 is still open",
        ] {
            assert_eq!(detect_in(text), None, "{text}");
        }
    }

    #[test]
    fn links() {
        let two = "see http://a.example and https://b.example";
        assert_eq!(detect_in(two), None);
        let three = format!("{two} and https://c.example/x");
        assert_eq!(detect_in(&three), Some(SpamSignal::TooManyLinks));
    }

    #[test]
    fn shouting() {
        assert_eq!(detect_in("THIS IS SO UNFAIR TO ALL OF US"), Some(SpamSignal::Shouting));
        assert_eq!(detect_in("NASA and the ESA and JAXA launch"), None);
    }

    #[test]
    fn repeated_phrases() {
        assert_eq!(
            detect_in("go team go team go team go team go"),
            Some(SpamSignal::RepeatedPhrase)
        );
        assert_eq!(detect_in("hahaha that is funny"), None);
        assert_eq!(detect_in("hahahaha"), Some(SpamSignal::RepeatedPhrase));
        assert_eq!(detect_in("indented\n        block"), None);
    }

    #[test]
    fn blocked_phrases() {
        assert_eq!(
            detect_spam("Great deal", "Click HERE for the best prices"),
            Some(SpamSignal::BlockedPhrase("click here"))
        );
    }
}
