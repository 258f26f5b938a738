//! Structural validation of write payloads.
//!
//! Every violated constraint is reported, not just the first one.

use hb_core::{
    Category, NewComment, NewPost, BODY_MAX_CHARS, BODY_MIN_CHARS, COMMENT_MAX_CHARS,
    COMMENT_MIN_CHARS, MAX_TAGS, TAG_MAX_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
};
use tracing::debug;

use crate::submission::{CommentSubmission, PostSubmission};

fn check_length(field: &str, value: &str, min: usize, max: usize, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if len < min {
        errors.push(format!("{field} must be at least {min} characters"));
    } else if len > max {
        errors.push(format!("{field} must be at most {max} characters"));
    }
}

/// Turn a post submission into a `NewPost`, or list what is wrong with it.
pub fn validate_post(sub: &PostSubmission) -> Result<NewPost, Vec<String>> {
    let mut errors = Vec::new();

    let title = sub.title.trim();
    let body = sub.body.trim();
    check_length("title", title, TITLE_MIN_CHARS, TITLE_MAX_CHARS, &mut errors);
    check_length("body", body, BODY_MIN_CHARS, BODY_MAX_CHARS, &mut errors);

    let category = match sub.category.trim().parse::<Category>() {
        Ok(c) => Some(c),
        Err(_) => {
            let allowed: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
            errors.push(format!("category must be one of: {}", allowed.join(", ")));
            None
        }
    };

    let tags: Vec<String> = sub
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.len() > MAX_TAGS {
        errors.push(format!("at most {MAX_TAGS} tags are allowed"));
    }
    for (i, tag) in tags.iter().enumerate() {
        if tag.chars().count() > TAG_MAX_CHARS {
            errors.push(format!("tag {} must be at most {TAG_MAX_CHARS} characters", i + 1));
        }
    }

    match category {
        Some(category) if errors.is_empty() => Ok(NewPost {
            title: title.to_string(),
            body: body.to_string(),
            category,
            tags,
        }),
        _ => {
            debug!(?errors, "Post failed validation");
            Err(errors)
        }
    }
}

/// Turn a comment submission into a `NewComment`, or list what is wrong with it.
pub fn validate_comment(sub: &CommentSubmission) -> Result<NewComment, Vec<String>> {
    let mut errors = Vec::new();
    let body = sub.body.trim();
    check_length("comment", body, COMMENT_MIN_CHARS, COMMENT_MAX_CHARS, &mut errors);

    if errors.is_empty() {
        Ok(NewComment {
            body: body.to_string(),
        })
    } else {
        debug!(?errors, "Comment failed validation");
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(title: &str, body: &str, category: &str, tags: &[&str]) -> PostSubmission {
        PostSubmission {
            title: title.into(),
            body: body.into(),
            category: category.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            website: None,
        }
    }

    #[test]
    fn minimal_valid_post() {
        let post = validate_post(&submission("Hello World", "0123456789", "tech", &[])).unwrap();
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.category, Category::Tech);
    }

    #[test]
    fn short_title_cites_minimum() {
        let errors = validate_post(&submission("Hi", "0123456789", "tech", &[])).unwrap_err();
        assert_eq!(errors, vec!["title must be at least 3 characters"]);
    }

    #[test]
    fn lengths_count_trimmed_characters() {
        // 9 visible characters padded with spaces
        let errors =
            validate_post(&submission("Title", "   012345678   ", "general", &[])).unwrap_err();
        assert_eq!(errors, vec!["body must be at least 10 characters"]);

        // multi-byte characters count once each
        let multibyte = submission("ééé", "ééééééééé€", "general", &[]);
        assert!(validate_post(&multibyte).is_ok());
    }

    #[test]
    fn itemizes_every_violation() {
        let long_tag = "x".repeat(51);
        let errors = validate_post(&submission(
            &"t".repeat(201),
            "short",
            "memes",
            &["a", "b", "c", "d", "e", &long_tag],
        ))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "title must be at most 200 characters".to_string(),
                "body must be at least 10 characters".to_string(),
                "category must be one of: general, tech, crypto, society, confession, question, \
                 random"
                    .to_string(),
                "at most 5 tags are allowed".to_string(),
                "tag 6 must be at most 50 characters".to_string(),
            ]
        );
    }

    #[test]
    fn blank_tags_are_dropped() {
        let tagged = submission("Tags", "0123456789", "random", &[" rust ", "", "  "]);
        let post = validate_post(&tagged).unwrap();
        assert_eq!(post.tags, vec!["rust"]);
    }

    #[test]
    fn comment_bounds() {
        let empty = CommentSubmission {
            body: "   ".into(),
            website: None,
        };
        assert_eq!(
            validate_comment(&empty).unwrap_err(),
            vec!["comment must be at least 1 characters"]
        );

        let long = CommentSubmission {
            body: "y".repeat(1001),
            website: None,
        };
        assert!(validate_comment(&long).is_err());

        let ok = CommentSubmission {
            body: " agreed ".into(),
            website: None,
        };
        assert_eq!(validate_comment(&ok).unwrap().body, "agreed");
    }
}
