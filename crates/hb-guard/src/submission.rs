//! Inbound write payloads, as decoded at the boundary and before validation.

use serde::Deserialize;

use crate::sanitize::Scrub;

/// Raw post payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostSubmission {
    pub title: String,
    pub body: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Honeypot; real clients never fill it in
    #[serde(default)]
    pub website: Option<String>,
}

/// Raw comment payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentSubmission {
    pub body: String,
    #[serde(default)]
    pub website: Option<String>,
}

/// A submission that may carry the honeypot field.
pub trait Honeypot {
    /// Removes the honeypot value, returning it.
    fn take_honeypot(&mut self) -> Option<String>;

    /// Text used as the excerpt when the request is logged.
    fn excerpt_source(&self) -> &str;
}

impl Scrub for PostSubmission {
    fn scrub(&mut self) {
        self.title.scrub();
        self.body.scrub();
        self.category.scrub();
        self.tags.scrub();
        self.website.scrub();
    }

    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        self.title.visit_strs(visit);
        self.body.visit_strs(visit);
        self.category.visit_strs(visit);
        self.tags.visit_strs(visit);
        self.website.visit_strs(visit);
    }
}

impl Honeypot for PostSubmission {
    fn take_honeypot(&mut self) -> Option<String> {
        self.website.take()
    }

    fn excerpt_source(&self) -> &str {
        &self.body
    }
}

impl Scrub for CommentSubmission {
    fn scrub(&mut self) {
        self.body.scrub();
        self.website.scrub();
    }

    fn visit_strs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        self.body.visit_strs(visit);
        self.website.visit_strs(visit);
    }
}

impl Honeypot for CommentSubmission {
    fn take_honeypot(&mut self) -> Option<String> {
        self.website.take()
    }

    fn excerpt_source(&self) -> &str {
        &self.body
    }
}
