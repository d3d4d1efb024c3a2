//! Route patterns
//!
//! Three forms, parsed once at startup:
//! - exact literal: `/api/webhook/clerk`
//! - template: `/events/:id` - each `:name` matches exactly one segment
//! - prefix: `/api/uploadthing/*` - matches the prefix itself and anything
//!   nested beneath it
//!
//! Matching is a pure function of the pattern and the path string.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern must start with '/': '{0}'")]
    MissingLeadingSlash(String),

    #[error("route pattern has an empty segment: '{0}'")]
    EmptySegment(String),

    #[error("route pattern has an unnamed ':' parameter: '{0}'")]
    UnnamedParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Matches exactly one path segment, never a '/'.
    Param,
}

/// A parsed route pattern. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    /// Trailing `/*`: segment comparison stops at the prefix length.
    prefix: bool,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let (body, prefix) = match pattern.strip_suffix("/*") {
            Some(rest) => (rest, true),
            None => (pattern.trim_end_matches('/'), false),
        };

        let mut segments = Vec::new();
        for segment in body.split('/').skip(1) {
            if segment.is_empty() {
                return Err(PatternError::EmptySegment(pattern.to_string()));
            }
            match segment.strip_prefix(':') {
                Some("") => return Err(PatternError::UnnamedParam(pattern.to_string())),
                Some(_) => segments.push(Segment::Param),
                None => segments.push(Segment::Literal(segment.to_string())),
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            prefix,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if self.prefix {
            if path_segments.len() < self.segments.len() {
                return false;
            }
        } else if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&path_segments)
            .all(|(segment, part)| match segment {
                Segment::Literal(literal) => literal == part,
                Segment::Param => true,
            })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> RoutePattern {
        RoutePattern::parse(s).expect("pattern parses")
    }

    #[test]
    fn exact_matching() {
        let p = pattern("/api/webhook/clerk");
        assert!(p.matches("/api/webhook/clerk"));
        assert!(p.matches("/api/webhook/clerk/"));
        assert!(!p.matches("/api/webhook"));
        assert!(!p.matches("/api/webhook/clerk/extra"));
    }

    #[test]
    fn root_matches_only_root() {
        let p = pattern("/");
        assert!(p.matches("/"));
        assert!(!p.matches("/events"));
    }

    #[test]
    fn template_matches_exactly_one_segment() {
        let p = pattern("/events/:id");
        assert!(p.matches("/events/abc123"));
        assert!(p.matches("/events/abc123/"));
        assert!(!p.matches("/events"));
        assert!(!p.matches("/events/abc123/edit"));
        assert!(!p.matches("/orders/abc123"));
    }

    #[test]
    fn prefix_matches_itself_and_below() {
        let p = pattern("/api/uploadthing/*");
        assert!(p.matches("/api/uploadthing"));
        assert!(p.matches("/api/uploadthing/callback"));
        assert!(p.matches("/api/uploadthing/a/b/c"));
        assert!(!p.matches("/api/upload"));
        assert!(!p.matches("/api"));
    }

    #[test]
    fn parse_rejects_malformed_patterns() {
        assert_eq!(
            RoutePattern::parse("events/:id"),
            Err(PatternError::MissingLeadingSlash("events/:id".to_string()))
        );
        assert_eq!(
            RoutePattern::parse("/events//detail"),
            Err(PatternError::EmptySegment("/events//detail".to_string()))
        );
        assert_eq!(
            RoutePattern::parse("/events/:"),
            Err(PatternError::UnnamedParam("/events/:".to_string()))
        );
    }

    #[test]
    fn display_round_trips_the_source() {
        assert_eq!(pattern("/events/:id").to_string(), "/events/:id");
        assert_eq!(pattern("/api/uploadthing/*").as_str(), "/api/uploadthing/*");
    }
}
