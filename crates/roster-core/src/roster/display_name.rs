//! Display-name derivation from external user identifiers.
//!
//! External user ids have the shape `<prefix><delimiter><name>`; the name is the
//! second segment. Content-share pseudo-attendees are recognised by a reserved
//! suffix on the attendee id and get a marker appended to their name.

use crate::config::{
    DEFAULT_CONTENT_SHARE_MARKER, DEFAULT_CONTENT_SHARE_SUFFIX, DEFAULT_NAME_DELIMITER,
    DEFAULT_PLACEHOLDER_NAME,
};
use common::types::AttendeeId;
use serde::Serialize;

/// Rules for turning an external user id into a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRules {
    /// Segment delimiter in external user ids.
    pub delimiter: char,
    /// Attendee id suffix marking a content-share pseudo-attendee.
    pub content_share_suffix: String,
    /// Marker appended to content-share display names.
    pub content_share_marker: String,
    /// Name used when the external user id has no name segment.
    pub placeholder_name: String,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_NAME_DELIMITER,
            content_share_suffix: DEFAULT_CONTENT_SHARE_SUFFIX.to_string(),
            content_share_marker: DEFAULT_CONTENT_SHARE_MARKER.to_string(),
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
        }
    }
}

/// A derived display name.
///
/// `is_placeholder` is set when the external user id was malformed and the
/// configured placeholder was substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayName {
    pub text: String,
    pub is_placeholder: bool,
}

impl DisplayName {
    /// The name to show, or `None` when only a placeholder is known.
    #[must_use]
    pub fn shown(&self) -> Option<&str> {
        if self.is_placeholder {
            None
        } else {
            Some(&self.text)
        }
    }
}

impl NameRules {
    /// Whether the attendee is a content-share pseudo-attendee.
    #[must_use]
    pub fn is_content_share(&self, attendee_id: &AttendeeId) -> bool {
        attendee_id.has_suffix(&self.content_share_suffix)
    }

    /// Derive the display name for an attendee.
    ///
    /// Never fails: a missing or blank name segment yields the placeholder.
    #[must_use]
    pub fn derive(&self, attendee_id: &AttendeeId, external_user_id: &str) -> DisplayName {
        let segment = external_user_id
            .split(self.delimiter)
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (base, is_placeholder) = match segment {
            Some(name) => (name.to_string(), false),
            None => (self.placeholder_name.clone(), true),
        };

        let text = if self.is_content_share(attendee_id) {
            format!("{base} {}", self.content_share_marker)
        } else {
            base
        };

        DisplayName {
            text,
            is_placeholder,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_second_segment() {
        let rules = NameRules::default();
        let name = rules.derive(&AttendeeId::new("a1"), "org#Jane Doe");
        assert_eq!(name.text, "Jane Doe");
        assert!(!name.is_placeholder);
        assert_eq!(name.shown(), Some("Jane Doe"));
    }

    #[test]
    fn test_content_share_gets_marker() {
        let rules = NameRules::default();
        let name = rules.derive(&AttendeeId::new("a1#content"), "org#Jane Doe");
        assert_eq!(name.text, "Jane Doe <<Content>>");
        assert!(!name.is_placeholder);
    }

    #[test]
    fn test_missing_segment_falls_back_to_placeholder() {
        let rules = NameRules::default();

        let name = rules.derive(&AttendeeId::new("a1"), "no-delimiter");
        assert_eq!(name.text, "Unknown");
        assert!(name.is_placeholder);
        assert_eq!(name.shown(), None);

        // Present but blank segment is treated the same way
        let name = rules.derive(&AttendeeId::new("a1"), "org#  ");
        assert!(name.is_placeholder);

        let name = rules.derive(&AttendeeId::new("a1"), "");
        assert!(name.is_placeholder);
    }

    #[test]
    fn test_placeholder_content_share_keeps_flag() {
        let rules = NameRules::default();
        let name = rules.derive(&AttendeeId::new("x#content"), "broken");
        assert_eq!(name.text, "Unknown <<Content>>");
        assert!(name.is_placeholder);
    }

    #[test]
    fn test_extra_segments_ignored() {
        let rules = NameRules::default();
        let name = rules.derive(&AttendeeId::new("a1"), "org#Bob#extra");
        assert_eq!(name.text, "Bob");
    }

    #[test]
    fn test_custom_rules() {
        let rules = NameRules {
            delimiter: '|',
            content_share_suffix: "+share".to_string(),
            content_share_marker: "[screen]".to_string(),
            placeholder_name: "Guest".to_string(),
        };
        let name = rules.derive(&AttendeeId::new("p+share"), "acme|Ann");
        assert_eq!(name.text, "Ann [screen]");

        let name = rules.derive(&AttendeeId::new("p"), "acme#Ann");
        assert_eq!(name.text, "Guest");
        assert!(name.is_placeholder);
    }
}
