//! Type-specific contribution payloads and their intake validation.
//!
//! Clients send the payload as free-form JSON next to the contribution type.
//! `validate_payload` parses it into the typed shape for that type, checks
//! required fields and size ceilings, and returns the normalized JSON that
//! gets persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::{GovernanceError, MemberId};
use crate::domains::contributions::models::ContributionType;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_BODY_CHARS: usize = 20_000;

const MIB: i64 = 1024 * 1024;

/// Per-type size ceilings in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_image_bytes: i64,
    pub max_document_bytes: i64,
    pub max_video_bytes: i64,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: 8 * MIB,
            max_document_bytes: 8 * MIB,
            max_video_bytes: 100 * MIB,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPayload {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPayload {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Size after the client's single reduction pass, if it made one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub file_name: String,
    pub size_bytes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_size_bytes: Option<i64>,
}

/// Either an uploaded file or an external link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommendationPayload {
    pub body: String,
    pub subject_member_id: MemberId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestonePayload {
    pub title: String,
    pub occurred_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A payload after validation, tagged by its contribution type
#[derive(Debug, Clone)]
pub enum ContributionPayload {
    Text(TextPayload),
    Link(LinkPayload),
    Image(ImagePayload),
    Document(DocumentPayload),
    Video(VideoPayload),
    Commendation(CommendationPayload),
    Milestone(MilestonePayload),
}

impl ContributionPayload {
    pub fn to_json(&self) -> Result<serde_json::Value, GovernanceError> {
        let value = match self {
            Self::Text(p) => serde_json::to_value(p),
            Self::Link(p) => serde_json::to_value(p),
            Self::Image(p) => serde_json::to_value(p),
            Self::Document(p) => serde_json::to_value(p),
            Self::Video(p) => serde_json::to_value(p),
            Self::Commendation(p) => serde_json::to_value(p),
            Self::Milestone(p) => serde_json::to_value(p),
        };
        value.map_err(|e| GovernanceError::Internal(e.into()))
    }
}

/// Parse and validate `raw` as the payload of `contribution_type`.
pub fn validate_payload(
    contribution_type: ContributionType,
    raw: serde_json::Value,
    limits: &IntakeLimits,
) -> Result<ContributionPayload, GovernanceError> {
    match contribution_type {
        ContributionType::Text => {
            let p: TextPayload = parse(contribution_type, raw)?;
            require_title(&p.title)?;
            require_body(&p.body)?;
            Ok(ContributionPayload::Text(p))
        }
        ContributionType::Link => {
            let p: LinkPayload = parse(contribution_type, raw)?;
            require_http_url(&p.url)?;
            if let Some(title) = &p.title {
                check_length("title", title, MAX_TITLE_CHARS)?;
            }
            Ok(ContributionPayload::Link(p))
        }
        ContributionType::Image => {
            let mut p: ImagePayload = parse(contribution_type, raw)?;
            require_non_empty("file_name", &p.file_name)?;
            if !p.content_type.starts_with("image/") {
                return Err(GovernanceError::validation(format!(
                    "content_type must be an image type, got '{}'",
                    p.content_type
                )));
            }
            p.size_bytes = check_image_size(p.size_bytes, p.reduced_size_bytes, limits)?;
            p.reduced_size_bytes = None;
            Ok(ContributionPayload::Image(p))
        }
        ContributionType::Document => {
            let p: DocumentPayload = parse(contribution_type, raw)?;
            require_non_empty("file_name", &p.file_name)?;
            check_size("document", p.size_bytes, limits.max_document_bytes)?;
            Ok(ContributionPayload::Document(p))
        }
        ContributionType::Video => {
            let p: VideoPayload = parse(contribution_type, raw)?;
            match (&p.file_name, p.size_bytes, &p.url) {
                (Some(file_name), Some(size), _) => {
                    require_non_empty("file_name", file_name)?;
                    check_size("video", size, limits.max_video_bytes)?;
                }
                (None, None, Some(url)) => require_http_url(url)?,
                _ => {
                    return Err(GovernanceError::validation(
                        "video needs either file_name and size_bytes, or a url",
                    ))
                }
            }
            Ok(ContributionPayload::Video(p))
        }
        ContributionType::Commendation => {
            let p: CommendationPayload = parse(contribution_type, raw)?;
            require_body(&p.body)?;
            Ok(ContributionPayload::Commendation(p))
        }
        ContributionType::Milestone => {
            let p: MilestonePayload = parse(contribution_type, raw)?;
            require_title(&p.title)?;
            NaiveDate::parse_from_str(&p.occurred_on, "%Y-%m-%d").map_err(|_| {
                GovernanceError::validation("occurred_on must be a date in YYYY-MM-DD form")
            })?;
            if let Some(body) = &p.body {
                check_length("body", body, MAX_BODY_CHARS)?;
            }
            Ok(ContributionPayload::Milestone(p))
        }
    }
}

/// The member a commendation is about, read back from a stored payload
pub fn commendation_subject(payload: &serde_json::Value) -> Option<MemberId> {
    serde_json::from_value::<CommendationPayload>(payload.clone())
        .ok()
        .map(|p| p.subject_member_id)
}

fn parse<T: serde::de::DeserializeOwned>(
    contribution_type: ContributionType,
    raw: serde_json::Value,
) -> Result<T, GovernanceError> {
    serde_json::from_value(raw).map_err(|e| {
        GovernanceError::validation(format!("Invalid {} payload: {}", contribution_type, e))
    })
}

fn require_non_empty(field: &str, value: &str) -> Result<(), GovernanceError> {
    if value.trim().is_empty() {
        return Err(GovernanceError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), GovernanceError> {
    if value.chars().count() > max {
        return Err(GovernanceError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn require_title(title: &str) -> Result<(), GovernanceError> {
    require_non_empty("title", title)?;
    check_length("title", title, MAX_TITLE_CHARS)
}

fn require_body(body: &str) -> Result<(), GovernanceError> {
    require_non_empty("body", body)?;
    check_length("body", body, MAX_BODY_CHARS)
}

fn require_http_url(raw: &str) -> Result<(), GovernanceError> {
    let url = Url::parse(raw)
        .map_err(|_| GovernanceError::validation(format!("'{}' is not a valid URL", raw)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GovernanceError::validation(format!(
            "URL scheme must be http or https, got '{}'",
            other
        ))),
    }
}

fn check_size(what: &str, actual: i64, limit: i64) -> Result<(), GovernanceError> {
    if actual < 0 {
        return Err(GovernanceError::validation("size_bytes cannot be negative"));
    }
    if actual > limit {
        return Err(GovernanceError::SizeExceeded {
            what: what.to_string(),
            actual,
            limit,
            reducible: false,
        });
    }
    Ok(())
}

/// Images get one reduction pass. Returns the size that will be stored.
fn check_image_size(
    original: i64,
    reduced: Option<i64>,
    limits: &IntakeLimits,
) -> Result<i64, GovernanceError> {
    let limit = limits.max_image_bytes;
    if original < 0 {
        return Err(GovernanceError::validation("size_bytes cannot be negative"));
    }
    if original <= limit {
        return Ok(original);
    }
    match reduced {
        None => Err(GovernanceError::SizeExceeded {
            what: "image".to_string(),
            actual: original,
            limit,
            reducible: true,
        }),
        Some(size) if (0..=limit).contains(&size) => Ok(size),
        Some(size) => Err(GovernanceError::SizeExceeded {
            what: "image".to_string(),
            actual: size,
            limit,
            reducible: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits() -> IntakeLimits {
        IntakeLimits::default()
    }

    #[test]
    fn test_text_requires_title_and_body() {
        let ok = validate_payload(
            ContributionType::Text,
            json!({"title": "Trial", "body": "x".repeat(60)}),
            &limits(),
        );
        assert!(ok.is_ok());

        let err = validate_payload(
            ContributionType::Text,
            json!({"title": "  ", "body": "something"}),
            &limits(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let err = validate_payload(ContributionType::Text, json!({"title": "t"}), &limits())
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_title_length_limit() {
        let err = validate_payload(
            ContributionType::Text,
            json!({"title": "a".repeat(MAX_TITLE_CHARS + 1), "body": "b"}),
            &limits(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_link_must_be_http() {
        assert!(validate_payload(
            ContributionType::Link,
            json!({"url": "https://example.org/club-history"}),
            &limits()
        )
        .is_ok());
        assert!(validate_payload(ContributionType::Link, json!({"url": "ftp://x.org"}), &limits())
            .is_err());
        assert!(validate_payload(ContributionType::Link, json!({"url": "not a url"}), &limits())
            .is_err());
    }

    #[test]
    fn test_document_over_ceiling_is_size_exceeded() {
        let err = validate_payload(
            ContributionType::Document,
            json!({"file_name": "minutes.pdf", "size_bytes": 40 * MIB}),
            &limits(),
        )
        .unwrap_err();
        match err {
            GovernanceError::SizeExceeded {
                actual,
                limit,
                reducible,
                ..
            } => {
                assert_eq!(actual, 40 * MIB);
                assert_eq!(limit, 8 * MIB);
                assert!(!reducible);
            }
            other => panic!("expected SizeExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_document_reduced_size_is_ignored() {
        let err = validate_payload(
            ContributionType::Document,
            json!({"file_name": "minutes.pdf", "size_bytes": 40 * MIB, "reduced_size_bytes": MIB}),
            &limits(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "size_exceeded");
    }

    #[test]
    fn test_oversize_image_is_reducible_once() {
        let err = validate_payload(
            ContributionType::Image,
            json!({"file_name": "team.jpg", "content_type": "image/jpeg", "size_bytes": 12 * MIB}),
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::SizeExceeded {
                reducible: true,
                ..
            }
        ));

        let accepted = validate_payload(
            ContributionType::Image,
            json!({
                "file_name": "team.jpg",
                "content_type": "image/jpeg",
                "size_bytes": 12 * MIB,
                "reduced_size_bytes": 3 * MIB
            }),
            &limits(),
        )
        .unwrap();
        match accepted {
            ContributionPayload::Image(p) => {
                assert_eq!(p.size_bytes, 3 * MIB);
                assert_eq!(p.reduced_size_bytes, None);
            }
            other => panic!("expected image payload, got {:?}", other),
        }
    }

    #[test]
    fn test_image_still_too_big_after_reduction_is_terminal() {
        let err = validate_payload(
            ContributionType::Image,
            json!({
                "file_name": "team.jpg",
                "content_type": "image/jpeg",
                "size_bytes": 30 * MIB,
                "reduced_size_bytes": 9 * MIB
            }),
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::SizeExceeded {
                reducible: false,
                ..
            }
        ));
    }

    #[test]
    fn test_image_needs_image_content_type() {
        let err = validate_payload(
            ContributionType::Image,
            json!({"file_name": "a.pdf", "content_type": "application/pdf", "size_bytes": 10}),
            &limits(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_video_file_or_url() {
        assert!(validate_payload(
            ContributionType::Video,
            json!({"url": "https://video.example/watch?v=1"}),
            &limits()
        )
        .is_ok());
        assert!(validate_payload(
            ContributionType::Video,
            json!({"file_name": "final.mp4", "size_bytes": 50 * MIB}),
            &limits()
        )
        .is_ok());
        assert_eq!(
            validate_payload(
                ContributionType::Video,
                json!({"file_name": "final.mp4", "size_bytes": 150 * MIB}),
                &limits()
            )
            .unwrap_err()
            .kind(),
            "size_exceeded"
        );
        assert!(validate_payload(ContributionType::Video, json!({}), &limits()).is_err());
    }

    #[test]
    fn test_commendation_subject_round_trips_from_storage() {
        let subject = MemberId::new();
        let payload = validate_payload(
            ContributionType::Commendation,
            json!({"body": "Coached for 30 years", "subject_member_id": subject}),
            &limits(),
        )
        .unwrap()
        .to_json()
        .unwrap();
        assert_eq!(commendation_subject(&payload), Some(subject));
        assert_eq!(commendation_subject(&json!({"title": "x"})), None);
    }

    #[test]
    fn test_milestone_needs_iso_date() {
        assert!(validate_payload(
            ContributionType::Milestone,
            json!({"title": "Founded", "occurred_on": "1952-04-01"}),
            &limits()
        )
        .is_ok());
        assert!(validate_payload(
            ContributionType::Milestone,
            json!({"title": "Founded", "occurred_on": "April 1952"}),
            &limits()
        )
        .is_err());
    }
}
