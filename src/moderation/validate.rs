//! Payload validation for content submissions
//!
//! Returns every failing field at once so the client can fix a submission
//! in a single round trip.

use chrono::NaiveDate;

use crate::db::schemas::{ContentPayload, EventFields, MartyrFields, MediaRef, SongFields};
use crate::types::{MemoriaError, Result};

const SHORT_FIELD_MAX: usize = 200;
const LONG_TEXT_MAX: usize = 2000;
const CAPTION_MAX: usize = 500;

const EVENT_TYPES: &[&str] = &[
    "protest",
    "arrest",
    "martyrdom",
    "statement",
    "meeting",
    "violence",
    "other",
];

const MEDIA_KINDS: &[&str] = &["image", "video"];

/// Validate a submission payload, collecting every invalid field name.
pub fn validate_payload(payload: &ContentPayload) -> Result<()> {
    let mut errors = Vec::new();

    match payload {
        ContentPayload::Martyr(fields) => validate_martyr(fields, &mut errors),
        ContentPayload::Song(fields) => validate_song(fields, &mut errors),
        ContentPayload::Event(fields) => validate_event(fields, &mut errors),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(MemoriaError::Validation(errors))
    }
}

fn validate_martyr(fields: &MartyrFields, errors: &mut Vec<String>) {
    check_short(&fields.name, "name", errors);
    check_short(&fields.english_name, "englishName", errors);
    check_date(&fields.date_of_martyrdom, "dateOfMartyrdom", errors);
    check_short(&fields.location, "location", errors);
    if fields.age == 0 || fields.age > 150 {
        errors.push("age".to_string());
    }
    check_long(&fields.background, "background", errors);
    check_long(&fields.life_story, "lifeStory", errors);
    check_long(&fields.quote, "quote", errors);
    check_long(&fields.contribution, "contribution", errors);
    check_long(&fields.impact, "impact", errors);
}

fn validate_song(fields: &SongFields, errors: &mut Vec<String>) {
    check_short(&fields.title, "title", errors);
    check_short(&fields.artist, "artist", errors);
    check_long(&fields.description, "description", errors);
    if !is_youtube_link(&fields.youtube_link) {
        errors.push("youtubeLink".to_string());
    }
    check_tags(&fields.tags, errors);
}

fn validate_event(fields: &EventFields, errors: &mut Vec<String>) {
    check_short(&fields.title, "title", errors);
    check_long(&fields.description, "description", errors);
    if !EVENT_TYPES.contains(&fields.event_type.as_str()) {
        errors.push("eventType".to_string());
    }
    check_date(&fields.date, "date", errors);
    check_short(&fields.location, "location", errors);
    check_tags(&fields.tags, errors);
    for media in &fields.media {
        validate_media(media, errors);
    }
    for source in &fields.sources {
        if source.trim().is_empty() || source.len() > SHORT_FIELD_MAX {
            errors.push("sources".to_string());
            break;
        }
    }
}

fn validate_media(media: &MediaRef, errors: &mut Vec<String>) {
    if !MEDIA_KINDS.contains(&media.media_kind.as_str()) && !errors.iter().any(|e| e == "media.mediaKind") {
        errors.push("media.mediaKind".to_string());
    }
    if media.reference.trim().is_empty() && !errors.iter().any(|e| e == "media.reference") {
        errors.push("media.reference".to_string());
    }
    if let Some(caption) = &media.caption {
        if caption.len() > CAPTION_MAX && !errors.iter().any(|e| e == "media.caption") {
            errors.push("media.caption".to_string());
        }
    }
}

fn check_short(value: &str, field: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() || value.len() > SHORT_FIELD_MAX {
        errors.push(field.to_string());
    }
}

fn check_long(value: &str, field: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() || value.len() > LONG_TEXT_MAX {
        errors.push(field.to_string());
    }
}

fn check_tags(tags: &[String], errors: &mut Vec<String>) {
    if tags
        .iter()
        .any(|t| t.trim().is_empty() || t.len() > SHORT_FIELD_MAX)
    {
        errors.push("tags".to_string());
    }
}

fn check_date(value: &str, field: &str, errors: &mut Vec<String>) {
    if !is_valid_date(value) {
        errors.push(field.to_string());
    }
}

/// Accepts YYYY-MM-DD or a full RFC 3339 timestamp.
fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

/// Accepts youtube.com, www.youtube.com, and youtu.be links over https.
fn is_youtube_link(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("https://") else {
        return false;
    };
    let host = rest.split('/').next().unwrap_or("");
    matches!(host, "youtube.com" | "www.youtube.com" | "youtu.be" | "m.youtube.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_song() -> SongFields {
        SongFields {
            title: "Mawtini".to_string(),
            artist: "Various".to_string(),
            description: "National anthem".to_string(),
            youtube_link: "https://www.youtube.com/watch?v=abc123".to_string(),
            tags: vec!["anthem".to_string()],
        }
    }

    fn valid_martyr() -> MartyrFields {
        MartyrFields {
            name: "Name".to_string(),
            english_name: "English Name".to_string(),
            date_of_martyrdom: "2011-07-15".to_string(),
            location: "City".to_string(),
            age: 24,
            background: "Background".to_string(),
            life_story: "Life story".to_string(),
            quote: "A quote".to_string(),
            contribution: "Contribution".to_string(),
            impact: "Impact".to_string(),
        }
    }

    fn valid_event() -> EventFields {
        EventFields {
            title: "March".to_string(),
            description: "A protest march".to_string(),
            event_type: "protest".to_string(),
            date: "2011-07-15".to_string(),
            location: "Square".to_string(),
            tags: vec![],
            media: vec![],
            sources: vec![],
            casualties: 0,
            injured: 0,
        }
    }

    #[test]
    fn test_valid_payloads_pass() {
        assert!(validate_payload(&ContentPayload::Song(valid_song())).is_ok());
        assert!(validate_payload(&ContentPayload::Martyr(valid_martyr())).is_ok());
        assert!(validate_payload(&ContentPayload::Event(valid_event())).is_ok());
    }

    #[test]
    fn test_collects_all_invalid_fields() {
        let mut song = valid_song();
        song.title = "   ".to_string();
        song.youtube_link = "https://vimeo.com/123".to_string();

        let err = validate_payload(&ContentPayload::Song(song)).unwrap_err();
        match err {
            MemoriaError::Validation(fields) => {
                assert!(fields.contains(&"title".to_string()));
                assert!(fields.contains(&"youtubeLink".to_string()));
                assert_eq!(fields.len(), 2);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_age_bounds() {
        let mut martyr = valid_martyr();
        martyr.age = 0;
        assert!(validate_payload(&ContentPayload::Martyr(martyr.clone())).is_err());
        martyr.age = 151;
        assert!(validate_payload(&ContentPayload::Martyr(martyr.clone())).is_err());
        martyr.age = 150;
        assert!(validate_payload(&ContentPayload::Martyr(martyr)).is_ok());
    }

    #[test]
    fn test_youtube_link_hosts() {
        assert!(is_youtube_link("https://youtu.be/abc"));
        assert!(is_youtube_link("https://youtube.com/watch?v=abc"));
        assert!(!is_youtube_link("http://youtube.com/watch?v=abc"));
        assert!(!is_youtube_link("https://evil.com/youtube.com"));
        assert!(!is_youtube_link("https://notyoutube.com/x"));
    }

    #[test]
    fn test_date_formats() {
        assert!(is_valid_date("2011-07-15"));
        assert!(is_valid_date("2011-07-15T12:30:00Z"));
        assert!(!is_valid_date("15/07/2011"));
        assert!(!is_valid_date("2011-13-40"));
        assert!(!is_valid_date("soon"));
    }

    #[test]
    fn test_event_type_whitelist() {
        let mut event = valid_event();
        event.event_type = "party".to_string();
        let err = validate_payload(&ContentPayload::Event(event)).unwrap_err();
        assert!(matches!(err, MemoriaError::Validation(f) if f == vec!["eventType".to_string()]));
    }

    #[test]
    fn test_event_media_validation() {
        let mut event = valid_event();
        event.media = vec![MediaRef {
            media_kind: "hologram".to_string(),
            reference: "".to_string(),
            caption: None,
        }];
        let err = validate_payload(&ContentPayload::Event(event)).unwrap_err();
        match err {
            MemoriaError::Validation(fields) => {
                assert!(fields.contains(&"media.mediaKind".to_string()));
                assert!(fields.contains(&"media.reference".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
