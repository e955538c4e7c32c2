use crate::error::ValidationErrors;
use crate::hang::{CategoryID, UserID};
use serde::{Deserialize, Serialize};

pub const TITLE_LENGTH: std::ops::RangeInclusive<usize> = 3..=100;
pub const DESCRIPTION_MAX_LENGTH: usize = 2000;
pub const CAPACITY: std::ops::RangeInclusive<u32> = 2..=1000;
pub const MESSAGE_LENGTH: std::ops::RangeInclusive<usize> = 1..=2000;

/// Hyphenated UUID, any case.
pub fn is_uuid(candidate: &str) -> bool {
    static UUID_PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let uuid_pattern = UUID_PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[0-9a-fA-F]{8}(-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}$")
            .expect("constant pattern should parse")
    });

    uuid_pattern.is_match(candidate)
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    allowed: std::ops::RangeInclusive<usize>,
) {
    let length = value.trim().chars().count();
    if !allowed.contains(&length) {
        errors.push(
            field,
            format!(
                "must be between {} and {} characters",
                allowed.start(),
                allowed.end()
            ),
        );
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: CategoryID,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub max_attendees: Option<u32>,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        check_length(&mut errors, "title", &self.title, TITLE_LENGTH);

        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LENGTH {
                errors.push(
                    "description",
                    format!("must be at most {DESCRIPTION_MAX_LENGTH} characters"),
                );
            }
        }

        if !is_uuid(&self.category_id) {
            errors.push("category_id", "must be a category id");
        }

        let start = match crate::window::parse_timestamp("start_time", &self.start_time) {
            Ok(start) => Some(start),
            Err(err) => {
                errors.0.push(err);
                None
            }
        };
        let end = match crate::window::parse_timestamp("end_time", &self.end_time) {
            Ok(end) => Some(end),
            Err(err) => {
                errors.0.push(err);
                None
            }
        };
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.push("end_time", "must be after the start time");
            }
        }

        if let Some(capacity) = self.max_attendees {
            if !CAPACITY.contains(&capacity) {
                errors.push(
                    "max_attendees",
                    format!("must be between {} and {}", CAPACITY.start(), CAPACITY.end()),
                );
            }
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageDraft {
    pub recipient_id: UserID,
    pub body: String,
}

impl MessageDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if !is_uuid(&self.recipient_id) {
            errors.push("recipient_id", "must be a user id");
        }
        check_length(&mut errors, "body", &self.body, MESSAGE_LENGTH);

        errors.into_result()
    }
}
