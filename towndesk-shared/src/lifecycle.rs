/// Task lifecycle rules
///
/// Pure logic with no I/O: every write must pass through this module
/// before it reaches storage. It validates untrusted client input into
/// typed fields, computes completion flips, and stamps the acting user
/// onto the write so `modified_by` is never left to ambient state.
///
/// # Validation contract
///
/// All field violations are collected and returned together in one
/// `ValidationErrors`, one message per field. Callers surface the whole
/// set so a form can re-render every problem at once.
///
/// # Example
///
/// ```
/// use towndesk_shared::lifecycle::{self, TaskDraft};
/// use uuid::Uuid;
///
/// let draft = TaskDraft {
///     title: "Send winter weather alert".to_string(),
///     description: None,
///     priority: Some("emergency".to_string()),
///     due_date: Some("2025-12-01".to_string()),
/// };
///
/// let validated = lifecycle::validate(draft).unwrap();
/// let write = validated.stamped(Uuid::new_v4());
/// assert_eq!(write.priority.as_str(), "emergency");
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::task::{TaskPriority, TaskWrite};

/// Untrusted task payload as submitted by a client
///
/// Priority and due date travel as open strings; validation narrows
/// them into `TaskPriority` and `NaiveDate` so nothing outside the
/// closed sets reaches storage.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskDraft {
    /// Task title, 1-160 characters
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 160,
        message = "title must be between 1 and 160 characters"
    ))]
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Priority as submitted; absent means `normal`
    pub priority: Option<String>,

    /// Due date as an ISO `YYYY-MM-DD` string
    pub due_date: Option<String>,
}

/// Task fields that passed the validation gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Typed priority
    pub priority: TaskPriority,

    /// Parsed due date
    pub due_date: Option<NaiveDate>,
}

impl ValidatedTask {
    /// Attributes the write to the acting user
    ///
    /// Every create/update path goes through here; there is no default
    /// identity fallback, so an actor must be supplied explicitly.
    pub fn stamped(self, actor: Uuid) -> TaskWrite {
        TaskWrite {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            modified_by: actor,
        }
    }
}

/// Validates a draft into typed task fields
///
/// Checks the title length, parses the priority into the closed enum
/// (defaulting to `normal` when absent), and parses the due date when
/// present. Returns every violation together rather than the first.
pub fn validate(draft: TaskDraft) -> Result<ValidatedTask, ValidationErrors> {
    let mut errors = match draft.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let priority = match draft.priority.as_deref() {
        None | Some("") => TaskPriority::default(),
        Some(raw) => match raw.parse::<TaskPriority>() {
            Ok(priority) => priority,
            Err(_) => {
                errors.add(
                    "priority",
                    field_error(
                        "priority",
                        "priority must be one of: normal, resident, emergency",
                    ),
                );
                TaskPriority::default()
            }
        },
    };

    let due_date = match draft.due_date.as_deref() {
        None | Some("") => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(
                    "due_date",
                    field_error("due_date", "due date must be a valid YYYY-MM-DD date"),
                );
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedTask {
        title: draft.title,
        description: draft.description,
        priority,
        due_date,
    })
}

/// Computes a completion flip
///
/// Pending becomes completed at `now`; completed becomes pending.
/// Flipping twice restores the original completion state, though the
/// second flip is a real write, not a no-op.
pub fn toggled_completion(
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match current {
        None => Some(now),
        Some(_) => None,
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, priority: Option<&str>, due_date: Option<&str>) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
            priority: priority.map(str::to_string),
            due_date: due_date.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        let validated = validate(draft(
            "Water main break repair update",
            Some("emergency"),
            Some("2025-08-08"),
        ))
        .unwrap();

        assert_eq!(validated.title, "Water main break repair update");
        assert_eq!(validated.priority, TaskPriority::Emergency);
        assert_eq!(
            validated.due_date,
            NaiveDate::from_ymd_opt(2025, 8, 8)
        );
    }

    #[test]
    fn test_priority_defaults_to_normal_when_absent() {
        let validated = validate(draft("Library closure notice", None, None)).unwrap();
        assert_eq!(validated.priority, TaskPriority::Normal);
    }

    #[test]
    fn test_title_at_limit_passes() {
        let validated = validate(draft(&"x".repeat(160), None, None)).unwrap();
        assert_eq!(validated.title.len(), 160);
    }

    #[test]
    fn test_title_over_limit_cites_title_field() {
        let errors = validate(draft(&"x".repeat(161), None, None)).unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn test_empty_title_cites_title_field() {
        let errors = validate(draft("", None, None)).unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = validate(draft("", Some("urgent"), Some("tomorrow"))).unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("priority"));
        assert!(fields.contains_key("due_date"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let errors = validate(draft("Snow removal", Some("critical"), None)).unwrap_err();
        assert!(errors.field_errors().contains_key("priority"));
    }

    #[test]
    fn test_malformed_due_date_rejected() {
        let errors = validate(draft("Snow removal", None, Some("08/30/2025"))).unwrap_err();
        assert!(errors.field_errors().contains_key("due_date"));
    }

    #[test]
    fn test_toggle_sets_then_clears() {
        let now = Utc::now();

        let completed = toggled_completion(None, now);
        assert_eq!(completed, Some(now));

        let pending = toggled_completion(completed, Utc::now());
        assert_eq!(pending, None);
    }

    #[test]
    fn test_stamped_records_actor() {
        let actor = Uuid::new_v4();
        let write = validate(draft("Budget hearing notice", Some("resident"), None))
            .unwrap()
            .stamped(actor);

        assert_eq!(write.modified_by, actor);
        assert_eq!(write.priority, TaskPriority::Resident);
    }
}
