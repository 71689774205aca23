//! Structural validation of request parameters.
//!
//! A [`Validator`] is a plain value holding one [`FieldRule`] per named
//! parameter. Build it once at startup and hand it to the service; it holds
//! no state and never touches I/O.

use serde::Serialize;
use thiserror::Error;

/// Maximum length of a user identifier (a hyphenated UUID).
pub const USER_ID_MAX_LEN: usize = 36;
/// Maximum length of a user name.
pub const USER_NAME_MAX_LEN: usize = 64;
/// Maximum length of an item identifier.
pub const ITEM_ID_MAX_LEN: usize = 36;

/// Named request parameters subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// User identifier.
    UserId,
    /// User display name.
    UserName,
    /// Item identifier.
    ItemId,
}

impl Field {
    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::UserName => "user_name",
            Self::ItemId => "item_id",
        }
    }
}

/// Constraint a field value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum Constraint {
    /// Value missing, empty, or only whitespace.
    Required,
    /// Value longer than `max` characters.
    MaxLength {
        /// Longest accepted length in characters.
        max: usize,
    },
}

/// A single violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Offending field.
    pub field: Field,
    /// Constraint it failed.
    #[serde(flatten)]
    pub constraint: Constraint,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.constraint {
            Constraint::Required => write!(f, "{} is required", self.field.as_str()),
            Constraint::MaxLength { max } => {
                write!(f, "{} must be at most {max} characters", self.field.as_str())
            }
        }
    }
}

/// Every constraint violated by one set of parameters.
///
/// ## Invariants
/// - `violations` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Violations in field declaration order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

/// Constraints declared for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    required: bool,
    max_len: Option<usize>,
}

impl FieldRule {
    /// A field that must be present and non-blank.
    pub const fn required() -> Self {
        Self {
            required: true,
            max_len: None,
        }
    }

    /// A field that may be blank.
    pub const fn optional() -> Self {
        Self {
            required: false,
            max_len: None,
        }
    }

    /// Cap the value length, counted in characters.
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    fn apply(self, field: Field, value: &str, violations: &mut Vec<Violation>) {
        if value.trim().is_empty() {
            if self.required {
                violations.push(Violation {
                    field,
                    constraint: Constraint::Required,
                });
            }
            return;
        }
        if let Some(max) = self.max_len
            && value.chars().count() > max
        {
            violations.push(Violation {
                field,
                constraint: Constraint::MaxLength { max },
            });
        }
    }
}

/// User parameters as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserParams<'a> {
    /// User identifier.
    pub user_id: &'a str,
    /// User name; `None` when the operation does not take one.
    pub user_name: Option<&'a str>,
}

impl<'a> UserParams<'a> {
    /// Parameters carrying only an identifier.
    pub const fn id_only(user_id: &'a str) -> Self {
        Self {
            user_id,
            user_name: None,
        }
    }
}

/// Item parameters as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemParams<'a> {
    /// Item identifier.
    pub item_id: &'a str,
}

/// Declarative rule set applied before any transactional work.
///
/// # Examples
/// ```
/// use stockroom::domain::{UserParams, Validator};
///
/// let validator = Validator::default();
/// assert!(validator.check_user(&UserParams::id_only("")).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    user_id: FieldRule,
    user_name: FieldRule,
    item_id: FieldRule,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(
            FieldRule::required().with_max_len(USER_ID_MAX_LEN),
            FieldRule::required().with_max_len(USER_NAME_MAX_LEN),
            FieldRule::required().with_max_len(ITEM_ID_MAX_LEN),
        )
    }
}

impl Validator {
    /// Build a validator from explicit rules.
    pub const fn new(user_id: FieldRule, user_name: FieldRule, item_id: FieldRule) -> Self {
        Self {
            user_id,
            user_name,
            item_id,
        }
    }

    /// Check user parameters, reporting every violation.
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing each violated constraint.
    pub fn check_user(&self, user: &UserParams<'_>) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        self.collect_user(user, &mut violations);
        ValidationError::check(violations)
    }

    /// Check user and item parameters together.
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing each violated constraint.
    pub fn check_user_item(
        &self,
        user: &UserParams<'_>,
        item: &ItemParams<'_>,
    ) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        self.collect_user(user, &mut violations);
        self.item_id
            .apply(Field::ItemId, item.item_id, &mut violations);
        ValidationError::check(violations)
    }

    fn collect_user(&self, user: &UserParams<'_>, violations: &mut Vec<Violation>) {
        self.user_id.apply(Field::UserId, user.user_id, violations);
        if let Some(name) = user.user_name {
            self.user_name.apply(Field::UserName, name, violations);
        }
    }
}
