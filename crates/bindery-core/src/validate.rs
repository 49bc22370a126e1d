//! The validation seam.
//!
//! Binding stages validate the populated model through the [`Validator`]
//! trait. The default implementation, [`RuleValidator`], runs the rules
//! declared with the `validator` crate's `#[validate(...)]` attributes and
//! flattens its nested error tree into a list of [`Violation`]s with dotted
//! paths (`address.city`, `[0].first_name`).
//!
//! A failing validator reports one [`ValidationFailure`], which the binding
//! stage records as a single validation error regardless of how many fields
//! failed.

use crate::cancel::Cancellation;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validates populated models.
pub trait Validator<M>: Send + Sync {
    /// Checks `model`, honouring `cancel` when it has fired.
    fn validate(&self, model: &M, cancel: &Cancellation) -> Result<(), ValidationFailure>;
}

impl<M, F> Validator<M> for F
where
    F: Fn(&M, &Cancellation) -> Result<(), ValidationFailure> + Send + Sync,
{
    fn validate(&self, model: &M, cancel: &Cancellation) -> Result<(), ValidationFailure> {
        self(model, cancel)
    }
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path of the field, with `[i]` for sequence positions.
    pub path: String,
    /// The rule code (`length`, `email`, `range`, ...).
    pub code: String,
    /// The rule's custom message, if one was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Violation {
    /// Creates a violation without a custom message.
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: None,
        }
    }

    /// Attaches a custom message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {:?} failed on the {:?} rule", self.path, self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// The aggregate outcome of a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// One or more rules failed.
    #[error("{}", join_violations(.0))]
    Violations(Vec<Violation>),
    /// Validation stopped because the request was cancelled.
    #[error("validation cancelled")]
    Cancelled,
    /// A validator-specific failure.
    #[error("{0}")]
    Other(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    /// The individual rule failures, empty for non-rule failures.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Violations(violations) => violations,
            Self::Cancelled | Self::Other(_) => &[],
        }
    }

    /// Returns the first violation recorded for `path`.
    #[must_use]
    pub fn violation_for(&self, path: &str) -> Option<&Violation> {
        self.violations().iter().find(|v| v.path == path)
    }

    /// Returns `true` if validation was cut short by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        flatten("", &errors, &mut violations);
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        Self::Violations(violations)
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &field.to_string());
        match kind {
            ValidationErrorsKind::Field(failures) => {
                out.extend(failures.iter().map(|failure| Violation {
                    path: path.clone(),
                    code: failure.code.to_string(),
                    message: failure.message.as_ref().map(ToString::to_string),
                }));
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Validator backed by `#[derive(validator::Validate)]` rules.
///
/// # Example
///
/// ```
/// use bindery_core::{Cancellation, RuleValidator, Validator};
/// use validator::Validate;
///
/// #[derive(Default, Validate)]
/// struct SignUp {
///     #[validate(length(min = 1))]
///     username: String,
/// }
///
/// let failure = RuleValidator::<SignUp>::new()
///     .validate(&SignUp::default(), &Cancellation::new())
///     .unwrap_err();
/// assert_eq!(failure.violations()[0].path, "username");
/// ```
pub struct RuleValidator<M> {
    rules: fn(&M) -> Vec<Violation>,
}

impl<M: Validate> RuleValidator<M> {
    /// Runs the model's own rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: record_violations::<M>,
        }
    }
}

impl<M: Validate> Default for RuleValidator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Validate> RuleValidator<Vec<T>> {
    /// Runs the element rules on every element of a sequence model.
    ///
    /// Paths are prefixed with the element position, e.g. `[0].first_name`.
    #[must_use]
    pub fn each() -> Self {
        Self {
            rules: element_violations::<T>,
        }
    }
}

fn record_violations<M: Validate>(model: &M) -> Vec<Violation> {
    let mut out = Vec::new();
    if let Err(errors) = model.validate() {
        flatten("", &errors, &mut out);
    }
    out
}

#[allow(clippy::ptr_arg)]
fn element_violations<T: Validate>(items: &Vec<T>) -> Vec<Violation> {
    let mut out = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if let Err(errors) = item.validate() {
            flatten(&format!("[{index}]"), &errors, &mut out);
        }
    }
    out
}

impl<M> fmt::Debug for RuleValidator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleValidator")
            .field("model", &std::any::type_name::<M>())
            .finish()
    }
}

impl<M> Validator<M> for RuleValidator<M> {
    fn validate(&self, model: &M, cancel: &Cancellation) -> Result<(), ValidationFailure> {
        if cancel.is_cancelled() {
            return Err(ValidationFailure::Cancelled);
        }
        let mut violations = (self.rules)(model);
        if violations.is_empty() {
            return Ok(());
        }
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        Err(ValidationFailure::Violations(violations))
    }
}

/// Validator that accepts every model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<M> Validator<M> for AcceptAll {
    fn validate(&self, _model: &M, _cancel: &Cancellation) -> Result<(), ValidationFailure> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Validate)]
    struct Address {
        #[validate(length(min = 1))]
        city: String,
    }

    #[derive(Debug, Default, Validate)]
    struct User {
        #[validate(length(min = 1))]
        first_name: String,
        #[validate(email)]
        email: String,
        #[validate(range(max = 130))]
        age: u8,
        #[validate(nested)]
        address: Address,
    }

    fn valid_user() -> User {
        User {
            first_name: "Logan".into(),
            email: "logan@example.com".into(),
            age: 30,
            address: Address {
                city: "Browser".into(),
            },
        }
    }

    #[test]
    fn test_valid_model_passes() {
        let validator = RuleValidator::<User>::new();
        assert!(validator.validate(&valid_user(), &Cancellation::new()).is_ok());
    }

    #[test]
    fn test_violations_are_flattened_and_sorted() {
        let mut user = valid_user();
        user.first_name.clear();
        user.address.city.clear();
        user.age = 200;

        let failure = RuleValidator::<User>::new()
            .validate(&user, &Cancellation::new())
            .unwrap_err();

        let paths: Vec<_> = failure.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["address.city", "age", "first_name"]);
        assert_eq!(failure.violation_for("age").unwrap().code, "range");
        assert!(failure.to_string().contains(r#"field "first_name" failed on the "length" rule"#));
    }

    #[test]
    fn test_each_prefixes_positions() {
        let mut second = valid_user();
        second.first_name.clear();
        let users = vec![valid_user(), second];

        let failure = RuleValidator::<Vec<User>>::each()
            .validate(&users, &Cancellation::new())
            .unwrap_err();

        assert_eq!(failure.violations().len(), 1);
        assert_eq!(failure.violations()[0].path, "[1].first_name");
    }

    #[test]
    fn test_cancelled_before_running() {
        let cancel = Cancellation::new();
        cancel.cancel();

        let failure = RuleValidator::<User>::new()
            .validate(&User::default(), &cancel)
            .unwrap_err();
        assert!(failure.is_cancelled());
        assert!(failure.violations().is_empty());
    }

    #[test]
    fn test_closure_and_accept_all() {
        let reject = |user: &User, _: &Cancellation| {
            if user.age < 18 {
                Err(ValidationFailure::Other("too young".into()))
            } else {
                Ok(())
            }
        };
        let failure = reject.validate(&User::default(), &Cancellation::new()).unwrap_err();
        assert_eq!(failure.to_string(), "too young");

        assert!(Validator::<User>::validate(&AcceptAll, &User::default(), &Cancellation::new()).is_ok());
    }

    #[test]
    fn test_violation_display_with_message() {
        let violation = Violation::new("email", "email").with_message("must be an address");
        assert_eq!(
            violation.to_string(),
            r#"field "email" failed on the "email" rule: must be an address"#
        );
    }
}
