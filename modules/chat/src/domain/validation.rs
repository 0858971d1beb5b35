//! Signup field rules.
//!
//! Per-field rules run for every field and their failures are collected
//! together; the cross-field rule (password vs. username) only runs once every
//! field is individually valid. Within a field, shape rules run before the
//! uniqueness lookup, and the first failing rule wins.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid"));

static DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Nd}").expect("digit pattern is valid"));

static LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("letter pattern is valid"));

/// Signup input fields, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordWeakness {
    TooShort { min: usize },
    MissingDigit,
    MissingLetter,
}

impl fmt::Display for PasswordWeakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => {
                write!(f, "Password must be at least {min} characters long.")
            }
            Self::MissingDigit => f.write_str("Password must contain at least one digit."),
            Self::MissingLetter => f.write_str("Password must contain at least one letter."),
        }
    }
}

/// A single reason a field was rejected. `Display` is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,
    #[error("This field may not be blank.")]
    Blank,
    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },
    #[error("Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")]
    InvalidUsername,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("This username is already taken.")]
    DuplicateUsername,
    #[error("This email is already in use.")]
    DuplicateEmail,
    #[error("{0}")]
    WeakPassword(PasswordWeakness),
    #[error("Password cannot be the same as the username.")]
    PasswordMatchesUsername,
}

/// Field-keyed set of validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, Vec<FieldError>>,
}

impl ValidationErrors {
    pub fn single(field: Field, error: FieldError) -> Self {
        let mut errors = Self::default();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: Field, error: FieldError) {
        self.errors.entry(field).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> &[FieldError] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: Field, error: &FieldError) -> bool {
        self.get(field).contains(error)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    /// Render as `{field: [message, ...]}`.
    pub fn to_messages(&self) -> BTreeMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, errs)| {
                (
                    field.as_str().to_string(),
                    errs.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errs) in &self.errors {
            for e in errs {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {e}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Tunable limits for signup rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignupRules {
    pub min_password_length: usize,
    pub max_username_length: usize,
    pub max_email_length: usize,
    pub max_password_length: usize,
}

impl Default for SignupRules {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            max_username_length: 150,
            max_email_length: 254,
            max_password_length: 128,
        }
    }
}

/// Missing → `Required`; empty or whitespace-only → `Blank`.
pub fn require(value: Option<&str>) -> Result<&str, FieldError> {
    match value {
        None => Err(FieldError::Required),
        Some(v) if v.trim().is_empty() => Err(FieldError::Blank),
        Some(v) => Ok(v),
    }
}

pub fn check_username_shape(username: &str, rules: &SignupRules) -> Result<(), FieldError> {
    if username.chars().count() > rules.max_username_length {
        return Err(FieldError::TooLong {
            max: rules.max_username_length,
        });
    }
    if !USERNAME_RE.is_match(username) {
        return Err(FieldError::InvalidUsername);
    }
    Ok(())
}

pub fn check_email_shape(email: &str, rules: &SignupRules) -> Result<(), FieldError> {
    if email.chars().count() > rules.max_email_length {
        return Err(FieldError::TooLong {
            max: rules.max_email_length,
        });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// Length counts characters, not bytes. A digit is a decimal digit (`Nd`) and a
/// letter is any `L*` category; numerals such as `½` or `Ⅷ` count as neither.
pub fn check_password_strength(password: &str, rules: &SignupRules) -> Result<(), FieldError> {
    let length = password.chars().count();
    if length > rules.max_password_length {
        return Err(FieldError::TooLong {
            max: rules.max_password_length,
        });
    }

    let weakness = if length < rules.min_password_length {
        Some(PasswordWeakness::TooShort {
            min: rules.min_password_length,
        })
    } else if !DIGIT_RE.is_match(password) {
        Some(PasswordWeakness::MissingDigit)
    } else if !LETTER_RE.is_match(password) {
        Some(PasswordWeakness::MissingLetter)
    } else {
        None
    };

    match weakness {
        Some(w) => Err(FieldError::WeakPassword(w)),
        None => Ok(()),
    }
}

/// Case-insensitive comparison of password and username.
pub fn check_password_differs(username: &str, password: &str) -> Result<(), FieldError> {
    if username.to_lowercase() == password.to_lowercase() {
        return Err(FieldError::PasswordMatchesUsername);
    }
    Ok(())
}
