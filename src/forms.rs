//! Account forms posted by the login and registration pages.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub const REQUIRED: &str = "Обязательное поле.";
pub const PASSWORDS_DIFFER: &str = "Пароли не совпали";
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
pub const BAD_CREDENTIALS: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль.";

/// Key for messages that belong to no single field
pub const NON_FIELD: &str = "__all__";

lazy_static! {
    static ref PHONE_RE: Regex =
        Regex::new(r"^((8|\+7)[\- ]?)?(\(?\d{3}\)?[\- ]?)?[\d\- ]{7,10}$").unwrap();
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(REQUIRED.into());
        return Err(err);
    }
    if username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username");
        err.message = Some("Допустимы только буквы, цифры и символы @/./+/-/_.".into());
        Err(err)
    }
}

/// Empty means "no phone"
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Wrong number".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(
        length(max = 150, message = "Не более 150 символов."),
        custom = "validate_username"
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Обязательное поле."))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Обязательное поле."))]
    pub password2: String,
    #[serde(default)]
    #[validate(
        length(max = 20, message = "Не более 20 символов."),
        custom = "validate_phone"
    )]
    pub phone: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl RegistrationForm {
    /// Field rules plus the password confirmation check
    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        if !self.password.is_empty()
            && !self.password2.is_empty()
            && self.password != self.password2
        {
            errors.add("password2", PASSWORDS_DIFFER);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Обязательное поле."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Обязательное поле."))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        self.validate().map_err(FormErrors::from)
    }
}

/// Messages per form field, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(NON_FIELD, message);
        errors
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field, message);
            }
        }
        out
    }
}
