//! Field rules for the registration, login and post forms.
//!
//! Every check runs and pushes its message, so a form comes back with the full
//! list of problems at once. Lengths count characters, not bytes.

use crate::models::{LoginForm, PostForm, RegisterForm};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 10;
pub const EMAIL_MIN: usize = 15;
pub const EMAIL_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 12;
pub const PASSWORD_MAX: usize = 70;
pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 50;
pub const CONTENT_MIN: usize = 20;
pub const CONTENT_MAX: usize = 5000;

pub type Errors = Vec<String>;

fn len(value: &str) -> usize {
    value.chars().count()
}

fn check_length(errors: &mut Errors, label: &str, value: &str, min: usize, max: usize) {
    if value.is_empty() {
        errors.push(format!("{label} cannot be empty."));
        return;
    }
    if len(value) < min {
        errors.push(format!("{label} must be at least {min} characters long"));
    }
    if len(value) > max {
        errors.push(format!("{label} must not exceed {max} characters."));
    }
}

fn check_present(errors: &mut Errors, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{label} cannot be empty."));
    }
}

pub fn validate_username(username: &str, errors: &mut Errors) {
    check_length(errors, "Username", username, USERNAME_MIN, USERNAME_MAX);
    if !username.is_empty() && !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(r#"Username cannot have special characters "!@#$%^&*""#.to_string());
    }
}

pub fn validate_email(email: &str, errors: &mut Errors) {
    check_length(errors, "Email", email, EMAIL_MIN, EMAIL_MAX);
}

/// Registration-only: login accepts a password of any length.
pub fn validate_new_password(password: &str, errors: &mut Errors) {
    check_length(errors, "Password", password, PASSWORD_MIN, PASSWORD_MAX);
}

pub fn validate_title(title: &str, errors: &mut Errors) {
    check_length(errors, "Title", title, TITLE_MIN, TITLE_MAX);
}

/// Expects a form whose username and email have already been trimmed.
pub fn validate_registration(form: &RegisterForm) -> Errors {
    let mut errors = Errors::new();
    validate_username(&form.username, &mut errors);
    validate_email(&form.email, &mut errors);
    validate_new_password(&form.password, &mut errors);
    errors
}

pub fn validate_login(form: &LoginForm) -> Errors {
    let mut errors = Errors::new();
    validate_email(&form.email, &mut errors);
    check_present(&mut errors, "Password", &form.password);
    errors
}

/// New posts only require some content.
pub fn validate_new_post(form: &PostForm) -> Errors {
    let mut errors = Errors::new();
    validate_title(&form.title, &mut errors);
    check_present(&mut errors, "Content", &form.content);
    errors
}

/// Edits additionally bound the content length.
pub fn validate_post_edit(form: &PostForm) -> Errors {
    let mut errors = Errors::new();
    validate_title(&form.title, &mut errors);
    check_length(&mut errors, "Content", &form.content, CONTENT_MIN, CONTENT_MAX);
    errors
}
