//! Field- and form-level validation.
//!
//! Rules run in a fixed precedence: the required check first, then the
//! type-specific check for the field's semantic name; the first failing rule
//! wins. Failures are reported by value and as per-field UI state — nothing
//! here ever panics or returns early through an error type.

use lazy_static::lazy_static;
use regex::Regex;

use crate::contact::ContactForm;
use crate::effects::Toast;
use crate::member::{LoginForm, RegisterForm};
use crate::password;

pub const MSG_REQUIRED: &str = "此欄位為必填";
pub const MSG_EMAIL: &str = "請輸入有效的電子郵件格式";
pub const MSG_WEAK_PASSWORD: &str = "密碼強度太弱，請包含字母、數字和特殊字元";
pub const MSG_PHONE: &str = "請輸入有效的電話號碼";
pub const MSG_NAME_MIN: &str = "姓名至少需要 2 個字元";
pub const MSG_NAME_MAX: &str = "姓名不能超過 50 個字元";
pub const MSG_SUBJECT_MIN: &str = "主旨至少需要 5 個字元";
pub const MSG_SUBJECT_MAX: &str = "主旨不能超過 200 個字元";
pub const MSG_MESSAGE_MIN: &str = "訊息內容至少需要 10 個字元";
pub const MSG_MESSAGE_MAX: &str = "訊息內容不能超過 1000 個字元";
pub const MSG_PASSWORD_MISMATCH: &str = "密碼不一致";
pub const MSG_AGREE_TERMS: &str = "請同意服務條款";
pub const MSG_AGREE_PRIVACY: &str = "請同意隱私政策";
pub const MSG_CONTACT_METHOD: &str = "請至少選擇一種偏好聯絡方式";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_AUTH_RE: Regex = Regex::new(r"^[\d\s\-\+\(\)]{8,15}$").unwrap();
}

/// Which page's rule set applies. The two pages disagree on the phone rule
/// and on the upper bound for names; the divergence is deliberate and kept
/// per-context rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormContext {
    Auth,
    Contact,
}

/// Visible state of a field group. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Neutral,
    Success,
    Error,
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub status: FieldStatus,
    pub message: Option<String>,
}

impl FieldCheck {
    fn success() -> Self {
        Self {
            status: FieldStatus::Success,
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: FieldStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status != FieldStatus::Error
    }
}

/// Validate one field by its semantic name. The value is trimmed first; an
/// empty optional field passes. Calling this again with the same inputs
/// yields the same result.
pub fn validate_field(name: &str, value: &str, required: bool, ctx: FormContext) -> FieldCheck {
    let value = value.trim();

    if value.is_empty() {
        return if required {
            FieldCheck::error(MSG_REQUIRED)
        } else {
            FieldCheck::success()
        };
    }

    match name {
        "email" => {
            if EMAIL_RE.is_match(value) {
                FieldCheck::success()
            } else {
                FieldCheck::error(MSG_EMAIL)
            }
        }
        "password" => {
            if password::strength(value).score < 2 {
                FieldCheck::error(MSG_WEAK_PASSWORD)
            } else {
                FieldCheck::success()
            }
        }
        "phone" => {
            if phone_is_valid(value, ctx) {
                FieldCheck::success()
            } else {
                FieldCheck::error(MSG_PHONE)
            }
        }
        "name" => {
            let len = value.chars().count();
            if len < 2 {
                FieldCheck::error(MSG_NAME_MIN)
            } else if ctx == FormContext::Contact && len > 50 {
                FieldCheck::error(MSG_NAME_MAX)
            } else {
                FieldCheck::success()
            }
        }
        "subject" if ctx == FormContext::Contact => {
            length_bounds(value, 5, 200, MSG_SUBJECT_MIN, MSG_SUBJECT_MAX)
        }
        "message" if ctx == FormContext::Contact => {
            length_bounds(value, 10, 1000, MSG_MESSAGE_MIN, MSG_MESSAGE_MAX)
        }
        _ => FieldCheck::success(),
    }
}

fn length_bounds(
    value: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
) -> FieldCheck {
    let len = value.chars().count();
    if len < min {
        FieldCheck::error(too_short)
    } else if len > max {
        FieldCheck::error(too_long)
    } else {
        FieldCheck::success()
    }
}

fn phone_is_valid(value: &str, ctx: FormContext) -> bool {
    match ctx {
        // Auth page: 8–15 characters drawn from digits and formatting marks.
        FormContext::Auth => PHONE_AUTH_RE.is_match(value),
        // Contact page: strip formatting, require 8–11 digits.
        FormContext::Contact => {
            let digits: String = value
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                .collect();
            (8..=11).contains(&digits.chars().count())
                && digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// Aggregated outcome of a whole-form validation pass: per-field states in
/// form order, the first invalid field (for scroll/focus), and any toasts
/// raised by the checkbox-group rules.
#[derive(Debug, Default)]
pub struct ValidationReport {
    fields: Vec<(String, FieldCheck)>,
    toasts: Vec<Toast>,
    first_invalid: Option<String>,
}

impl ValidationReport {
    pub fn record(&mut self, name: &str, check: FieldCheck) {
        if !check.is_valid() && self.first_invalid.is_none() {
            self.first_invalid = Some(name.to_string());
        }
        // A later rule for the same field replaces the earlier outcome, the
        // way a second showError overwrites the slot.
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| n == name) {
            entry.1 = check;
        } else {
            self.fields.push((name.to_string(), check));
        }
    }

    pub fn push_toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|(_, c)| c.is_valid()) && self.toasts.is_empty()
    }

    pub fn status(&self, name: &str) -> FieldStatus {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map_or(FieldStatus::Neutral, |(_, c)| c.status)
    }

    pub fn error_message(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, c)| c.message.as_deref())
    }

    pub fn first_invalid(&self) -> Option<&str> {
        self.first_invalid.as_deref()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn replace_toasts(&mut self, toasts: Vec<Toast>) {
        self.toasts = toasts;
    }
}

pub fn validate_login(form: &LoginForm) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.record(
        "email",
        validate_field("email", &form.email, true, FormContext::Auth),
    );
    report.record(
        "password",
        validate_field("password", &form.password, true, FormContext::Auth),
    );
    report
}

pub fn validate_register(form: &RegisterForm) -> ValidationReport {
    let ctx = FormContext::Auth;
    let mut report = ValidationReport::default();
    report.record("name", validate_field("name", &form.name, true, ctx));
    report.record("email", validate_field("email", &form.email, true, ctx));
    report.record("phone", validate_field("phone", &form.phone, false, ctx));
    report.record(
        "occupation",
        validate_field("occupation", &form.occupation, false, ctx),
    );
    report.record(
        "company",
        validate_field("company", &form.company, false, ctx),
    );
    report.record(
        "password",
        validate_field("password", &form.password, true, ctx),
    );
    report.record(
        "confirmPassword",
        validate_field("confirmPassword", &form.confirm_password, true, ctx),
    );

    if form.password != form.confirm_password {
        report.record("confirmPassword", FieldCheck::error(MSG_PASSWORD_MISMATCH));
    }

    if !form.agree_terms {
        report.record("agreeTerms", FieldCheck::error(MSG_AGREE_TERMS));
        report.push_toast(Toast::warning(MSG_AGREE_TERMS));
    }

    report
}

pub fn validate_contact(form: &ContactForm) -> ValidationReport {
    let ctx = FormContext::Contact;
    let mut report = ValidationReport::default();
    report.record("name", validate_field("name", &form.name, true, ctx));
    report.record("email", validate_field("email", &form.email, true, ctx));
    report.record("phone", validate_field("phone", &form.phone, false, ctx));
    report.record(
        "company",
        validate_field("company", &form.company, false, ctx),
    );
    report.record(
        "inquiryType",
        validate_field("inquiryType", &form.inquiry_type, true, ctx),
    );
    report.record(
        "subject",
        validate_field("subject", &form.subject, true, ctx),
    );
    report.record(
        "message",
        validate_field("message", &form.message, true, ctx),
    );

    if !form.agree_privacy {
        report.record("agreePrivacy", FieldCheck::error(MSG_AGREE_PRIVACY));
        report.push_toast(Toast::warning(MSG_AGREE_PRIVACY));
    }

    if form.contact_methods.is_empty() {
        report.push_toast(Toast::warning(MSG_CONTACT_METHOD));
    }

    report
}
