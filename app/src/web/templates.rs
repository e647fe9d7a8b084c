use askama::Template;
use domain::contact::ContactForm;
use domain::effects::Toast;
use domain::member::RegisterForm;
use domain::submission::SubmissionOutcome;
use domain::validation::{FieldStatus, ValidationReport};

/// Per-field presentation state: the value to re-render, the class on the
/// form group and the text of its error slot (empty when there is none).
#[derive(Clone, Default)]
pub struct FieldView {
    pub value: String,
    pub class: String,
    pub error: String,
}

impl FieldView {
    pub fn neutral(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn invalid(value: &str, message: &str) -> Self {
        Self {
            value: value.to_string(),
            class: "error".to_string(),
            error: message.to_string(),
        }
    }

    pub fn checked(name: &str, value: &str, report: &ValidationReport) -> Self {
        let class = match report.status(name) {
            FieldStatus::Neutral => "",
            FieldStatus::Success => "success",
            FieldStatus::Error => "error",
        };
        Self {
            value: value.to_string(),
            class: class.to_string(),
            error: report.error_message(name).unwrap_or("").to_string(),
        }
    }
}

/// A toast ready for display: message, background color, and how long the
/// page keeps it up before the dismiss animation.
#[derive(Clone)]
pub struct ToastView {
    pub message: String,
    pub color: String,
    pub duration_ms: u128,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            message: toast.message.clone(),
            color: toast.kind.color().to_string(),
            duration_ms: toast.duration.as_millis(),
        }
    }
}

/// Field-group toasts from the validation report, then the outcome toast.
fn collect_toasts(outcome: &SubmissionOutcome) -> Vec<ToastView> {
    let mut toasts: Vec<ToastView> = outcome.report.toasts().iter().map(ToastView::from).collect();
    if let Some(toast) = &outcome.toast {
        toasts.push(ToastView::from(toast));
    }
    toasts
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user_name: String,
    pub newsletter_email: FieldView,
    pub toasts: Vec<ToastView>,
}

impl IndexTemplate {
    pub fn new(user_name: Option<String>) -> Self {
        Self {
            user_name: user_name.unwrap_or_default(),
            newsletter_email: FieldView::default(),
            toasts: Vec::new(),
        }
    }
}

/// The auth page carries both panels; `tab` picks which one is shown.
#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub user_name: String,
    pub tab: String,
    pub registered: bool,
    pub login_email: FieldView,
    pub login_password: FieldView,
    pub name: FieldView,
    pub email: FieldView,
    pub phone: FieldView,
    pub occupation: FieldView,
    pub company: FieldView,
    pub password: FieldView,
    pub confirm_password: FieldView,
    pub terms_error: String,
    pub toasts: Vec<ToastView>,
}

impl AuthTemplate {
    pub fn blank(tab: &str) -> Self {
        Self {
            user_name: String::new(),
            tab: tab.to_string(),
            registered: false,
            login_email: FieldView::default(),
            login_password: FieldView::default(),
            name: FieldView::default(),
            email: FieldView::default(),
            phone: FieldView::default(),
            occupation: FieldView::default(),
            company: FieldView::default(),
            password: FieldView::default(),
            confirm_password: FieldView::default(),
            terms_error: String::new(),
            toasts: Vec::new(),
        }
    }

    /// Re-render the login panel after a failed attempt. The password is
    /// never echoed back.
    pub fn failed_login(email: &str, outcome: &SubmissionOutcome) -> Self {
        let report = &outcome.report;
        Self {
            login_email: FieldView::checked("email", email, report),
            login_password: FieldView::checked("password", "", report),
            toasts: collect_toasts(outcome),
            ..Self::blank("login")
        }
    }

    pub fn failed_register(form: &RegisterForm, outcome: &SubmissionOutcome) -> Self {
        let report = &outcome.report;
        Self {
            name: FieldView::checked("name", &form.name, report),
            email: FieldView::checked("email", &form.email, report),
            phone: FieldView::checked("phone", &form.phone, report),
            occupation: FieldView::checked("occupation", &form.occupation, report),
            company: FieldView::checked("company", &form.company, report),
            password: FieldView::checked("password", "", report),
            confirm_password: FieldView::checked("confirmPassword", "", report),
            terms_error: report.error_message("agreeTerms").unwrap_or("").to_string(),
            toasts: collect_toasts(outcome),
            ..Self::blank("register")
        }
    }

    /// Success panel shown in place of the registration form.
    pub fn registered() -> Self {
        Self {
            registered: true,
            ..Self::blank("login")
        }
    }
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub user_name: String,
    pub submitted: bool,
    pub name: FieldView,
    pub email: FieldView,
    pub phone: FieldView,
    pub company: FieldView,
    pub inquiry_type: FieldView,
    pub subject: FieldView,
    pub message: FieldView,
    pub method_email: bool,
    pub method_phone: bool,
    pub method_line: bool,
    pub subscribe_updates: bool,
    pub privacy_error: String,
    pub toasts: Vec<ToastView>,
}

impl ContactTemplate {
    pub fn blank() -> Self {
        Self {
            user_name: String::new(),
            submitted: false,
            name: FieldView::default(),
            email: FieldView::default(),
            phone: FieldView::default(),
            company: FieldView::default(),
            inquiry_type: FieldView::default(),
            subject: FieldView::default(),
            message: FieldView::default(),
            method_email: false,
            method_phone: false,
            method_line: false,
            subscribe_updates: false,
            privacy_error: String::new(),
            toasts: Vec::new(),
        }
    }

    /// Signed-in members get their name and email filled in.
    pub fn prefilled(name: &str, email: &str) -> Self {
        Self {
            user_name: name.to_string(),
            name: FieldView::neutral(name),
            email: FieldView::neutral(email),
            ..Self::blank()
        }
    }

    pub fn failed(form: &ContactForm, outcome: &SubmissionOutcome, user_name: &str) -> Self {
        let report = &outcome.report;
        let has_method = |m: &str| form.contact_methods.iter().any(|v| v == m);
        Self {
            user_name: user_name.to_string(),
            name: FieldView::checked("name", &form.name, report),
            email: FieldView::checked("email", &form.email, report),
            phone: FieldView::checked("phone", &form.phone, report),
            company: FieldView::checked("company", &form.company, report),
            inquiry_type: FieldView::checked("inquiryType", &form.inquiry_type, report),
            subject: FieldView::checked("subject", &form.subject, report),
            message: FieldView::checked("message", &form.message, report),
            method_email: has_method("email"),
            method_phone: has_method("phone"),
            method_line: has_method("line"),
            subscribe_updates: form.subscribe_updates,
            privacy_error: report.error_message("agreePrivacy").unwrap_or("").to_string(),
            toasts: collect_toasts(outcome),
            ..Self::blank()
        }
    }

    /// Success panel shown in place of the form.
    pub fn success(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            submitted: true,
            ..Self::blank()
        }
    }
}
