//! Submission orchestration: validate, enter the loading state, call the
//! backend (or its fallback), and report the outcome.
//!
//! Each submission walks the phase machine
//! idle → validating → (idle | submitting → (succeeded | failed → idle)).
//! A validation failure never reaches the backend; a failed primary call is
//! retryable only by the user resubmitting. Secondary writes on the
//! succeeded path are best-effort: their failures are logged and never
//! surface or revert the success.

use serde_json::json;
use tracing::{error, info, warn};

use crate::contact::ContactForm;
use crate::core::Portal;
use crate::effects::{NEWSLETTER_THANKS, Toast};
use crate::member::{AuthUser, LoginForm, RegisterForm};
use crate::validation::{
    FieldCheck, FormContext, ValidationReport, validate_contact, validate_field, validate_login,
    validate_register,
};
use std::time::Duration;

pub const MSG_LOGIN_OK: &str = "登入成功！";
pub const MSG_LOGIN_OK_DEMO: &str = "登入成功！（演示模式）";
pub const MSG_LOGIN_FAILED: &str = "登入失敗，請檢查您的帳號密碼";
pub const MSG_REGISTER_FAILED: &str = "註冊失敗，請稍後再試";
pub const MSG_CONTACT_FAILED: &str = "訊息傳送失敗，請稍後再試";

/// Toasts on the contact page linger a second longer.
const CONTACT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Phase tracker. Transitions are driven only from this module; anything
/// else the machine is asked to do is a bug and is logged, not applied.
#[derive(Debug)]
struct Submission {
    phase: SubmissionPhase,
    trace: Vec<SubmissionPhase>,
}

impl Submission {
    fn start() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            trace: vec![SubmissionPhase::Idle],
        }
    }

    fn advance(&mut self, next: SubmissionPhase) {
        use SubmissionPhase::{Failed, Idle, Submitting, Succeeded, Validating};
        let legal = matches!(
            (self.phase, next),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, Submitting)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
                | (Failed, Idle)
        );
        if legal {
            self.phase = next;
            self.trace.push(next);
        } else {
            error!("illegal submission transition {:?} -> {next:?}", self.phase);
        }
    }
}

/// What a submission attempt left behind, for the presentation layer to
/// mirror: the final phase, the full phase trace, per-field validation
/// state, an optional toast, and where to go on success.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub phase: SubmissionPhase,
    pub trace: Vec<SubmissionPhase>,
    pub report: ValidationReport,
    pub toast: Option<Toast>,
    pub redirect: Option<String>,
    pub user: Option<AuthUser>,
}

impl SubmissionOutcome {
    pub fn succeeded(&self) -> bool {
        self.phase == SubmissionPhase::Succeeded
    }

    fn from_parts(sub: Submission, report: ValidationReport) -> Self {
        Self {
            phase: sub.phase,
            trace: sub.trace,
            report,
            toast: None,
            redirect: None,
            user: None,
        }
    }
}

impl Portal {
    /// Handle a login submission. On success the caller redirects to the
    /// landing page; a member-activity record is written best-effort against
    /// the hosted backend.
    pub async fn login(&self, form: &LoginForm, user_agent: Option<&str>) -> SubmissionOutcome {
        let mut sub = Submission::start();
        sub.advance(SubmissionPhase::Validating);

        let report = validate_login(form);
        if !report.is_valid() {
            sub.advance(SubmissionPhase::Idle);
            return SubmissionOutcome::from_parts(sub, report);
        }

        sub.advance(SubmissionPhase::Submitting);
        match self
            .backend()
            .sign_in_with_password(&form.email, &form.password)
            .await
        {
            Ok(user) => {
                sub.advance(SubmissionPhase::Succeeded);
                info!("login succeeded for {}", user.email);
                self.log_member_activity("login", "會員登入", &user, user_agent)
                    .await;

                let message = if self.is_hosted() {
                    MSG_LOGIN_OK
                } else {
                    MSG_LOGIN_OK_DEMO
                };
                let mut outcome = SubmissionOutcome::from_parts(sub, report);
                outcome.toast = Some(Toast::success(message));
                outcome.redirect = Some("/".to_string());
                outcome.user = Some(user);
                outcome
            }
            Err(e) => {
                warn!("login failed for {}: {e}", form.email);
                sub.advance(SubmissionPhase::Failed);
                sub.advance(SubmissionPhase::Idle);
                let mut outcome = SubmissionOutcome::from_parts(sub, report);
                outcome.toast = Some(Toast::error(
                    e.user_message().unwrap_or(MSG_LOGIN_FAILED).to_string(),
                ));
                outcome
            }
        }
    }

    /// Handle a registration submission. On success the page switches to its
    /// success panel; the members row and the newsletter subscription are
    /// written best-effort and never revert the success.
    pub async fn register(&self, form: &RegisterForm) -> SubmissionOutcome {
        let mut sub = Submission::start();
        sub.advance(SubmissionPhase::Validating);

        let report = validate_register(form);
        if !report.is_valid() {
            sub.advance(SubmissionPhase::Idle);
            return SubmissionOutcome::from_parts(sub, report);
        }

        sub.advance(SubmissionPhase::Submitting);
        match self
            .backend()
            .sign_up(&form.email, &form.password, form.metadata())
            .await
        {
            Ok(user) => {
                sub.advance(SubmissionPhase::Succeeded);
                info!("registration succeeded for {}", user.email);

                if let Err(e) = self
                    .backend()
                    .upsert_row("members", form.member_record(&user.id))
                    .await
                {
                    error!("Error saving member details: {e}");
                }
                if form.subscribe_newsletter {
                    let record = json!({ "email": form.email, "member_id": user.id });
                    if let Err(e) = self
                        .backend()
                        .insert_row("newsletter_subscriptions", record)
                        .await
                    {
                        error!("Error subscribing to newsletter: {e}");
                    }
                }

                let mut outcome = SubmissionOutcome::from_parts(sub, report);
                outcome.user = Some(user);
                outcome
            }
            Err(e) => {
                warn!("registration failed for {}: {e}", form.email);
                sub.advance(SubmissionPhase::Failed);
                sub.advance(SubmissionPhase::Idle);
                let mut outcome = SubmissionOutcome::from_parts(sub, report);
                outcome.toast = Some(Toast::error(
                    e.user_message().unwrap_or(MSG_REGISTER_FAILED).to_string(),
                ));
                outcome
            }
        }
    }

    /// Handle a contact-form submission. The contact record write is strict;
    /// the admin notification and the newsletter upsert are best-effort.
    pub async fn contact(&self, form: &ContactForm) -> SubmissionOutcome {
        let mut sub = Submission::start();
        sub.advance(SubmissionPhase::Validating);

        let mut report = validate_contact(form);
        if !report.is_valid() {
            // Contact-page toasts stay up for 4 s.
            stretch_toasts(&mut report);
            sub.advance(SubmissionPhase::Idle);
            return SubmissionOutcome::from_parts(sub, report);
        }

        sub.advance(SubmissionPhase::Submitting);

        let member_id = self.current_user().await.map(|u| u.id);
        let record = form.record(member_id.as_deref());

        match self.backend().insert_row("contact_forms", record).await {
            Ok(()) => {
                sub.advance(SubmissionPhase::Succeeded);
                info!("contact form stored: {}", form.subject);

                // Admin notification; an email service could hang off this.
                info!(
                    "通知郵件已發送給管理員: to=admin@mdvta.org.tw subject=新的聯絡表單：{} from={} type={}",
                    form.subject, form.email, form.inquiry_type
                );

                if form.subscribe_updates {
                    let subscription = json!({ "email": form.email, "is_active": true });
                    if let Err(e) = self
                        .backend()
                        .upsert_row("newsletter_subscriptions", subscription)
                        .await
                    {
                        error!("Newsletter subscription error: {e}");
                    }
                }

                SubmissionOutcome::from_parts(sub, report)
            }
            Err(e) => {
                warn!("contact submission failed: {e}");
                sub.advance(SubmissionPhase::Failed);
                sub.advance(SubmissionPhase::Idle);
                let mut outcome = SubmissionOutcome::from_parts(sub, report);
                outcome.toast = Some(
                    Toast::error(e.user_message().unwrap_or(MSG_CONTACT_FAILED).to_string())
                        .lasting(CONTACT_TOAST_DURATION),
                );
                outcome
            }
        }
    }

    /// Landing-page newsletter form: validate the address and thank the
    /// subscriber. No record is written from this form.
    pub fn newsletter_signup(&self, email: &str) -> Result<Toast, FieldCheck> {
        let check = validate_field("email", email, true, FormContext::Auth);
        if check.is_valid() {
            Ok(Toast::success(NEWSLETTER_THANKS))
        } else {
            Err(check)
        }
    }

    async fn log_member_activity(
        &self,
        activity_type: &str,
        description: &str,
        user: &AuthUser,
        user_agent: Option<&str>,
    ) {
        if !self.is_hosted() {
            return;
        }

        let ip = self.backend().public_ip().await;
        let record = json!({
            "member_id": user.id,
            "activity_type": activity_type,
            "description": description,
            "ip_address": ip,
            "user_agent": user_agent,
        });
        if let Err(e) = self.backend().insert_row("member_activities", record).await {
            error!("Error logging activity: {e}");
        }
    }
}

fn stretch_toasts(report: &mut ValidationReport) {
    let stretched: Vec<Toast> = report
        .toasts()
        .iter()
        .cloned()
        .map(|t| t.lasting(CONTACT_TOAST_DURATION))
        .collect();
    report.replace_toasts(stretched);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendError, DEMO_EMAIL, DEMO_PASSWORD, FallbackBackend};
    use async_trait::async_trait;
    use local_store_adapter::LocalStore;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Records every call; individual operations can be made to fail with a
    /// given collaborator message.
    struct MockBackend {
        calls: Mutex<Vec<String>>,
        sign_up_error: Option<String>,
        insert_error: Option<String>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                sign_up_error: None,
                insert_error: None,
            }
        }

        fn with_sign_up_error(mut self, message: &str) -> Self {
            self.sign_up_error = Some(message.to_string());
            self
        }

        fn with_insert_error(mut self, message: &str) -> Self {
            self.insert_error = Some(message.to_string());
            self
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn sign_in_with_password(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<AuthUser, BackendError> {
            self.record("sign_in");
            Ok(AuthUser {
                id: "user-1".to_string(),
                email: email.to_string(),
                name: "Test".to_string(),
            })
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            _metadata: Value,
        ) -> Result<AuthUser, BackendError> {
            self.record("sign_up");
            if let Some(msg) = &self.sign_up_error {
                return Err(BackendError::Rejected(msg.clone()));
            }
            Ok(AuthUser {
                id: "user-1".to_string(),
                email: email.to_string(),
                name: "Test".to_string(),
            })
        }

        async fn insert_row(&self, table: &str, _record: Value) -> Result<(), BackendError> {
            self.record(&format!("insert:{table}"));
            if let Some(msg) = &self.insert_error {
                return Err(BackendError::Rejected(msg.clone()));
            }
            Ok(())
        }

        async fn upsert_row(&self, table: &str, _record: Value) -> Result<(), BackendError> {
            self.record(&format!("upsert:{table}"));
            Ok(())
        }

        async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
            self.record("current_user");
            Ok(None)
        }

        fn is_hosted(&self) -> bool {
            true
        }
    }

    fn demo_portal() -> Portal {
        let path = std::env::temp_dir().join(format!("portal_{}.json", uuid::Uuid::new_v4()));
        Portal::with_backend(Arc::new(FallbackBackend::new(LocalStore::open(path))))
    }

    fn valid_register_form() -> RegisterForm {
        RegisterForm {
            name: "王小明".to_string(),
            email: "ming@example.tw".to_string(),
            password: "Abc12345!".to_string(),
            confirm_password: "Abc12345!".to_string(),
            agree_terms: true,
            ..Default::default()
        }
    }

    fn valid_contact_form() -> ContactForm {
        ContactForm {
            name: "林小華".to_string(),
            email: "hua@example.tw".to_string(),
            inquiry_type: "course".to_string(),
            subject: "課程相關諮詢".to_string(),
            message: "想詢問下一期課程的報名時間。".to_string(),
            contact_methods: vec!["email".to_string()],
            agree_privacy: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn demo_login_succeeds_without_a_configured_backend() {
        let portal = demo_portal();
        let form = LoginForm {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            remember: false,
        };

        let outcome = portal.login(&form, None).await;
        assert!(outcome.succeeded());
        assert_eq!(outcome.redirect.as_deref(), Some("/"));
        assert_eq!(
            outcome.toast.as_ref().map(|t| t.message.as_str()),
            Some(MSG_LOGIN_OK_DEMO)
        );

        // Exactly one current-user record lands in the fallback store.
        let user = portal.current_user().await.unwrap();
        assert_eq!(user.email, DEMO_EMAIL);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_backend() {
        let backend = Arc::new(MockBackend::new());
        let portal = Portal::with_backend(backend.clone());

        let form = RegisterForm {
            confirm_password: "Abc999!!".to_string(),
            ..valid_register_form()
        };

        let outcome = portal.register(&form).await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.phase, SubmissionPhase::Idle);
        assert_eq!(
            outcome.report.error_message("confirmPassword"),
            Some(crate::validation::MSG_PASSWORD_MISMATCH)
        );
        // No loading state was entered and no call was made.
        assert!(!outcome.trace.contains(&SubmissionPhase::Submitting));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_sign_up_surfaces_the_collaborator_message() {
        let backend = Arc::new(MockBackend::new().with_sign_up_error("Email already registered"));
        let portal = Portal::with_backend(backend.clone());

        let outcome = portal.register(&valid_register_form()).await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.phase, SubmissionPhase::Idle);
        assert!(outcome.trace.contains(&SubmissionPhase::Failed));
        assert_eq!(
            outcome.toast.as_ref().map(|t| t.message.as_str()),
            Some("Email already registered")
        );
        // Only the primary call happened; no best-effort writes followed.
        assert_eq!(backend.calls(), vec!["sign_up"]);
    }

    #[tokio::test]
    async fn successful_register_attempts_best_effort_writes() {
        let backend = Arc::new(MockBackend::new());
        let portal = Portal::with_backend(backend.clone());

        let form = RegisterForm {
            subscribe_newsletter: true,
            ..valid_register_form()
        };

        let outcome = portal.register(&form).await;
        assert!(outcome.succeeded());
        assert!(outcome.toast.is_none());
        assert_eq!(
            backend.calls(),
            vec!["sign_up", "upsert:members", "insert:newsletter_subscriptions"]
        );
    }

    #[tokio::test]
    async fn contact_failure_keeps_success_hidden_and_is_retryable() {
        let backend = Arc::new(MockBackend::new().with_insert_error("資料儲存失敗：policy"));
        let portal = Portal::with_backend(backend.clone());

        let outcome = portal.contact(&valid_contact_form()).await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.phase, SubmissionPhase::Idle);
        assert_eq!(
            outcome.toast.as_ref().map(|t| t.message.as_str()),
            Some("資料儲存失敗：policy")
        );
        assert_eq!(
            outcome.toast.as_ref().map(|t| t.duration),
            Some(CONTACT_TOAST_DURATION)
        );
    }

    #[tokio::test]
    async fn contact_success_writes_one_submission_record() {
        let portal = demo_portal();
        let outcome = portal.contact(&valid_contact_form()).await;
        assert!(outcome.succeeded());
        assert_eq!(
            outcome.trace,
            vec![
                SubmissionPhase::Idle,
                SubmissionPhase::Validating,
                SubmissionPhase::Submitting,
                SubmissionPhase::Succeeded
            ]
        );
    }

    #[tokio::test]
    async fn missing_contact_method_aborts_with_a_toast() {
        let backend = Arc::new(MockBackend::new());
        let portal = Portal::with_backend(backend.clone());

        let mut form = valid_contact_form();
        form.contact_methods.clear();

        let outcome = portal.contact(&form).await;
        assert!(!outcome.succeeded());
        assert_eq!(outcome.report.toasts().len(), 1);
        assert_eq!(
            outcome.report.toasts()[0].duration,
            CONTACT_TOAST_DURATION
        );
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn newsletter_signup_validates_the_address() {
        let portal = demo_portal();
        assert!(portal.newsletter_signup("sub@example.tw").is_ok());
        assert!(portal.newsletter_signup("not-an-email").is_err());
        assert_eq!(
            portal.newsletter_signup("sub@example.tw").unwrap().message,
            NEWSLETTER_THANKS
        );
    }
}
