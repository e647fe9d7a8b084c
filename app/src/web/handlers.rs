use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::web::{
    AppState, session,
    templates::{AuthTemplate, ContactTemplate, FieldView, IndexTemplate, ToastView},
};
use domain::contact::ContactForm;
use domain::effects::Toast;
use domain::member::{LoginForm, RegisterForm};
use domain::submission::{MSG_LOGIN_OK, MSG_LOGIN_OK_DEMO};

#[derive(Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub welcome: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginFormData {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterFormData {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub company: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default, rename = "agreeTerms")]
    pub agree_terms: Option<String>,
    #[serde(default, rename = "subscribeNewsletter")]
    pub subscribe_newsletter: Option<String>,
}

impl RegisterFormData {
    fn into_fields(self) -> RegisterForm {
        RegisterForm {
            name: self.name,
            email: self.email,
            password: self.password,
            confirm_password: self.confirm_password,
            phone: self.phone,
            occupation: self.occupation,
            company: self.company,
            agree_terms: self.agree_terms.is_some(),
            subscribe_newsletter: self.subscribe_newsletter.is_some(),
        }
    }
}

#[derive(Deserialize)]
pub struct NewsletterFormData {
    pub email: String,
}

/// The contact form repeats `contactMethod` for each checked box, so it is
/// read as raw pairs rather than a struct.
fn contact_fields(pairs: Vec<(String, String)>) -> ContactForm {
    let mut form = ContactForm::default();
    for (key, value) in pairs {
        match key.as_str() {
            "name" => form.name = value,
            "email" => form.email = value,
            "phone" => form.phone = value,
            "company" => form.company = value,
            "inquiryType" => form.inquiry_type = value,
            "subject" => form.subject = value,
            "message" => form.message = value,
            "contactMethod" => form.contact_methods.push(value),
            "agreePrivacy" => form.agree_privacy = true,
            "subscribeUpdates" => form.subscribe_updates = true,
            _ => {}
        }
    }
    form
}

fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

// Handler functions
pub async fn home(
    State(portal): State<AppState>,
    Query(query): Query<HomeQuery>,
    headers: HeaderMap,
) -> Response {
    let claims = session::current_claims(&headers);
    let mut template = IndexTemplate::new(claims.map(|c| c.name));

    // Fresh sign-ins land here with ?welcome=1 so the success toast still
    // shows after the redirect.
    if query.welcome.is_some() && !template.user_name.is_empty() {
        let message = if portal.is_hosted() {
            MSG_LOGIN_OK
        } else {
            MSG_LOGIN_OK_DEMO
        };
        template.toasts.push(ToastView::from(&Toast::success(message)));
    }

    render(template)
}

pub async fn auth_page(Query(query): Query<AuthQuery>) -> Response {
    let tab = match query.tab.as_deref() {
        Some("register") => "register",
        _ => "login",
    };
    render(AuthTemplate::blank(tab))
}

pub async fn login_submit(
    State(portal): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginFormData>,
) -> Response {
    info!("Login attempt for email: {}", form.email);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());
    let fields = LoginForm {
        email: form.email.clone(),
        password: form.password,
        remember: form.remember.is_some(),
    };

    let outcome = portal.login(&fields, user_agent).await;
    if outcome.succeeded() {
        let cookie = outcome
            .user
            .as_ref()
            .and_then(|user| session::create_session_token(user).ok())
            .and_then(|token| {
                session::create_session_cookie(&token, fields.remember)
                    .parse::<HeaderValue>()
                    .ok()
            });
        if let Some(cookie) = cookie {
            let target = outcome.redirect.as_deref().unwrap_or("/");
            let mut response = Redirect::to(&format!("{target}?welcome=1")).into_response();
            response.headers_mut().insert(header::SET_COOKIE, cookie);
            return response;
        }
        // No session could be minted; land signed out rather than erroring.
        return Redirect::to("/").into_response();
    }

    render(AuthTemplate::failed_login(&form.email, &outcome))
}

pub async fn register_submit(
    State(portal): State<AppState>,
    Form(form): Form<RegisterFormData>,
) -> Response {
    info!("Registration attempt for email: {}", form.email);

    let fields = form.into_fields();
    let outcome = portal.register(&fields).await;
    if outcome.succeeded() {
        return render(AuthTemplate::registered());
    }

    render(AuthTemplate::failed_register(&fields, &outcome))
}

pub async fn contact_page(headers: HeaderMap) -> Response {
    match session::current_claims(&headers) {
        Some(claims) => render(ContactTemplate::prefilled(&claims.name, &claims.email)),
        None => render(ContactTemplate::blank()),
    }
}

pub async fn contact_submit(
    State(portal): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let fields = contact_fields(pairs);
    info!("Contact submission from: {}", fields.email);

    let user_name = session::current_claims(&headers)
        .map(|c| c.name)
        .unwrap_or_default();
    let outcome = portal.contact(&fields).await;
    if outcome.succeeded() {
        return render(ContactTemplate::success(&user_name));
    }

    render(ContactTemplate::failed(&fields, &outcome, &user_name))
}

pub async fn newsletter_submit(
    State(portal): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<NewsletterFormData>,
) -> Response {
    let user_name = session::current_claims(&headers).map(|c| c.name);
    let mut template = IndexTemplate::new(user_name);

    match portal.newsletter_signup(&form.email) {
        Ok(toast) => template.toasts.push(ToastView::from(&toast)),
        Err(check) => {
            let message = check.message.unwrap_or_default();
            template.newsletter_email = FieldView::invalid(&form.email, &message);
        }
    }

    render(template)
}

pub async fn logout() -> Response {
    // Clear the session cookie and return to the landing page
    let mut response = Redirect::to("/").into_response();
    if let Ok(cookie) = session::create_logout_cookie().parse() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
