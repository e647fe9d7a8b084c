#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, Response, StatusCode, header},
    };
    use domain::Portal;
    use domain::backend::FallbackBackend;
    use local_store_adapter::LocalStore;
    use tower::ServiceExt;

    fn test_app() -> Router {
        // Fresh fallback store per test, without the demo-mode latency.
        let path = std::env::temp_dir().join(format!("portal_web_{}.json", uuid::Uuid::new_v4()));
        let backend = FallbackBackend::new(LocalStore::open(path));
        let portal = Portal::with_backend(Arc::new(backend));
        crate::web::create_app(Arc::new(portal))
    }

    async fn get(app: Router, uri: &str) -> Response<Body> {
        app.oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
        app.oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn landing_page_renders() {
        let response = get(test_app(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("訂閱電子報"));
        assert!(body.contains("會員登入"));
    }

    #[tokio::test]
    async fn auth_page_shows_the_requested_tab() {
        let response = get(test_app(), "/auth?tab=register").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("確認密碼"));
    }

    #[tokio::test]
    async fn demo_login_redirects_with_a_session_cookie() {
        let response = post_form(
            test_app(),
            "/auth/login",
            "email=demo%40mdvta.org.tw&password=demo123",
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/?welcome=1")
        );
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("session="));
        // No "remember me", so the cookie ends with the browser session.
        assert!(!cookie.contains("Max-Age"));
    }

    #[tokio::test]
    async fn welcome_toast_only_shows_for_a_signed_in_member() {
        // Anonymous visitors can hit /?welcome=1 without getting the toast.
        let anonymous = get(test_app(), "/?welcome=1").await;
        assert!(!body_string(anonymous).await.contains("登入成功"));

        let login = post_form(
            test_app(),
            "/auth/login",
            "email=demo%40mdvta.org.tw&password=demo123",
        )
        .await;
        let cookie = login
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();

        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/?welcome=1")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("登入成功！（演示模式）"));
        assert!(body.contains("演示用戶"));
    }

    #[tokio::test]
    async fn wrong_password_rerenders_the_login_form() {
        let response = post_form(
            test_app(),
            "/auth/login",
            "email=demo%40mdvta.org.tw&password=wrong123",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("帳號或密碼錯誤"));
        assert!(body.contains("demo@mdvta.org.tw"));
    }

    #[tokio::test]
    async fn register_rerenders_with_field_errors() {
        let response = post_form(
            test_app(),
            "/auth/register",
            "name=Wang+Ming&email=ming%40example.tw&password=Abc12345%21\
             &confirmPassword=Abc999%21%21&agreeTerms=on",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("密碼不一致"));
    }

    #[tokio::test]
    async fn register_success_shows_the_panel() {
        let response = post_form(
            test_app(),
            "/auth/register",
            "name=Wang+Ming&email=ming%40example.tw&password=Abc12345%21\
             &confirmPassword=Abc12345%21&agreeTerms=on",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("註冊成功"));
    }

    #[tokio::test]
    async fn contact_without_privacy_agreement_is_rejected() {
        let response = post_form(
            test_app(),
            "/contact",
            "name=Lin+Hua&email=hua%40example.tw&inquiryType=course\
             &subject=Course+question&message=Asking+about+schedule+details\
             &contactMethod=email",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("請同意隱私政策"));
    }

    #[tokio::test]
    async fn contact_submission_shows_the_success_panel() {
        let response = post_form(
            test_app(),
            "/contact",
            "name=Lin+Hua&email=hua%40example.tw&inquiryType=course\
             &subject=Course+question&message=Asking+about+schedule+details\
             &contactMethod=email&agreePrivacy=on",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("訊息已送出"));
    }

    #[tokio::test]
    async fn newsletter_rejects_a_malformed_address() {
        let response = post_form(test_app(), "/newsletter", "email=nope").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("請輸入有效的電子郵件格式"));
    }

    #[tokio::test]
    async fn logout_clears_the_session_cookie() {
        let response = post_form(test_app(), "/logout", "").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
