use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use doggo::auth::UserIdentity;
use doggo::http::server::{configure, security_headers};
use doggo::App;
use serde_json::{json, Value};

macro_rules! init_service {
    ($app:expr) => {
        test::init_service(
            actix_web::App::new()
                .wrap(security_headers())
                .configure(configure(web::Data::new($app.clone()))),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn error_fields(body: &Value) -> Vec<&str> {
    body["errors"]
        .as_array()
        .map(|v| v.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default()
}

#[actix_web::test]
async fn alice_registers_logs_in_and_deletes_herself() {
    doggo::logging::init_for_tests();
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "email": "alice@example.com", "password": "Secret123!" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let alice: Value = test::read_body_json(resp).await;
    assert_eq!(alice["name"], "alice");
    assert!(alice.get("password").is_none());
    assert!(alice.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "bob", "password": "hunter22" }))
        .to_request();
    let bob: Value = test::call_and_read_body_json(&service, req).await;

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "usernameOrEmail": "alice", "password": "Secret123!" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let token = body["jwt"].as_str().unwrap().to_string();

    let UserIdentity { uid } = app.jwt.validate(&token).unwrap();
    assert_eq!(json!(uid), alice["id"]);

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(me, alice);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", bob["id"]))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", alice["id"]))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // the token outlives the account but no longer authenticates
    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_failures_look_the_same() {
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "password": "Secret123!" }))
        .to_request();
    test::call_service(&service, req).await;

    let mut bodies = Vec::new();
    for (identifier, password) in [("alice", "wrong"), ("nobody", "Secret123!")] {
        let req = test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({ "usernameOrEmail": identifier, "password": password }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        bodies.push(test::read_body_json::<Value, _>(resp).await);
    }
    assert_eq!(bodies[0], json!({ "type": "invalid_credentials" }));
    assert_eq!(bodies[0], bodies[1]);

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "invalid_form_body");
    assert_eq!(error_fields(&body), vec!["usernameOrEmail", "password"]);
}

#[actix_web::test]
async fn duplicate_name_and_email_conflict() {
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "email": "alice@example.com", "password": "Secret123!" }))
        .to_request();
    test::call_service(&service, req).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "email": "other@example.com", "password": "x" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "conflict");
    assert_eq!(error_fields(&body), vec!["name"]);
    assert_eq!(body["errors"][0]["message"], "User with same name already exists");

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice2", "email": "alice@example.com", "password": "x" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(error_fields(&body), vec!["email"]);
}

#[actix_web::test]
async fn missing_user_is_reported_before_permissions() {
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "password": "Secret123!" }))
        .to_request();
    let alice: Value = test::call_and_read_body_json(&service, req).await;
    let uid = serde_json::from_value(alice["id"].clone()).unwrap();
    let token = app.jwt.issue(UserIdentity { uid }).unwrap();

    for uri in ["/users/9999", "/users/not-an-id"] {
        let req = test::TestRequest::delete()
            .uri(uri)
            .insert_header(bearer(token.as_str()))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(token.as_str()))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn protected_routes_reject_bad_tokens() {
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "alice", "password": "Secret123!" }))
        .to_request();
    let alice: Value = test::call_and_read_body_json(&service, req).await;
    let identity = UserIdentity {
        uid: serde_json::from_value(alice["id"].clone()).unwrap(),
    };

    let expired = app
        .jwt
        .issue_at(identity, chrono::Utc::now().timestamp() - 7200)
        .unwrap();

    let mut other_config = doggo::config::Server::for_tests();
    other_config.auth.jwt_secret = "a-completely-different-secret".into();
    let foreign = App::with_store(other_config, doggo::database::MemoryStore::new())
        .jwt
        .issue(identity)
        .unwrap();

    for token in [None, Some("garbage"), Some(expired.as_str()), Some(foreign.as_str())] {
        for (method, uri) in [
            ("GET", "/users/me"),
            ("GET", "/users"),
            ("DELETE", "/testusers"),
        ] {
            let mut req = match method {
                "GET" => test::TestRequest::get(),
                _ => test::TestRequest::delete(),
            }
            .uri(uri);
            if let Some(token) = token {
                req = req.insert_header(bearer(token));
            }

            let resp = test::call_service(&service, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "type": "unauthenticated" }));
        }
    }
}

#[actix_web::test]
async fn admin_manages_other_users() {
    let app = App::for_tests();
    let admin = doggo::services::users::reset(&app, "root", "r00tr00t".into())
        .await
        .unwrap();
    let admin_token = app.jwt.issue(UserIdentity { uid: admin.id }).unwrap();
    let service = init_service!(app);

    let mut ids = Vec::new();
    for (name, email) in [("bob", "bob@example.com"), ("ci", "ci@citest.com")] {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({ "name": name, "email": email, "password": "hunter22" }))
            .to_request();
        let user: Value = test::call_and_read_body_json(&service, req).await;
        ids.push(user["id"].clone());
    }

    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", ids[0]))
        .insert_header(bearer(admin_token.as_str()))
        .set_json(json!({ "email": "robert@example.com", "roles": ["admin"] }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bob: Value = test::read_body_json(resp).await;
    assert_eq!(bob["email"], "robert@example.com");
    assert_eq!(bob["roles"], json!(["admin"]));

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(bearer(admin_token.as_str()))
        .to_request();
    let users: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(users.as_array().map(Vec::len), Some(3));

    let req = test::TestRequest::delete()
        .uri("/testusers")
        .insert_header(bearer(admin_token.as_str()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}", ids[1]))
        .insert_header(bearer(admin_token.as_str()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", ids[0]))
        .insert_header(bearer(admin_token.as_str()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn hello_and_malformed_bodies() {
    let app = App::for_tests();
    let service = init_service!(app);

    let resp = test::call_service(&service, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-content-type-options").and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(header::ContentType::json())
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "invalid_form_body");
    assert_eq!(error_fields(&body), vec!["body"]);
}

#[actix_web::test]
async fn names_cannot_shadow_emails() {
    let app = App::for_tests();
    let service = init_service!(app);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "bob", "email": "bob@example.com", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "bob@example.com", "password": "attacker!" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(error_fields(&body), vec!["name"]);

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "usernameOrEmail": "bob@example.com", "password": "hunter22" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    let token = body["jwt"].as_str().unwrap();

    // scheme matching ignores case
    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(me["name"], "bob");
}
