mod common;

use reqwest::StatusCode;
use serde_json::json;

use gymsite::content::ContentKey;
use gymsite::content::ContentMap;
use gymsite::content::render::PageContent;
use gymsite::editor::http::HttpEditorBackend;
use gymsite::editor::{Editor, ImageFile, NodeContent, Page};

macro_rules! app {
    () => {
        match common::spawn_app().await {
            Some(app) => app,
            None => return,
        }
    };
}

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = app!();

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Login & admin gate ──────────────────────────────────────────

#[tokio::test]
async fn admin_page_redirects_anonymous_to_login() {
    let app = app!();

    let resp = app.client.get(app.url("/admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.starts_with("/auth/login?next="), "{location}");

    common::cleanup(app).await;
}

#[tokio::test]
async fn admin_login_sets_session_and_opens_gate() {
    let app = app!();
    let token = app.admin_session().await;

    let resp = app
        .client
        .get(app.url("/admin"))
        .header("cookie", format!("gym_session={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/");

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_with_wrong_password_rerenders_form() {
    let app = app!();
    app.seed_admin().await;

    let (status, token) = app.login(common::ADMIN_EMAIL, "wrongpassword").await;
    assert_eq!(status, StatusCode::OK);
    assert!(token.is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn non_admin_cannot_open_admin_gate() {
    let app = app!();
    app.create_user("member@gym.test", "password123", false).await;
    let (_, token) = app.login("member@gym.test", "password123").await;
    let token = token.expect("member login should set a session");

    let (status, _) = app.get_page("/admin", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_is_rate_limited_per_email() {
    let app = app!();
    app.seed_admin().await;

    for _ in 0..5 {
        app.login(common::ADMIN_EMAIL, "wrongpassword").await;
    }
    // Correct password is still refused while the limit holds
    let (status, token) = app.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert!(token.is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn bootstrap_admin_runs_only_on_empty_users_table() {
    let app = app!();

    let mut config = gymsite::config::Config {
        database_url: String::new(),
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: app.base_url(),
        upload_dir: app.upload_dir.clone(),
        max_upload_size: 1_048_576,
        log_level: "warn".to_string(),
        admin: None,
        smtp: None,
    };
    assert!(!gymsite::bootstrap_admin(&app.pool, &config).await.unwrap());

    config.admin = Some(gymsite::config::AdminBootstrap {
        email: "owner@gym.test".to_string(),
        password: "bootstrap123".to_string(),
    });
    assert!(gymsite::bootstrap_admin(&app.pool, &config).await.unwrap());
    assert!(!gymsite::bootstrap_admin(&app.pool, &config).await.unwrap());

    let (status, token) = app.login("owner@gym.test", "bootstrap123").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(token.is_some());

    common::cleanup(app).await;
}

#[tokio::test]
async fn emails_are_unique_regardless_of_case() {
    let app = app!();
    app.seed_admin().await;

    let pw_hash = gymsite::auth::password::hash("password123").unwrap();
    let err = gymsite::db::users::create(&app.pool, "ADMIN@Gym.Test", &pw_hash, "Twin", false)
        .await
        .unwrap_err();
    let err = gymsite::error::AppError::from(err);
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let user = gymsite::db::users::find_by_email(&app.pool, "Admin@GYM.test")
        .await
        .unwrap()
        .expect("lookup ignores case");
    assert_eq!(user.email, common::ADMIN_EMAIL);

    common::cleanup(app).await;
}

// ── Site rendering ──────────────────────────────────────────────

#[tokio::test]
async fn visitors_see_defaults_without_edit_controls() {
    let app = app!();

    let (status, html) = app.get_page("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Forge your strength"));
    assert!(!html.contains("edit-trigger"));
    assert!(!html.contains("/static/js/editor.js"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn admins_see_edit_controls() {
    let app = app!();
    let token = app.admin_session().await;

    let (_, html) = app.get_page("/", Some(&token)).await;
    assert!(html.contains("edit-trigger"));
    assert!(html.contains("data-section=\"hero\" data-element=\"title\""));
    assert!(html.contains("/static/js/editor.js"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn legal_pages_render() {
    let app = app!();

    let (status, html) = app.get_page("/privacy", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Privacy Policy"));

    let (status, html) = app.get_page("/terms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Liability"));

    common::cleanup(app).await;
}

// ── Content API ─────────────────────────────────────────────────

#[tokio::test]
async fn save_content_requires_session() {
    let app = app!();

    let (body, status) = app
        .post_json(
            "/api/content",
            None,
            &json!({ "section": "hero", "element_id": "title", "content_type": "text", "content": "Hacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    common::cleanup(app).await;
}

#[tokio::test]
async fn save_content_is_reflected_on_site() {
    let app = app!();
    let token = app.admin_session().await;

    let (body, status) = app
        .post_json(
            "/api/content",
            Some(&token),
            &json!({ "section": "hero", "element_id": "title", "content_type": "text", "content": "Lift <heavy>" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("Lift &#60;heavy&#62;") || html.contains("Lift &lt;heavy&gt;"));
    assert!(!html.contains("Forge your strength"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn saving_same_key_twice_keeps_one_entry() {
    let app = app!();
    let token = app.admin_session().await;

    for content in ["First", "Second"] {
        let (_, status) = app
            .post_json(
                "/api/content",
                Some(&token),
                &json!({ "section": "about", "element_id": "title", "content_type": "text", "content": content }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM content_entries WHERE section = 'about' AND element_id = 'title'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let entry = gymsite::db::content::find(&app.pool, "about", "title")
        .await
        .unwrap()
        .expect("entry should exist after save");
    assert_eq!(entry.content.as_deref(), Some("Second"));
    assert_eq!(entry.kind(), gymsite::models::ContentType::Text);

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("Second"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn save_content_rejects_bad_input() {
    let app = app!();
    let token = app.admin_session().await;

    // Invalid key characters
    let (_, status) = app
        .post_json(
            "/api/content",
            Some(&token),
            &json!({ "section": "hero/../x", "element_id": "title", "content_type": "text", "content": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Image without a path
    let (body, status) = app
        .post_json(
            "/api/content",
            Some(&token),
            &json!({ "section": "hero", "element_id": "background", "content_type": "image" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    common::cleanup(app).await;
}

#[tokio::test]
async fn upload_stores_image_and_serves_it() {
    let app = app!();
    let token = app.admin_session().await;

    let form = reqwest::multipart::Form::new()
        .text("section", "hero")
        .text("element_id", "background")
        .part(
            "image",
            reqwest::multipart::Part::bytes(PNG.to_vec())
                .file_name("photo.png")
                .mime_str("image/png")
                .unwrap(),
        );
    let resp = app
        .client
        .post(app.url("/api/content/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    let path = body["image_path"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/hero-background-"), "{path}");
    assert!(path.ends_with(".png"));

    let served = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), PNG);

    common::cleanup(app).await;
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = app!();
    let token = app.admin_session().await;

    let form = reqwest::multipart::Form::new()
        .text("section", "hero")
        .text("element_id", "background")
        .part(
            "image",
            reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec()).file_name("script.sh"),
        );
    let resp = app
        .client
        .post(app.url("/api/content/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Catalog ─────────────────────────────────────────────────────

#[tokio::test]
async fn empty_catalog_shows_empty_state() {
    let app = app!();

    let (body, status) = app.get_json("/api/plans").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["planes"], json!([]));

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("No plans available"));
    assert!(html.contains("No products available"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn plans_are_listed_in_order_and_inactive_hidden() {
    let app = app!();
    app.seed_plan("Annual", 39900, 2, true).await;
    app.seed_plan("Monthly", 3999, 1, true).await;
    app.seed_plan("Legacy", 1000, 0, false).await;

    let (body, _) = app.get_json("/api/plans").await;
    let names: Vec<&str> = body["planes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Monthly", "Annual"]);

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("39.99"));
    assert!(!html.contains("Legacy"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn products_are_listed() {
    let app = app!();
    app.seed_product("Protein shake", 450, Some("img/shake.jpg")).await;

    let (body, status) = app.get_json("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productos"][0]["name"], "Protein shake");

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("Protein shake"));
    assert!(html.contains("./img/shake.jpg"));

    common::cleanup(app).await;
}

// ── Password reset ──────────────────────────────────────────────

#[tokio::test]
async fn forgot_password_gives_same_answer_for_unknown_email() {
    let app = app!();
    app.seed_admin().await;

    let (known, status) = app
        .post_json("/api/auth/forgot-password", None, &json!({ "email": common::ADMIN_EMAIL }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (unknown, status) = app
        .post_json("/api/auth/forgot-password", None, &json!({ "email": "nobody@gym.test" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(known, unknown);

    let stored: Option<String> =
        sqlx::query_scalar("SELECT reset_token_hash FROM users WHERE email = $1")
            .bind(common::ADMIN_EMAIL)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert!(stored.is_some());

    common::cleanup(app).await;
}

#[tokio::test]
async fn reset_page_reports_each_link_state() {
    let app = app!();
    let user_id = app.seed_admin().await;
    let token = gymsite::reset::issue(&app.pool, user_id).await.unwrap();
    let email = common::ADMIN_EMAIL;

    let (status, html) = app
        .get_page(&format!("/auth/reset-password?token={token}&email={email}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("id=\"reset-form\""));

    let (_, html) = app
        .get_page(&format!("/auth/reset-password?token=deadbeef&email={email}"), None)
        .await;
    assert!(html.contains("This reset link is invalid."));
    assert!(!html.contains("id=\"reset-form\""));

    let (_, html) = app.get_page("/auth/reset-password", None).await;
    assert!(html.contains("The reset link is incomplete."));

    sqlx::query("UPDATE users SET reset_requested_at = now() - interval '3601 seconds' WHERE id = $1")
        .bind(user_id)
        .execute(&app.pool)
        .await
        .unwrap();
    let (_, html) = app
        .get_page(&format!("/auth/reset-password?token={token}&email={email}"), None)
        .await;
    assert!(html.contains("This reset link has expired."));
    assert!(!html.contains("id=\"reset-form\""));

    common::cleanup(app).await;
}

#[tokio::test]
async fn reset_password_then_login_with_new_password() {
    let app = app!();
    let user_id = app.seed_admin().await;
    let token = gymsite::reset::issue(&app.pool, user_id).await.unwrap();

    let (body, status) = app
        .post_json(
            "/api/auth/reset-password",
            None,
            &json!({
                "token": token,
                "email": common::ADMIN_EMAIL,
                "password": "newpassword456",
                "password_confirm": "newpassword456",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let (_, old) = app.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert!(old.is_none());
    let (status, new) = app.login(common::ADMIN_EMAIL, "newpassword456").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(new.is_some());

    // Token is single-use
    let (_, status) = app
        .post_json(
            "/api/auth/reset-password",
            None,
            &json!({
                "token": token,
                "email": common::ADMIN_EMAIL,
                "password": "another789",
                "password_confirm": "another789",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn reset_password_rejects_mismatch() {
    let app = app!();
    let user_id = app.seed_admin().await;
    let token = gymsite::reset::issue(&app.pool, user_id).await.unwrap();

    let (body, status) = app
        .post_json(
            "/api/auth/reset-password",
            None,
            &json!({
                "token": token,
                "email": common::ADMIN_EMAIL,
                "password": "newpassword456",
                "password_confirm": "different456",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Passwords do not match");

    common::cleanup(app).await;
}

// ── Editor client ───────────────────────────────────────────────

#[tokio::test]
async fn editor_saves_text_and_patches_duplicates() {
    let app = app!();
    let token = app.admin_session().await;

    let content = PageContent::new(ContentMap::new(), true);
    let page = Page::from_fragments([
        content.text("site", "name", "Forge Gym"),
        content.text("hero", "title", "Forge your strength"),
        content.text("site", "name", "Forge Gym"),
    ]);
    let backend = HttpEditorBackend::new(&app.base_url(), &token).unwrap();
    let mut editor = Editor::new(backend, page);

    editor.open(0).unwrap().set_text("Iron House");
    let saved = editor.confirm().await.unwrap();
    assert_eq!(saved.key, ContentKey::new("site", "name"));

    let key = ContentKey::new("site", "name");
    assert!(editor.page().nodes_for(&key).all(|n| n.displayed() == "Iron House"));
    let after = editor.acknowledge().unwrap();
    assert_eq!(after.reload_after, gymsite::editor::RELOAD_DELAY);

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("Iron House"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn editor_uploads_then_saves_image() {
    let app = app!();
    let token = app.admin_session().await;

    let content = PageContent::new(ContentMap::new(), true);
    let page = Page::from_fragments([content.image("about", "image", "/static/img/about.jpg", "Gym floor")]);
    let backend = HttpEditorBackend::new(&app.base_url(), &token).unwrap();
    let mut editor = Editor::new(backend, page);

    let session = editor.open(0).unwrap();
    session.choose_file(ImageFile {
        file_name: "floor.png".to_string(),
        mime: "image/png".to_string(),
        bytes: PNG.to_vec(),
    });
    session.set_alt_text("New floor");
    editor.confirm().await.unwrap();

    match &editor.page().nodes()[0].content {
        NodeContent::Image { src, alt } => {
            assert!(src.starts_with("/uploads/about-image-"), "{src}");
            assert_eq!(alt, "New floor");
        }
        other => panic!("expected image node, got {other:?}"),
    }

    let (_, html) = app.get_page("/", None).await;
    assert!(html.contains("/uploads/about-image-"));
    assert!(html.contains("New floor"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn editor_reports_save_failure_without_session() {
    let app = app!();

    let content = PageContent::new(ContentMap::new(), true);
    let page = Page::from_fragments([content.text("hero", "title", "Forge your strength")]);
    let backend = HttpEditorBackend::new(&app.base_url(), "not-a-token").unwrap();
    let mut editor = Editor::new(backend, page);

    editor.open(0).unwrap().set_text("Nope");
    assert!(editor.confirm().await.is_err());
    assert_eq!(editor.page().nodes()[0].displayed(), "Forge your strength");

    common::cleanup(app).await;
}
