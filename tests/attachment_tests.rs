// tests/attachment_tests.rs

mod common;

use common::{png_bytes, spawn_app};
use hoaxify::{
    services::file::{self, ATTACHMENT_MAX_BYTES},
    utils::clock::{ONE_DAY_IN_MILLIS, now_millis},
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

fn file_form(bytes: Vec<u8>, name: &str) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(name.to_string()))
}

#[tokio::test]
async fn png_upload_is_stored_with_sniffed_type() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/1.0/hoaxes/attachments"))
        .multipart(file_form(png_bytes(1024), "claims-to-be.txt"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();
    assert!(id > 0);

    let (filename, file_type, hoax_id): (String, String, Option<i64>) =
        sqlx::query_as("SELECT filename, file_type, hoax_id FROM file_attachments WHERE id = ?")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(file_type, "image/png");
    assert!(filename.ends_with(".png"));
    assert!(hoax_id.is_none());
    assert!(app.config.attachment_folder().join(&filename).exists());
}

#[tokio::test]
async fn unrecognized_upload_has_no_extension() {
    let app = spawn_app().await;

    let body: Value = app
        .client
        .post(app.url("/api/1.0/hoaxes/attachments"))
        .multipart(file_form(b"just some text".to_vec(), "notes.txt"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let (filename, file_type): (String, String) =
        sqlx::query_as("SELECT filename, file_type FROM file_attachments WHERE id = ?")
            .bind(body["id"].as_i64().unwrap())
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(file_type, "unrecognized");
    assert!(!filename.contains('.'));
}

#[tokio::test]
async fn request_without_file_returns_placeholder_id() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/1.0/hoaxes/attachments"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], 0);
    assert_eq!(app.count("file_attachments").await, 0);
}

#[tokio::test]
async fn upload_at_the_size_limit_is_accepted() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/1.0/hoaxes/attachments"))
        .multipart(file_form(png_bytes(ATTACHMENT_MAX_BYTES), "big.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.count("file_attachments").await, 1);
}

#[tokio::test]
async fn upload_over_the_size_limit_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/1.0/hoaxes/attachments"))
        .header("Accept-Language", "es")
        .multipart(file_form(png_bytes(ATTACHMENT_MAX_BYTES + 1), "big.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El archivo subido no puede superar los 5MB");
    assert_eq!(body["path"], "/api/1.0/hoaxes/attachments");
    assert_eq!(app.count("file_attachments").await, 0);
}

#[tokio::test]
async fn sweep_removes_only_old_unlinked_attachments() {
    let app = spawn_app().await;
    let user = app.create_user("user1", "user1@mail.com", true).await;
    let hoax = app.add_hoax(user, "Hoax content of user1", 1).await;
    let now = now_millis();
    let two_days_ago = now - 2 * ONE_DAY_IN_MILLIS;

    let orphan = app.add_attachment("orphan.png", two_days_ago, None).await;
    let linked = app.add_attachment("linked.png", two_days_ago, Some(hoax)).await;
    let recent = app.add_attachment("recent.png", now - 1_000, None).await;

    let removed = file::remove_unused_attachments(&app.pool, &app.config, now)
        .await
        .unwrap();

    assert_eq!(removed, 1);
    let remaining: Vec<i64> = sqlx::query_scalar("SELECT id FROM file_attachments ORDER BY id")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, vec![linked, recent]);
    assert!(!remaining.contains(&orphan));

    let folder = app.config.attachment_folder();
    assert!(!folder.join("orphan.png").exists());
    assert!(folder.join("linked.png").exists());
    assert!(folder.join("recent.png").exists());
}

#[tokio::test]
async fn attachment_linked_after_going_stale_keeps_its_file() {
    let app = spawn_app().await;
    let user = app.create_user("user1", "user1@mail.com", true).await;
    let hoax = app.add_hoax(user, "Hoax content of user1", 1).await;
    let now = now_millis();
    let stale = app.add_attachment("late-link.png", now - 2 * ONE_DAY_IN_MILLIS, None).await;

    assert!(file::associate_file_to_hoax(&app.pool, stale, hoax).await.unwrap());
    let removed = file::remove_unused_attachments(&app.pool, &app.config, now)
        .await
        .unwrap();

    assert_eq!(removed, 0);
    let linked: Option<i64> = sqlx::query_scalar("SELECT hoax_id FROM file_attachments WHERE id = ?")
        .bind(stale)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(linked, Some(hoax));
    assert!(app.config.attachment_folder().join("late-link.png").exists());

    let response = app
        .client
        .get(app.url("/attachments/late-link.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn sweep_tolerates_missing_backing_file() {
    let app = spawn_app().await;
    let now = now_millis();
    app.add_attachment("gone.png", now - 2 * ONE_DAY_IN_MILLIS, None).await;
    std::fs::remove_file(app.config.attachment_folder().join("gone.png")).unwrap();

    let removed = file::remove_unused_attachments(&app.pool, &app.config, now)
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(app.count("file_attachments").await, 0);
}

#[tokio::test]
async fn creating_folders_twice_is_harmless() {
    let app = spawn_app().await;
    std::fs::write(app.config.profile_folder().join("keep.png"), b"image").unwrap();

    file::create_folders(&app.config).await.unwrap();

    assert!(app.config.profile_folder().is_dir());
    assert!(app.config.attachment_folder().is_dir());
    assert!(app.config.profile_folder().join("keep.png").exists());
}

#[tokio::test]
async fn stored_attachments_are_served_statically() {
    let app = spawn_app().await;
    app.add_attachment("served.png", now_millis(), None).await;

    let response = app
        .client
        .get(app.url("/attachments/served.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["cache-control"].to_str().unwrap(),
        "public, max-age=31536000"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"attachment");
}
