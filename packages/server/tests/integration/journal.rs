use reqwest::multipart::Form;
use serde_json::json;

use crate::common::{BUCKET, PUBLIC_BASE, TestApp, file_part, photo_part, routes, video_part};

mod journal_creation {
    use super::*;

    #[tokio::test]
    async fn creates_journal_with_media() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("title", "Hari yang melelahkan")
            .text("note", "Rapat seharian")
            .part("video", video_part())
            .part("photo", photo_part("Sunset Beach!.JPG"));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 201, "{}", res.text);
        let data = &res.body["data"];
        assert_eq!(data["title"], "Hari yang melelahkan");
        assert_eq!(data["note"], "Rapat seharian");
        assert_eq!(data["owner_id"], "user-a");
        assert_eq!(data["emotion"], "Calm");
        assert_eq!(data["created_at"], data["updated_at"]);

        let video = data["video_location"].as_str().unwrap();
        let photo = data["photo_location"].as_str().unwrap();
        assert!(video.starts_with(&format!("{PUBLIC_BASE}/{BUCKET}/journals/user-a/videos/")));
        assert!(photo.starts_with(&format!("{PUBLIC_BASE}/{BUCKET}/journals/user-a/photos/")));
        assert!(photo.ends_with("-sunset-beach.jpg"));
        let derived = data["derived_path"].as_str().unwrap();
        assert_eq!(photo, format!("{PUBLIC_BASE}/{BUCKET}/{derived}"));

        assert_eq!(app.blobs_under("journals/user-a/").await.len(), 2);
        assert_eq!(app.repo.len(), 1);
        assert!(app.repo.last_entry("user-a").is_some());
    }

    #[tokio::test]
    async fn creates_journal_from_json_body() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        let res = app
            .post_json(routes::JOURNALS, &json!({ "title": "Just text" }), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["note"], "");
        assert!(res.body["data"]["video_location"].is_null());
        assert!(res.body["data"]["photo_location"].is_null());
    }

    #[tokio::test]
    async fn empty_file_inputs_are_ignored() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("title", "No photo after all")
            .part("photo", file_part("", "application/octet-stream", b""));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["data"]["photo_location"].is_null());
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn returns_validation_error_without_title() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("note", "forgot the title")
            .part("photo", photo_part("p.jpg"));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.is_empty());
        assert!(app.repo.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_webm_video() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("title", "Wrong format")
            .part("video", file_part("clip.mp4", "video/mp4", b"mp4"));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let app = TestApp::spawn_with_max_file_size(1024).await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("title", "Too big")
            .part("photo", file_part("big.jpg", "image/jpeg", &[7u8; 1025]));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.is_empty());
        assert!(app.repo.is_empty());
    }

    #[tokio::test]
    async fn rejects_body_over_request_limit() {
        // Body limit is 2 * 1000 + 1 MiB.
        let app = TestApp::spawn_with_max_file_size(1000).await;
        let token = app.token_for("user-a");

        let form = Form::new()
            .text("title", "over the limit")
            .text("note", "a".repeat(1_100_000))
            .part("photo", photo_part("p.jpg"));
        let res = app.post_form(routes::JOURNALS, form, Some(token.as_str())).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.is_empty());
        assert!(app.repo.is_empty());
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(routes::JOURNALS).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");

        let form = Form::new().text("title", "anonymous");
        let res = app.post_form(routes::JOURNALS, form, None).await;
        assert_eq!(res.status, 401);
        assert!(app.repo.is_empty());
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app.get_with_token(routes::JOURNALS, "not-a-jwt").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod journal_access {
    use super::*;

    #[tokio::test]
    async fn owner_can_read_journal() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let id = app.create_journal(&token, "Mine", Form::new()).await;

        let res = app.get_with_token(&routes::journal(&id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["title"], "Mine");
    }

    #[tokio::test]
    async fn foreign_journal_looks_missing() {
        let app = TestApp::spawn().await;
        let owner = app.token_for("user-a");
        let intruder = app.token_for("user-b");
        let id = app
            .create_journal(&owner, "Private", Form::new().part("photo", photo_part("p.jpg")))
            .await;

        let foreign = app.get_with_token(&routes::journal(&id), &intruder).await;
        let missing = app
            .get_with_token(&routes::journal(&uuid::Uuid::new_v4().to_string()), &intruder)
            .await;
        let malformed = app.get_with_token(&routes::journal("not-a-uuid"), &intruder).await;

        assert_eq!(foreign.status, 404);
        assert_eq!(foreign.status, missing.status);
        assert_eq!(foreign.body, missing.body);
        assert_eq!(malformed.body, missing.body);

        let delete = app.delete_with_token(&routes::journal(&id), &intruder).await;
        assert_eq!(delete.status, 404);
        assert_eq!(delete.body, missing.body);

        let patch = app
            .patch_json(&routes::journal(&id), &json!({ "note": "hijacked" }), &intruder)
            .await;
        assert_eq!(patch.status, 404);

        let still_there = app.get_with_token(&routes::journal(&id), &owner).await;
        assert_eq!(still_there.status, 200);
        assert_eq!(still_there.body["data"]["note"], "");
        assert_eq!(app.blobs_under("journals/user-a/photos/").await.len(), 1);
    }
}

mod journal_update {
    use super::*;

    #[tokio::test]
    async fn note_only_patch_keeps_title() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let id = app.create_journal(&token, "X", Form::new()).await;
        let before = app.get_with_token(&routes::journal(&id), &token).await;

        let res = app
            .patch_json(&routes::journal(&id), &json!({ "note": "edited" }), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["title"], "X");
        assert_eq!(res.body["data"]["note"], "edited");
        assert_eq!(res.body["data"]["created_at"], before.body["data"]["created_at"]);
        assert_ne!(res.body["data"]["updated_at"], before.body["data"]["updated_at"]);
    }

    #[tokio::test]
    async fn photo_replacement_deletes_old_blob() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let id = app
            .create_journal(&token, "Photo", Form::new().part("photo", photo_part("old.jpg")))
            .await;
        let old_keys = app.blobs_under("journals/user-a/photos/").await;
        assert_eq!(old_keys.len(), 1);

        let form = Form::new().part("photo", photo_part("new.jpg"));
        let res = app.put_form(&routes::journal(&id), form, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let keys = app.blobs_under("journals/user-a/photos/").await;
        assert_eq!(keys.len(), 1);
        assert_ne!(keys, old_keys);
        assert_eq!(res.body["data"]["derived_path"], keys[0].as_str());
        assert_eq!(res.body["data"]["title"], "Photo");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let id = app.create_journal(&token, "Keep me", Form::new()).await;

        let res = app
            .patch_json(&routes::journal(&id), &json!({ "title": "  " }), &token)
            .await;

        assert_eq!(res.status, 400);
        let after = app.get_with_token(&routes::journal(&id), &token).await;
        assert_eq!(after.body["data"]["title"], "Keep me");
    }
}

mod journal_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_journal_and_media() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let form = Form::new()
            .part("video", video_part())
            .part("photo", photo_part("p.jpg"));
        let id = app.create_journal(&token, "Short lived", form).await;

        let res = app.delete_with_token(&routes::journal(&id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"]["message"].is_string());
        assert!(app.blobs_under("journals/user-a/").await.is_empty());
        let gone = app.get_with_token(&routes::journal(&id), &token).await;
        assert_eq!(gone.status, 404);
    }
}

mod journal_listing {
    use super::*;

    #[tokio::test]
    async fn lists_current_month_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        let first = app.create_journal(&token, "First", Form::new()).await;
        let second = app.create_journal(&token, "Second", Form::new()).await;
        let other = app.token_for("user-b");
        app.create_journal(&other, "Not mine", Form::new()).await;

        let res = app.get_with_token(routes::JOURNALS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        let ids: Vec<&str> = data.iter().map(|j| j["id"].as_str().unwrap()).collect();
        assert!(ids.contains(&first.as_str()));
        assert!(ids.contains(&second.as_str()));
        assert!(res.body["meta"]["days_in_month"].as_u64().unwrap() >= 28);
    }

    #[tokio::test]
    async fn explicit_month_filters_and_reports_period() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        app.create_journal(&token, "Today", Form::new()).await;

        let res = app
            .get_with_token(&format!("{}?year=2000&month=2", routes::JOURNALS), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"].as_array().unwrap().is_empty());
        assert_eq!(res.body["meta"]["filter_month"], 2);
        assert_eq!(res.body["meta"]["filter_year"], 2000);
        assert_eq!(res.body["meta"]["days_in_month"], 29);
    }

    #[tokio::test]
    async fn invalid_period_is_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");

        for query in [
            "?month=13",
            "?month=abc",
            "?year=2147483647&month=12",
            "?year=-2147483648&month=1",
        ] {
            let res = app
                .get_with_token(&format!("{}{query}", routes::JOURNALS), &token)
                .await;
            assert_eq!(res.status, 400, "{query}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn mood_calendar_reports_todays_mood() {
        let app = TestApp::spawn().await;
        let token = app.token_for("user-a");
        app.create_journal(&token, "A calm day", Form::new()).await;

        let res = app.get_with_token(routes::MOOD_CALENDAR, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let today = chrono::Utc::now().format("%-d").to_string();
        assert_eq!(res.body["moods"][today.as_str()]["emotion"], "Calm");
        assert_eq!(res.body["moods"].as_object().unwrap().len(), 1);
    }
}

mod api_docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_journal_routes() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        let paths = &res.body["paths"];
        assert!(paths["/api/v1/journals"].is_object() || paths["/api/v1/journals/"].is_object());
        assert!(paths["/api/v1/journals/{id}"]["patch"].is_object());
        assert!(paths["/api/v1/journals/mood-calendar"].is_object());
    }
}
