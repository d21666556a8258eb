mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use projectstash::errors::ApiError;
use projectstash::projects;
use serde_json::Value;

async fn create_project(h: &common::TestHarness, owner: &str, name: &str) -> i64 {
    let user = projectstash::users::find_user(&h.db, owner)
        .await
        .unwrap()
        .expect("owner exists");
    projects::create_project(&h.db, &h.cfg, &user, name, None)
        .await
        .expect("create project")
        .id
}

#[actix_web::test]
async fn upload_list_download_delete_cycle() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    let id = create_project(&h, "alice", "thesis").await;
    let app = test::init_service(h.app()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/projects/{id}/files"))
        .insert_header(h.bearer("alice"))
        .insert_header(("Content-Type", common::multipart_content_type()))
        .set_payload(common::multipart_body("chapter1.txt", b"draft one"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: Value = test::read_body_json(resp).await;
    assert_eq!(saved[0]["name"], "chapter1.txt");
    assert_eq!(saved[0]["size_bytes"], 9);

    let req = test::TestRequest::get()
        .uri(&format!("/projects/{id}/files"))
        .insert_header(h.bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let list: Value = test::read_body_json(resp).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["name"], "chapter1.txt");

    let req = test::TestRequest::get()
        .uri(&format!("/projects/{id}/files/chapter1.txt"))
        .insert_header(h.bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"draft one");

    let req = test::TestRequest::delete()
        .uri(&format!("/projects/{id}/files/chapter1.txt"))
        .insert_header(h.bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/projects/{id}/files"))
        .insert_header(h.bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let list: Value = test::read_body_json(resp).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn same_name_upload_overwrites_previous_contents() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    let id = create_project(&h, "alice", "thesis").await;
    let app = test::init_service(h.app()).await;

    for contents in [b"first".as_slice(), b"second version".as_slice()] {
        let req = test::TestRequest::post()
            .uri(&format!("/projects/{id}/files"))
            .insert_header(h.bearer("alice"))
            .insert_header(("Content-Type", common::multipart_content_type()))
            .set_payload(common::multipart_body("a.txt", contents))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // exactly one file on disk, holding the second upload
    let dir = h.storage_root().join(id.to_string());
    let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let on_disk = std::fs::read(dir.join("a.txt")).unwrap();
    assert_eq!(&on_disk[..], b"second version");
}

#[actix_web::test]
async fn deleting_missing_file_is_not_found() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    let id = create_project(&h, "alice", "thesis").await;
    let app = test::init_service(h.app()).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/projects/{id}/files/nope.txt"))
        .insert_header(h.bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn path_escaping_file_names_are_rejected() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    create_project(&h, "alice", "thesis").await;

    let user = projectstash::users::find_user(&h.db, "alice").await.unwrap().unwrap();
    let project = projects::list_projects(&h.db, &user).await.unwrap().remove(0);

    for name in ["../evil.txt", "..", "a/b.txt", ""] {
        let res = projects::stored_file_path(&h.cfg, &project, name);
        assert!(matches!(res, Err(ApiError::BadRequest(_))), "{name:?} must be rejected");
        let res = projects::delete_file(&h.cfg, &project, name);
        assert!(matches!(res, Err(ApiError::BadRequest(_))), "{name:?} must be rejected");
    }
}

#[actix_web::test]
async fn files_of_foreign_projects_are_not_reachable() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    h.seed_user("bob", "password123").await;
    let id = create_project(&h, "alice", "private").await;
    let app = test::init_service(h.app()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/projects/{id}/files"))
        .insert_header(h.bearer("bob"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn root_upload_gets_a_randomized_name() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    let app = test::init_service(h.app()).await;

    let req = test::TestRequest::post()
        .uri("/files")
        .insert_header(h.bearer("alice"))
        .insert_header(("Content-Type", common::multipart_content_type()))
        .set_payload(common::multipart_body("notes.txt", b"root notes"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: Value = test::read_body_json(resp).await;

    let name = saved[0]["name"].as_str().unwrap();
    assert!(name.ends_with("_notes.txt"));
    assert_ne!(name, "notes.txt");

    let on_disk = std::fs::read(h.storage_root().join(name)).unwrap();
    assert_eq!(&on_disk[..], b"root notes");
}

#[actix_web::test]
async fn upload_without_file_part_is_bad_request() {
    let h = common::TestHarness::new().await;
    h.seed_user("alice", "password123").await;
    let id = create_project(&h, "alice", "thesis").await;
    let app = test::init_service(h.app()).await;

    let empty = format!("--{}--\r\n", common::MULTIPART_BOUNDARY);
    let req = test::TestRequest::post()
        .uri(&format!("/projects/{id}/files"))
        .insert_header(h.bearer("alice"))
        .insert_header(("Content-Type", common::multipart_content_type()))
        .set_payload(empty.into_bytes())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
