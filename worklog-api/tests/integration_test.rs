/// Integration tests for the Worklog API
///
/// These tests require a running PostgreSQL database (DATABASE_URL) and a
/// JWT_SECRET of at least 32 characters in the environment. They verify
/// the system end-to-end:
/// - Membership-based visibility of logs
/// - Search filter semantics (scoped AND vs unscoped OR)
/// - Update semantics (cleaning, user_modified stamping, no partial writes)
/// - Authorization failures for non-members

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use worklog_shared::models::client_user::ClientUser;
use worklog_shared::models::log::Log;

/// A user with no memberships sees an empty listing
#[tokio::test]
async fn test_visible_logs_empty_without_membership() {
    let ctx = TestContext::new().await.unwrap();
    common::create_test_log(
        &ctx,
        "Incident Alpha",
        "power outage at the primary site",
        "full report of the outage and its resolution",
    )
    .await
    .unwrap();

    let outsider = common::create_test_user(&ctx.db).await.unwrap();
    let outsider_token = common::token_for(outsider.id, &ctx.config).unwrap();

    let (status, body) = common::get_json(&ctx.app, "/v1/logs", &outsider_token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    worklog_shared::models::user::User::delete(&ctx.db, outsider.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// A log is visible iff the user has a membership row for its client
#[tokio::test]
async fn test_membership_grants_visibility() {
    let ctx = TestContext::new().await.unwrap();
    let log = common::create_test_log(
        &ctx,
        "Incident Bravo",
        "a description long enough to validate",
        "a body that is also long enough to validate",
    )
    .await
    .unwrap();

    let second = common::create_test_user(&ctx.db).await.unwrap();
    let second_token = common::token_for(second.id, &ctx.config).unwrap();

    // Not assigned yet: empty listing
    let (_, body) = common::get_json(&ctx.app, "/v1/logs", &second_token).await;
    assert_eq!(body["total"], 0);

    // Assign, then the log appears with summary fields only
    ClientUser::assign(&ctx.db, ctx.client.id, second.id)
        .await
        .unwrap();

    let (status, body) = common::get_json(&ctx.app, "/v1/logs", &second_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let item = &body["items"][0];
    assert_eq!(item["slug"], log.slug);
    assert_eq!(item["title"], "Incident Bravo");
    assert!(item["description"].is_string());
    assert!(item["path"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/logs/{}", log.slug)));
    // The full body is not part of the summary projection
    assert!(item.get("body").is_none());

    worklog_shared::models::user::User::delete(&ctx.db, second.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Unscoped search (no field flags) ORs the term across all fields
#[tokio::test]
async fn test_search_unscoped_or_semantics() {
    let ctx = TestContext::new().await.unwrap();
    common::create_test_log(
        &ctx,
        "quokka in the title",
        "a plain description of the first incident",
        "nothing remarkable in this body text at all",
    )
    .await
    .unwrap();
    common::create_test_log(
        &ctx,
        "Unrelated second entry",
        "another plain description of an incident",
        "the quokka appears in the body this time",
    )
    .await
    .unwrap();
    common::create_test_log(
        &ctx,
        "Third entry no match",
        "a third description without the term",
        "a third body without the term either",
    )
    .await
    .unwrap();

    let (status, body) =
        common::get_json(&ctx.app, "/v1/logs?search=quokka", &ctx.jwt_token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    ctx.cleanup().await.unwrap();
}

/// Scoped search restricts matching to exactly the flagged fields
#[tokio::test]
async fn test_search_scoped_title_only() {
    let ctx = TestContext::new().await.unwrap();
    common::create_test_log(
        &ctx,
        "quokka in the title",
        "a plain description of the first incident",
        "nothing remarkable in this body text at all",
    )
    .await
    .unwrap();
    common::create_test_log(
        &ctx,
        "Unrelated second entry",
        "another plain description of an incident",
        "the quokka appears in the body this time",
    )
    .await
    .unwrap();

    let (status, body) =
        common::get_json(&ctx.app, "/v1/logs?search=quokka&title", &ctx.jwt_token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "quokka in the title");

    ctx.cleanup().await.unwrap();
}

/// An empty search term with flags set matches every visible row
#[tokio::test]
async fn test_empty_search_with_flags_matches_all() {
    let ctx = TestContext::new().await.unwrap();
    common::create_test_log(
        &ctx,
        "First entry title",
        "a description long enough to validate",
        "a body that is long enough to validate too",
    )
    .await
    .unwrap();
    common::create_test_log(
        &ctx,
        "Second entry title",
        "another description long enough to pass",
        "another body that is long enough to pass",
    )
    .await
    .unwrap();

    let (status, body) =
        common::get_json(&ctx.app, "/v1/logs?search=&title", &ctx.jwt_token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    ctx.cleanup().await.unwrap();
}

/// Updating a log cleans the values and stamps user_modified
#[tokio::test]
async fn test_update_log_cleans_and_stamps() {
    let ctx = TestContext::new().await.unwrap();
    let log = common::create_test_log(
        &ctx,
        "Incident Charlie",
        "original description of the incident here",
        "original body of the incident report here",
    )
    .await
    .unwrap();
    assert!(log.user_modified.is_none());

    let (status, _) = common::send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/logs/{}", log.slug),
        &ctx.jwt_token,
        json!({
            "title": "  Updated <b>title</b> here  ",
            "description": "  updated description with <i>markup</i> inside  ",
            "body": "updated body of the incident report goes here",
            "notes": "  follow-up scheduled  "
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = Log::find_by_id(&ctx.db, log.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Updated title here");
    assert_eq!(stored.description, "updated description with markup inside");
    assert_eq!(stored.notes, "follow-up scheduled");
    assert_eq!(stored.user_modified, Some(ctx.user.id));

    ctx.cleanup().await.unwrap();
}

/// Validation failure leaves the row untouched
#[tokio::test]
async fn test_update_log_validation_failure_no_partial_write() {
    let ctx = TestContext::new().await.unwrap();
    let log = common::create_test_log(
        &ctx,
        "Incident Delta",
        "original description of the incident here",
        "original body of the incident report here",
    )
    .await
    .unwrap();

    let (status, body) = common::send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/logs/{}", log.slug),
        &ctx.jwt_token,
        json!({
            "title": "abc",
            "description": "too short",
            "body": "updated body of the incident report goes here"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert!(!body["details"].as_array().unwrap().is_empty());

    let stored = Log::find_by_id(&ctx.db, log.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Incident Delta");
    assert_eq!(stored.description, "original description of the incident here");
    assert!(stored.user_modified.is_none());

    ctx.cleanup().await.unwrap();
}

/// Non-members get 403 on the detail route
#[tokio::test]
async fn test_log_detail_requires_membership() {
    let ctx = TestContext::new().await.unwrap();
    let log = common::create_test_log(
        &ctx,
        "Incident Echo",
        "a description long enough to validate",
        "a body that is long enough to validate too",
    )
    .await
    .unwrap();

    let outsider = common::create_test_user(&ctx.db).await.unwrap();
    let outsider_token = common::token_for(outsider.id, &ctx.config).unwrap();

    let (status, _) = common::get_json(
        &ctx.app,
        &format!("/v1/logs/{}", log.slug),
        &outsider_token,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Members see the rendered detail
    let (status, body) =
        common::get_json(&ctx.app, &format!("/v1/logs/{}", log.slug), &ctx.jwt_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], log.slug);
    assert!(body["path"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/logs/{}", log.slug)));

    worklog_shared::models::user::User::delete(&ctx.db, outsider.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// The access resolver contract, exercised directly at the model layer
#[tokio::test]
async fn test_visible_to_user_resolver() {
    let ctx = TestContext::new().await.unwrap();
    let log = common::create_test_log(
        &ctx,
        "Resolver Check Entry",
        "a description long enough to validate",
        "a body that is long enough to validate too",
    )
    .await
    .unwrap();

    // Member: exactly the summary projection, ordered set
    let visible = Log::visible_to_user(&ctx.db, ctx.user.id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, log.id);
    assert_eq!(visible[0].slug, log.slug);
    assert_eq!(visible[0].title, "Resolver Check Entry");

    // Non-member: empty set
    let outsider = common::create_test_user(&ctx.db).await.unwrap();
    let none = Log::visible_to_user(&ctx.db, outsider.id).await.unwrap();
    assert!(none.is_empty());

    // Membership rows round-trip through the join model
    let memberships = ClientUser::list_for_user(&ctx.db, ctx.user.id)
        .await
        .unwrap();
    assert!(memberships
        .iter()
        .any(|m| m.client_id == ctx.client.id && m.user_id == ctx.user.id));

    worklog_shared::models::user::User::delete(&ctx.db, outsider.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Colleagues are the users sharing at least one client
#[tokio::test]
async fn test_colleagues_listing() {
    let ctx = TestContext::new().await.unwrap();

    let colleague = common::create_test_user(&ctx.db).await.unwrap();
    ClientUser::assign(&ctx.db, ctx.client.id, colleague.id)
        .await
        .unwrap();

    let stranger = common::create_test_user(&ctx.db).await.unwrap();

    let (status, body) = common::get_json(&ctx.app, "/v1/users", &ctx.jwt_token).await;
    assert_eq!(status, StatusCode::OK);

    let listed: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert!(listed.contains(&colleague.id.to_string().as_str()));
    assert!(!listed.contains(&stranger.id.to_string().as_str()));
    assert!(!listed.contains(&ctx.user.id.to_string().as_str()));

    for id in [colleague.id, stranger.id] {
        worklog_shared::models::user::User::delete(&ctx.db, id)
            .await
            .unwrap();
    }
    ctx.cleanup().await.unwrap();
}

/// Listing requests without a token are rejected
#[tokio::test]
async fn test_listing_requires_authentication() {
    let ctx = TestContext::new().await.unwrap();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/v1/logs")
        .body(axum::body::Body::empty())
        .unwrap();

    use tower::Service as _;
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Health endpoint reports database connectivity
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    use tower::Service as _;
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}
