//! End-to-end conditional write scenarios.
//!
//! Two clients append roles to the same movie. Each presents the fingerprint it
//! last saw; a client working from a stale copy must get a conflict instead of
//! adding a duplicate.

mod common;

use common::{characters, context, create_movie, handler, header, provider, seed_movie};
use futures::future::join_all;
use movie_catalog::operation_handler::{OperationRequest, StatusCode};
use movie_catalog::resource::{
    ConditionalRequest, ConditionalResult, ConflictReason, NewRole, fingerprint_of,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

fn add_challenger(movie_id: &str, last_modified: &str) -> OperationRequest {
    OperationRequest::add_role(movie_id, json!({ "character": "challenger" }))
        .with_if_unmodified_since(last_modified)
}

#[tokio::test]
async fn test_first_append_with_current_fingerprint_succeeds() {
    let handler = handler();
    let (movie_id, f0) = create_movie(&handler, "rocky27").await;

    let response = handler.handle(add_challenger(&movie_id, &f0)).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.success);
    let body = response.data.as_ref().expect("Movie body expected");
    assert_eq!(characters(body), vec!["challenger"]);

    let f1 = header(&response, "Last-Modified");
    assert_ne!(f1, f0, "Appending a role must restamp the movie");
    assert!(response.header("ETag").is_some());
    assert!(response.metadata.additional.contains_key("role_id"));
}

#[tokio::test]
async fn test_replayed_append_with_stale_fingerprint_conflicts() {
    let handler = handler();
    let (movie_id, f0) = create_movie(&handler, "rocky27").await;

    let first = handler.handle(add_challenger(&movie_id, &f0)).await;
    assert_eq!(first.status, StatusCode::Ok);
    let f1 = header(&first, "Last-Modified");

    let replay = handler.handle(add_challenger(&movie_id, &f0)).await;
    assert_eq!(replay.status, StatusCode::Conflict);
    assert!(!replay.success);
    assert_eq!(replay.error_code.as_deref(), Some("PRECONDITION_FAILED"));
    assert_eq!(header(&replay, "Last-Modified"), f1);
    assert_eq!(
        replay.metadata.additional.get("conflict_reason"),
        Some(&json!("modified_since"))
    );

    let current = handler.handle(OperationRequest::get_movie(&movie_id)).await;
    assert_eq!(current.status, StatusCode::Ok);
    assert_eq!(
        characters(current.data.as_ref().unwrap()),
        vec!["challenger"],
        "The conflicting request must not add a duplicate role"
    );
}

#[tokio::test]
async fn test_retry_after_refetch_appends_distinct_role() {
    let handler = handler();
    let (movie_id, f0) = create_movie(&handler, "rocky27").await;

    let first = handler.handle(add_challenger(&movie_id, &f0)).await;
    assert_eq!(first.status, StatusCode::Ok);
    let replay = handler.handle(add_challenger(&movie_id, &f0)).await;
    assert_eq!(replay.status, StatusCode::Conflict);

    let refetched = handler.handle(OperationRequest::get_movie(&movie_id)).await;
    let f1 = header(&refetched, "Last-Modified");

    let retry = handler.handle(add_challenger(&movie_id, &f1)).await;
    assert_eq!(retry.status, StatusCode::Ok);

    let body = retry.data.as_ref().unwrap();
    assert_eq!(characters(body), vec!["challenger", "challenger"]);
    let roles = body["roles"].as_array().unwrap();
    assert_ne!(roles[0]["id"], roles[1]["id"], "Roles must have distinct ids");
}

#[tokio::test]
async fn test_malformed_date_is_rejected_without_mutation() {
    let handler = handler();
    let (movie_id, f0) = create_movie(&handler, "rocky27").await;

    let response = handler.handle(add_challenger(&movie_id, "not-a-date")).await;
    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(response.error_code.as_deref(), Some("MALFORMED_CONDITION"));

    let current = handler.handle(OperationRequest::get_movie(&movie_id)).await;
    assert!(characters(current.data.as_ref().unwrap()).is_empty());
    assert_eq!(header(&current, "Last-Modified"), f0);
}

#[tokio::test]
async fn test_malformed_date_is_rejected_for_missing_movie() {
    let handler = handler();

    let response = handler.handle(add_challenger("no-such-movie", "not-a-date")).await;

    assert_eq!(response.status, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_concurrent_appends_with_same_fingerprint_have_single_winner() {
    let handler = handler();
    let (movie_id, f0) = create_movie(&handler, "rocky27").await;

    let responses = join_all((0..2).map(|_| handler.handle(add_challenger(&movie_id, &f0)))).await;

    let ok = responses
        .iter()
        .filter(|r| r.status == StatusCode::Ok)
        .count();
    let conflicts = responses
        .iter()
        .filter(|r| r.status == StatusCode::Conflict)
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 1);

    let current = handler.handle(OperationRequest::get_movie(&movie_id)).await;
    assert_eq!(characters(current.data.as_ref().unwrap()).len(), 1);
}

#[tokio::test]
async fn test_many_concurrent_appends_have_single_winner() {
    let provider = provider();
    let movie = seed_movie(&provider, "rocky27").await;
    let condition = ConditionalRequest::from_fingerprint(movie.fingerprint());
    let movie_id = movie.resource().id.clone();

    let attempts = (0..8).map(|i| {
        let provider = provider.clone();
        let condition = condition.clone();
        let movie_id = movie_id.clone();
        tokio::spawn(async move {
            provider
                .add_role(
                    &movie_id,
                    NewRole::character(format!("extra {}", i)),
                    &condition,
                    &context(),
                )
                .await
        })
    });

    let mut successes = 0;
    let mut conflicts = 0;
    for outcome in join_all(attempts).await {
        let result = assert_ok!(outcome.expect("Task panicked"));
        match result {
            ConditionalResult::Success(_) => successes += 1,
            ConditionalResult::PreconditionFailed(_) => conflicts += 1,
            ConditionalResult::NotFound => panic!("Movie should exist"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);

    let stored = provider.get_movie(&movie_id, &context()).await.unwrap().unwrap();
    assert_eq!(stored.resource().roles.len(), 1);
}

#[tokio::test]
async fn test_provider_scenarios_against_fingerprints() {
    let provider = provider();
    let created = seed_movie(&provider, "rocky27").await;
    let movie_id = created.resource().id.clone();
    let f0 = created.fingerprint().clone();
    let stale = ConditionalRequest::unmodified_since(f0.last_modified_header());

    let first = assert_ok!(
        provider
            .add_role(&movie_id, NewRole::character("challenger"), &stale, &context())
            .await
    );
    let change = first.into_success().expect("First append should succeed");
    let f1 = change.movie.fingerprint().clone();
    assert!(f1.last_modified() > f0.last_modified());
    assert_ne!(f1.token(), f0.token());
    assert_eq!(&f1, &fingerprint_of(change.movie.resource()));

    let replay = assert_ok!(
        provider
            .add_role(&movie_id, NewRole::character("challenger"), &stale, &context())
            .await
    );
    let conflict = replay.into_conflict().expect("Replay should conflict");
    assert_eq!(conflict.current, f1);
    assert!(matches!(conflict.reason, ConflictReason::ModifiedSince { .. }));

    let retry = assert_ok!(
        provider
            .add_role(
                &movie_id,
                NewRole::character("challenger"),
                &ConditionalRequest::from_fingerprint(&f1),
                &context(),
            )
            .await
    );
    assert!(retry.is_success());

    let stored = provider.get_movie(&movie_id, &context()).await.unwrap().unwrap();
    assert_eq!(stored.resource().roles.len(), 2);

    let malformed = ConditionalRequest::unmodified_since("not-a-date");
    assert_err!(
        provider
            .add_role(&movie_id, NewRole::character("challenger"), &malformed, &context())
            .await
    );
    let unchanged = provider.get_movie(&movie_id, &context()).await.unwrap().unwrap();
    assert_eq!(unchanged.fingerprint(), stored.fingerprint());
}
