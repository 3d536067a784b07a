//! Property tests for the concurrency guard and fingerprint stamping.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{context, provider, seed_movie};
use movie_catalog::resource::{
    ConcurrencyGuard, ConditionalRequest, Decision, MoviePatch, NewRole, Preconditions, RawVersion,
    ResourceFingerprint, fingerprint_of, format_http_date,
};
use proptest::prelude::*;

fn instant(seconds: i64, nanos: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, nanos)
        .single()
        .expect("Generated timestamp should be valid")
}

fn fingerprint(token: &str, last_modified: DateTime<Utc>) -> ResourceFingerprint {
    ResourceFingerprint::new(RawVersion::from_hash(token), last_modified)
}

/// Seconds between 1970 and 2100.
fn seconds() -> impl Strategy<Value = i64> {
    0i64..4_102_444_800i64
}

fn nanos() -> impl Strategy<Value = u32> {
    0u32..1_000_000_000u32
}

fn token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,32}"
}

/// Mutations a client can apply to a movie.
#[derive(Debug, Clone)]
enum Mutation {
    Retitle(String),
    RetitleSame,
    AddRole(String),
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        "[a-z]{1,12}".prop_map(Mutation::Retitle),
        Just(Mutation::RetitleSame),
        "[a-z]{1,12}".prop_map(Mutation::AddRole),
    ]
}

proptest! {
    #[test]
    fn prop_no_condition_always_proceeds(
        secs in seconds(),
        ns in nanos(),
        tag in token(),
    ) {
        let current = fingerprint(&tag, instant(secs, ns));

        let decision = ConcurrencyGuard::evaluate(&ConditionalRequest::none(), &current);

        prop_assert_eq!(decision, Ok(Decision::Proceed(current.clone())));
    }

    #[test]
    fn prop_equal_date_header_proceeds(secs in seconds(), tag in token()) {
        let current = fingerprint(&tag, instant(secs, 0));
        let request = ConditionalRequest::unmodified_since(current.last_modified_header());

        let decision = ConcurrencyGuard::evaluate(&request, &current);

        prop_assert!(matches!(decision, Ok(Decision::Proceed(_))));
    }

    #[test]
    fn prop_equal_instant_proceeds_at_full_precision(
        secs in seconds(),
        ns in nanos(),
        tag in token(),
    ) {
        let current = fingerprint(&tag, instant(secs, ns));

        let decision = Preconditions::unmodified_since(current.last_modified()).check(&current);

        prop_assert!(decision.is_proceed());
    }

    #[test]
    fn prop_stale_date_header_conflicts(
        secs in 1_000_000i64..4_102_444_800i64,
        ns in nanos(),
        behind in 1i64..1_000_000i64,
        tag in token(),
    ) {
        let stamp = instant(secs, ns);
        let current = fingerprint(&tag, stamp);
        let request = ConditionalRequest::unmodified_since(
            format_http_date(&(stamp - Duration::seconds(behind))),
        );

        let decision = ConcurrencyGuard::evaluate(&request, &current);

        match decision {
            Ok(Decision::Conflict(conflict)) => prop_assert_eq!(conflict.current, current),
            other => prop_assert!(false, "expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn prop_stale_instant_conflicts_at_full_precision(
        secs in 1i64..4_102_444_800i64,
        ns in nanos(),
        behind_ns in 1i64..1_000_000_000i64,
        tag in token(),
    ) {
        let stamp = instant(secs, ns);
        let current = fingerprint(&tag, stamp);
        let since = stamp - Duration::nanoseconds(behind_ns);

        let decision = Preconditions::unmodified_since(since).check(&current);

        prop_assert!(decision.is_conflict());
    }

    #[test]
    fn prop_if_match_current_or_wildcard_proceeds(
        secs in seconds(),
        tag in token(),
    ) {
        let current = fingerprint(&tag, instant(secs, 0));

        let exact = ConditionalRequest::if_match(current.etag_header());
        let wildcard = ConditionalRequest::if_match("*");
        let listed = ConditionalRequest::if_match(format!("W/\"other\", {}", current.etag_header()));

        prop_assert!(matches!(ConcurrencyGuard::evaluate(&exact, &current), Ok(Decision::Proceed(_))));
        prop_assert!(matches!(ConcurrencyGuard::evaluate(&wildcard, &current), Ok(Decision::Proceed(_))));
        prop_assert!(matches!(ConcurrencyGuard::evaluate(&listed, &current), Ok(Decision::Proceed(_))));
    }

    #[test]
    fn prop_if_match_other_tag_conflicts(
        secs in seconds(),
        tag in token(),
        other in token(),
    ) {
        prop_assume!(tag != other);
        let current = fingerprint(&tag, instant(secs, 0));
        let request = ConditionalRequest::if_match(format!("W/\"{}\"", other));

        let decision = ConcurrencyGuard::evaluate(&request, &current);

        prop_assert!(matches!(decision, Ok(Decision::Conflict(_))));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_mutations_never_move_fingerprint_backwards(
        mutations in prop::collection::vec(mutation(), 1..6),
    ) {
        tokio_test::block_on(async {
            let provider = provider();
            let created = seed_movie(&provider, "rocky27").await;
            let movie_id = created.resource().id.clone();
            let mut previous = created.fingerprint().clone();

            for mutation in mutations {
                let condition = ConditionalRequest::from_fingerprint(&previous);
                let updated = match mutation {
                    Mutation::Retitle(title) => provider
                        .update_movie(&movie_id, MoviePatch { title: Some(title) }, &condition, &context())
                        .await
                        .unwrap()
                        .into_success()
                        .unwrap(),
                    Mutation::RetitleSame => provider
                        .update_movie(&movie_id, MoviePatch::default(), &condition, &context())
                        .await
                        .unwrap()
                        .into_success()
                        .unwrap(),
                    Mutation::AddRole(character) => provider
                        .add_role(&movie_id, NewRole::character(character), &condition, &context())
                        .await
                        .unwrap()
                        .into_success()
                        .unwrap()
                        .movie,
                };

                let current = fingerprint_of(updated.resource());
                assert_eq!(&current, updated.fingerprint());
                assert!(current.last_modified() > previous.last_modified());
                assert_ne!(current.token(), previous.token());
                previous = current;
            }
        });
    }
}
