//! Concurrency Guard Benchmarks
//!
//! Measures precondition evaluation and fingerprinting of movies with a growing
//! number of embedded roles.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use movie_catalog::resource::{
    ConcurrencyGuard, ConditionalRequest, Meta, Movie, MovieRole, NewMovie, NewRole, RawVersion,
    ResourceFingerprint, fingerprint_of,
};

fn movie_with_roles(role_count: usize) -> Movie {
    let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
    let mut movie = Movie::new(
        "movie-1",
        NewMovie {
            title: "rocky27".to_string(),
        },
        Meta::created_at("Movie", stamp).unwrap(),
    )
    .unwrap();

    for i in 0..role_count {
        let role = MovieRole::new(
            format!("role-{}", i),
            NewRole::character(format!("challenger {}", i)),
            Meta::created_at("MovieRole", stamp).unwrap(),
        )
        .unwrap();
        movie.roles.push(role);
    }
    movie
}

fn bench_evaluate(c: &mut Criterion) {
    let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
    let current = ResourceFingerprint::new(RawVersion::from_hash("Tm9wZQ"), stamp);

    let requests = [
        ("none", ConditionalRequest::none()),
        (
            "unmodified_since_equal",
            ConditionalRequest::unmodified_since("Wed, 06 Jan 2016 06:13:09 GMT"),
        ),
        (
            "unmodified_since_stale",
            ConditionalRequest::unmodified_since("Wed, 06 Jan 2016 06:13:08 GMT"),
        ),
        (
            "if_match_list",
            ConditionalRequest::if_match("W/\"a\", W/\"b\", W/\"Tm9wZQ\""),
        ),
        ("malformed", ConditionalRequest::unmodified_since("not-a-date")),
    ];

    let mut group = c.benchmark_group("guard_evaluate");
    for (name, request) in &requests {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| ConcurrencyGuard::evaluate(black_box(request), black_box(&current)))
        });
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_of");
    for role_count in [0usize, 10, 100, 1000] {
        let movie = movie_with_roles(role_count);
        group.throughput(Throughput::Elements(role_count.max(1) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(role_count),
            &movie,
            |b, movie| b.iter(|| fingerprint_of(black_box(movie))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_fingerprint);
criterion_main!(benches);
