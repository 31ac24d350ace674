use criterion::{Criterion, criterion_group, criterion_main};
use muista_api::oauth2::credentials::ClientCredentials;
use muista_api::oauth2::scope::negotiate;
use muista_api::oauth2::{TokenIssuer, hash_secret, verify_secret};
use std::hint::black_box;

// CI-friendly benchmark configuration
fn is_ci_mode() -> bool {
    std::env::var("CI").is_ok() || std::env::var("QUICK_BENCH").is_ok()
}

fn granted_scopes() -> Vec<String> {
    (0..16).map(|i| format!("resource{i}:read")).collect()
}

fn benchmark_scope_negotiation(c: &mut Criterion) {
    let granted = granted_scopes();

    c.bench_function("negotiate_full_set", |b| {
        b.iter(|| black_box(negotiate(black_box(&granted), None)));
    });

    c.bench_function("negotiate_subset", |b| {
        let requested = "resource3:read resource9:read resource15:read";
        b.iter(|| black_box(negotiate(black_box(&granted), Some(black_box(requested)))));
    });

    c.bench_function("negotiate_rejected", |b| {
        let requested = "resource3:read admin:all";
        b.iter(|| black_box(negotiate(black_box(&granted), Some(black_box(requested)))));
    });
}

fn benchmark_credential_generation(c: &mut Criterion) {
    c.bench_function("client_credentials_generate", |b| {
        b.iter(|| black_box(ClientCredentials::generate()));
    });
}

fn benchmark_tokens(c: &mut Criterion) {
    let issuer = TokenIssuer::new(b"bench-secret-0123456789abcdef-0123", 3600, None);
    let scopes = vec!["tasks:read".to_string(), "tasks:write".to_string()];

    c.bench_function("token_sign", |b| {
        b.iter(|| black_box(issuer.sign("internal-id", "public-id", black_box(&scopes))));
    });

    let token = issuer
        .sign("internal-id", "public-id", &scopes)
        .expect("sign");
    c.bench_function("token_verify", |b| {
        b.iter(|| black_box(issuer.verify(black_box(&token))));
    });
}

fn benchmark_secret_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("argon2");
    // Each iteration costs tens of milliseconds; keep the sample small.
    group.sample_size(if is_ci_mode() { 10 } else { 20 });

    let hash = hash_secret("V1StGXR8_Z5jdHi6B-myTV1StGXR8_Z5").expect("hash");
    group.bench_function("verify_secret", |b| {
        b.iter(|| black_box(verify_secret(black_box("V1StGXR8_Z5jdHi6B-myTV1StGXR8_Z5"), &hash)));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_scope_negotiation,
    benchmark_credential_generation,
    benchmark_tokens,
    benchmark_secret_hashing
);
criterion_main!(benches);
