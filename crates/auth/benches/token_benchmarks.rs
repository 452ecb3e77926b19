use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use identity_auth::{
    AuthConfig, Identity, InMemoryRevocationStore, Permission, RevocationStore,
    RevokedTokenRecord, Role, SigningSecret, TokenIssuer, TokenVerifier, build_scope,
};
use identity_core::UserId;
use std::sync::Arc;
use tokio::runtime::Runtime;

const SECRET: &str = "bench-signing-secret-0123456789abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJ";

fn config() -> AuthConfig {
    AuthConfig::new(SigningSecret::new(SECRET).unwrap())
}

fn identity_with_roles(roles: usize) -> Identity {
    let roles = (0..roles)
        .map(|i| {
            Role::with_permissions(
                format!("ROLE{i}"),
                (0..4).map(|p| Permission::new(format!("PERM_{i}_{p}"))),
            )
        })
        .collect();
    Identity::new(UserId::new(), "john12", roles).unwrap()
}

fn bench_scope_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_building");

    for roles in [1usize, 8, 64] {
        let identity = identity_with_roles(roles);
        group.throughput(Throughput::Elements(roles as u64));
        group.bench_with_input(BenchmarkId::new("roles", roles), &identity, |b, identity| {
            b.iter(|| black_box(build_scope(identity.roles())));
        });
    }

    group.finish();
}

fn bench_issue(c: &mut Criterion) {
    let issuer = TokenIssuer::new(&config());
    let identity = identity_with_roles(2);

    c.bench_function("issue_token", |b| {
        b.iter(|| black_box(issuer.issue(black_box(&identity)).unwrap()));
    });
}

fn bench_verify(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let config = config();
    let store = Arc::new(InMemoryRevocationStore::new());
    let issuer = TokenIssuer::new(&config);
    let verifier = TokenVerifier::new(&config, store.clone());
    let identity = identity_with_roles(2);

    // A populated blacklist keeps the lookup realistic.
    runtime.block_on(async {
        for _ in 0..10_000 {
            let revoked = issuer.issue(&identity).unwrap();
            store
                .add(RevokedTokenRecord::from_claims(&revoked.claims))
                .await
                .unwrap();
        }
    });

    let active = issuer.issue(&identity).unwrap();
    let revoked = issuer.issue(&identity).unwrap();
    runtime
        .block_on(store.add(RevokedTokenRecord::from_claims(&revoked.claims)))
        .unwrap();

    let mut group = c.benchmark_group("verify_token");
    group.bench_function("active", |b| {
        b.iter(|| black_box(runtime.block_on(verifier.verify(black_box(&active.token))).unwrap()));
    });
    group.bench_function("revoked", |b| {
        b.iter(|| black_box(runtime.block_on(verifier.verify(black_box(&revoked.token))).is_err()));
    });
    group.bench_function("garbage", |b| {
        b.iter(|| black_box(runtime.block_on(verifier.verify(black_box("not.a.token"))).is_err()));
    });
    group.finish();
}

criterion_group!(benches, bench_scope_building, bench_issue, bench_verify);
criterion_main!(benches);
