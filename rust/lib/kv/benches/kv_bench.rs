use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use resort_kv::{KVStore, MemoryStore, RedbStore};

const DOC: &[u8] = br#"{"reservationId":"R-1001","status":"confirmed","qrData":{"verificationCode":"AB12CD"}}"#;

fn bench_redb_set(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = RedbStore::open(&tmp.path().join("bench.redb")).unwrap();

    c.bench_function("redb_set", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("frontdesk:reservation:{}", i);
            store.set(black_box(&key), black_box(DOC)).unwrap();
            i += 1;
        });
    });
}

fn bench_redb_scan(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = RedbStore::open(&tmp.path().join("bench.redb")).unwrap();

    for i in 0..1000 {
        let key = format!("frontdesk:reservation:{:04}", i);
        store.set(&key, DOC).unwrap();
    }

    // Business-id lookup is a full prefix scan.
    c.bench_function("redb_scan_1000", |b| {
        b.iter(|| {
            let results = store.scan(black_box("frontdesk:reservation:")).unwrap();
            assert_eq!(results.len(), 1000);
        });
    });
}

fn bench_redb_compare_and_set(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = RedbStore::open(&tmp.path().join("bench.redb")).unwrap();
    store.set("frontdesk:reservation:cas", b"a").unwrap();

    c.bench_function("redb_compare_and_set", |b| {
        let mut flip = false;
        b.iter(|| {
            let (from, to): (&[u8], &[u8]) = if flip { (b"b", b"a") } else { (b"a", b"b") };
            assert!(store.compare_and_set("frontdesk:reservation:cas", from, to).unwrap());
            flip = !flip;
        });
    });
}

fn bench_memory_scan(c: &mut Criterion) {
    let store = MemoryStore::new();
    for i in 0..1000 {
        store.set(&format!("frontdesk:reservation:{:04}", i), DOC).unwrap();
    }

    c.bench_function("memory_scan_1000", |b| {
        b.iter(|| {
            let results = store.scan(black_box("frontdesk:reservation:")).unwrap();
            assert_eq!(results.len(), 1000);
        });
    });
}

criterion_group!(
    benches,
    bench_redb_set,
    bench_redb_scan,
    bench_redb_compare_and_set,
    bench_memory_scan,
);
criterion_main!(benches);
