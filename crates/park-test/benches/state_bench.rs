//! Benchmarks for presence document operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use park_core::{AvatarRecord, AvatarUpdate, DocumentAddress, Locator, Point, SessionId};
use park_state::{DocHandle, ReplicaId};

fn handle(replica: u64) -> DocHandle {
    let address = DocumentAddress::parse("park:00000000000000000000000000000001").unwrap();
    DocHandle::new(address, ReplicaId::new(replica), None)
}

fn record() -> AvatarRecord {
    AvatarRecord::joining("#447F59", 2.0, Point::ORIGIN, Locator::new("cursor-park"))
}

fn bench_publish_position(c: &mut Criterion) {
    let mut h = handle(1);
    let id = SessionId::new(1);
    h.change(|tx| tx.put_record(id, record()));
    let mut x = 0.0;

    c.bench_function("publish_position", |b| {
        b.iter(|| {
            x += 1.0;
            black_box(h.change(|tx| tx.update(id, &AvatarUpdate::new().x(x).y(x))))
        })
    });
}

fn bench_hydration(c: &mut Criterion) {
    let mut h = handle(1);
    for i in 0..50 {
        h.change(|tx| tx.put_record(SessionId::new(i), record()));
    }

    c.bench_function("hydration_50_avatars", |b| {
        b.iter(|| black_box(h.document().hydration_patches()))
    });
}

criterion_group!(benches, bench_publish_position, bench_hydration);
criterion_main!(benches);
