use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use stockroom_core::{Entity, ItemId};
use stockroom_infra::{InMemoryStore, ItemStore, MovementEngine};
use stockroom_inventory::{EntryRequest, ExitRequest, NewItem, StockItem, Unit};

fn seeded(store: &InMemoryStore, rt: &tokio::runtime::Runtime, initial: i64) -> ItemId {
    let item = StockItem::new(
        ItemId::new(),
        NewItem {
            code: "BNCH-1".to_string(),
            description: "bench item".to_string(),
            category: "Misc".to_string(),
            equipment: String::new(),
            location: "A-01".to_string(),
            unit: Unit::Each,
            initial_stock: initial,
            min_stock: 0,
            unit_value_cents: 100,
            supplier_id: None,
        },
    )
    .unwrap();
    let id = *item.id();
    rt.block_on(store.insert_item(item)).unwrap();
    id
}

fn bench_movements(c: &mut Criterion) {
    stockroom_observability::init();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("movement_engine");
    for batch in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(
            BenchmarkId::new("entry_exit_pairs", batch),
            &batch,
            |b, &batch| {
                b.iter(|| {
                    let store = Arc::new(InMemoryStore::new());
                    let item_id = seeded(&store, &rt, 0);
                    let engine = MovementEngine::new(store);
                    rt.block_on(async {
                        for i in 0..batch {
                            engine
                                .register_entry(
                                    EntryRequest {
                                        item_id,
                                        quantity: 5,
                                        supplier: None,
                                        invoice_ref: Some(format!("NF-{i}")),
                                        observations: None,
                                    },
                                    "bench",
                                )
                                .await
                                .unwrap();
                            engine
                                .register_exit(
                                    ExitRequest {
                                        item_id,
                                        quantity: 3,
                                        requester: "Maintenance".to_string(),
                                        responsible: "Bench".to_string(),
                                    },
                                    "bench",
                                )
                                .await
                                .unwrap();
                        }
                    });
                    black_box(item_id)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_movements);
criterion_main!(benches);
