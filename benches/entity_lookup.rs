#![allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]

//! Criterion benchmark fanning single-row lookups out across concurrent tasks.
//! Compares typed entity mapping against generic rows and against a bare
//! lease checkout, all through the same bounded pool.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rusqlite::{Connection, Result as RusqliteResult};
use sql_entity_access::prelude::*;
use std::fs;
use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::task::JoinSet;

const LOOKUP_SQL: &str = "SELECT id, name, score, active FROM Reading WHERE id = ?";

entity! {
    #[derive(Debug)]
    struct Reading {
        id: i64,
        name: String,
        score: f64,
        active: bool,
    }
}

/// On-disk dataset plus deterministic lookup ids.
struct Dataset {
    path: String,
    ids: Vec<i64>,
}

static TOKIO_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("create tokio runtime"));

static DATASET: LazyLock<Dataset> = LazyLock::new(|| {
    let row_count = lookup_row_count_to_run();
    let path = PathBuf::from("benchmark_entity_lookup.db");
    prepare_dataset(&path, row_count).expect("prepare sqlite dataset");

    let mut ids: Vec<i64> = (1..=row_count as i64).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(9_876_543_210);
    ids.shuffle(&mut rng);

    Dataset {
        path: path.to_string_lossy().into_owned(),
        ids,
    }
});

static ACCESS: LazyLock<EntityAccess> = LazyLock::new(|| {
    let pool = PoolOptions {
        max_size: *BENCH_CONCURRENCY as u32,
        ..PoolOptions::default()
    };
    let config = DataSourceConfig::new(Driver::Sqlite, format!("jdbc:sqlite:{}", DATASET.path))
        .with_pool(pool);
    TOKIO_RUNTIME
        .block_on(EntityAccess::from_config(&config))
        .expect("create entity access")
});

static BENCH_CONCURRENCY: LazyLock<usize> = LazyLock::new(|| {
    std::env::var("BENCH_CONCURRENCY")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8_usize)
        .max(1)
});

fn lookup_row_count_to_run() -> usize {
    std::env::var("BENCH_LOOKUPS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1024)
}

fn prepare_dataset(path: &Path, row_count: usize) -> RusqliteResult<()> {
    if path.exists() {
        let _ = fs::remove_file(path);
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        CREATE TABLE Reading (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL,
            score   REAL NOT NULL,
            active  INTEGER NOT NULL
        );
        ",
    )?;

    let tx = conn.transaction()?;
    {
        let mut insert =
            tx.prepare("INSERT INTO Reading (id, name, score, active) VALUES (?1, ?2, ?3, ?4)")?;
        for id in 1..=row_count as i64 {
            insert.execute(rusqlite::params![id, format!("name-{id}"), id as f64 * 0.5, id % 2])?;
        }
    }
    tx.commit()
}

#[derive(Clone, Copy)]
enum Lookup {
    Entity,
    Rows,
}

async fn parallel_lookup(
    access: &EntityAccess,
    ids: &[i64],
    concurrency: usize,
    lookup: Lookup,
) -> Result<(), EntityAccessError> {
    let per_worker = ids.len().div_ceil(concurrency).max(1);
    let mut join_set = JoinSet::new();

    for chunk in ids.chunks(per_worker) {
        let access = access.clone();
        let chunk = chunk.to_vec();
        join_set.spawn(async move {
            for id in chunk {
                let params = [RowValues::Int(id)];
                match lookup {
                    Lookup::Entity => {
                        let reading: Option<Reading> =
                            access.query_entity(LOOKUP_SQL, &params).await?;
                        black_box(reading.expect("row for id"));
                    }
                    Lookup::Rows => {
                        let rows = access.execute_query(LOOKUP_SQL, &params).await?;
                        black_box(rows);
                    }
                }
            }
            Ok::<(), EntityAccessError>(())
        });
    }

    while let Some(outcome) = join_set.join_next().await {
        outcome.expect("lookup worker panicked")?;
    }
    Ok(())
}

async fn parallel_checkout(access: &EntityAccess, concurrency: usize) -> Result<(), EntityAccessError> {
    let mut join_set = JoinSet::new();
    for _ in 0..concurrency {
        let manager = access.connection_manager().clone();
        join_set.spawn(async move {
            let lease = manager.acquire().await?;
            drop(lease);
            Ok::<(), EntityAccessError>(())
        });
    }

    while let Some(outcome) = join_set.join_next().await {
        outcome.expect("checkout worker panicked")?;
    }
    Ok(())
}

fn bench_lookup(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    name: &str,
    lookup: Lookup,
) {
    let ids = DATASET.ids.clone();
    let concurrency = *BENCH_CONCURRENCY;

    group.bench_function(BenchmarkId::new(name, concurrency), |b| {
        let ids = ids.clone();
        b.to_async(&*TOKIO_RUNTIME).iter_custom(move |iters| {
            let ids = ids.clone();
            async move {
                let mut total = Duration::default();
                for _ in 0..iters {
                    let start = Instant::now();
                    parallel_lookup(&ACCESS, &ids, concurrency, lookup)
                        .await
                        .expect("parallel lookup");
                    total += start.elapsed();
                }
                total
            }
        });
    });
}

fn bench_checkout(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    let concurrency = *BENCH_CONCURRENCY;
    group.bench_function(BenchmarkId::new("pool_checkout", concurrency), |b| {
        b.to_async(&*TOKIO_RUNTIME).iter_custom(move |iters| async move {
            let mut total = Duration::default();
            for _ in 0..iters {
                let start = Instant::now();
                parallel_checkout(&ACCESS, concurrency)
                    .await
                    .expect("pool checkout");
                total += start.elapsed();
            }
            total
        });
    });
}

fn entity_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_lookup");
    group.throughput(Throughput::Elements(DATASET.ids.len() as u64));
    group.sample_size(20);

    bench_lookup(&mut group, "query_entity", Lookup::Entity);
    bench_lookup(&mut group, "execute_query", Lookup::Rows);
    bench_checkout(&mut group);

    group.finish();
}

criterion_group!(benches, entity_lookup);
criterion_main!(benches);
