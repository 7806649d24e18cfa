use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minidb::{Database, Value};
use std::hint::black_box;
use std::sync::Arc;

fn setup_populated_db(n: usize) -> Database {
    let mut db = Database::new();

    db.execute("CREATE TABLE users (id int, name varchar(32), age int, active bool, PRIMARY KEY(id))")
        .unwrap();

    let table = db.get_table_mut("users").unwrap();

    for i in 0..n {
        let row = vec![
            Value::Int(i as i32),
            Value::Text(Arc::from(format!("user{i}").as_str())),
            Value::Int((i % 100) as i32),
            Value::Bool(i % 2 == 0),
        ];
        table.insert(row).unwrap();
    }
    db
}

fn setup_join_db(n: usize) -> Database {
    let mut db = setup_populated_db(n);
    db.execute("CREATE TABLE orders (user_id int, total double)")
        .unwrap();

    let orders = db.get_table_mut("orders").unwrap();
    for i in 0..n / 2 {
        orders
            .insert(vec![Value::Int((i * 2) as i32), Value::Double(i as f64)])
            .unwrap();
    }
    db
}

fn bench_insert_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_SQL_Pipeline");
    group.bench_function("insert_single_row_sql", |b| {
        let mut db = Database::new();
        db.execute("CREATE TABLE tests (id int)").unwrap();
        b.iter(|| {
            db.execute(black_box("INSERT INTO tests VALUES (42)"))
                .unwrap();
        });
    });
    group.finish();
}

fn bench_keyed_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Keyed_Insert");

    for n in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| black_box(setup_populated_db(n)));
        });
    }
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_populated_db(n);
            b.iter(|| {
                let res = db
                    .query("SELECT name FROM users WHERE age = 42 OR age = 7")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("Join_Performance");

    for n in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_join_db(n);
            b.iter(|| {
                let res = db
                    .query("SELECT name, total FROM users LEFT JOIN orders ON users.id = orders.user_id")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Update_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n),
                |mut db| {
                    db.execute("UPDATE users SET age = 99 WHERE active = TRUE")
                        .unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

fn bench_delete_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delete_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n),
                |mut db| {
                    db.execute("DELETE FROM users WHERE age > 90").unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sql,
    bench_keyed_insert,
    bench_select_scaling,
    bench_join,
    bench_update_performance,
    bench_delete_performance
);
criterion_main!(benches);
