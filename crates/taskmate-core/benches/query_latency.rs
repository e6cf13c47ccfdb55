#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use time::Duration;
use time::macros::datetime;

use taskmate_core::{GridModel, Priority, SortKey, Status, StatusFilter, Task, TaskQuery, query};

fn task_dataset(size: usize) -> Vec<Task> {
    let base = datetime!(2024-01-01 00:00 UTC);
    (0..size)
        .map(|index| {
            let days = i64::try_from(index % 90).unwrap_or_default();
            let mut task = Task::new(format!("Benchmark task {index}"), base);
            task.description = format!("Payload for task {index}");
            task.category = ["Work", "Personal", "Health"][index % 3].to_owned();
            task.priority = [Priority::Low, Priority::Medium, Priority::High][index % 3];
            task.status = if index % 4 == 0 {
                Status::Completed
            } else {
                Status::Todo
            };
            task.due_date = (index % 5 != 0).then(|| base + Duration::days(days));
            task.tags = vec![format!("team-{}", index % 7)];
            task
        })
        .collect()
}

fn bench_task_query(c: &mut Criterion) {
    let dataset = task_dataset(2_000);
    let params = TaskQuery::sorted_by(SortKey::DueDate)
        .with_search("team-3")
        .with_status(StatusFilter::Only(Status::Todo));

    c.bench_function("task_query_search_due_date", |b| {
        b.iter(|| query(black_box(&dataset), black_box(&params)));
    });

    c.bench_function("calendar_grid_month", |b| {
        b.iter(|| {
            GridModel::build(
                2024,
                1,
                black_box(&dataset),
                None,
                time::macros::date!(2024-02-14),
                time::UtcOffset::UTC,
            )
        });
    });
}

criterion_group!(query_benches, bench_task_query);
criterion_main!(query_benches);
