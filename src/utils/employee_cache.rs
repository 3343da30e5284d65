use anyhow::Result;
use chrono::NaiveTime;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// The slice of an employee row that attendance writes snapshot into each
/// new record, plus the shift window the classifier needs.
#[derive(Debug, Clone)]
pub struct EmployeeSnapshot {
    pub full_name: String,
    pub department: String,
    pub job_title: String,
    pub daily_salary: f64,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

type SnapshotRow = (
    String,
    String,
    String,
    String,
    f64,
    Option<NaiveTime>,
    Option<NaiveTime>,
);

pub static EMPLOYEE_CACHE: Lazy<Cache<String, EmployeeSnapshot>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(3600)) // 1h TTL
        .build()
});

fn snapshot_from_row(row: SnapshotRow) -> (String, EmployeeSnapshot) {
    let (emp_code, full_name, department, job_title, daily_salary, start_time, end_time) = row;
    (
        emp_code,
        EmployeeSnapshot {
            full_name,
            department,
            job_title,
            daily_salary,
            start_time,
            end_time,
        },
    )
}

pub async fn put(emp_code: &str, snapshot: EmployeeSnapshot) {
    EMPLOYEE_CACHE.insert(emp_code.to_string(), snapshot).await;
}

/// Drop a stale entry after an employee update or delete.
pub async fn invalidate(emp_code: &str) {
    EMPLOYEE_CACHE.invalidate(emp_code).await;
}

/// Cache-first snapshot lookup with a database fallback that repopulates
/// the cache on a hit.
pub async fn lookup(
    pool: &MySqlPool,
    emp_code: &str,
) -> Result<Option<EmployeeSnapshot>, sqlx::Error> {
    if let Some(snapshot) = EMPLOYEE_CACHE.get(emp_code).await {
        return Ok(Some(snapshot));
    }

    let row = sqlx::query_as::<_, SnapshotRow>(
        r#"
        SELECT emp_code, full_name, department, job_title, daily_salary, start_time, end_time
        FROM employees
        WHERE emp_code = ?
        "#,
    )
    .bind(emp_code)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let (code, snapshot) = snapshot_from_row(row);
            EMPLOYEE_CACHE.insert(code, snapshot.clone()).await;
            Ok(Some(snapshot))
        }
        None => Ok(None),
    }
}

async fn batch_put(entries: Vec<(String, EmployeeSnapshot)>) {
    let futures: Vec<_> = entries
        .into_iter()
        .map(|(code, snapshot)| EMPLOYEE_CACHE.insert(code, snapshot))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load all employee snapshots into the in-memory cache (batched)
pub async fn warmup_employee_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, SnapshotRow>(
        r#"
        SELECT emp_code, full_name, department, job_title, daily_salary, start_time, end_time
        FROM employees
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(snapshot_from_row(row?));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_put(std::mem::take(&mut batch)).await;
            batch = Vec::with_capacity(batch_size);
        }
    }

    if !batch.is_empty() {
        batch_put(batch).await;
    }

    log::info!("Employee cache warmup complete: {} employees", total_count);

    Ok(())
}
