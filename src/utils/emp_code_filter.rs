use anyhow::{anyhow, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real headcounts.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMP_CODE_FILTER: Lazy<RwLock<CuckooFilter<String>>> = Lazy::new(|| {
    RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE))
});

#[inline]
fn normalize(emp_code: &str) -> String {
    emp_code.trim().to_string()
}

/// Check if an employee code might exist (false positives possible).
/// A definite "no" lets attendance inserts reject unknown codes without
/// touching the database.
pub fn might_exist(emp_code: &str) -> bool {
    let emp_code = normalize(emp_code);
    EMP_CODE_FILTER
        .read()
        .expect("emp code filter poisoned")
        .contains(&emp_code)
}

/// Insert a single employee code into the filter
pub fn insert(emp_code: &str) {
    let emp_code = normalize(emp_code);
    EMP_CODE_FILTER
        .write()
        .expect("emp code filter poisoned")
        .add(&emp_code);
}

/// Remove an employee code from the filter
pub fn remove(emp_code: &str) {
    let emp_code = normalize(emp_code);
    EMP_CODE_FILTER
        .write()
        .expect("emp code filter poisoned")
        .remove(&emp_code);
}

/// Warm up the employee-code filter using streaming + batching
pub async fn warmup_emp_code_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT emp_code FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (emp_code,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&emp_code));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Employee code filter warmup complete: {} employees", total);
    Ok(())
}

/// Insert a batch of normalized employee codes
fn insert_batch(emp_codes: &[String]) {
    let mut filter = EMP_CODE_FILTER.write().expect("emp code filter poisoned");

    for emp_code in emp_codes {
        filter.add(emp_code);
    }
}
