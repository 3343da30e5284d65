//! Pure attendance-classification and payroll-aggregation logic.
//!
//! Everything in here is a stateless function over already-fetched rows: no
//! pool handles, no I/O. The HTTP layer in `crate::api` fetches the snapshot
//! and renders whatever comes back.

pub mod aggregate;
pub mod classify;
pub mod duration;

pub use aggregate::{aggregate_payroll, PayrollSummary, SalaryConfig};
pub use classify::{classify_check_in, classify_record, CheckInClass, ClassifyPolicy, TimingBucket};
pub use duration::{
    compute_overtime_and_shortfall, format_duration, parse_duration, standard_shift_minutes,
    working_hours_label, InvalidDurationFormat,
};
