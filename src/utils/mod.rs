pub mod db_utils;
pub mod emp_code_filter;
pub mod employee_cache;
