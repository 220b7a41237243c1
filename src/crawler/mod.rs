/// Fundamentals-data site the company pages are fetched from
pub mod screener;
