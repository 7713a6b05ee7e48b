pub mod dedup;
pub mod scan;
