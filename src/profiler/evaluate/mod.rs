pub mod compare;
pub mod pattern_query;
