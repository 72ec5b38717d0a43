pub mod charts;
pub mod correctness_view;
pub mod table_view;
