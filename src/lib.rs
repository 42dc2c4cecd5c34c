// Library exports for submash
pub mod assign;
pub mod dist_table;
pub mod error;
pub mod gadd;
pub mod pipeline;
pub mod plot;
pub mod tools;
