pub mod core;
pub mod courses;
pub mod exchange;
pub mod grades;
pub mod scheme;
pub mod students;
pub mod summary;
pub mod theme;
