pub mod odds;
pub mod outcome;
pub mod summary;
