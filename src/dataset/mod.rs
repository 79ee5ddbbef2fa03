pub mod filters;
pub mod merger;
pub mod pick;
