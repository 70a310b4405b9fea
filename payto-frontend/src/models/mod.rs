pub mod draft;
pub mod page;
pub mod totals;
pub mod user;
