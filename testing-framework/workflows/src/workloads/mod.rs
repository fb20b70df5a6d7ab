pub mod book;
pub mod fill_book;
pub mod provision;
