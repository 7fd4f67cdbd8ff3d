pub mod charts;
pub mod domain;
pub mod repository;
pub mod summary;
pub mod workbook;
