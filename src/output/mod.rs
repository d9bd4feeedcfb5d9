//! Result presentation: CSV rows, JSON documents, and terminal reports.

pub mod csv;
pub mod json;
pub mod terminal;
