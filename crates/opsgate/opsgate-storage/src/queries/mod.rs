pub mod aggregation;
pub mod document_crud;
pub mod document_search;
pub mod filters;
pub mod fuzzy;
pub mod highlight;
pub mod refresh;
pub mod tokens;
pub mod vector_search;
