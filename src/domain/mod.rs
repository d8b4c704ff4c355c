//! Catalog domain: the entity schema and its validation rules.

pub mod product;

pub use product::{Product, ProductCreateData, ProductUpdateData};
