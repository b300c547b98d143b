pub mod builder;
pub mod data_model;
pub mod domain;
pub mod error;
pub mod protocol;
