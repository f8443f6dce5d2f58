//! Flutter bridge for marknote core.

pub mod api;
