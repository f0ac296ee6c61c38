//! Japanese medical and long-term-care facility directory.
//!
//! Government CSV exports are built into per-prefecture JSON files
//! ([`builder`]), which the search service ([`query`], [`routes`]) loads,
//! decorates and filters at request time.

pub mod batch;
pub mod builder;
pub mod collate;
pub mod config;
pub mod decorate;
pub mod error;
pub mod extract;
pub mod municipality;
pub mod normalize;
pub mod query;
pub mod record;
pub mod routes;
pub mod sheet_parser;
pub mod source;
pub mod tables;
