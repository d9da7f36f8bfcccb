//! # sqlineage
//!
//! A library for extracting object-level data-lineage graphs from SQL DDL
//! scripts.
//!
//! # Features
//!
//! - Parse `create table` / `create [materialized|or replace] view` /
//!   `create external table ... location` statements, including nested CTEs
//!   and union branches, into a dependency graph.
//! - Distinguish table sources from the `from` keyword inside function
//!   clauses such as `extract(month from col)` or `trim('x' from col)`.
//! - Filter a graph down to one object and everything transitively upstream
//!   of it, cycles included.
//! - Merge graphs across scripts, and merge CSV adjacency pairs into the
//!   same graph shape.
//! - Render a graph as a Graphviz DOT or Mermaid diagram.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlineage::deps::extract_script_lineage;
//! use sqlineage::render::{RenderTarget, render};
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let script = std::fs::read_to_string("views.sql")?;
//!     let graph = extract_script_lineage(&script);
//!     println!("{}", serde_json::to_string_pretty(&graph)?);
//!
//!     // Everything fact_orders is derived from, directly or not.
//!     let upstream = graph.lineage("fact_orders")?;
//!     println!("{}", render(&upstream, RenderTarget::Mermaid));
//!     Ok(())
//! }
//! ```
pub mod deps;
pub mod graph;
pub mod normalize;
pub mod render;
pub mod scanner;
pub mod splitter;
