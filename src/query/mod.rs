//! Query language: parsing compact parameters into filter and sort specs.

pub mod parser;
pub mod filter;
pub mod sort;

pub use filter::{compare_values, FilterClause, FilterSpec, Lookup};
pub use parser::{parse_pairs, parse_values, ParseError, RawValue};
pub use sort::{SortKey, SortSpec};
