//! Input line parsing
//!
//! Splits raw lines into command segments and words. Option grammar is left
//! to the commands themselves.

pub mod line;

pub use line::{
    ControlOperator, DefaultTokenizer, LineTokenizer, ParsedLine, Segment, split_operators,
};
