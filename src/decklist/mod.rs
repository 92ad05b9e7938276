//! Decklist intake: parsing customer text and flagging suspicious lists.
//!
//! - [`parser`] - line patterns, confidence scoring and consolidation
//! - [`validator`] - non-fatal warnings for staff and customers

pub mod parser;
pub mod validator;

pub use parser::{format_decklist, parse_decklist, ParseResult, ParsedCard};
pub use validator::{validate_decklist, validate_decklist_text};
