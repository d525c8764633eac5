//! Format-String Interpreter
//!
//! Renders calendar values with .NET-style pattern strings such as
//! `MMM dd, yyyy` or `Q yyyy`:
//!
//! - **token**: Splits a pattern into literal and token segments (longest match first)
//! - **date**: Resolves each token against a date
//! - **display**: Cell and header formatting built on top of the two
//!
//! # Tokens
//!
//! ```text
//! yyyy yy            year (2024, 24)
//! MMMM MMM MM M      month (January, Jan, 01, 1)
//! dddd ddd dd d      weekday name / day of month (Monday, Mon, 05, 5)
//! HH H hh h          hour, 24h and 12h (09, 9)
//! tt t               AM/PM designator (PM, P)
//! mm m ss s          minute, second
//! QQ Q               quarter (01, Q1)
//! 'text'             literal text
//! ```
//!
//! Because the pattern is tokenized before anything is substituted, text
//! produced for one token (a month name, a quarter label) is never read
//! again as part of the pattern.

mod date;
mod display;
mod token;

pub use date::format_date;
pub use display::{format_cell, format_date_string, looks_like_date, parse_date_like};
pub use token::{tokenize, DateToken, Segment};
