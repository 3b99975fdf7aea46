pub mod error;
pub mod handler;
pub mod lex_error;
pub mod parser_error;
pub mod warning;
