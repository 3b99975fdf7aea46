mod lexer;
mod parser;
mod priv_prelude;
mod unescape;

use crate::priv_prelude::*;
pub use crate::{
    lexer::Lexer,
    parser::{ParseResult, Parser, MAX_NESTING_DEPTH},
    unescape::{strip_c_slashes, strip_slashes},
};

/// Parses a single Fusion source into its AST. Include statements are kept
/// as they are; following them is up to the caller.
pub fn parse_file(
    handler: &Handler,
    src: &str,
    path: Option<Arc<PathBuf>>,
) -> Result<FusionFile, ErrorEmitted> {
    let lexer = Lexer::new(src, path);
    Parser::new(handler, lexer).parse_fusion_file()
}
