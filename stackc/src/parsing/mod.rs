mod block;
mod call;
mod cond;
mod expr;
mod func;
mod loops;
mod var;

pub use block::*;
pub use call::*;
pub use cond::*;
pub use expr::*;
pub use func::*;
pub use loops::*;
pub use var::*;

use crate::{
    error::CompileResult,
    inst::Labels,
    symbol::{FunctionTable, Locals},
    token_stream::TokenStream,
};

/// Parser state threaded through one function body.
pub(crate) struct Ctx<'t> {
    /// Variables declared so far in the function scope.
    pub locals: &'t mut Locals,
    /// Compiled functions, consulted when a call is parsed.
    pub functions: &'t FunctionTable,
    /// Jump label allocator of the compile run.
    pub labels: &'t mut Labels,
}

pub(crate) trait Parse: Sized {
    type Output;

    fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self::Output>;
}
