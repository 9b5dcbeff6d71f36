//! Checker and reachability errors. Both reuse
//! [`lousyc_syntax::error::Diagnostic`] for rendering (`spec.md` §6).

use lousyc_syntax::error::Diagnostic;
use lousyc_syntax::Token;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckError {
    #[error("this name clashes with an existing symbol")]
    NameClash { token: Token },

    #[error("symbol does not exist in this scope")]
    SymbolNotFound { token: Token },

    #[error("cannot assign this value")]
    CannotAssign { token: Token },

    #[error("initializers not implemented yet")]
    InitializerNotImplemented { token: Token },
}

impl CheckError {
    pub fn token(&self) -> Token {
        match self {
            CheckError::NameClash { token }
            | CheckError::SymbolNotFound { token }
            | CheckError::CannotAssign { token }
            | CheckError::InitializerNotImplemented { token } => *token,
        }
    }

    pub fn diagnostic(&self, path: &str, source: &str) -> Diagnostic {
        Diagnostic::new(path, source, self.token(), self.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("this code is unreachable")]
pub struct ReachabilityError {
    pub token: Token,
}

impl ReachabilityError {
    pub fn diagnostic(&self, path: &str, source: &str) -> Diagnostic {
        Diagnostic::new(path, source, self.token, self.to_string())
    }
}
