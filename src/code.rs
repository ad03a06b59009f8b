//! The external code-registration collaborator. The loader hands decoded
//! code text (raw bytes with explicit lengths, GML may contain embedded
//! NULs) to this interface and stores only the returned handles; it never
//! interprets code itself.

use crate::ByteString;

/// Opaque handle for a registered piece of code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CodeHandle(pub u32);

pub trait CodeRegistry {
    /// Registers a block of code run for its side effects.
    fn register(&mut self, source: &[u8]) -> CodeHandle;

    /// Registers an expression evaluated for an answer (trigger conditions,
    /// action condition parameters).
    fn register_question(&mut self, source: &[u8]) -> CodeHandle;

    /// Compiles a previously registered handle. The error string is reported
    /// back through [`crate::Error::Compile`].
    fn compile(&mut self, handle: CodeHandle) -> Result<(), String>;
}

/// A registry that records sources without compiling anything. Useful for
/// headless inspection of a game's assets, and for tests.
#[derive(Default)]
pub struct NullRegistry {
    pub sources: Vec<ByteString>,
    pub compiled: Vec<CodeHandle>,
}

impl CodeRegistry for NullRegistry {
    fn register(&mut self, source: &[u8]) -> CodeHandle {
        let handle = CodeHandle(self.sources.len() as u32);
        self.sources.push(ByteString::from(source));
        handle
    }

    fn register_question(&mut self, source: &[u8]) -> CodeHandle {
        self.register(source)
    }

    fn compile(&mut self, handle: CodeHandle) -> Result<(), String> {
        self.compiled.push(handle);
        Ok(())
    }
}
