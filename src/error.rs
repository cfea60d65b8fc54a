use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SharedError {
    /// The global allocator refused a request.
    #[error("allocation of {size} bytes (align {align}) failed")]
    Alloc { size : usize, align : usize },
    /// The operation needs a handle that owns a value.
    #[error("handle does not own a value")]
    Empty,
    /// A checked downcast found a different dynamic type.
    #[error("managed value is not a `{expected}`")]
    TypeMismatch { expected : &'static str },
}
