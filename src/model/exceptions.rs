//! Try blocks and exception handlers.
//!
//! Both types are generic over how the caught exception type is held: the immutable model uses
//! the descriptor `String`, a construction session holds the canonical type reference.

/// One `catch` clause of a try block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExceptionHandler<T = String> {
    /// Caught exception type; `None` is the catch-all handler
    pub exception_type: Option<T>,
    /// Code address of the handler
    pub handler_code_address: u32,
}

impl<T> ExceptionHandler<T> {
    /// Create a typed handler
    pub fn new(exception_type: T, handler_code_address: u32) -> Self {
        ExceptionHandler {
            exception_type: Some(exception_type),
            handler_code_address,
        }
    }

    /// Create a catch-all handler
    pub fn catch_all(handler_code_address: u32) -> Self {
        ExceptionHandler {
            exception_type: None,
            handler_code_address,
        }
    }

    /// Rebuild the handler with its exception type mapped through `f`
    ///
    /// # Errors
    /// Propagates the error returned by `f`.
    pub fn map_type<U, E, F>(&self, f: F) -> Result<ExceptionHandler<U>, E>
    where
        F: FnOnce(&T) -> Result<U, E>,
    {
        Ok(ExceptionHandler {
            exception_type: self.exception_type.as_ref().map(f).transpose()?,
            handler_code_address: self.handler_code_address,
        })
    }
}

/// A range of code protected by a list of handlers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TryBlock<T = String> {
    /// First covered code address
    pub start_address: u32,
    /// Number of covered code units
    pub code_unit_count: u32,
    /// Handlers in match order
    pub handlers: Vec<ExceptionHandler<T>>,
}

impl<T> TryBlock<T> {
    /// Create a new try block
    pub fn new(start_address: u32, code_unit_count: u32, handlers: Vec<ExceptionHandler<T>>) -> Self {
        TryBlock {
            start_address,
            code_unit_count,
            handlers,
        }
    }

    /// One past the last covered code address
    #[must_use]
    pub fn end_address(&self) -> u32 {
        self.start_address + self.code_unit_count
    }

    /// Rebuild the try block with every handler type mapped through `f`
    ///
    /// # Errors
    /// Propagates the first error returned by `f`.
    pub fn map_types<U, E, F>(&self, mut f: F) -> Result<TryBlock<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        let handlers = self
            .handlers
            .iter()
            .map(|handler| handler.map_type(&mut f))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(TryBlock {
            start_address: self.start_address,
            code_unit_count: self.code_unit_count,
            handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_types_keeps_catch_all() {
        let block = TryBlock::new(
            2,
            6,
            vec![
                ExceptionHandler::new("Ljava/io/IOException;".to_string(), 10),
                ExceptionHandler::catch_all(14),
            ],
        );
        let mapped = block.map_types(|ty| Ok::<_, crate::Error>(ty.len())).unwrap();

        assert_eq!(mapped.end_address(), 8);
        assert_eq!(mapped.handlers[0].exception_type, Some(21));
        assert_eq!(mapped.handlers[1].exception_type, None);
        assert_eq!(mapped.handlers[1].handler_code_address, 14);
    }
}
