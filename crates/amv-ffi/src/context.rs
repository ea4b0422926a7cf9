use amv_core::{Dispatcher, KernelConfig, Result, SquareMatrix};

/// Opaque context handle that owns a configured dispatcher.
pub struct AmvContext {
    pub dispatcher: Dispatcher,
}

impl Default for AmvContext {
    fn default() -> Self {
        Self {
            dispatcher: Dispatcher::with_defaults(),
        }
    }
}

impl AmvContext {
    pub fn new(config: KernelConfig) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(config)?,
        })
    }
}

/// Opaque matrix handle: one contiguous row-major n×n block.
pub struct AmvMatrix {
    pub matrix: SquareMatrix,
}
