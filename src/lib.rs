// Phobos - a small synchronous web framework core for Rust
//
// This library wires together a dependency-injection container, a pattern
// router, and a middleware pipeline behind one application bootstrapper.

// Re-export core functionality
pub use phobos_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use phobos_config;

#[cfg(feature = "events")]
pub use phobos_events;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Action,
        ActionResult,
        Application,
        Container,
        Error,
        GroupAttributes,
        HttpException,
        HttpStatus,
        Middleware,
        MiddlewareEntry,
        Module,
        ParamSpec,
        ParamType,
        Provider,
        Recorder,
        Request,
        Response,
        Route,
        Router,
        TypeSpec,
    };
}
