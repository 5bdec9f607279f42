// Module and provider traits

use crate::container::Container;
use crate::pipeline::MiddlewareEntry;
use crate::routing::Router;
use crate::Error;
use std::sync::Arc;

/// A service provider: binds services into the container during boot.
///
/// All providers have `register` called before any has `boot` called, so a
/// provider's boot phase may resolve services registered by another.
pub trait Provider: Send + Sync {
    fn register(&self, container: &Container) -> Result<(), Error>;

    fn boot(&self, _container: &Container) -> Result<(), Error> {
        Ok(())
    }
}

/// A feature module: contributes routes, middleware, and providers to the
/// application.
pub trait Module: Send + Sync {
    /// Register this module's routes
    fn routes(&self, router: &mut Router) -> Result<(), Error>;

    /// Middleware applied to every request, after the application's global
    /// middleware and before any route middleware
    fn middlewares(&self) -> Vec<MiddlewareEntry> {
        Vec::new()
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        Vec::new()
    }
}
