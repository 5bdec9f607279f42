// Application bootstrapper
//
// Wires the container, router, and pipeline together: modules contribute
// providers, middleware, and routes during boot; handle() then runs each
// request through global, module, and route middleware into its action.

use crate::container::{value, CallTarget, Callback, Container, ParamMap, SharedValue};
use crate::module::Module;
use crate::observe::Recorder;
use crate::pipeline::{ActionResult, MiddlewareEntry, Pipeline};
use crate::routing::{Action, Router};
use crate::{Error, Request, Response};
use std::sync::Arc;
use tracing::{debug, info};

/// The application: container, router, middleware stacks, and modules
pub struct Application {
    container: Arc<Container>,
    router: Router,
    middleware: Vec<MiddlewareEntry>,
    module_middleware: Vec<MiddlewareEntry>,
    modules: Vec<Arc<dyn Module>>,
    booted: bool,
}

impl Application {
    pub fn new() -> Self {
        debug!("Creating application");
        Self {
            container: Arc::new(Container::new()),
            router: Router::new(),
            middleware: Vec::new(),
            module_middleware: Vec::new(),
            modules: Vec::new(),
            booted: false,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Install the observability sink for the container, router, and
    /// application events
    pub fn set_recorder(&mut self, recorder: Arc<dyn Recorder>) {
        self.container.set_recorder(recorder.clone());
        self.router.set_recorder(recorder);
    }

    /// Append a global middleware; global middleware are outermost
    pub fn middleware(&mut self, entry: MiddlewareEntry) -> &mut Self {
        self.middleware.push(entry);
        self
    }

    pub fn register_module<M: Module + 'static>(&mut self, module: M) -> &mut Self {
        self.modules.push(Arc::new(module));
        self
    }

    /// Boot all registered modules. Every provider's `register` runs before
    /// any provider's `boot`; module middleware and routes are collected
    /// afterwards. Booting twice is a no-op.
    pub fn boot(&mut self) -> Result<(), Error> {
        if self.booted {
            return Ok(());
        }

        let providers: Vec<_> = self
            .modules
            .iter()
            .flat_map(|module| module.providers())
            .collect();
        for provider in &providers {
            provider.register(&self.container)?;
        }
        for provider in &providers {
            provider.boot(&self.container)?;
        }

        let modules = self.modules.clone();
        for module in &modules {
            self.module_middleware.extend(module.middlewares());
            module.routes(&mut self.router)?;
        }

        self.booted = true;
        info!(
            modules = modules.len(),
            providers = providers.len(),
            routes = self.router.routes().len(),
            "Application booted"
        );
        self.container.recorder().record(
            "app.booted",
            &[
                ("modules", modules.len().to_string()),
                ("routes", self.router.routes().len().to_string()),
            ],
        );
        Ok(())
    }

    /// Run one request to completion: resolve the route, stack global +
    /// module + route middleware, and dispatch the action.
    pub fn handle(&self, request: Request) -> Result<Response, Error> {
        let matched = self.router.resolve(&request.method, &request.path)?;

        let mut request = request;
        request.set_params(matched.params.clone());

        let mut entries = self.middleware.clone();
        entries.extend(self.module_middleware.iter().cloned());
        entries.extend(matched.route.middleware.iter().cloned());

        let action = matched.route.action.clone();
        let container = self.container.clone();
        Pipeline::new(self.container.clone())
            .through(entries)
            .then(request, move |passed| {
                dispatch_action(&container, &action, passed)
            })
    }

    /// Generate a URL for a named route
    pub fn url(
        &self,
        name: &str,
        params: &std::collections::HashMap<String, String>,
    ) -> Result<String, Error> {
        self.router.url(name, params)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

// Method actions receive their route parameters by name plus the request
// itself under "request"; whatever they return is normalized like a
// handler return value.
fn dispatch_action(
    container: &Arc<Container>,
    action: &Action,
    request: Request,
) -> Result<Response, Error> {
    match action {
        Action::Handler(handler) => handler(request)?.into_response(),
        Action::Method { class, method } => {
            let mut params = ParamMap::new();
            for (name, captured) in request.params() {
                params.insert(name.clone(), value(captured.clone()));
            }
            params.insert("request".to_string(), value(request));

            let callback = Callback::Method {
                target: CallTarget::Abstract(class.clone()),
                method: method.clone(),
            };
            normalize_returned(container.call(&callback, &params)?)
        }
    }
}

fn normalize_returned(raw: SharedValue) -> Result<Response, Error> {
    if let Some(result) = raw.downcast_ref::<ActionResult>() {
        return result.clone().into_response();
    }
    if let Some(response) = raw.downcast_ref::<Response>() {
        return Ok(response.clone());
    }
    if let Some(json) = raw.downcast_ref::<serde_json::Value>() {
        return ActionResult::Value(json.clone()).into_response();
    }
    if let Some(text) = raw.downcast_ref::<String>() {
        return ActionResult::from(text.clone()).into_response();
    }
    Err(Error::Container(
        "action returned an unsupported value".to_string(),
    ))
}
