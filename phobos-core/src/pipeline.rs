// Onion middleware pipeline
//
// Middleware wrap the handler outside-in: the first entry sees the request
// first and the response last. Each layer decides whether to call `next`;
// dropping it short-circuits everything further in.

use crate::container::Container;
use crate::{Error, Request, Response};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Continuation to the next pipeline layer. Call at most once; dropping it
/// without calling short-circuits the rest of the pipeline.
pub type Next<'a> = Box<dyn FnOnce(Request) -> Result<Response, Error> + 'a>;

/// A pipeline layer
pub trait Middleware: Send + Sync {
    fn handle(&self, request: Request, next: Next<'_>) -> Result<Response, Error>;
}

/// A middleware reference held by a route or pipeline: either an instance,
/// or a name resolved through the container on first use.
#[derive(Clone)]
pub enum MiddlewareEntry {
    Instance(Arc<dyn Middleware>),
    Named(String),
}

impl MiddlewareEntry {
    pub fn instance<M: Middleware + 'static>(middleware: M) -> Self {
        MiddlewareEntry::Instance(Arc::new(middleware))
    }

    pub fn named(name: impl Into<String>) -> Self {
        MiddlewareEntry::Named(name.into())
    }
}

impl std::fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareEntry::Instance(_) => f.write_str("MiddlewareEntry::Instance"),
            MiddlewareEntry::Named(name) => write!(f, "MiddlewareEntry::Named({name})"),
        }
    }
}

/// A route handler closure producing a value for normalization
pub type HandlerFn = Arc<dyn Fn(Request) -> Result<ActionResult, Error> + Send + Sync>;

/// What a handler returned, before normalization into a `Response`
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// Passed through untouched
    Response(Response),
    /// Normalized by shape: objects and arrays become JSON, strings become
    /// HTML, remaining scalars are wrapped as `{"data": value}` JSON.
    Value(serde_json::Value),
}

impl ActionResult {
    /// Serialize any value into an `ActionResult::Value`
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(ActionResult::Value)
            .map_err(|e| Error::Container(format!("result serialization failed: {e}")))
    }

    /// Normalize into a concrete response. Every normalized variant gets
    /// status 200; handlers needing another status return a `Response`.
    pub fn into_response(self) -> Result<Response, Error> {
        match self {
            ActionResult::Response(response) => Ok(response),
            ActionResult::Value(value) => match value {
                serde_json::Value::String(text) => Ok(Response::ok().with_html(text)),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    Response::ok().with_json(&value)
                }
                scalar => Response::ok().with_json(&serde_json::json!({ "data": scalar })),
            },
        }
    }
}

impl From<Response> for ActionResult {
    fn from(response: Response) -> Self {
        ActionResult::Response(response)
    }
}

impl From<serde_json::Value> for ActionResult {
    fn from(value: serde_json::Value) -> Self {
        ActionResult::Value(value)
    }
}

impl From<String> for ActionResult {
    fn from(text: String) -> Self {
        ActionResult::Value(serde_json::Value::String(text))
    }
}

impl From<&str> for ActionResult {
    fn from(text: &str) -> Self {
        ActionResult::Value(serde_json::Value::String(text.to_string()))
    }
}

/// Composes middleware around a destination handler
pub struct Pipeline {
    container: Arc<Container>,
    entries: Vec<MiddlewareEntry>,
}

impl Pipeline {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            entries: Vec::new(),
        }
    }

    /// Append layers; earlier entries end up outermost
    pub fn through<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = MiddlewareEntry>,
    {
        self.entries.extend(entries);
        self
    }

    /// Run the request through every layer and into the handler
    pub fn then<F>(self, request: Request, handler: F) -> Result<Response, Error>
    where
        F: FnOnce(Request) -> Result<Response, Error> + 'static,
    {
        trace!(layers = self.entries.len(), "Running pipeline");
        self.container.recorder().record(
            "pipeline.start",
            &[("layers", self.entries.len().to_string())],
        );

        let mut stack = VecDeque::with_capacity(self.entries.len());
        for entry in &self.entries {
            stack.push_back(self.materialize(entry)?);
        }
        let outcome = run_stack(
            stack,
            0,
            self.container.recorder(),
            request,
            Box::new(handler),
        );

        self.container.recorder().record(
            "pipeline.end",
            &[("ok", outcome.is_ok().to_string())],
        );
        outcome
    }

    fn materialize(&self, entry: &MiddlewareEntry) -> Result<Arc<dyn Middleware>, Error> {
        match entry {
            MiddlewareEntry::Instance(middleware) => Ok(middleware.clone()),
            MiddlewareEntry::Named(name) => {
                let resolved = self.container.make(name)?;
                resolved
                    .downcast::<Arc<dyn Middleware>>()
                    .map(|wrapped| (*wrapped).clone())
                    .map_err(|_| {
                        Error::Container(format!("`{name}` did not resolve to a middleware"))
                    })
            }
        }
    }
}

fn run_stack(
    mut stack: VecDeque<Arc<dyn Middleware>>,
    depth: usize,
    recorder: Arc<dyn crate::observe::Recorder>,
    request: Request,
    handler: Next<'static>,
) -> Result<Response, Error> {
    match stack.pop_front() {
        None => handler(request),
        Some(layer) => {
            recorder.record("middleware.enter", &[("layer", depth.to_string())]);
            let inner_recorder = recorder.clone();
            let outcome = layer.handle(
                request,
                Box::new(move |passed| {
                    run_stack(stack, depth + 1, inner_recorder, passed, handler)
                }),
            );
            recorder.record(
                "middleware.exit",
                &[
                    ("layer", depth.to_string()),
                    ("ok", outcome.is_ok().to_string()),
                ],
            );
            outcome
        }
    }
}
