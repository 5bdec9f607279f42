// Core library for the Phobos web framework
// This crate contains the dispatch and resolution core: request/response
// value objects, the dependency-injection container, the pattern router,
// and the middleware pipeline, composed by the application bootstrapper.

pub mod application;
pub mod container;
pub mod error;
pub mod http;
pub mod module;
pub mod observe;
pub mod pipeline;
pub mod routing;
pub mod status;

// Re-export commonly used types
pub use application::Application;
pub use container::{
    arg, arg_opt, arg_value, value, BindingInfo, CallTarget, CallableSpec, Callback, Container,
    MethodSpec, Nil, ParamMap, ParamSpec, ParamType, PrimitiveKind, SharedValue, TypeSpec,
};
pub use error::{Error, HttpException};
pub use http::{Request, Response, UploadedFile};
pub use module::{Module, Provider};
pub use observe::{NullRecorder, Recorder};
pub use pipeline::{ActionResult, HandlerFn, Middleware, MiddlewareEntry, Next, Pipeline};
pub use routing::{Action, GroupAttributes, Route, RouteHandle, RouteMatch, Router, ALL_METHODS};
pub use status::HttpStatus;
