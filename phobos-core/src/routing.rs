// Pattern router
//
// Patterns are compiled to anchored regexes in a single left-to-right scan
// so capture names line up with capture groups in positional order, even
// for mixed patterns like /files/*/versions/:id/**.

use crate::http::normalize_path;
use crate::observe::{NullRecorder, Recorder};
use crate::pipeline::{ActionResult, HandlerFn, MiddlewareEntry};
use crate::{Error, Request};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a matched route dispatches to
#[derive(Clone)]
pub enum Action {
    /// A plain handler closure
    Handler(HandlerFn),
    /// A container-dispatched method on a registered type
    Method { class: String, method: String },
}

impl Action {
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(Request) -> Result<ActionResult, Error> + Send + Sync + 'static,
    {
        Action::Handler(Arc::new(f))
    }

    /// Parse a `Class::method` action string
    pub fn parse(spec: &str) -> Result<Self, Error> {
        match spec.split_once("::") {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Ok(Action::Method {
                    class: class.to_string(),
                    method: method.to_string(),
                })
            }
            _ => Err(Error::Container(format!(
                "invalid callback: `{spec}` is not of the form Class::method"
            ))),
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Handler(_) => f.write_str("Action::Handler"),
            Action::Method { class, method } => write!(f, "Action::Method({class}::{method})"),
        }
    }
}

/// A route pattern compiled to an anchored regex plus the capture names in
/// positional order.
#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    names: Vec<String>,
}

impl CompiledPattern {
    // :name captures one segment, the n-th * captures one anonymous
    // segment named segment_<n> (counting occurrences from 0), and a
    // trailing /** captures the remainder (including nothing) under
    // "wildcard". A ** anywhere else is rejected.
    fn compile(pattern: &str) -> Result<Self, Error> {
        let normalized = normalize_path(pattern);
        let mut source = String::from("^");
        let mut names = Vec::new();
        let mut stars = 0usize;

        if normalized == "/" {
            source.push('/');
        } else {
            let segments: Vec<&str> = normalized[1..].split('/').collect();
            for (index, segment) in segments.iter().enumerate() {
                let last = index == segments.len() - 1;
                if *segment == "**" {
                    if !last {
                        return Err(Error::InvalidRoutePattern(format!(
                            "`{pattern}`: ** is only allowed as the final segment"
                        )));
                    }
                    // Optional group: an absent tail yields no parameter.
                    source.push_str("(?:/(.*))?");
                    names.push("wildcard".to_string());
                } else if let Some(name) = segment.strip_prefix(':') {
                    source.push_str("/([^/]+)");
                    names.push(name.to_string());
                } else if *segment == "*" {
                    source.push_str("/([^/]+)");
                    names.push(format!("segment_{stars}"));
                    stars += 1;
                } else {
                    source.push('/');
                    source.push_str(&regex::escape(segment));
                }
            }
        }
        source.push('$');

        let regex = Regex::new(&source)
            .map_err(|e| Error::InvalidRoutePattern(format!("`{pattern}`: {e}")))?;
        Ok(Self { regex, names })
    }

    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        let mut params = HashMap::new();
        for (index, name) in self.names.iter().enumerate() {
            if let Some(capture) = captures.get(index + 1) {
                params.insert(name.clone(), capture.as_str().to_string());
            }
        }
        Some(params)
    }
}

/// The standard verbs an `any` registration expands to
pub const ALL_METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// A registered route
#[derive(Debug, Clone)]
pub struct Route {
    /// Accepted methods, upper-cased, always non-empty
    pub methods: Vec<String>,
    pub pattern: String,
    compiled: CompiledPattern,
    pub action: Action,
    pub middleware: Vec<MiddlewareEntry>,
    pub name: Option<String>,
    pub attributes: HashMap<String, String>,
}

/// The outcome of a successful route resolution
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Attributes applied to every route registered inside a group
#[derive(Debug, Clone, Default)]
pub struct GroupAttributes {
    pub prefix: Option<String>,
    pub middleware: Vec<MiddlewareEntry>,
    pub attributes: HashMap<String, String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn middleware(mut self, entry: MiddlewareEntry) -> Self {
        self.middleware.push(entry);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Builder handle over a freshly registered route
pub struct RouteHandle<'a> {
    router: &'a mut Router,
    index: usize,
}

impl std::fmt::Debug for RouteHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteHandle")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<'a> RouteHandle<'a> {
    /// Append a route-level middleware; it runs inside any group middleware
    pub fn middleware(self, entry: MiddlewareEntry) -> Self {
        self.router.routes[self.index].middleware.push(entry);
        self
    }

    /// Name the route for URL generation. Registering a second route under
    /// an existing name is an error.
    pub fn name(self, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if self.router.names.contains_key(&name) {
            return Err(Error::DuplicateRouteName(name));
        }
        self.router.names.insert(name.clone(), self.index);
        self.router.routes[self.index].name = Some(name);
        Ok(self)
    }

    /// Set a route attribute; overrides any value inherited from a group
    pub fn attribute(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.router.routes[self.index]
            .attributes
            .insert(key.into(), value.into());
        self
    }
}

/// First-match-wins pattern router
pub struct Router {
    routes: Vec<Route>,
    names: HashMap<String, usize>,
    group_stack: Vec<GroupAttributes>,
    recorder: Arc<dyn Recorder>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            names: HashMap::new(),
            group_stack: Vec::new(),
            recorder: Arc::new(NullRecorder),
        }
    }

    pub fn set_recorder(&mut self, recorder: Arc<dyn Recorder>) {
        self.recorder = recorder;
    }

    // ---- registration -----------------------------------------------------

    pub fn get(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["GET"], pattern, action)
    }

    pub fn post(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["POST"], pattern, action)
    }

    pub fn put(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["PUT"], pattern, action)
    }

    pub fn delete(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["DELETE"], pattern, action)
    }

    pub fn patch(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["PATCH"], pattern, action)
    }

    pub fn options(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(&["OPTIONS"], pattern, action)
    }

    /// Register a route accepting every standard method
    pub fn any(&mut self, pattern: &str, action: Action) -> Result<RouteHandle<'_>, Error> {
        self.match_methods(ALL_METHODS, pattern, action)
    }

    /// Register a route for an explicit method list. An empty list expands
    /// to the standard verb set, so every stored route carries a non-empty
    /// method set.
    pub fn match_methods(
        &mut self,
        methods: &[&str],
        pattern: &str,
        action: Action,
    ) -> Result<RouteHandle<'_>, Error> {
        let methods = if methods.is_empty() {
            ALL_METHODS
        } else {
            methods
        };
        let full_pattern = self.prefixed(pattern);
        let compiled = CompiledPattern::compile(&full_pattern)?;

        let mut middleware = Vec::new();
        let mut attributes = HashMap::new();
        // Outer groups contribute middleware first and lose attribute
        // conflicts to inner groups.
        for group in &self.group_stack {
            middleware.extend(group.middleware.iter().cloned());
            attributes.extend(
                group
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }

        trace!(pattern = %full_pattern, methods = ?methods, "Registering route");
        self.routes.push(Route {
            methods: methods.iter().map(|m| m.to_uppercase()).collect(),
            pattern: normalize_path(&full_pattern),
            compiled,
            action,
            middleware,
            name: None,
            attributes,
        });
        let index = self.routes.len() - 1;
        Ok(RouteHandle {
            router: self,
            index,
        })
    }

    /// Run `register` with the given attributes pushed onto the group
    /// stack; every route registered inside inherits them.
    pub fn group<F>(&mut self, attributes: GroupAttributes, register: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Router) -> Result<(), Error>,
    {
        self.group_stack.push(attributes);
        let outcome = register(self);
        self.group_stack.pop();
        outcome
    }

    fn prefixed(&self, pattern: &str) -> String {
        let mut combined = String::new();
        for group in &self.group_stack {
            if let Some(prefix) = &group.prefix {
                let trimmed = prefix.trim_matches('/');
                if !trimmed.is_empty() {
                    combined.push('/');
                    combined.push_str(trimmed);
                }
            }
        }
        let tail = pattern.trim_matches('/');
        if !tail.is_empty() {
            combined.push('/');
            combined.push_str(tail);
        }
        if combined.is_empty() {
            combined.push('/');
        }
        combined
    }

    // ---- resolution -------------------------------------------------------

    /// Resolve a method+path to the first matching route, in registration
    /// order. Method comparison is exact: callers supply the upper-cased
    /// method (`Request::new` already normalizes it).
    pub fn resolve(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, Error> {
        let method = method.to_string();
        let path = normalize_path(path);

        for route in &self.routes {
            if !route.methods.iter().any(|m| m == &method) {
                continue;
            }
            if let Some(params) = route.compiled.match_path(&path) {
                debug!(%method, %path, pattern = %route.pattern, "Route matched");
                self.recorder.record(
                    "route.matched",
                    &[
                        ("method", method.clone()),
                        ("path", path.clone()),
                        ("pattern", route.pattern.clone()),
                    ],
                );
                return Ok(RouteMatch { route, params });
            }
        }

        debug!(%method, %path, "No route matched");
        self.recorder.record(
            "route.missed",
            &[("method", method.clone()), ("path", path.clone())],
        );
        Err(Error::RouteNotFound(format!("{method} {path}")))
    }

    /// Generate a URL for a named route by substituting its pattern tokens.
    ///
    /// `:name` and `*` tokens must be covered by `params` (anonymous
    /// segments under their `segment_<i>` key); a trailing `**` is filled
    /// from the `wildcard` key or dropped when absent.
    pub fn url(&self, name: &str, params: &HashMap<String, String>) -> Result<String, Error> {
        let index = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| Error::RouteNotFound(format!("no route named `{name}`")))?;
        let route = &self.routes[index];

        let mut segments = Vec::new();
        let mut missing = Vec::new();
        let mut stars = 0usize;
        let pattern = route.pattern.trim_start_matches('/');
        for segment in pattern.split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment == "**" {
                if let Some(value) = params.get("wildcard") {
                    segments.push(value.clone());
                }
            } else if let Some(token) = segment.strip_prefix(':') {
                match params.get(token) {
                    Some(value) => segments.push(value.clone()),
                    None => missing.push(token.to_string()),
                }
            } else if segment == "*" {
                let key = format!("segment_{stars}");
                stars += 1;
                match params.get(&key) {
                    Some(value) => segments.push(value.clone()),
                    None => missing.push(key),
                }
            } else {
                segments.push(segment.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingRouteParameters(format!(
                "route `{name}` needs: {}",
                missing.join(", ")
            )));
        }
        if segments.is_empty() {
            Ok("/".to_string())
        } else {
            Ok(format!("/{}", segments.join("/")))
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Response;

    fn noop() -> Action {
        Action::handler(|_req| Ok(ActionResult::Response(Response::ok())))
    }

    #[test]
    fn test_static_route_match() {
        let mut router = Router::new();
        router.get("/users", noop()).unwrap();

        let matched = router.resolve("GET", "/users").unwrap();
        assert_eq!(matched.route.pattern, "/users");
        assert!(matched.params.is_empty());
        assert!(router.resolve("POST", "/users").is_err());
        assert!(router.resolve("GET", "/users/1").is_err());
    }

    #[test]
    fn test_trailing_slash_is_equivalent() {
        let mut router = Router::new();
        router.get("/users/", noop()).unwrap();
        assert!(router.resolve("GET", "/users").is_ok());
        assert!(router.resolve("GET", "/users/").is_ok());
    }

    #[test]
    fn test_named_parameter_capture() {
        let mut router = Router::new();
        router.get("/users/:id/posts/:post", noop()).unwrap();

        let matched = router.resolve("GET", "/users/42/posts/7").unwrap();
        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(matched.params.get("post").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_single_star_is_anonymous_one_segment() {
        let mut router = Router::new();
        router.get("/files/*/download", noop()).unwrap();

        // anonymous captures count * occurrences from zero, not path position
        let matched = router.resolve("GET", "/files/report/download").unwrap();
        assert_eq!(
            matched.params.get("segment_0").map(String::as_str),
            Some("report")
        );
        assert!(router.resolve("GET", "/files/a/b/download").is_err());
    }

    #[test]
    fn test_multiple_stars_number_by_occurrence() {
        let mut router = Router::new();
        router.get("/pick/*/from/*", noop()).unwrap();

        let matched = router.resolve("GET", "/pick/one/from/two").unwrap();
        assert_eq!(matched.params.get("segment_0").map(String::as_str), Some("one"));
        assert_eq!(matched.params.get("segment_1").map(String::as_str), Some("two"));
    }

    #[test]
    fn test_trailing_double_star_captures_remainder() {
        let mut router = Router::new();
        router.get("/static/**", noop()).unwrap();

        let deep = router.resolve("GET", "/static/css/site.css").unwrap();
        assert_eq!(
            deep.params.get("wildcard").map(String::as_str),
            Some("css/site.css")
        );

        // empty remainder matches too, with no wildcard param at all
        let bare = router.resolve("GET", "/static").unwrap();
        assert!(bare.params.get("wildcard").is_none());
    }

    #[test]
    fn test_mixed_pattern_positional_captures() {
        let mut router = Router::new();
        router.get("/a/*/b/:id/**", noop()).unwrap();

        let matched = router.resolve("GET", "/a/x/b/9/rest/of/it").unwrap();
        assert_eq!(matched.params.get("segment_0").map(String::as_str), Some("x"));
        assert_eq!(matched.params.get("id").map(String::as_str), Some("9"));
        assert_eq!(
            matched.params.get("wildcard").map(String::as_str),
            Some("rest/of/it")
        );
    }

    #[test]
    fn test_double_star_mid_pattern_is_rejected() {
        let mut router = Router::new();
        let err = router.get("/a/**/b", noop()).unwrap_err();
        assert!(matches!(err, Error::InvalidRoutePattern(_)));
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let mut router = Router::new();
        router.get("/users/:id", noop()).unwrap();
        router.get("/users/me", noop()).unwrap();

        // the earlier, more generic pattern shadows the later literal one
        let matched = router.resolve("GET", "/users/me").unwrap();
        assert_eq!(matched.route.pattern, "/users/:id");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("me"));
    }

    #[test]
    fn test_any_matches_every_standard_method() {
        let mut router = Router::new();
        router.any("/ping", noop()).unwrap();
        for method in ALL_METHODS {
            assert!(router.resolve(method, "/ping").is_ok());
        }
        // the stored method set is explicit, never empty
        assert!(!router.routes()[0].methods.is_empty());
    }

    #[test]
    fn test_method_matching_is_exact_and_case_sensitive() {
        let mut router = Router::new();
        router.match_methods(&["get", "Post"], "/x", noop()).unwrap();
        // stored methods are upper-cased at registration; lookup compares
        // verbatim, so only the upper-case form matches
        assert!(router.resolve("GET", "/x").is_ok());
        assert!(router.resolve("POST", "/x").is_ok());
        assert!(router.resolve("post", "/x").is_err());
        assert!(router.resolve("PUT", "/x").is_err());
    }

    #[test]
    fn test_group_prefix_and_nesting() {
        let mut router = Router::new();
        router
            .group(GroupAttributes::new().prefix("/api"), |r| {
                r.get("/ping", noop())?;
                r.group(GroupAttributes::new().prefix("v1"), |r| {
                    r.get("/users/:id", noop())?;
                    Ok(())
                })
            })
            .unwrap();

        assert!(router.resolve("GET", "/api/ping").is_ok());
        let matched = router.resolve("GET", "/api/v1/users/3").unwrap();
        assert_eq!(matched.route.pattern, "/api/v1/users/:id");
        // routes registered after the group closes are unprefixed
        router.get("/plain", noop()).unwrap();
        assert!(router.resolve("GET", "/plain").is_ok());
    }

    #[test]
    fn test_group_attributes_innermost_wins() {
        let mut router = Router::new();
        router
            .group(
                GroupAttributes::new().attribute("auth", "basic").attribute("zone", "api"),
                |r| {
                    r.group(GroupAttributes::new().attribute("auth", "token"), |r| {
                        r.get("/secure", noop())?;
                        Ok(())
                    })
                },
            )
            .unwrap();

        let matched = router.resolve("GET", "/secure").unwrap();
        assert_eq!(
            matched.route.attributes.get("auth").map(String::as_str),
            Some("token")
        );
        assert_eq!(
            matched.route.attributes.get("zone").map(String::as_str),
            Some("api")
        );
    }

    #[test]
    fn test_route_attribute_overrides_group() {
        let mut router = Router::new();
        router
            .group(GroupAttributes::new().attribute("auth", "basic"), |r| {
                r.get("/open", noop())?.attribute("auth", "none");
                Ok(())
            })
            .unwrap();

        let matched = router.resolve("GET", "/open").unwrap();
        assert_eq!(
            matched.route.attributes.get("auth").map(String::as_str),
            Some("none")
        );
    }

    #[test]
    fn test_named_route_url_generation() {
        let mut router = Router::new();
        router
            .get("/users/:id/posts/:post", noop())
            .unwrap()
            .name("user.post")
            .unwrap();

        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        params.insert("post".to_string(), "7".to_string());
        assert_eq!(
            router.url("user.post", &params).unwrap(),
            "/users/42/posts/7"
        );
    }

    #[test]
    fn test_url_substitutes_anonymous_segments_by_occurrence() {
        let mut router = Router::new();
        router
            .get("/files/*/download", noop())
            .unwrap()
            .name("file.download")
            .unwrap();

        let mut params = HashMap::new();
        params.insert("segment_0".to_string(), "report".to_string());
        assert_eq!(
            router.url("file.download", &params).unwrap(),
            "/files/report/download"
        );
    }

    #[test]
    fn test_url_reports_missing_parameters() {
        let mut router = Router::new();
        router
            .get("/users/:id", noop())
            .unwrap()
            .name("user.show")
            .unwrap();

        let err = router.url("user.show", &HashMap::new()).unwrap_err();
        match err {
            Error::MissingRouteParameters(message) => assert!(message.contains("id")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_url_for_unknown_name() {
        let router = Router::new();
        assert!(matches!(
            router.url("ghost", &HashMap::new()),
            Err(Error::RouteNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_route_name_is_rejected() {
        let mut router = Router::new();
        router.get("/a", noop()).unwrap().name("dup").unwrap();
        match router.get("/b", noop()).unwrap().name("dup") {
            Err(Error::DuplicateRouteName(name)) => assert_eq!(name, "dup"),
            _ => panic!("expected duplicate name error"),
        }
    }

    #[test]
    fn test_action_parse() {
        assert!(matches!(
            Action::parse("Users::show"),
            Ok(Action::Method { .. })
        ));
        assert!(Action::parse("justastring").is_err());
        assert!(Action::parse("::show").is_err());
    }

    #[test]
    fn test_root_route() {
        let mut router = Router::new();
        router.get("/", noop()).unwrap();
        assert!(router.resolve("GET", "/").is_ok());
        assert!(router.resolve("GET", "").is_ok());
        assert!(router.resolve("GET", "/anything").is_err());
    }
}
