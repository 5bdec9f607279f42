// Dependency injection container
//
// String-keyed registries drive resolution: bindings map abstract
// identifiers to concrete resolvers, instances cache shared values, and a
// type registry replaces runtime constructor reflection. Each constructible
// type registers a TypeSpec describing its constructor parameters, the
// capabilities it satisfies, and a construct closure over the resolved
// argument list.

use crate::observe::{NullRecorder, Recorder};
use crate::pipeline::Middleware;
use crate::Error;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A value held by the container
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// Explicit parameter overrides supplied to `make_with` / `call`
pub type ParamMap = HashMap<String, SharedValue>;

/// Factory resolver: receives the container and the caller's parameter map
pub type FactoryFn = Arc<dyn Fn(&Container, &ParamMap) -> Result<SharedValue, Error> + Send + Sync>;

/// Construct closure: builds an instance from the resolved argument list
pub type ConstructFn = Arc<dyn Fn(&[SharedValue]) -> Result<SharedValue, Error> + Send + Sync>;

/// Function invocation closure for `call`
pub type InvokeFn = Arc<dyn Fn(&[SharedValue]) -> Result<SharedValue, Error> + Send + Sync>;

/// Method invocation closure: receiver plus resolved arguments
pub type MethodFn =
    Arc<dyn Fn(&SharedValue, &[SharedValue]) -> Result<SharedValue, Error> + Send + Sync>;

/// Marker value a nullable dependency resolves to when its type cannot be
/// built. `arg_opt` maps it to `None`.
pub struct Nil;

/// Wrap a value for the container
pub fn value<T: Send + Sync + 'static>(v: T) -> SharedValue {
    Arc::new(v)
}

/// Downcast a resolved constructor argument
pub fn arg<T: Send + Sync + 'static>(args: &[SharedValue], index: usize) -> Result<Arc<T>, Error> {
    let raw = args
        .get(index)
        .cloned()
        .ok_or_else(|| Error::Container(format!("missing constructor argument {index}")))?;
    raw.downcast::<T>().map_err(|_| {
        Error::Container(format!(
            "constructor argument {index} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Downcast a nullable argument; `Nil` becomes `None`
pub fn arg_opt<T: Send + Sync + 'static>(
    args: &[SharedValue],
    index: usize,
) -> Result<Option<Arc<T>>, Error> {
    let raw = args
        .get(index)
        .cloned()
        .ok_or_else(|| Error::Container(format!("missing constructor argument {index}")))?;
    if raw.downcast_ref::<Nil>().is_some() {
        return Ok(None);
    }
    raw.downcast::<T>().map(Some).map_err(|_| {
        Error::Container(format!(
            "constructor argument {index} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Downcast and clone a by-value argument (primitives and small values)
pub fn arg_value<T: Clone + Send + Sync + 'static>(
    args: &[SharedValue],
    index: usize,
) -> Result<T, Error> {
    arg::<T>(args, index).map(|v| (*v).clone())
}

/// Primitive parameter kinds, used for error messages and union filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Str,
    Int,
    Float,
    Bool,
    List,
    Map,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrimitiveKind::Str => "string",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::List => "list",
            PrimitiveKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Declared type of a constructor or callable parameter
#[derive(Debug, Clone)]
pub enum ParamType {
    /// No declared type at all
    Untyped,
    Primitive(PrimitiveKind),
    /// A class/interface identifier resolved recursively through the container
    Class(String),
    /// One of several types; non-primitive alternatives are attempted in
    /// declaration order, first success wins
    Union(Vec<ParamType>),
    /// The built instance must satisfy every listed capability
    Intersection(Vec<String>),
}

/// One constructor/callable parameter: name, declared type, optional
/// default, nullability
#[derive(Clone)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub default: Option<SharedValue>,
    pub nullable: bool,
}

impl ParamSpec {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Untyped,
            default: None,
            nullable: false,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Primitive(kind),
            default: None,
            nullable: false,
        }
    }

    pub fn class(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Class(class.into()),
            default: None,
            nullable: false,
        }
    }

    pub fn union(name: impl Into<String>, alternatives: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Union(alternatives),
            default: None,
            nullable: false,
        }
    }

    pub fn intersection(name: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Intersection(capabilities),
            default: None,
            nullable: false,
        }
    }

    pub fn with_default(mut self, default: SharedValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Registered metadata for one constructible type: the runtime replacement
/// for constructor reflection.
#[derive(Clone)]
pub struct TypeSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub capabilities: Vec<String>,
    pub construct: ConstructFn,
    pub methods: HashMap<String, MethodSpec>,
}

impl TypeSpec {
    pub fn new<F>(name: impl Into<String>, construct: F) -> Self
    where
        F: Fn(&[SharedValue]) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            capabilities: Vec::new(),
            construct: Arc::new(construct),
            methods: HashMap::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Declare an interface/capability this type satisfies, consulted by
    /// intersection parameter checks.
    pub fn capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    fn satisfies(&self, capability: &str) -> bool {
        self.name == capability || self.capabilities.iter().any(|c| c == capability)
    }
}

/// A dispatchable method on a registered type
#[derive(Clone)]
pub struct MethodSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub invoke: MethodFn,
}

impl MethodSpec {
    pub fn new<F>(name: impl Into<String>, invoke: F) -> Self
    where
        F: Fn(&SharedValue, &[SharedValue]) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// A free function with declared parameters, invokable via `Container::call`
#[derive(Clone)]
pub struct CallableSpec {
    pub params: Vec<ParamSpec>,
    pub invoke: InvokeFn,
}

impl CallableSpec {
    pub fn new<F>(invoke: F) -> Self
    where
        F: Fn(&[SharedValue]) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// Receiver of a method callback
#[derive(Clone)]
pub enum CallTarget {
    /// An abstract identifier resolved through `make` first
    Abstract(String),
    /// An already-built value plus the name of its registered type
    Value(SharedValue, String),
}

/// Shapes accepted by `Container::call`
#[derive(Clone)]
pub enum Callback {
    Function(CallableSpec),
    Method { target: CallTarget, method: String },
}

#[derive(Clone)]
enum Concrete {
    Class(String),
    Factory(FactoryFn),
}

#[derive(Clone)]
struct Binding {
    concrete: Concrete,
    shared: bool,
}

/// Read-only snapshot of one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub abstract_id: String,
    pub concrete: String,
    pub shared: bool,
}

/// The dependency injection container
#[derive(Clone)]
pub struct Container {
    bindings: Arc<RwLock<HashMap<String, Binding>>>,
    instances: Arc<RwLock<HashMap<String, SharedValue>>>,
    aliases: Arc<RwLock<HashMap<String, String>>>,
    types: Arc<RwLock<HashMap<String, Arc<TypeSpec>>>>,
    build_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    recorder: Arc<RwLock<Arc<dyn Recorder>>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            bindings: Arc::new(RwLock::new(HashMap::new())),
            instances: Arc::new(RwLock::new(HashMap::new())),
            aliases: Arc::new(RwLock::new(HashMap::new())),
            types: Arc::new(RwLock::new(HashMap::new())),
            build_locks: Arc::new(Mutex::new(HashMap::new())),
            recorder: Arc::new(RwLock::new(Arc::new(NullRecorder))),
        }
    }

    /// Install the observability sink the container reports to
    pub fn set_recorder(&self, recorder: Arc<dyn Recorder>) {
        *self.recorder.write() = recorder;
    }

    pub(crate) fn recorder(&self) -> Arc<dyn Recorder> {
        self.recorder.read().clone()
    }

    // ---- registration -----------------------------------------------------

    /// Register an abstract identifier as non-shared. With no concrete, the
    /// abstract resolves to itself. Overwrites any existing binding.
    pub fn bind(&self, abstract_id: &str, concrete: Option<&str>) {
        self.insert_binding(abstract_id, concrete, false);
    }

    /// Register a non-shared factory resolver
    pub fn bind_factory<F>(&self, abstract_id: &str, factory: F)
    where
        F: Fn(&Container, &ParamMap) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        self.insert_factory(abstract_id, factory, false);
    }

    /// Like `bind`, but the first resolution caches the instance
    pub fn singleton(&self, abstract_id: &str, concrete: Option<&str>) {
        self.insert_binding(abstract_id, concrete, true);
    }

    /// Register a shared factory resolver
    pub fn singleton_factory<F>(&self, abstract_id: &str, factory: F)
    where
        F: Fn(&Container, &ParamMap) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        self.insert_factory(abstract_id, factory, true);
    }

    fn insert_binding(&self, abstract_id: &str, concrete: Option<&str>, shared: bool) {
        let concrete_name = concrete.unwrap_or(abstract_id).to_string();
        trace!(abstract_id, concrete = %concrete_name, shared, "Registering binding");
        self.bindings.write().insert(
            abstract_id.to_string(),
            Binding {
                concrete: Concrete::Class(concrete_name),
                shared,
            },
        );
        self.recorder().record(
            "container.binding",
            &[
                ("abstract", abstract_id.to_string()),
                ("shared", shared.to_string()),
            ],
        );
    }

    fn insert_factory<F>(&self, abstract_id: &str, factory: F, shared: bool)
    where
        F: Fn(&Container, &ParamMap) -> Result<SharedValue, Error> + Send + Sync + 'static,
    {
        trace!(abstract_id, shared, "Registering factory binding");
        self.bindings.write().insert(
            abstract_id.to_string(),
            Binding {
                concrete: Concrete::Factory(Arc::new(factory)),
                shared,
            },
        );
        self.recorder().record(
            "container.binding",
            &[
                ("abstract", abstract_id.to_string()),
                ("shared", shared.to_string()),
            ],
        );
    }

    /// Register a pre-built object as an already-resolved singleton;
    /// future construction is bypassed entirely.
    pub fn instance<T: Send + Sync + 'static>(&self, abstract_id: &str, instance: T) {
        self.instance_shared(abstract_id, Arc::new(instance));
    }

    /// Register an already-wrapped shared value as an instance
    pub fn instance_shared(&self, abstract_id: &str, instance: SharedValue) {
        debug!(abstract_id, "Registering instance");
        self.instances
            .write()
            .insert(abstract_id.to_string(), instance);
        self.recorder()
            .record("container.instance", &[("abstract", abstract_id.to_string())]);
    }

    /// Register a name redirect, resolved once (single level) at the start
    /// of `make` / `has` / `is_shared`.
    pub fn alias(&self, alias_name: &str, abstract_id: &str) {
        trace!(alias_name, abstract_id, "Registering alias");
        self.aliases
            .write()
            .insert(alias_name.to_string(), abstract_id.to_string());
        self.recorder().record(
            "container.alias",
            &[
                ("alias", alias_name.to_string()),
                ("abstract", abstract_id.to_string()),
            ],
        );
    }

    /// Register constructor metadata for a constructible type
    pub fn register_type(&self, spec: TypeSpec) {
        trace!(type_name = %spec.name, "Registering type metadata");
        self.types.write().insert(spec.name.clone(), Arc::new(spec));
    }

    /// Register a middleware under a name resolvable from route middleware
    /// lists. The instance is built lazily on first use and then shared.
    pub fn register_middleware<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        self.singleton_factory(name, move |_, _| Ok(value(factory())));
    }

    // ---- resolution -------------------------------------------------------

    /// Resolve an abstract identifier to a concrete instance
    pub fn make(&self, abstract_id: &str) -> Result<SharedValue, Error> {
        self.make_with(abstract_id, &ParamMap::new())
    }

    /// Resolve with explicit parameter overrides (any parameter, including
    /// primitives, may be supplied by name)
    pub fn make_with(&self, abstract_id: &str, parameters: &ParamMap) -> Result<SharedValue, Error> {
        let mut stack = Vec::new();
        self.resolve(abstract_id, parameters, &mut stack)
    }

    /// Alias for `make`
    pub fn get(&self, abstract_id: &str) -> Result<SharedValue, Error> {
        self.make(abstract_id)
    }

    /// Resolve and downcast in one step
    pub fn make_as<T: Send + Sync + 'static>(&self, abstract_id: &str) -> Result<Arc<T>, Error> {
        self.make(abstract_id)?.downcast::<T>().map_err(|_| {
            Error::Container(format!(
                "`{abstract_id}` did not resolve to a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    fn resolve(
        &self,
        abstract_id: &str,
        parameters: &ParamMap,
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        let id = self.unalias(abstract_id);
        trace!(abstract_id = %id, "Resolving");
        self.recorder()
            .record("container.resolving", &[("abstract", id.clone())]);

        if let Some(existing) = self.instances.read().get(&id) {
            return Ok(existing.clone());
        }

        let (concrete, shared) = match self.bindings.read().get(&id) {
            Some(binding) => (binding.concrete.clone(), binding.shared),
            None => (Concrete::Class(id.clone()), false),
        };

        if let Concrete::Class(class) = &concrete {
            // Cycle check runs before the singleton build lock is taken so a
            // cyclic graph reports its chain instead of deadlocking.
            if stack.iter().any(|entry| entry == class) {
                let mut chain = stack.clone();
                chain.push(class.clone());
                return Err(Error::Container(format!(
                    "circular dependency detected: {}",
                    chain.join(" -> ")
                )));
            }
        }

        let built = if shared {
            let gate = self.build_lock(&id);
            let _held = gate.lock();
            if let Some(existing) = self.instances.read().get(&id) {
                return Ok(existing.clone());
            }
            let built = self.construct(&concrete, parameters, stack)?;
            self.instances.write().insert(id.clone(), built.clone());
            built
        } else {
            self.construct(&concrete, parameters, stack)?
        };

        debug!(abstract_id = %id, shared, "Resolved");
        self.recorder()
            .record("container.resolved", &[("abstract", id.clone())]);
        Ok(built)
    }

    fn construct(
        &self,
        concrete: &Concrete,
        parameters: &ParamMap,
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        match concrete {
            // No circular-dependency tracking applies to factory-produced
            // values beyond what the factory itself does.
            Concrete::Factory(factory) => factory(self, parameters),
            Concrete::Class(class) => self.build(class, parameters, stack),
        }
    }

    fn build(
        &self,
        class: &str,
        parameters: &ParamMap,
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        let spec = self.types.read().get(class).cloned().ok_or_else(|| {
            Error::Container(format!(
                "target `{class}` is not instantiable: no type registration found"
            ))
        })?;

        stack.push(class.to_string());
        let built = self.build_from_spec(&spec, parameters, stack);
        stack.pop();
        built
    }

    fn build_from_spec(
        &self,
        spec: &TypeSpec,
        parameters: &ParamMap,
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        let mut args = Vec::with_capacity(spec.params.len());
        for param in &spec.params {
            args.push(self.resolve_param(&spec.name, param, parameters, stack)?);
        }
        (spec.construct)(&args)
    }

    fn resolve_param(
        &self,
        owner: &str,
        param: &ParamSpec,
        parameters: &ParamMap,
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        // 1. An explicitly supplied value always wins, primitives included.
        if let Some(given) = parameters.get(&param.name) {
            return Ok(given.clone());
        }

        match &param.ty {
            ParamType::Untyped => param.default.clone().ok_or_else(|| {
                Error::Container(format!(
                    "unresolvable dependency `{}` in `{owner}`: no declared type and no default",
                    param.name
                ))
            }),

            ParamType::Primitive(kind) => param.default.clone().ok_or_else(|| {
                Error::Container(format!(
                    "unresolvable primitive dependency `{}` ({kind}) in `{owner}`",
                    param.name
                ))
            }),

            ParamType::Union(alternatives) => {
                for alternative in alternatives {
                    let class = match alternative {
                        ParamType::Class(class) => class,
                        _ => continue,
                    };
                    if let Ok(resolved) = self.resolve(class, &ParamMap::new(), stack) {
                        return Ok(resolved);
                    }
                }
                param.default.clone().ok_or_else(|| {
                    Error::Container(format!(
                        "unresolvable union dependency `{}` in `{owner}`",
                        param.name
                    ))
                })
            }

            ParamType::Intersection(required) => {
                match self.resolve_intersection(required, stack) {
                    Ok(resolved) => Ok(resolved),
                    Err(err) => param.default.clone().ok_or_else(|| {
                        Error::Container(format!(
                            "unresolvable intersection dependency `{}` in `{owner}`: {err}",
                            param.name
                        ))
                    }),
                }
            }

            ParamType::Class(class) => match self.resolve(class, &ParamMap::new(), stack) {
                Ok(resolved) => Ok(resolved),
                Err(err) => {
                    if let Some(default) = &param.default {
                        Ok(default.clone())
                    } else if param.nullable {
                        Ok(Arc::new(Nil))
                    } else {
                        Err(err)
                    }
                }
            },
        }
    }

    // Build the first listed type, then verify its registered capabilities
    // cover every other listed type. Factory-bound identifiers carry no
    // type metadata and therefore cannot prove capabilities.
    fn resolve_intersection(
        &self,
        required: &[String],
        stack: &mut Vec<String>,
    ) -> Result<SharedValue, Error> {
        let first = required.first().ok_or_else(|| {
            Error::Container("intersection type lists no members".to_string())
        })?;
        let resolved = self.resolve(first, &ParamMap::new(), stack)?;

        let spec = self
            .concrete_class_of(first)
            .and_then(|class| self.types.read().get(&class).cloned());
        let satisfied = spec
            .map(|spec| required.iter().skip(1).all(|cap| spec.satisfies(cap)))
            .unwrap_or(false);

        if satisfied {
            Ok(resolved)
        } else {
            Err(Error::Container(format!(
                "`{first}` does not satisfy all of: {}",
                required.join(" & ")
            )))
        }
    }

    // ---- callbacks --------------------------------------------------------

    /// Invoke a function value or a (target, method) pair with
    /// dependency-injected arguments. Abstract targets are resolved via
    /// `make` first.
    pub fn call(&self, callback: &Callback, parameters: &ParamMap) -> Result<SharedValue, Error> {
        match callback {
            Callback::Function(spec) => {
                let mut stack = Vec::new();
                let mut args = Vec::with_capacity(spec.params.len());
                for param in &spec.params {
                    args.push(self.resolve_param("<callable>", param, parameters, &mut stack)?);
                }
                (spec.invoke)(&args)
            }
            Callback::Method { target, method } => {
                let (receiver, class) = match target {
                    CallTarget::Abstract(id) => {
                        let class = self.concrete_class_of(id).ok_or_else(|| {
                            Error::Container(format!(
                                "invalid callback: cannot dispatch `{method}` on factory-bound `{id}`"
                            ))
                        })?;
                        (self.make(id)?, class)
                    }
                    CallTarget::Value(instance, class) => (instance.clone(), class.clone()),
                };

                let spec = self.types.read().get(&class).cloned().ok_or_else(|| {
                    Error::Container(format!("invalid callback: unknown type `{class}`"))
                })?;
                let method_spec = spec.methods.get(method).cloned().ok_or_else(|| {
                    Error::Container(format!(
                        "invalid callback: `{class}` has no method `{method}`"
                    ))
                })?;

                let owner = format!("{class}::{method}");
                let mut stack = Vec::new();
                let mut args = Vec::with_capacity(method_spec.params.len());
                for param in &method_spec.params {
                    args.push(self.resolve_param(&owner, param, parameters, &mut stack)?);
                }
                (method_spec.invoke)(&receiver, &args)
            }
        }
    }

    // ---- introspection ----------------------------------------------------

    /// True if a binding exists, an instance exists, or the identifier
    /// names a registered type
    pub fn has(&self, abstract_id: &str) -> bool {
        let id = self.unalias(abstract_id);
        self.bindings.read().contains_key(&id)
            || self.instances.read().contains_key(&id)
            || self.types.read().contains_key(&id)
    }

    /// True if an instance is cached or the binding is marked shared
    pub fn is_shared(&self, abstract_id: &str) -> bool {
        let id = self.unalias(abstract_id);
        self.instances.read().contains_key(&id)
            || self
                .bindings
                .read()
                .get(&id)
                .map(|binding| binding.shared)
                .unwrap_or(false)
    }

    /// Snapshot of all registered bindings
    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.bindings
            .read()
            .iter()
            .map(|(abstract_id, binding)| BindingInfo {
                abstract_id: abstract_id.clone(),
                concrete: match &binding.concrete {
                    Concrete::Class(class) => class.clone(),
                    Concrete::Factory(_) => "<factory>".to_string(),
                },
                shared: binding.shared,
            })
            .collect()
    }

    /// Snapshot of all cached instance identifiers
    pub fn instances(&self) -> Vec<String> {
        self.instances.read().keys().cloned().collect()
    }

    /// Clear bindings, instances, and aliases. Type metadata persists, the
    /// same way reflection metadata survives a container reset.
    pub fn flush(&self) {
        let count = self.bindings.read().len();
        self.bindings.write().clear();
        self.instances.write().clear();
        self.aliases.write().clear();
        self.build_locks.lock().clear();
        debug!(binding_count = count, "Flushed container");
    }

    // ---- internals --------------------------------------------------------

    // Single-level alias redirect; chains are deliberately not followed.
    fn unalias(&self, abstract_id: &str) -> String {
        self.aliases
            .read()
            .get(abstract_id)
            .cloned()
            .unwrap_or_else(|| abstract_id.to_string())
    }

    fn concrete_class_of(&self, abstract_id: &str) -> Option<String> {
        let id = self.unalias(abstract_id);
        match self.bindings.read().get(&id) {
            Some(binding) => match &binding.concrete {
                Concrete::Class(class) => Some(class.clone()),
                Concrete::Factory(_) => None,
            },
            None => Some(id),
        }
    }

    fn build_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.build_locks
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
