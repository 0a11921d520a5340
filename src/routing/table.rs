//! Route table construction and conversion into an axum router.
//!
//! # Responsibilities
//! - Compute the mount order once, before anything is registered
//! - Expand each controller's action map into concrete routes
//! - Register routes on an `axum::Router`, earliest mount winning on conflicts
//!
//! # Design Decisions
//! - The table is plain data first, so it can be inspected and tested
//!   without a running server
//! - A build error leaves no partial table behind
//! - Unknown paths and verbs outside the action map reach the error handler
//!   as `NotFound`, like an unmatched prefix router would

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Request};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;

use crate::actions::{ActionName, Segment, Verb};
use crate::controller::ControllerHandle;
use crate::error::{DefaultErrorHandler, DispatchError, ErrorHandler, RouteError};
use crate::http::Exchange;
use crate::observability::metrics;
use crate::routing::naming::controllerize;
use crate::routing::order::{mount_order, mount_point};
use crate::routing::registry::ControllerMap;

/// Largest request body buffered for an action.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// One route derived from a controller's action map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedRoute {
    pub path_name: String,
    pub controller: &'static str,
    pub action: ActionName,
    pub verb: Verb,
    pub segment: Segment,
    /// Router pattern, e.g. `/nested/sibling/{id}`.
    pub path: String,
}

impl MountedRoute {
    /// Every pattern this route is registered under.
    pub fn patterns(&self) -> Vec<String> {
        self.patterns_under("/")
    }

    /// Every pattern this route is registered under below `mount_path`.
    ///
    /// A root segment answers both with and without a trailing slash, the
    /// root index included once it sits below a mount path.
    pub fn patterns_under(&self, mount_path: &str) -> Vec<String> {
        let path = match (mount_path, self.path.as_str()) {
            ("/" | "", path) => path.to_string(),
            (prefix, "/") => prefix.to_string(),
            (prefix, path) => format!("{prefix}{path}"),
        };
        if self.segment == Segment::Root && path != "/" {
            let slashed = format!("{path}/");
            vec![path, slashed]
        } else {
            vec![path]
        }
    }
}

/// How the converted router handles requests.
#[derive(Clone)]
pub struct MountOptions {
    pub error_handler: Arc<dyn ErrorHandler>,
    pub max_body_bytes: usize,
}

impl MountOptions {
    pub fn with_error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            error_handler: Arc::new(DefaultErrorHandler),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// The validated, ordered set of routes for a controller map.
#[derive(Clone, Default)]
pub struct RouteTable {
    order: Vec<String>,
    routes: Vec<MountedRoute>,
    controllers: ControllerMap,
    strict_names: bool,
}

impl RouteTable {
    /// Build the table without checking controller names against path-names.
    pub fn build(controllers: &ControllerMap) -> Result<Self, RouteError> {
        Self::build_with(controllers, false)
    }

    /// Build the table.
    ///
    /// With `strict_names`, every controller must be named after its
    /// path-name (`nested/sibling` → `NestedSiblingController`).
    pub fn build_with(controllers: &ControllerMap, strict_names: bool) -> Result<Self, RouteError> {
        let order = mount_order(controllers)?;
        let mut routes = Vec::new();

        for path_name in &order {
            let Some(controller) = controllers.get(path_name) else {
                continue;
            };

            if strict_names {
                let expected = controllerize(path_name);
                if expected != controller.name() {
                    return Err(RouteError::ControllerName {
                        path_name: path_name.clone(),
                        expected,
                        actual: controller.name(),
                    });
                }
            }

            let prefix = match mount_point(path_name) {
                "" => String::new(),
                point => format!("/{point}"),
            };

            tracing::info!(
                path_name = %path_name,
                controller = controller.name(),
                flavor = ?controller.flavor(),
                "Mounting controller"
            );

            for entry in controller.flavor().entries() {
                let path = match (prefix.as_str(), entry.segment) {
                    ("", Segment::Root) => "/".to_string(),
                    (prefix, Segment::Root) => prefix.to_string(),
                    (prefix, segment) => format!("{prefix}{}", segment.pattern()),
                };

                tracing::debug!(
                    controller = controller.name(),
                    action = %entry.action,
                    verb = %entry.verb,
                    path = %path,
                    "Route mounted"
                );

                routes.push(MountedRoute {
                    path_name: path_name.clone(),
                    controller: controller.name(),
                    action: entry.action,
                    verb: entry.verb,
                    segment: entry.segment,
                    path,
                });
            }
        }

        Ok(Self {
            order,
            routes,
            controllers: controllers.clone(),
            strict_names,
        })
    }

    /// Add one controller and rebuild the whole table.
    ///
    /// The new path-name is checked against everything already mounted, so
    /// `foo` followed by `foo/index` is a collision just as it is in a single
    /// map. On error the table is left unchanged.
    pub fn mount(&mut self, path_name: &str, controller: ControllerHandle) -> Result<(), RouteError> {
        if self.controllers.contains(path_name) {
            return Err(RouteError::DuplicatePathName(path_name.to_string()));
        }
        let controllers = self.controllers.clone().with(path_name, controller);
        *self = Self::build_with(&controllers, self.strict_names)?;
        Ok(())
    }

    /// Path-names in the order they were mounted.
    pub fn mount_order(&self) -> &[String] {
        &self.order
    }

    pub fn routes(&self) -> &[MountedRoute] {
        &self.routes
    }

    /// Register every route on a fresh router with default options.
    pub fn into_router(self) -> Router {
        self.router_with(MountOptions::default())
    }

    /// Register every route, plus a fallback answering `NotFound`.
    pub fn router_with(&self, options: MountOptions) -> Router {
        let fallback = not_found(Arc::clone(&options.error_handler));
        self.routes_with(options).fallback(fallback)
    }

    /// Register every route without a router-level fallback.
    ///
    /// Used when the routes are merged into a larger application that
    /// supplies its own fallback.
    pub fn routes_with(&self, options: MountOptions) -> Router {
        self.routes_under("/", options)
    }

    /// Register every route below `mount_path` (`/` for none), without a
    /// router-level fallback.
    pub fn routes_under(&self, mount_path: &str, options: MountOptions) -> Router {
        let mut seen: HashSet<(Verb, String)> = HashSet::new();
        let mut paths: Vec<String> = Vec::new();
        let mut method_routers: HashMap<String, MethodRouter> = HashMap::new();

        for route in &self.routes {
            let Some(controller) = self.controllers.get(&route.path_name) else {
                continue;
            };

            for pattern in route.patterns_under(mount_path) {
                if !seen.insert((route.verb, pattern.clone())) {
                    tracing::warn!(
                        controller = route.controller,
                        action = %route.action,
                        verb = %route.verb,
                        path = %pattern,
                        "Route shadowed by an earlier mount, skipping"
                    );
                    continue;
                }

                let target = Arc::new(RouteTarget {
                    controller: Arc::clone(controller),
                    action: route.action,
                    verb: route.verb,
                    options: options.clone(),
                });

                let method_router = method_routers.remove(&pattern).unwrap_or_else(|| {
                    paths.push(pattern.clone());
                    MethodRouter::new().fallback(not_found(Arc::clone(&options.error_handler)))
                });
                let method_router = add_handler(method_router, route, target);
                method_routers.insert(pattern, method_router);
            }
        }

        paths.into_iter().fold(Router::new(), |router, path| {
            match method_routers.remove(&path) {
                Some(method_router) => router.route(&path, method_router),
                None => router,
            }
        })
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("order", &self.order)
            .field("routes", &self.routes)
            .finish()
    }
}

/// Build a router serving every controller in `controllers`.
pub fn mount_controllers(controllers: &ControllerMap) -> Result<Router, RouteError> {
    Ok(RouteTable::build(controllers)?.into_router())
}

/// Add a single controller to `table`. See [`RouteTable::mount`].
pub fn mount_controller(
    table: &mut RouteTable,
    path_name: &str,
    controller: ControllerHandle,
) -> Result<(), RouteError> {
    table.mount(path_name, controller)
}

struct RouteTarget {
    controller: ControllerHandle,
    action: ActionName,
    verb: Verb,
    options: MountOptions,
}

fn method_filter(verb: Verb) -> MethodFilter {
    match verb {
        Verb::Get => MethodFilter::GET,
        Verb::Post => MethodFilter::POST,
        Verb::Put => MethodFilter::PUT,
        Verb::Patch => MethodFilter::PATCH,
        Verb::Delete => MethodFilter::DELETE,
    }
}

fn add_handler(method_router: MethodRouter, route: &MountedRoute, target: Arc<RouteTarget>) -> MethodRouter {
    let filter = method_filter(route.verb);
    if route.segment.has_id() {
        method_router.on(filter, move |Path(id): Path<String>, request: Request| {
            let params = HashMap::from([("id".to_string(), id)]);
            serve(target, params, request)
        })
    } else {
        method_router.on(filter, move |request: Request| serve(target, HashMap::new(), request))
    }
}

pub(crate) fn not_found(
    handler: Arc<dyn ErrorHandler>,
) -> impl Fn() -> std::future::Ready<Response> + Clone + Send + Sync + 'static {
    move || std::future::ready(handler.handle(DispatchError::NotFound))
}

async fn serve(target: Arc<RouteTarget>, params: HashMap<String, String>, request: Request) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let controller = target.controller.name();
    let action = target.action;

    let outcome = match Exchange::from_request(request, params, target.options.max_body_bytes).await {
        Ok(exchange) => target.controller.dispatch(action, target.verb, exchange).await,
        Err(error) => Err(error),
    };

    let response = match outcome {
        Ok(exchange) => exchange.into_response(),
        Err(error) => target.options.error_handler.handle(error),
    };

    metrics::record_request(&method, response.status().as_u16(), controller, action.as_str(), start);
    response
}
