//! 路由注册
//! 路由表在启动时构建一次，之后不可变，再编译为 axum Router

use axum::{
    handler::Handler,
    http::Method,
    routing::{self, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{chain::{self, Middleware}, handlers, middleware::AppState};

/// 单条路由定义
pub struct RouteSpec<S> {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    handler: MethodRouter<S>,
    middlewares: Vec<Middleware>,
}

impl<S> RouteSpec<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn get<H, T>(name: &'static str, path: &'static str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(name, Method::GET, path, routing::get(handler))
    }

    pub fn post<H, T>(name: &'static str, path: &'static str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(name, Method::POST, path, routing::post(handler))
    }

    fn new(name: &'static str, method: Method, path: &'static str, handler: MethodRouter<S>) -> Self {
        Self {
            name,
            method,
            path,
            handler,
            middlewares: Vec::new(),
        }
    }

    /// 追加一个中间件，执行顺序与追加顺序一致
    pub fn with(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(Middleware::name).collect()
    }
}

/// 有序路由表
pub struct RouteTable<S> {
    routes: Vec<RouteSpec<S>>,
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(routes: Vec<RouteSpec<S>>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteSpec<S>] {
        &self.routes
    }

    /// 每条路由的 handler 外层按声明顺序包上自己的中间件链
    pub fn into_router(self) -> Router<S> {
        self.routes.into_iter().fold(Router::new(), |router, route| {
            tracing::debug!(
                name = route.name,
                method = %route.method,
                path = route.path,
                middlewares = ?route.middleware_names(),
                "Route registered"
            );
            router.route(route.path, chain::compose(route.handler, &route.middlewares))
        })
    }
}

/// 服务的路由表
pub fn route_table(state: &AppState) -> RouteTable<Arc<AppState>> {
    RouteTable::new(vec![
        // 探针不经过任何中间件
        RouteSpec::get("health", "/health", handlers::health::health_check),
        RouteSpec::get("ready", "/ready", handlers::health::readiness_check),
        RouteSpec::get("version", "/version", handlers::version::get_version)
            .with(Middleware::request_log()),
        RouteSpec::post("signup", "/signup", handlers::auth::signup)
            .with(Middleware::request_log())
            .with(Middleware::json_response()),
        RouteSpec::post("login", "/login", handlers::auth::login)
            .with(Middleware::request_log())
            .with(Middleware::json_response()),
        RouteSpec::get("find user", "/user/{id}", handlers::user::find_user)
            .with(Middleware::request_log()),
        RouteSpec::post("work", "/work", handlers::work::submit_work)
            .with(Middleware::request_log())
            .with(Middleware::authenticate(state.token_service.clone()))
            .with(Middleware::json_response()),
    ])
}

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    route_table(&state)
        .into_router()
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
