//! 中间件链
//!
//! 每个中间件接收 `(request, next)` 并且必须给出唯一的结果：
//! 调用 `next` 继续向下游传递（可在返回后改写响应），或者不调用 `next` 直接返回终止响应。
//! 路由上的中间件按声明顺序执行，位置 k 的短路保证 k+1..n 以及 handler 都不会执行。

use axum::{
    extract::{Request, State},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};

use crate::{
    auth::{jwt::TokenService, middleware::authenticate},
    middleware::{json_response_middleware, request_tracking_middleware},
};

type MiddlewareFn = dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync;

/// 具名中间件，可以放进路由表
#[derive(Clone)]
pub struct Middleware {
    name: &'static str,
    run: Arc<MiddlewareFn>,
}

impl Middleware {
    pub fn from_fn<F, Fut, R>(name: &'static str, f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            name,
            run: Arc::new(move |req, next| {
                let fut = f(req, next);
                Box::pin(async move { fut.await.into_response() })
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 请求日志与指标（透传 + 包裹）
    pub fn request_log() -> Self {
        Self::from_fn("request_log", request_tracking_middleware)
    }

    /// 响应默认为 JSON（包裹）
    pub fn json_response() -> Self {
        Self::from_fn("json_response", json_response_middleware)
    }

    /// Bearer 令牌认证（短路）
    pub fn authenticate(token_service: Arc<TokenService>) -> Self {
        Self::from_fn("authenticate", move |req, next| {
            authenticate(State(token_service.clone()), req, next)
        })
    }

    async fn call(self, req: Request, next: Next) -> Response {
        (self.run)(req, next).await
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

/// 按声明顺序把中间件包裹到 handler 外层
///
/// 最后加入的层位于最外侧，所以这里逆序折叠。
/// 使用 `route_layer`，未匹配方法的 405 回退不经过中间件链。
pub fn compose<S>(handler: MethodRouter<S>, middlewares: &[Middleware]) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    middlewares.iter().rev().fold(handler, |route, middleware| {
        let middleware = middleware.clone();
        route.route_layer(from_fn(move |req: Request, next: Next| {
            middleware.clone().call(req, next)
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn recorder(
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    ) -> Middleware {
        Middleware::from_fn(name, move |req: Request, next: Next| {
            log.lock().unwrap().push(name);
            next.run(req)
        })
    }

    #[tokio::test]
    async fn test_declaration_order_is_execution_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler_log = log.clone();

        let handler = get(move || {
            handler_log.lock().unwrap().push("handler");
            async { "ok" }
        });
        let route = compose(
            handler,
            &[
                recorder("first", log.clone()),
                recorder("second", log.clone()),
                recorder("third", log.clone()),
            ],
        );

        let app: Router = Router::new().route("/", route);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third", "handler"]);
    }

    #[test]
    fn test_middleware_debug_shows_name() {
        assert_eq!(format!("{:?}", Middleware::json_response()), "Middleware(\"json_response\")");
        assert_eq!(Middleware::request_log().name(), "request_log");
    }
}
