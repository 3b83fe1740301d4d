//! Application builder and request service.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::context::Context;
use crate::middleware::{from_fn, BodyParser, Middleware, Next, Pipeline};
use crate::parser::{HttpRequest, Method};
use crate::router::Router;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{BoxFuture, HandlerFn};
use crate::server::listener::Server;
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::transport::{read_request, write_response};

enum Layer {
    Middleware(Arc<dyn Middleware>),
    /// Position of the route dispatcher in the stack.
    Routes,
}

/// Collects routes and interceptors, then freezes them into a [`Service`].
///
/// A new `Flow` starts with [`BodyParser`] registered. Interceptors run in
/// registration order; [`Flow::use_router`] decides where route dispatch
/// sits among them.
///
/// ```
/// use flowhttp::middleware::NotFound;
/// use flowhttp::server::Flow;
///
/// let mut flow = Flow::new();
/// flow.get("/ping", |ctx| Box::pin(async move {
///     ctx.set_body("pong");
///     Ok(())
/// }));
/// flow.use_router().use_middleware(NotFound);
/// let service = flow.build();
/// assert_eq!(service.routes().len(), 1);
/// ```
pub struct Flow {
    routes: Router<HandlerFn>,
    layers: Vec<Layer>,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        let mut flow = Self::bare();
        flow.use_middleware(BodyParser);
        flow
    }

    /// A builder without the default body parser.
    pub fn bare() -> Self {
        Self {
            routes: Router::new(),
            layers: Vec::new(),
        }
    }

    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.layers.push(Layer::Middleware(Arc::new(middleware)));
        self
    }

    /// Register a closure interceptor, see [`from_fn`].
    pub fn use_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.use_middleware(from_fn(f))
    }

    /// Insert the route dispatcher at this point of the stack.
    ///
    /// Matched requests stop at their handler; unmatched ones continue to
    /// the next interceptor.
    pub fn use_router(&mut self) -> &mut Self {
        self.layers.push(Layer::Routes);
        self
    }

    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route_handler(method, path, Arc::new(handler))
    }

    /// Register an already boxed handler. Registering the same method and
    /// path again replaces the earlier handler.
    pub fn route_handler(&mut self, method: Method, path: &str, handler: HandlerFn) -> &mut Self {
        if self.routes.add(method, path, handler).is_some() {
            warn!("{method} {path} registered more than once; keeping the last handler");
        }
        self
    }

    pub fn get<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn patch<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    pub fn delete<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    pub fn router(&self) -> &Router<HandlerFn> {
        &self.routes
    }

    /// Freeze routes and interceptors.
    pub fn build(self) -> Service {
        let routes = Arc::new(self.routes);
        let stack = self
            .layers
            .into_iter()
            .map(|layer| match layer {
                Layer::Middleware(middleware) => middleware,
                Layer::Routes => Arc::new(RouteDispatch {
                    routes: Arc::clone(&routes),
                }) as Arc<dyn Middleware>,
            })
            .collect();

        Service {
            pipeline: Arc::new(Pipeline::new(stack)),
            routes,
        }
    }

    /// Build the service and bind a listener for it.
    pub async fn bind(self, config: ServerConfig) -> Result<Server, Error> {
        Server::bind(self.build(), config).await
    }
}

struct RouteDispatch {
    routes: Arc<Router<HandlerFn>>,
}

impl Middleware for RouteDispatch {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let found = {
                let path = match ctx.path() {
                    "" => "/",
                    path => path,
                };
                self.routes.find(ctx.method(), path)
            };
            match found {
                Some(handler) => handler(ctx).await,
                None => next.run(ctx).await,
            }
        })
    }
}

/// The frozen request pipeline; cheap to clone and shared by all
/// connections.
#[derive(Clone)]
pub struct Service {
    pipeline: Arc<Pipeline>,
    routes: Arc<Router<HandlerFn>>,
}

impl Service {
    pub fn routes(&self) -> &Router<HandlerFn> {
        &self.routes
    }

    /// Run the pipeline for `request` and return the finished context.
    ///
    /// A failing or panicking pipeline yields the fixed 500 response.
    pub async fn handle(&self, request: HttpRequest) -> Context {
        let method = request.method;
        let target = request.target.clone();
        let version = request.version;
        let remote_addr = request.remote_addr;

        let pipeline = Arc::clone(&self.pipeline);
        let task = tokio::spawn(async move {
            let mut ctx = Context::new(request);
            let result = pipeline.run(&mut ctx).await;
            (ctx, result)
        });

        match task.await {
            Ok((ctx, Ok(()))) => ctx,
            Ok((mut ctx, Err(e))) => {
                error!("{method} {target} failed: {e}");
                ctx.internal_error();
                ctx
            }
            Err(e) => {
                error!("{method} {target} aborted: {e}");
                let mut request = HttpRequest::new(method, target, version, HashMap::new());
                request.remote_addr = remote_addr;
                let mut ctx = Context::new(request);
                ctx.internal_error();
                ctx
            }
        }
    }

    /// Serve one request on `socket`.
    pub async fn handle_connection<S>(&self, socket: &mut S, config: &ServerConfig) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.serve_connection(socket, None, config).await
    }

    pub async fn serve_connection<S>(
        &self,
        socket: &mut S,
        remote_addr: Option<SocketAddr>,
        config: &ServerConfig,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut request = match read_request(socket, config).await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(Error::PayloadTooLarge(len)) => {
                let response = HttpResponse::new(StatusCode::PayloadTooLarge)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Request body of {len} bytes exceeds {} bytes", config.max_body_size));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::PayloadTooLarge(len));
            }
            Err(Error::ParseError(e)) => {
                let response = HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
            Err(e) => return Err(e),
        };
        request.remote_addr = remote_addr;

        let head_only = request.method == Method::HEAD;
        let mut ctx = self.handle(request).await;
        write_response(socket, &mut ctx, head_only).await
    }
}
