//! Tests for the pipeline and the bundled interceptors.

#[cfg(test)]
mod middleware_tests {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use serde_json::json;
    use tokio::io::AsyncReadExt;

    use crate::context::{Body, Context};
    use crate::middleware::{from_fn, AccessLog, Assets, BodyParser, Latency, Middleware, NotFound, Pipeline};
    use crate::parser::{HttpRequest, Method};
    use crate::server::Error;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn tracer(name: &'static str, trace: Trace) -> Arc<dyn Middleware> {
        Arc::new(from_fn(move |ctx, next| {
            let trace = Arc::clone(&trace);
            Box::pin(async move {
                trace.lock().unwrap().push(format!("{name} in"));
                next.run(ctx).await?;
                trace.lock().unwrap().push(format!("{name} out"));
                Ok(())
            })
        }))
    }

    fn layer(middleware: impl Middleware + 'static) -> Arc<dyn Middleware> {
        Arc::new(middleware)
    }

    fn responder(body: &'static str) -> Arc<dyn Middleware> {
        Arc::new(from_fn(move |ctx, _next| {
            Box::pin(async move {
                ctx.set_body(body);
                Ok(())
            })
        }))
    }

    fn marker() -> Arc<dyn Middleware> {
        Arc::new(from_fn(|ctx, next| {
            Box::pin(async move {
                ctx.set_header("X-Reached", "yes");
                next.run(ctx).await
            })
        }))
    }

    fn post(content_type: &str, body: &str) -> HttpRequest {
        HttpRequest::get("/submit")
            .with_method(Method::POST)
            .with_header("Content-Type", content_type)
            .with_header("Content-Length", body.len().to_string())
            .with_body(body.as_bytes())
    }

    #[tokio::test]
    async fn test_onion_order() {
        let trace: Trace = Arc::default();
        let handler_trace = Arc::clone(&trace);
        let handler: Arc<dyn Middleware> = Arc::new(from_fn(move |ctx, _next| {
            let trace = Arc::clone(&handler_trace);
            Box::pin(async move {
                trace.lock().unwrap().push("handler".to_string());
                ctx.set_body("done");
                Ok(())
            })
        }));

        let pipeline = Pipeline::new(vec![
            tracer("a", Arc::clone(&trace)),
            tracer("b", Arc::clone(&trace)),
            tracer("c", Arc::clone(&trace)),
            handler,
        ]);
        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["a in", "b in", "c in", "handler", "c out", "b out", "a out"]
        );
        assert_eq!(ctx.body().as_text(), Some("done"));
    }

    #[tokio::test]
    async fn test_empty_pipeline_resolves() {
        let pipeline = Pipeline::default();
        assert!(pipeline.is_empty());
        let mut ctx = Context::new(HttpRequest::get("/"));
        assert!(pipeline.run(&mut ctx).await.is_ok());
        assert_eq!(ctx.status(), 200);
    }

    #[tokio::test]
    async fn test_next_past_the_end_resolves() {
        let trace: Trace = Arc::default();
        let pipeline = Pipeline::new(vec![tracer("only", Arc::clone(&trace))]);
        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["only in", "only out"]);
    }

    #[tokio::test]
    async fn test_calling_next_twice_is_rejected() {
        let twice: Arc<dyn Middleware> = Arc::new(from_fn(|ctx, next| {
            Box::pin(async move {
                next.run(ctx).await?;
                next.run(ctx).await
            })
        }));
        let trace: Trace = Arc::default();
        let pipeline = Pipeline::new(vec![twice, tracer("inner", Arc::clone(&trace))]);
        let mut ctx = Context::new(HttpRequest::get("/"));

        let result = pipeline.run(&mut ctx).await;
        assert!(matches!(result, Err(Error::NextCalledMultipleTimes)));
        assert_eq!(*trace.lock().unwrap(), vec!["inner in", "inner out"]);
    }

    #[tokio::test]
    async fn test_pipeline_is_reusable() {
        let pipeline = Pipeline::new(vec![marker(), responder("ok")]);
        for _ in 0..3 {
            let mut ctx = Context::new(HttpRequest::get("/"));
            pipeline.run(&mut ctx).await.unwrap();
            assert_eq!(ctx.body().as_text(), Some("ok"));
        }
    }

    #[tokio::test]
    async fn test_short_circuit_skips_the_rest() {
        let pipeline = Pipeline::new(vec![responder("early"), marker()]);
        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.body().as_text(), Some("early"));
        assert_eq!(ctx.response_header("X-Reached"), None);
    }

    #[tokio::test]
    async fn test_error_propagates_outward() {
        let trace: Trace = Arc::default();
        let failing: Arc<dyn Middleware> = Arc::new(from_fn(|_ctx, _next| {
            Box::pin(async move { Err(Error::Handler("nope".to_string())) })
        }));
        let pipeline = Pipeline::new(vec![tracer("outer", Arc::clone(&trace)), failing]);
        let mut ctx = Context::new(HttpRequest::get("/"));

        assert!(matches!(pipeline.run(&mut ctx).await, Err(Error::Handler(_))));
        assert_eq!(*trace.lock().unwrap(), vec!["outer in"]);
    }

    #[tokio::test]
    async fn test_not_found_is_terminal() {
        let pipeline = Pipeline::new(vec![layer(NotFound), marker()]);
        let mut ctx = Context::new(HttpRequest::get("/nowhere"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), 404);
        assert!(ctx.body().is_empty());
        assert_eq!(ctx.response_header("X-Reached"), None);
    }

    #[tokio::test]
    async fn test_latency_delays_request() {
        let pipeline = Pipeline::new(vec![layer(Latency::from_millis(20)), responder("late")]);
        let mut ctx = Context::new(HttpRequest::get("/"));

        let started = Instant::now();
        pipeline.run(&mut ctx).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(ctx.body().as_text(), Some("late"));
    }

    #[tokio::test]
    async fn test_latency_without_delay_passes_through() {
        let latency = Latency::new(None);
        assert_eq!(latency.delay(), None);

        let pipeline = Pipeline::new(vec![layer(latency), marker()]);
        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.response_header("X-Reached"), Some("yes"));
    }

    #[tokio::test]
    async fn test_access_log_passes_through() {
        let pipeline = Pipeline::new(vec![layer(AccessLog), responder("logged")]);
        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.body().as_text(), Some("logged"));
    }

    #[tokio::test]
    async fn test_body_parser_decodes_json() {
        let pipeline = Pipeline::new(vec![layer(BodyParser)]);
        let mut ctx = Context::new(post("application/json; charset=utf-8", r#"{"name":"flow","n":2}"#));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.request_body(), Some(&json!({ "name": "flow", "n": 2 })));
        assert_eq!(ctx.param("n"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_body_parser_decodes_forms() {
        let pipeline = Pipeline::new(vec![layer(BodyParser)]);
        let mut ctx = Context::new(post("application/x-www-form-urlencoded", "a=1&b=2&b=3&c=x%20y"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.request_body(),
            Some(&json!({ "a": "1", "b": ["2", "3"], "c": "x y" }))
        );
    }

    #[tokio::test]
    async fn test_body_parser_defaults_to_empty_object() {
        let pipeline = Pipeline::new(vec![layer(BodyParser)]);

        let mut ctx = Context::new(post("text/plain", "hello"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.request_body(), Some(&json!({})));

        let mut ctx = Context::new(HttpRequest::get("/"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.request_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn test_body_parser_rejects_malformed_json() {
        let pipeline = Pipeline::new(vec![layer(BodyParser)]);
        let mut ctx = Context::new(post("application/json", "{broken"));
        assert!(matches!(pipeline.run(&mut ctx).await, Err(Error::JsonError(_))));
    }

    #[tokio::test]
    async fn test_body_parser_keeps_existing_body() {
        let pipeline = Pipeline::new(vec![layer(BodyParser)]);
        let mut ctx = Context::new(post("application/json", r#"{"a":1}"#));
        ctx.set_request_body(json!({ "preset": true }));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.request_body(), Some(&json!({ "preset": true })));
    }

    async fn read_stream(ctx: &mut Context) -> String {
        let mut out = String::new();
        match ctx.take_body() {
            Body::Stream(mut stream) => {
                stream.reader_mut().read_to_string(&mut out).await.unwrap();
            }
            other => panic!("expected a stream body, got {other:?}"),
        }
        out
    }

    #[tokio::test]
    async fn test_assets_serves_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), "body { margin: 0 }").unwrap();

        let pipeline = Pipeline::new(vec![layer(Assets::new("static", dir.path())), marker()]);
        let mut ctx = Context::new(HttpRequest::get("/static/app.css"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), 200);
        assert_eq!(ctx.content_type(), Some("text/css; charset=utf-8"));
        assert_eq!(ctx.response_header("X-Reached"), None);
        assert_eq!(read_stream(&mut ctx).await, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_assets_decodes_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my notes.txt"), "hi").unwrap();

        let pipeline = Pipeline::new(vec![layer(Assets::new("files", dir.path()))]);
        let mut ctx = Context::new(HttpRequest::get("/files/my%20notes.txt"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(read_stream(&mut ctx).await, "hi");
    }

    #[tokio::test]
    async fn test_assets_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(vec![layer(Assets::new("static", dir.path())), marker()]);

        let mut ctx = Context::new(HttpRequest::get("/static/missing.js"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.status(), 404);
        assert_eq!(ctx.response_header("X-Reached"), None);

        let mut ctx = Context::new(HttpRequest::get("/static/..%2Fsecret"));
        pipeline.run(&mut ctx).await.unwrap();
        assert_eq!(ctx.status(), 404);
    }

    #[tokio::test]
    async fn test_assets_ignores_other_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), "x").unwrap();

        let pipeline = Pipeline::new(vec![layer(Assets::new("static", dir.path())), marker()]);
        let mut ctx = Context::new(HttpRequest::get("/public/app.css"));
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), 200);
        assert!(ctx.body().is_empty());
        assert_eq!(ctx.response_header("X-Reached"), Some("yes"));
    }
}
