use anyhow::{Context, Result, bail};
use axum::{Router, extract::State, http::StatusCode, routing::post};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, warn};
use weatherbot_core::WebhookHandler;

/// The webhook route must be a literal absolute path.
fn router(handler: Arc<WebhookHandler>, route: &str) -> Result<Router> {
    if !route.starts_with('/') {
        bail!("--path must start with '/', got {route:?}");
    }
    if route.contains(['{', '}', ':', '*']) {
        bail!("--path must be a literal path without captures, got {route:?}");
    }

    Ok(Router::new()
        .route(route, post(webhook))
        .with_state(handler))
}

/// Run the webhook server until Ctrl+C.
pub async fn run(handler: Arc<WebhookHandler>, listen: SocketAddr, route: &str) -> Result<()> {
    if !handler.is_enabled() {
        warn!("Credentials are missing; updates will be acknowledged and ignored");
    }

    let app = router(handler, route)?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;

    info!("Listening for Telegram updates on http://{listen}{route}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    Ok(())
}

async fn webhook(State(handler): State<Arc<WebhookHandler>>, body: String) -> StatusCode {
    match handler.handle(&body).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("Failed to process update: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use weatherbot_core::{
        ClockConfig, LookupOutcome, MessageRouter, Reply, ReplySender, WeatherLookup,
        WeatherResponder,
    };

    #[derive(Debug)]
    struct FixedLookup(Option<LookupOutcome>);

    #[async_trait]
    impl WeatherLookup for FixedLookup {
        async fn lookup(&self, _place: &str) -> Result<LookupOutcome> {
            self.0
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSender {
        sent: Mutex<Vec<Reply>>,
    }

    #[derive(Debug)]
    struct SharedSender(Arc<RecordingSender>);

    #[async_trait]
    impl ReplySender for SharedSender {
        async fn send(&self, reply: &Reply) -> Result<()> {
            self.0.sent.lock().unwrap().push(reply.clone());
            Ok(())
        }
    }

    fn enabled(lookup: FixedLookup) -> (Arc<WebhookHandler>, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender::default());
        let router = MessageRouter::new(WeatherResponder::new(
            Box::new(lookup),
            ClockConfig::default(),
        ));
        let handler = WebhookHandler::new(router, Box::new(SharedSender(sender.clone())));
        (Arc::new(handler), sender)
    }

    fn text_update(text: &str) -> String {
        format!(
            r#"{{"update_id": 1, "message": {{"message_id": 5, "chat": {{"id": 8}}, "text": "{text}"}}}}"#
        )
    }

    #[tokio::test]
    async fn disabled_handler_answers_ok() {
        let handler = Arc::new(WebhookHandler::disabled());

        let status = webhook(State(handler), text_update("London")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_answers_ok_without_reply() {
        let (handler, sender) = enabled(FixedLookup(Some(LookupOutcome::NotFound)));

        let status = webhook(State(handler), "{not json".to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn handled_update_answers_ok_after_one_reply() {
        let (handler, sender) = enabled(FixedLookup(Some(LookupOutcome::NotFound)));

        let status = webhook(State(handler), text_update("zzzqx")).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "Я не нашел населенный пункт \"zzzqx\".");
    }

    #[tokio::test]
    async fn lookup_failure_answers_internal_error() {
        let (handler, sender) = enabled(FixedLookup(None));

        let status = webhook(State(handler), text_update("London")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn route_without_leading_slash_is_rejected() {
        let handler = Arc::new(WebhookHandler::disabled());

        let err = router(handler, "webhook").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn route_with_captures_is_rejected() {
        let handler = Arc::new(WebhookHandler::disabled());

        assert!(router(handler.clone(), "/:token").is_err());
        assert!(router(handler, "/{token}").is_err());
    }

    #[test]
    fn literal_routes_are_accepted() {
        let handler = Arc::new(WebhookHandler::disabled());

        assert!(router(handler.clone(), "/").is_ok());
        assert!(router(handler, "/telegram/webhook").is_ok());
    }
}
