use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::error::AppError;
use crate::handlers::academy_id;
use crate::services::ChangeFeed;

/// Subscribe to the feed and frame one academy's events for SSE. Other
/// academies' events and lagged gaps are silently skipped.
pub fn scoped_stream(
    feed: &ChangeFeed,
    owner_id: String,
) -> impl Stream<Item = Result<web::Bytes, actix_web::Error>> + use<> {
    BroadcastStream::new(feed.subscribe()).filter_map(move |item| {
        let owner_id = owner_id.clone();
        async move {
            match item {
                Ok(event) if event.owner_id() == owner_id => serde_json::to_string(&event)
                    .ok()
                    .map(|json| {
                        Ok::<web::Bytes, actix_web::Error>(web::Bytes::from(format!(
                            "data: {json}\n\n"
                        )))
                    }),
                _ => None,
            }
        }
    })
}

/// SSE stream of change events for the caller's academy. UIs subscribe and
/// re-query on each event instead of polling; a lagging client misses events
/// and is expected to reconnect and re-query.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(
        ("academy" = Option<String>, Query, description = "Academy scope (EventSource cannot set headers)"),
        ("X-Academy-Id" = Option<String>, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "text/event-stream of scoped change events")
    )
)]
pub async fn stream(feed: web::Data<ChangeFeed>, req: HttpRequest) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(
            AppError::ValidationError("Missing academy scope".to_string()).error_response(),
        );
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(scoped_stream(&feed, owner_id)))
}

pub fn events_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(stream));
}
