//! Share-target path.

use super::{BackgroundTask, Handled, Interceptor, Route};
use crate::clients::{ClientId, ClientMessage, SharedFile};
use crate::config::AgentConfig;
use crate::http::{Request, Response};
use crate::multipart::{self, FormPart};
use url::Url;

const SHARE_BOUNDARY: &str = "----swcache-share-boundary";

/// Build the POST an OS share sheet would submit for `file`.
pub fn share_request(
    config: &AgentConfig,
    origin: &Url,
    file: &SharedFile,
    resulting_client: ClientId,
) -> Result<Request, url::ParseError> {
    let part = FormPart {
        name: config.share_field.clone(),
        filename: Some(file.name.clone().unwrap_or_else(|| "blob".to_string())),
        content_type: file.content_type.clone(),
        data: file.data.clone(),
    };
    let body = multipart::encode(&[part], SHARE_BOUNDARY);
    Ok(Request::resolve("POST", &config.share_path, origin)?
        .with_header("Content-Type", &multipart::content_type(SHARE_BOUNDARY))
        .with_body(body)
        .with_resulting_client(resulting_client))
}

impl Interceptor {
    /// Redirect now; deliver the file later.
    pub(super) fn share_target(&self, request: Request) -> Handled {
        let redirect = Response::redirect(&self.redirect);
        let this = self.clone();
        Handled {
            route: Route::ShareTarget,
            response: Box::pin(async move { Ok(redirect) }),
            background: vec![BackgroundTask::new(
                "deliver-shared-file",
                async move { this.deliver_shared_file(request).await },
            )],
        }
    }

    /// Every failure here is absorbed: the redirect has already committed.
    async fn deliver_shared_file(&self, request: Request) {
        let Some(file) = extract_shared_file(&self.config, &request) else {
            return;
        };
        let Some(client) = self.clients.resolve_originating(&request).await else {
            tracing::debug!(url = %request.url, "no originating client; shared file dropped");
            return;
        };

        let name = file.name.clone().unwrap_or_default();
        let size = file.size();
        match client.post_message(ClientMessage::SharedFile { file }).await {
            Ok(()) => {
                tracing::info!(client = %client.id(), file = %name, size, "shared file delivered")
            }
            Err(gone) => tracing::debug!("shared file not delivered: {}", gone),
        }
    }
}

fn extract_shared_file(config: &AgentConfig, request: &Request) -> Option<SharedFile> {
    let body = request.body.as_deref().unwrap_or_default();
    if body.len() as u64 > config.max_share_bytes {
        tracing::debug!(size = body.len(), limit = config.max_share_bytes, "share body too large");
        return None;
    }
    let Some(content_type) = request.header("content-type") else {
        tracing::debug!("share submission without content type");
        return None;
    };
    let form = match multipart::boundary(content_type).and_then(|b| multipart::parse(body, &b)) {
        Ok(form) => form,
        Err(e) => {
            tracing::debug!("share submission not parsed: {}", e);
            return None;
        }
    };
    let Some(part) = form.take(&config.share_field) else {
        tracing::debug!(field = %config.share_field, "share submission has no file part");
        return None;
    };
    // An empty text value counts as absent; a file part is present even when empty.
    if !part.is_file() && part.data.is_empty() {
        return None;
    }
    Some(part.into())
}
