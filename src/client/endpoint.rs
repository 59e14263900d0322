use super::RealtimeClientOptions;
use crate::types::{RealtimeError, Result, TOKEN_QUERY_PARAM, WS_PATH_PREFIX};
use url::{Position, Url};

/// Builds `ws[s]://{host}/ws/{endpoint}/{shop_id}/[?token=...]`.
///
/// The scheme mirrors the page origin (`https` pages get `wss`). The host is
/// the development backend override when set, otherwise the page's own host.
pub fn build_endpoint_url(options: &RealtimeClientOptions, token: Option<&str>) -> Result<Url> {
    let origin = Url::parse(&options.page_origin)?;
    let scheme = if origin.scheme() == "https" {
        "wss"
    } else {
        "ws"
    };

    let host = match options.dev_backend_host.as_deref() {
        Some(host) => host.trim_end_matches('/'),
        None => &origin[Position::BeforeHost..Position::AfterPort],
    };
    if host.is_empty() {
        return Err(RealtimeError::Config(format!(
            "page origin '{}' has no host",
            options.page_origin
        )));
    }

    let mut url = Url::parse(&format!(
        "{}://{}/{}/{}/{}/",
        scheme,
        host,
        WS_PATH_PREFIX,
        options.endpoint.trim_matches('/'),
        options.shop_id
    ))?;

    if let Some(token) = token.filter(|token| !token.is_empty()) {
        url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token);
    }

    Ok(url)
}
