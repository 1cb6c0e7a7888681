/*
 * Responsibility
 * - Shared, read-only edge context: token codec, route table, upstream table, outbound client
 * - Built once at start; nothing in here changes per request
 */
use std::sync::Arc;

use identity::TokenCodec;

use crate::proxy::Upstreams;
use crate::routes::RouteTable;

#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub routes: Arc<RouteTable>,
    pub upstreams: Arc<Upstreams>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        codec: TokenCodec,
        routes: RouteTable,
        upstreams: Upstreams,
        http: reqwest::Client,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            routes: Arc::new(routes),
            upstreams: Arc::new(upstreams),
            http,
        }
    }
}
