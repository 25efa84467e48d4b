use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::router::build_router;
use crate::state::AppState;

/// HTTP front door to the profile chaincode.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Open the configured world state and build the chaincode.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.allow_cors)
    }

    /// Start serving requests.
    pub async fn serve(self) -> GatewayResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("SPL gateway listening on {}", self.config.bind_addr);
        let init = self.state.chaincode().init(self.state.store().as_ref());
        if !init.is_ok() {
            return Err(GatewayError::Internal(init.message));
        }
        axum::serve(listener, app)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}
