//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the session registry and the provider clients.

use crate::{call::registry::SessionRegistry, config::Config};
use fishjam_agent::FishjamClient;
use std::sync::Arc;
use vapi_realtime::VapiClient;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub fishjam: Arc<FishjamClient>,
    pub vapi: Arc<VapiClient>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut fishjam =
            FishjamClient::new(&config.fishjam_id, &config.fishjam_management_token);
        if let (Some(base_url), Some(socket_url)) =
            (&config.fishjam_url, &config.fishjam_socket_url)
        {
            fishjam = fishjam.with_base_url(base_url, socket_url);
        }

        let mut vapi = VapiClient::new(&config.vapi_api_key, &config.vapi_assistant_id);
        if let Some(base_url) = &config.vapi_url {
            vapi = vapi.with_base_url(base_url);
        }

        Self {
            registry: Arc::new(SessionRegistry::new()),
            fishjam: Arc::new(fishjam),
            vapi: Arc::new(vapi),
            config: Arc::new(config),
        }
    }
}
