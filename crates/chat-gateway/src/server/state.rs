//! Gateway state
//!
//! Application state shared by every route of the gateway server.

use crate::broadcast::FanoutAdapter;
use crate::connection::ConnectionManager;
use chat_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and the broadcast handle
    service_context: Arc<ServiceContext>,
    /// Connection registry and room membership
    connections: Arc<ConnectionManager>,
    /// Bus dispatch loop feeding local rooms
    fanout: Arc<FanoutAdapter>,
}

impl GatewayState {
    /// Create the state around a service context.
    ///
    /// The fanout adapter listens on the same bus the context's broadcaster
    /// publishes to.
    pub fn new(service_context: ServiceContext) -> Self {
        let connections = ConnectionManager::new_shared();
        let bus = service_context.broadcaster().bus().clone();
        let fanout = Arc::new(FanoutAdapter::new(bus, connections.clone()));

        Self {
            service_context: Arc::new(service_context),
            connections,
            fanout,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn fanout(&self) -> &Arc<FanoutAdapter> {
        &self.fanout
    }

    /// Origin tag of this instance on the bus
    pub fn instance_id(&self) -> &str {
        self.service_context.broadcaster().origin()
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("instance_id", &self.instance_id())
            .field("connections", &self.connections)
            .finish_non_exhaustive()
    }
}
