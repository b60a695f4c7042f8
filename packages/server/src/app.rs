//! Application assembly.
//!
//! Builds the hub, the bus bridge and the use cases in dependency order and
//! hands the resulting state to the HTTP server. Nothing here reads the
//! environment: every knob arrives through [`ServerConfig`].

use std::{future::Future, sync::Arc};

use huddle_shared::time::SystemClock;
use tokio::{net::TcpListener, task::JoinHandle};

use crate::{
    domain::{InstanceId, MessageBus, MessageRepository, RoomRepository},
    hub::{Hub, HubConfig},
    infrastructure::{
        bus::{BusPublisher, BusSubscriber, DEFAULT_BUS_CAPACITY, DEFAULT_TOPIC, InMemoryBus},
        repository::{InMemoryMessageRepository, InMemoryRoomRepository},
    },
    ui::{Server, state::AppState},
    usecase::{ConnectParticipantUseCase, RoomAdminUseCase, SendMessageUseCase},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub hub: HubConfig,
    pub bus_topic: String,
    pub bus_capacity: usize,
    /// Identity stamped on every record this process publishes
    pub instance_id: InstanceId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            hub: HubConfig::default(),
            bus_topic: DEFAULT_TOPIC.to_string(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
            instance_id: InstanceId::generate(),
        }
    }
}

/// External collaborators of one server process.
///
/// Several processes sharing the same collaborators behave like several
/// backend instances behind one database and one bus.
#[derive(Clone)]
pub struct Collaborators {
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub bus: Arc<dyn MessageBus>,
}

impl Collaborators {
    /// In-memory repositories and bus
    pub fn in_memory(bus_capacity: usize) -> Self {
        Self {
            rooms: Arc::new(InMemoryRoomRepository::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
            bus: Arc::new(InMemoryBus::new(bus_capacity)),
        }
    }
}

/// A fully wired server process
pub struct App {
    state: Arc<AppState>,
    hub_loop: JoinHandle<()>,
    bus_subscriber: JoinHandle<()>,
}

impl App {
    pub async fn build(config: &ServerConfig, collaborators: Collaborators) -> Self {
        // Initialize dependencies in order:
        // 1. Hub
        // 2. Bus bridge
        // 3. UseCases
        // 4. AppState

        // 1. Hub (process-wide, passed explicitly to every component)
        let (hub, hub_loop) = Hub::spawn(config.hub);
        tracing::info!(instance = %config.instance_id, "Hub started");

        // 2. Bus bridge
        let publisher = Arc::new(BusPublisher::new(
            collaborators.bus.clone(),
            config.bus_topic.clone(),
            config.instance_id,
        ));
        let bus_subscriber = BusSubscriber::new(
            collaborators.bus,
            config.bus_topic.clone(),
            config.instance_id,
            hub.clone(),
        )
        .start()
        .await;

        // 3. UseCases
        let clock = Arc::new(SystemClock);
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            collaborators.rooms.clone(),
            hub.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            collaborators.messages.clone(),
            hub.clone(),
            publisher,
            clock.clone(),
        ));
        let room_admin_usecase = Arc::new(RoomAdminUseCase::new(
            collaborators.rooms,
            collaborators.messages,
            hub.clone(),
            clock,
        ));

        // 4. AppState
        let state = Arc::new(AppState {
            hub,
            connect_participant_usecase,
            send_message_usecase,
            room_admin_usecase,
        });

        Self {
            state,
            hub_loop,
            bus_subscriber,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn hub(&self) -> &Hub {
        &self.state.hub
    }

    /// Serve HTTP on `listener` until `shutdown` resolves, then stop the
    /// background tasks.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = Server::new(self.state.clone()).serve(listener, shutdown).await;
        self.bus_subscriber.abort();
        self.hub_loop.abort();
        result
    }
}
