//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::{
    config::ServerConfig,
    domain::{Broadcaster, UserRegistry},
    infrastructure::{AdmissionGate, InMemoryUserRegistry, RegistryBroadcaster},
    usecase::{
        AuthenticateUserUseCase, DisconnectUserUseCase, GetOnlineUsersUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// AuthenticateUserUseCase（認証のユースケース）
    pub authenticate_user_usecase: Arc<AuthenticateUserUseCase>,
    /// SendMessageUseCase（メッセージリレーのユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetOnlineUsersUseCase（オンラインユーザー取得のユースケース）
    pub get_online_users_usecase: Arc<GetOnlineUsersUseCase>,
    /// DisconnectUserUseCase（切断のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// Caps concurrently active sessions
    pub admission_gate: AdmissionGate,
    /// Timeout for writing one frame to a client
    pub write_timeout: Duration,
    /// Capacity of each connection's outbound queue
    pub outbound_queue_capacity: usize,
}

impl AppState {
    /// Wire the in-memory implementations together from the config
    pub fn from_config(config: &ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Registry
        // 2. Broadcaster
        // 3. UseCases
        // 4. Admission gate

        // 1. Create Registry (in-memory)
        let registry: Arc<dyn UserRegistry> =
            Arc::new(InMemoryUserRegistry::new(config.username_policy));

        // 2. Create Broadcaster on top of the registry
        let broadcaster: Arc<dyn Broadcaster> =
            Arc::new(RegistryBroadcaster::new(registry.clone()));

        // 3. Create UseCases
        let authenticate_user_usecase = Arc::new(AuthenticateUserUseCase::new(registry.clone()));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(broadcaster.clone()));
        let get_online_users_usecase = Arc::new(GetOnlineUsersUseCase::new(registry.clone()));
        let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(
            registry,
            broadcaster,
            config.notify_on_leave,
        ));

        // 4. Create the admission gate
        let admission_gate = AdmissionGate::new(usize::from(config.max_conn));

        Self {
            authenticate_user_usecase,
            send_message_usecase,
            get_online_users_usecase,
            disconnect_user_usecase,
            admission_gate,
            write_timeout: config.write_timeout(),
            outbound_queue_capacity: config.outbound_queue_capacity,
        }
    }
}
