use drivebridge_config::Settings;
use drivebridge_db::OptionStore;
use drivebridge_services::{
    AuthService, DriveProxy, GoogleDriveClient, NonceService, SessionManager,
    cloud_storage::{DriveClient, RemoteError},
    drive::SessionConfig,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub nonces: Arc<NonceService>,
    pub session: Arc<SessionManager>,
    pub drive: Arc<DriveProxy>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn OptionStore>) -> Result<Self, RemoteError> {
        let client = Arc::new(GoogleDriveClient::new(&settings.drive)?);
        Ok(Self::with_client(settings, store, client))
    }

    /// Wires the state around an explicit provider client.
    pub fn with_client(
        settings: Settings,
        store: Arc<dyn OptionStore>,
        client: Arc<dyn DriveClient>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(settings.auth.clone()));
        let nonces = Arc::new(NonceService::new(
            settings.auth.nonce_secret.clone(),
            settings.auth.nonce_lifetime_secs,
        ));
        let session = Arc::new(SessionManager::new(
            client.clone(),
            store,
            SessionConfig::from(&settings.drive),
        ));
        let drive = Arc::new(DriveProxy::new(session.clone(), client));

        Self {
            settings,
            auth,
            nonces,
            session,
            drive,
        }
    }
}
