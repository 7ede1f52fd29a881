use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use voketag_client::{Clients, FileSessionStore};
use voketag_config::Config;
use voketag_core::Result;

/// Everything a command needs: configuration, API clients, output mode
pub struct Context {
    pub config: Arc<Config>,
    pub clients: Clients,
    pub json: bool,
}

impl Context {
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
        let clients = Clients::new(&config, store)?;
        Ok(Self {
            config: Arc::new(config),
            clients,
            json,
        })
    }
}

/// Cancel `token` on the first Ctrl-C
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    tracing::info!("interrupted, stopping");
                    token.cancel();
                }
            }
        }
    });
}
