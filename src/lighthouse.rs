//! The remote pixel display: an authenticated, best-effort image sink.
//!
//! Frames travel over a bounded channel to a sender thread that PUTs them
//! to the display API. The game never waits on the network — a busy sink
//! drops frames, and delivery failures are logged and forgotten. There is
//! deliberately no reconnect or backoff logic at this boundary.

use std::{
    env,
    sync::mpsc::{sync_channel, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::Duration,
};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, warn};

use leuchtris_engine::PixelFrame;

/// Base URL of the lighthouse display API.
const API_URL: &str = "https://lighthouse.uni-kiel.de/api";
/// Per-request network budget; frames are worthless once stale.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A running display session. Construct via [`Lighthouse::from_env`],
/// feed with [`Lighthouse::set_image`], end with [`Lighthouse::stop`]
/// (or by dropping).
#[derive(Debug)]
pub struct Lighthouse {
    sender: Option<SyncSender<PixelFrame>>,
    handle: Option<JoinHandle<()>>,
}

impl Lighthouse {
    /// Starts a display session from the `USER_NAME` / `API_TOKEN`
    /// environment variables. Returns `None` (and the game runs without
    /// the display) when either is unset.
    pub fn from_env() -> Option<Self> {
        match (env::var("USER_NAME"), env::var("API_TOKEN")) {
            (Ok(username), Ok(token)) => Some(Self::start(username, token)),
            _ => {
                warn!("USER_NAME / API_TOKEN not set, lighthouse display disabled");
                None
            }
        }
    }

    /// Starts the sender thread for an authenticated display session.
    pub fn start(username: String, token: String) -> Self {
        // Capacity 1: the display only ever wants the newest frame.
        let (sender, receiver) = sync_channel::<PixelFrame>(1);

        let join_handle = thread::spawn(move || {
            let client = match reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
            {
                Ok(client) => client,
                Err(error) => {
                    warn!("could not set up lighthouse client: {error}");
                    return;
                }
            };
            let url = format!("{API_URL}/user/{username}/model");
            let authorization = format!("Token {token}");

            // Drains until the game drops its sender.
            for frame in receiver {
                let body = match serde_json::to_vec(&frame) {
                    Ok(body) => body,
                    Err(error) => {
                        debug!("could not encode frame: {error}");
                        continue;
                    }
                };
                let outcome = client
                    .put(&url)
                    .header(AUTHORIZATION, authorization.as_str())
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
                    .and_then(|response| response.error_for_status());
                if let Err(error) = outcome {
                    debug!("frame not delivered: {error}");
                }
            }
        });

        info!("lighthouse session started");
        Lighthouse {
            sender: Some(sender),
            handle: Some(join_handle),
        }
    }

    /// Hands a frame to the sender thread. Best-effort: if the thread is
    /// still busy with the previous frame, this one is dropped.
    pub fn set_image(&self, frame: PixelFrame) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("sink busy, frame dropped"),
            Err(TrySendError::Disconnected(_)) => debug!("sink thread gone, frame dropped"),
        }
    }

    /// Ends the session: lets the sender thread drain and finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("lighthouse session stopped");
        }
    }
}

impl Drop for Lighthouse {
    fn drop(&mut self) {
        self.shutdown();
    }
}
