//! Client for the N-in-a-row match server.
//!
//! Wraps the HTTP API in [`GameClient`], keeps lobby and match state fresh
//! by polling ([`LobbyWatcher`], [`MatchWatcher`]) and tracks one online game
//! from this device's side ([`OnlineSession`]).
//!
//! # Example
//!
//! ```no_run
//! use nline_client::{GameClient, LobbyEvent, LobbyWatcher, SearchOutcome, DEFAULT_POLL_INTERVAL};
//!
//! # async fn example() -> Result<(), nline_client::ClientError> {
//! let client = GameClient::from_env()?;
//! let me = client.register(Some("ana")).await?;
//!
//! let assignment = match client.search_match(&me, 3).await? {
//!     SearchOutcome::Matched(assignment) => assignment,
//!     SearchOutcome::Waiting { .. } => {
//!         let (_watcher, mut events) = LobbyWatcher::spawn(client.clone(), me.clone(), DEFAULT_POLL_INTERVAL);
//!         match events.recv().await {
//!             Some(LobbyEvent::Matched(assignment)) => assignment,
//!             None => return Ok(()),
//!         }
//!     }
//! };
//! println!("playing match {}", assignment.match_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod session;

pub use client::{GameClient, SearchOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use poll::{LobbyEvent, LobbyWatcher, MatchEvent, MatchWatcher, DEFAULT_POLL_INTERVAL};
pub use session::{OnlineSession, Phase, SessionResult};
