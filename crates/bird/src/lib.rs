//! # Bird
//!
//! HTTP backend for a four-player, Rook-style trick-taking game.
//!
//! Tables move through three phases under one room ID (lobby, bidding,
//! game). Each phase has its own [`RoomManager`](bird_room::RoomManager);
//! every change is pushed to subscribed clients as a server-sent event
//! stream, projected so each player sees only their own hand.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), bird::BirdError> {
//! let config = bird::ServerConfig::from_env()?;
//! let server = bird::BirdServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

pub mod auth;
pub mod config;
mod error;
mod routes;
mod server;
pub mod state;
mod stream;
pub mod telemetry;

pub use config::{ConfigError, ServerConfig, StreamConfig};
pub use error::{ApiError, BirdError};
pub use server::{BirdServer, BirdServerBuilder, router};
pub use state::AppState;
