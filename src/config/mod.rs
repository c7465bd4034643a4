/// Main configuration module.
///
/// Re-exports submodules for matchmaking, anti-spam and server configuration.
pub mod matchmaking;
pub mod anti_spam;
pub mod server;
