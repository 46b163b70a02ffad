pub mod api;
pub mod config;
pub mod dashboard;
pub mod scheduler;
pub mod state;
pub mod terminal;
pub mod types;
pub mod wallets;

/// LayerEdge dashboard API base URL (public, no auth required)
pub const API_BASE: &str = "https://dashboard.layeredge.io/api";

/// Origin the dashboard API expects on browser requests.
/// `Referer` is derived from it with a trailing slash.
pub const API_ORIGIN: &str = "https://dashboard.layeredge.io";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
