pub mod config;
pub mod matcher;
pub mod movie;
pub mod session;
pub mod testing;
pub mod torrent;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LoggingConfig,
    TrackerConfig,
};
pub use matcher::{best_match, Profile, SortKey};
pub use movie::{Movie, MovieError, MovieValue, Source, FIELD_ROUTES};
pub use session::{HttpSession, Response, SessionError, Transport};
pub use torrent::{Torrent, TorrentEnrichment};
