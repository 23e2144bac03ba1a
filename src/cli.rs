//! Command-line interface for the `garland` binary
//!
//! Parses arguments with clap and maps each subcommand onto the matching
//! client accessor.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::data::{GarlandClient, Language};
use crate::error::Result;

/// Garland Tools lookup - fetch game database documents and assets
#[derive(Parser, Debug)]
#[command(name = "garland")]
#[command(about = "Look up Garland Tools database documents, icons and maps")]
#[command(version)]
pub struct Cli {
    /// Language for document lookups (en, de, fr, ja)
    #[arg(long, short, global = true, default_value = "en")]
    pub lang: Language,

    /// Service host to query
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per database resource
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// An achievement by ID
    Achievement { id: u32 },
    /// The achievement index
    Achievements,
    /// An action by ID
    Action { id: u32 },
    /// The action index
    Actions,
    /// The core data document
    Data,
    /// Endgame gear for a job (three-letter abbreviation)
    EndgameGear { job: String },
    /// A FATE by ID
    Fate { id: u32 },
    /// The FATE index
    Fates,
    /// The fishing spot index
    FishingSpots,
    /// A PNG icon, written to a file
    Icon {
        /// Database directory, e.g. "item" or "action"
        kind: String,
        id: u32,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// An instance by ID
    Instance { id: u32 },
    /// The instance index
    Instances,
    /// An item by ID
    Item { id: u32 },
    /// A leve by ID
    Leve { id: u32 },
    /// The levequest index
    Leves,
    /// Leveling gear for a job (three-letter abbreviation)
    LevelingGear { job: String },
    /// A PNG zone map, written to a file
    Map {
        /// Zone name; nested zones as "La Noscea/Lower La Noscea"
        zone: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// A mob by ID
    Mob { id: u32 },
    /// The mob index
    Mobs,
    /// A gathering node by ID
    Node { id: u32 },
    /// The gathering node index
    Nodes,
    /// An NPC by ID
    Npc { id: u32 },
    /// The NPC index
    Npcs,
    /// Free-text search
    Search { query: String },
    /// A status effect by ID
    Status { id: u32 },
    /// The status effect index
    Statuses,
    /// A quest by ID
    Quest { id: u32 },
    /// The quest index
    Quests,
}

/// Result of running a subcommand
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A document or listing to print
    Json(Value),
    /// Asset bytes to write to `path`
    Asset { bytes: Bytes, path: PathBuf },
}

impl Cli {
    /// Builds the client configuration from the global flags
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_language(self.lang)
            .with_timeout(Duration::from_secs(self.timeout))
    }
}

impl Command {
    /// Runs the lookup against `client`
    pub async fn execute(&self, client: &GarlandClient) -> Result<Lookup> {
        let document = match self {
            Command::Achievement { id } => (*client.achievement(*id).await?).clone(),
            Command::Achievements => Value::Array(client.achievements().await?),
            Command::Action { id } => (*client.action(*id).await?).clone(),
            Command::Actions => Value::Array(client.actions().await?),
            Command::Data => (*client.data().await?).clone(),
            Command::EndgameGear { job } => (*client.endgame_gear(job).await?).clone(),
            Command::Fate { id } => (*client.fate(*id).await?).clone(),
            Command::Fates => Value::Array(client.fates().await?),
            Command::FishingSpots => Value::Array(client.fishing_spots().await?),
            Command::Icon { kind, id, output } => {
                return Ok(Lookup::Asset {
                    bytes: client.icon(kind, *id).await?,
                    path: output.clone(),
                });
            }
            Command::Instance { id } => (*client.instance(*id).await?).clone(),
            Command::Instances => Value::Array(client.instances().await?),
            Command::Item { id } => (*client.item(*id).await?).clone(),
            Command::Leve { id } => (*client.leve(*id).await?).clone(),
            Command::Leves => Value::Array(client.leves().await?),
            Command::LevelingGear { job } => (*client.leveling_gear(job).await?).clone(),
            Command::Map { zone, output } => {
                return Ok(Lookup::Asset {
                    bytes: client.map(zone).await?,
                    path: output.clone(),
                });
            }
            Command::Mob { id } => (*client.mob(*id).await?).clone(),
            Command::Mobs => Value::Array(client.mobs().await?),
            Command::Node { id } => (*client.node(*id).await?).clone(),
            Command::Nodes => Value::Array(client.nodes().await?),
            Command::Npc { id } => (*client.npc(*id).await?).clone(),
            Command::Npcs => Value::Array(client.npcs().await?),
            Command::Search { query } => (*client.search(query).await?).clone(),
            Command::Status { id } => (*client.status(*id).await?).clone(),
            Command::Statuses => Value::Array(client.statuses().await?),
            Command::Quest { id } => (*client.quest(*id).await?).clone(),
            Command::Quests => Value::Array(client.quests().await?),
        };
        Ok(Lookup::Json(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["garland", "achievement", "1"]);
        assert_eq!(cli.lang, Language::En);
        assert_eq!(cli.base_url, "https://www.garlandtools.org");
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.command, Command::Achievement { id: 1 });
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["garland", "item", "5057", "--lang", "de", "--timeout", "5"]);
        assert_eq!(cli.lang, Language::De);
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.command, Command::Item { id: 5057 });
    }

    #[test]
    fn test_cli_parse_icon_requires_output() {
        assert!(Cli::try_parse_from(["garland", "icon", "item", "26"]).is_err());

        let cli = Cli::parse_from(["garland", "icon", "item", "26", "-o", "icon.png"]);
        assert_eq!(
            cli.command,
            Command::Icon {
                kind: "item".to_string(),
                id: 26,
                output: PathBuf::from("icon.png"),
            }
        );
    }

    #[test]
    fn test_cli_parse_rejects_unknown_language() {
        let result = Cli::try_parse_from(["garland", "--lang", "es", "data"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["garland", "quest", "abc"]).is_err());
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::parse_from([
            "garland",
            "--lang",
            "fr",
            "--base-url",
            "http://localhost:9000",
            "--timeout",
            "3",
            "fates",
        ]);
        let config = cli.client_config();

        assert_eq!(config.language, Language::Fr);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_execute_index_returns_listing_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/db/doc/browse/en/2/leve.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "browse": [{ "i": 1 }] })))
            .mount(&server)
            .await;

        let cli = Cli::parse_from(["garland", "--base-url", server.uri().as_str(), "leves"]);
        let client = GarlandClient::with_config(cli.client_config()).unwrap();
        let lookup = cli.command.execute(&client).await.unwrap();

        assert_eq!(lookup, Lookup::Json(json!([{ "i": 1 }])));
    }

    #[tokio::test]
    async fn test_execute_map_returns_asset_with_output_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/maps/Thanalan.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .mount(&server)
            .await;

        let cli = Cli::parse_from([
            "garland",
            "--base-url",
            server.uri().as_str(),
            "map",
            "Thanalan",
            "--output",
            "map.png",
        ]);
        let client = GarlandClient::with_config(cli.client_config()).unwrap();
        let lookup = cli.command.execute(&client).await.unwrap();

        assert_eq!(
            lookup,
            Lookup::Asset {
                bytes: Bytes::from_static(&[1, 2, 3]),
                path: PathBuf::from("map.png"),
            }
        );
    }
}
