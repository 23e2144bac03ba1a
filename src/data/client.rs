//! Garland Tools HTTP client
//!
//! Builds request URLs for each resource type and routes every request
//! through the shared response cache.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::endpoints::{self, Document, GearSet, Index};
use super::Language;
use crate::cache::{Cache, CachedValue};
use crate::config::ClientConfig;
use crate::error::{FetchFailure, GarlandError, Result};

/// Client for the Garland Tools database
///
/// Clones share the same cache and language setting.
#[derive(Debug, Clone)]
pub struct GarlandClient {
    http: Client,
    base_url: String,
    language: Arc<RwLock<Language>>,
    cache: Cache,
}

impl GarlandClient {
    /// Create a new client against the public service with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client from an explicit configuration
    ///
    /// # Returns
    /// * `Err(GarlandError::InvalidConfig)` if the configuration is rejected
    ///   or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                GarlandError::InvalidConfig(format!("failed to build HTTP client: {}", e))
            })?;

        Self::with_client(config, http)
    }

    /// Create a new client with a custom HTTP client
    ///
    /// The client's own timeout and headers apply; `config.timeout` and
    /// `config.user_agent` are ignored.
    pub fn with_client(config: ClientConfig, http: Client) -> Result<Self> {
        config.validate()?;

        let cache = Cache::with_policy(config.cache_time, config.read_policy)?;
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            language: Arc::new(RwLock::new(config.language)),
            cache,
        })
    }

    /// Change the language used for subsequent requests
    ///
    /// Cached entries for other languages stay valid, since the language is
    /// part of every request URL.
    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
        tracing::info!(language = %language, "Language updated");
    }

    pub fn language(&self) -> Language {
        *self.language.read()
    }

    /// Remove every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Set how long responses are cached, in milliseconds
    ///
    /// # Returns
    /// * `Err(GarlandError::InvalidConfig)` if `ms` is not positive; the
    ///   current cache time is kept
    pub fn set_cache_time(&self, ms: i64) -> Result<()> {
        if ms <= 0 {
            return Err(GarlandError::InvalidConfig(format!(
                "cache time must be greater than zero, got {} ms",
                ms
            )));
        }
        self.cache.set_ttl(Duration::from_millis(ms as u64))
    }

    /// The response cache backing this client
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a JSON document through the cache
    async fn document(&self, path: String) -> Result<Arc<Value>> {
        let url = self.url(&path);
        let http = self.http.clone();
        let target = url.clone();

        let value = self
            .cache
            .get_or_fetch(&url, move || fetch_json(http, target))
            .await?;
        expect_json(url, value)
    }

    /// Fetch a browse document through the cache
    async fn browse_document(&self, path: String) -> Result<Arc<Value>> {
        let url = self.url(&path);
        let http = self.http.clone();
        let target = url.clone();

        let value = self
            .cache
            .get_or_fetch(&url, move || fetch_browse(http, target))
            .await?;
        expect_json(url, value)
    }

    /// Fetch a browse document through the cache and return its listing
    ///
    /// The cached document is shared, but the returned listing is a deep copy
    /// of its `browse` array, so every call costs one clone of the index.
    /// Use [`GarlandClient::index_document`] to borrow the shared document.
    async fn listing(&self, path: String) -> Result<Vec<Value>> {
        let url = self.url(&path);
        let document = self.browse_document(path).await?;

        document
            .get("browse")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                GarlandError::fetch(url, Arc::new(FetchFailure::MissingField("browse".into())))
            })
    }

    /// Fetch a binary asset through the cache
    async fn asset(&self, path: String) -> Result<Bytes> {
        let url = self.url(&path);
        let http = self.http.clone();
        let target = url.clone();

        let value = self
            .cache
            .get_or_fetch(&url, move || fetch_binary(http, target))
            .await?;
        value.into_binary().ok_or(GarlandError::UnexpectedPayload {
            key: url,
            expected: "binary asset",
        })
    }

    async fn by_id(&self, doc: Document, id: u32) -> Result<Arc<Value>> {
        self.document(endpoints::document(self.language(), doc, id))
            .await
    }

    async fn index(&self, index: Index) -> Result<Vec<Value>> {
        self.listing(endpoints::browse(self.language(), index)).await
    }

    /// The whole browse document for `index`, shared with the cache
    ///
    /// Uses the same cache entry as the list accessors such as
    /// [`GarlandClient::achievements`] without copying the listing.
    pub async fn index_document(&self, index: Index) -> Result<Arc<Value>> {
        self.browse_document(endpoints::browse(self.language(), index))
            .await
    }

    /// An achievement's JSON listing
    pub async fn achievement(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Achievement, id).await
    }

    /// The achievement index
    pub async fn achievements(&self) -> Result<Vec<Value>> {
        self.index(Index::Achievements).await
    }

    /// An action's JSON listing
    pub async fn action(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Action, id).await
    }

    /// The action index
    pub async fn actions(&self) -> Result<Vec<Value>> {
        self.index(Index::Actions).await
    }

    /// The entire core data document
    pub async fn data(&self) -> Result<Arc<Value>> {
        self.document(endpoints::core_data(self.language())).await
    }

    /// Endgame equipment for a three-letter job abbreviation
    pub async fn endgame_gear(&self, job: &str) -> Result<Arc<Value>> {
        self.document(endpoints::gear(self.language(), GearSet::Endgame, job))
            .await
    }

    /// A FATE's JSON listing
    pub async fn fate(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Fate, id).await
    }

    /// The FATE index
    pub async fn fates(&self) -> Result<Vec<Value>> {
        self.index(Index::Fates).await
    }

    /// The fishing spot index
    pub async fn fishing_spots(&self) -> Result<Vec<Value>> {
        self.index(Index::FishingSpots).await
    }

    /// A PNG icon from a database directory such as `item` or `action`
    pub async fn icon(&self, kind: &str, id: u32) -> Result<Bytes> {
        self.asset(endpoints::icon(kind, id)).await
    }

    /// An instance's JSON listing
    pub async fn instance(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Instance, id).await
    }

    /// The instance index
    pub async fn instances(&self) -> Result<Vec<Value>> {
        self.index(Index::Instances).await
    }

    /// An item's JSON listing
    pub async fn item(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Item, id).await
    }

    /// A leve's JSON listing
    pub async fn leve(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Leve, id).await
    }

    /// The levequest index
    pub async fn leves(&self) -> Result<Vec<Value>> {
        self.index(Index::Leves).await
    }

    /// Leveling equipment for a job, sorted by level
    pub async fn leveling_gear(&self, job: &str) -> Result<Arc<Value>> {
        self.document(endpoints::gear(self.language(), GearSet::Leveling, job))
            .await
    }

    /// A PNG map; nested zones are written as `Parent/Zone`
    pub async fn map(&self, zone: &str) -> Result<Bytes> {
        self.asset(endpoints::map(zone)).await
    }

    /// A mob's JSON listing
    pub async fn mob(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Mob, id).await
    }

    /// The mob index
    pub async fn mobs(&self) -> Result<Vec<Value>> {
        self.index(Index::Mobs).await
    }

    /// A gathering node's JSON listing
    pub async fn node(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Node, id).await
    }

    /// The gathering node index
    pub async fn nodes(&self) -> Result<Vec<Value>> {
        self.index(Index::Nodes).await
    }

    /// An NPC's JSON listing
    pub async fn npc(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Npc, id).await
    }

    /// The NPC index
    pub async fn npcs(&self) -> Result<Vec<Value>> {
        self.index(Index::Npcs).await
    }

    /// Search results for a free-text query in the current language
    pub async fn search(&self, query: &str) -> Result<Arc<Value>> {
        self.document(endpoints::search(self.language(), query))
            .await
    }

    /// A status effect's JSON listing
    pub async fn status(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Status, id).await
    }

    /// The status effect index
    pub async fn statuses(&self) -> Result<Vec<Value>> {
        self.index(Index::Statuses).await
    }

    /// A quest's JSON listing
    pub async fn quest(&self, id: u32) -> Result<Arc<Value>> {
        self.by_id(Document::Quest, id).await
    }

    /// The quest index
    pub async fn quests(&self) -> Result<Vec<Value>> {
        self.index(Index::Quests).await
    }
}

fn expect_json(url: String, value: CachedValue) -> Result<Arc<Value>> {
    value.into_json().ok_or(GarlandError::UnexpectedPayload {
        key: url,
        expected: "JSON document",
    })
}

/// GET `url`, requiring a 200 response
async fn get_ok(http: &Client, url: &str) -> std::result::Result<Bytes, FetchFailure> {
    tracing::debug!(url = %url, "Requesting");
    let response = http.get(url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchFailure::Status { status });
    }
    Ok(response.bytes().await?)
}

async fn fetch_json(http: Client, url: String) -> std::result::Result<CachedValue, FetchFailure> {
    let body = get_ok(&http, &url).await?;
    let document: Value = serde_json::from_slice(&body)?;
    Ok(CachedValue::json(document))
}

/// Like `fetch_json`, but rejects documents without a `browse` array so a
/// malformed listing is never cached
async fn fetch_browse(
    http: Client,
    url: String,
) -> std::result::Result<CachedValue, FetchFailure> {
    let value = fetch_json(http, url).await?;
    let has_listing = value
        .as_json()
        .and_then(|document| document.get("browse"))
        .is_some_and(Value::is_array);
    if !has_listing {
        return Err(FetchFailure::MissingField("browse".to_string()));
    }
    Ok(value)
}

async fn fetch_binary(http: Client, url: String) -> std::result::Result<CachedValue, FetchFailure> {
    let body = get_ok(&http, &url).await?;
    Ok(CachedValue::binary(body))
}
