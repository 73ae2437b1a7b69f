//! Entry listing, retrieval, patching, and export.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value, json};
use tokio::io::AsyncWrite;
use tracing::{debug, info, instrument};
use url::Url;

use super::dispatcher::ensure_success;
use super::error::ApiError;
use crate::client::ApiClient;
use crate::http::{BodyCopyError, Method};
use crate::model::{Entry, EntryPage};

/// Query parameters for the entries listing, sent in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    params: Vec<(String, String)>,
}

impl EntryFilter {
    /// An empty filter (all entries).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an earlier value for the same key.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.params.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.params.push((key, value));
        }
        self
    }

    /// Filters on the archived flag (`archive=0|1`).
    #[must_use]
    pub fn archived(self, archived: bool) -> Self {
        self.param("archive", if archived { "1" } else { "0" })
    }

    /// Filters on the starred flag (`starred=0|1`).
    #[must_use]
    pub fn starred(self, starred: bool) -> Self {
        self.param("starred", if starred { "1" } else { "0" })
    }

    /// Restricts to entries carrying all of `tags` (comma-joined). Empty input is ignored.
    #[must_use]
    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self
        } else {
            self.param("tags", joined)
        }
    }

    /// Page size requested from the server.
    #[must_use]
    pub fn per_page(self, per_page: u32) -> Self {
        self.param("perPage", per_page.to_string())
    }

    /// The parameters in order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// URL-encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for EntryFilter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filter, (key, value)| filter.param(key, value))
    }
}

/// Document formats the export endpoint can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Epub,
    Mobi,
    Txt,
    Csv,
    Json,
    Xml,
}

impl ExportFormat {
    /// All supported formats.
    pub const ALL: [Self; 7] = [
        Self::Pdf,
        Self::Epub,
        Self::Mobi,
        Self::Txt,
        Self::Csv,
        Self::Json,
        Self::Xml,
    ];

    /// Path suffix and file extension (`pdf`, `epub`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown export format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported export format '{0}' (expected one of: pdf, epub, mobi, txt, csv, json, xml)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| UnknownFormat(value.to_string()))
    }
}

impl ApiClient {
    fn entries_url(&self, filter: &EntryFilter) -> String {
        let query = filter.to_query();
        if query.is_empty() {
            format!("{}/api/entries.json", self.base_url())
        } else {
            format!("{}/api/entries.json?{query}", self.base_url())
        }
    }

    fn entry_url(&self, id: u64) -> String {
        format!("{}/api/entries/{id}.json", self.base_url())
    }

    fn export_url(&self, id: u64, format: ExportFormat) -> String {
        format!("{}/api/entries/{id}/export.{format}", self.base_url())
    }

    /// Lists all entries matching `filter`, following `next` links across pages.
    ///
    /// Items are returned in server order, concatenated page by page. Any
    /// failure aborts the whole listing.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError`] encountered, or [`ApiError::Pagination`]
    /// when a page claims more pages without a usable `next` link.
    #[instrument(skip(self, filter), fields(params = %filter.to_query()))]
    pub async fn list_entries(&mut self, filter: &EntryFilter) -> Result<Vec<Entry>, ApiError> {
        info!("listing entries");
        let mut url = self.entries_url(filter);
        let mut page: EntryPage = self.get(&url).await?;
        let mut items = std::mem::take(&mut page.embedded.items);

        while page.has_more() {
            let Some(href) = page.next_href() else {
                return Err(ApiError::pagination(
                    url,
                    page.page,
                    page.pages,
                    "missing next link",
                ));
            };
            let next_url = resolve_href(&url, href);
            let previous = page.page;
            debug!(page = previous.saturating_add(1), pages = page.pages, "fetching next entries page");

            page = self.get(&next_url).await?;
            url = next_url;
            if page.page <= previous {
                return Err(ApiError::pagination(
                    url,
                    page.page,
                    page.pages,
                    "page number did not advance",
                ));
            }
            items.append(&mut page.embedded.items);
        }

        info!(
            retrieved = items.len(),
            total = page.total,
            pages = page.pages,
            "retrieved entries"
        );
        Ok(items)
    }

    /// Fetches a single entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on auth, transport, status, or decode failure.
    #[instrument(skip(self))]
    pub async fn get_entry(&mut self, id: u64) -> Result<Entry, ApiError> {
        info!("get entry");
        let url = self.entry_url(id);
        self.get(&url).await
    }

    /// Sends a partial update for an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on auth, transport, or status failure.
    #[instrument(skip(self, fields), fields(keys = ?fields.keys().collect::<Vec<_>>()))]
    pub async fn patch_entry(&mut self, id: u64, fields: &Map<String, Value>) -> Result<(), ApiError> {
        info!("patch entry");
        let url = self.entry_url(id);
        self.patch(&url, fields).await
    }

    /// Marks an entry as archived (`{"archive": 1}`).
    ///
    /// # Errors
    ///
    /// See [`ApiClient::patch_entry`].
    pub async fn archive_entry(&mut self, id: u64) -> Result<(), ApiError> {
        let mut fields = Map::new();
        fields.insert("archive".to_string(), json!(1));
        self.patch_entry(id, &fields).await
    }

    /// Streams the exported document verbatim into `sink`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadStatus`] for non-2xx responses and
    /// [`ApiError::Sink`] when writing into `sink` fails.
    #[instrument(skip(self, sink), fields(format = %format))]
    pub async fn export_entry<W>(
        &mut self,
        id: u64,
        format: ExportFormat,
        sink: &mut W,
    ) -> Result<u64, ApiError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        info!("export entry");
        let url = self.export_url(id, format);
        let response = self.request(Method::GET, &url, None).await?;
        let response = ensure_success(&url, response)?;
        let written = response.copy_to(sink).await.map_err(|error| match error {
            BodyCopyError::Transport(source) => ApiError::Transport(source),
            BodyCopyError::Io(source) => ApiError::Sink { id, source },
        })?;
        debug!(bytes = written, "export streamed");
        Ok(written)
    }
}

/// Resolves a possibly relative `href` against the URL it was found on.
fn resolve_href(current: &str, href: &str) -> String {
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(current)
            .and_then(|base| base.join(href))
            .map_or_else(|_| href.to_string(), |joined| joined.to_string()),
        Err(_) => href.to_string(),
    }
}
