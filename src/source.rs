use crate::errors::SourceError;
use crate::models::{ClientRecord, ClientsResponse, SeriesOutcome};
use crate::period::{PeriodToken, resolve};
use crate::series::{DailySeries, TimestampedRecord, bucketize};
use chrono::NaiveDateTime;
use reqwest::Client;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ClientSource {
    client: Client,
    url: String,
}

impl ClientSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_clients(&self) -> Result<Vec<ClientRecord>, SourceError> {
        info!(url = %self.url, "fetching clients");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| SourceError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let payload: ClientsResponse = response.json().await.map_err(SourceError::Decode)?;
        debug!(count = payload.clients.len(), "fetched clients");
        Ok(payload.clients)
    }
}

/// Resolves the period, fetches records and folds them into a daily series.
/// A failing source yields the zero-filled series instead of an error.
pub async fn load_series(
    source: &ClientSource,
    token: PeriodToken,
    now: NaiveDateTime,
) -> SeriesOutcome {
    let fetched = source.fetch_clients().await;
    series_from(token, now, fetched)
}

pub fn series_from<R: TimestampedRecord>(
    token: PeriodToken,
    now: NaiveDateTime,
    fetched: Result<Vec<R>, SourceError>,
) -> SeriesOutcome {
    let range = resolve(token, now);
    match fetched {
        Ok(records) => SeriesOutcome {
            period: token,
            series: bucketize(&range, &records),
            degraded: false,
        },
        Err(err) => {
            warn!(%token, "record source unavailable, serving empty series: {err}");
            SeriesOutcome {
                period: token,
                series: DailySeries::empty(&range),
                degraded: true,
            }
        }
    }
}
