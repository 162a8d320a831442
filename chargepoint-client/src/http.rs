//! Thin HTTP implementation of [`ChargePointApi`].
//!
//! Each listing call is one POST against the gateway; credentials ride as
//! basic auth. Pagination, retry and normalization all live in the sync
//! service, so this stays a plain request/response wrapper.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{
    AlarmPage, AlarmQuery, ApiError, ChargePointApi, RawAlarm, RawSession, RawStation,
    SessionPage, SessionQuery, StationList, StationQuery,
};

pub struct HttpChargePointApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

/// Wire envelope for the session listing. The continuation flag arrives as
/// an integer (0/1) from the upstream gateway.
#[derive(Deserialize)]
struct SessionListingResponse {
    #[serde(rename = "ChargingSessionData", default)]
    records: Vec<RawSession>,
    #[serde(rename = "MoreFlag", default)]
    more_flag: i32,
}

#[derive(Deserialize)]
struct AlarmListingResponse {
    #[serde(rename = "Alarms", default)]
    records: Vec<RawAlarm>,
    #[serde(rename = "moreFlag", default)]
    more_flag: i32,
}

#[derive(Deserialize)]
struct StationListingResponse {
    #[serde(rename = "stationData", default)]
    records: Vec<RawStation>,
}

impl HttpChargePointApi {
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    async fn post<Q, R>(&self, method: &str, query: &Q) -> Result<R, ApiError>
    where
        Q: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("{method} returned {status}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("{method}: {e}")))
    }
}

#[async_trait]
impl ChargePointApi for HttpChargePointApi {
    async fn charging_sessions(&self, query: &SessionQuery) -> Result<SessionPage, ApiError> {
        let resp: SessionListingResponse = self.post("getChargingSessionData", query).await?;
        Ok(SessionPage {
            records: resp.records,
            more: resp.more_flag != 0,
        })
    }

    async fn alarms(&self, query: &AlarmQuery) -> Result<AlarmPage, ApiError> {
        let resp: AlarmListingResponse = self.post("getAlarms", query).await?;
        Ok(AlarmPage {
            records: resp.records,
            more: resp.more_flag != 0,
        })
    }

    async fn stations(&self, query: &StationQuery) -> Result<StationList, ApiError> {
        let resp: StationListingResponse = self.post("getStations", query).await?;
        Ok(StationList {
            records: resp.records,
        })
    }
}
