//! Cursor-driven retrieval from the remote listing calls.
//!
//! Each listing is paged by a record offset: the first page starts at
//! record 1 and every following page advances by [`PAGE_SIZE`] until the
//! server clears its continuation flag. Transport errors surface to the
//! merge engine, which owns the retry policy; nothing is retried here.

use chrono::{DateTime, Utc};

use chargepoint_client::api::{
    AlarmQuery, ApiError, ChargePointApi, RawAlarm, RawSession, RawStation, SessionQuery,
    StationQuery,
};

/// Per-page record limit of the remote API.
pub const PAGE_SIZE: u32 = 100;

/// Pull every session in `[from_ts, to_ts)`; an omitted upper bound leaves
/// the range open-ended on the server side. An exhausted range yields an
/// empty vec, not an error.
pub async fn fetch_sessions(
    api: &dyn ChargePointApi,
    from_ts: DateTime<Utc>,
    to_ts: Option<DateTime<Utc>>,
) -> Result<Vec<RawSession>, ApiError> {
    let mut records = Vec::new();
    let mut start_record = 1;

    loop {
        let page = api
            .charging_sessions(&SessionQuery {
                from_ts,
                to_ts,
                start_record,
            })
            .await?;

        metrics::counter!("chargepoint_session_pages_total").increment(1);
        tracing::debug!(start_record, count = page.records.len(), "fetched session page");

        records.extend(page.records);
        if !page.more {
            break;
        }
        start_record += PAGE_SIZE;
    }

    Ok(records)
}

/// Pull every alarm in `[start_ts, end_ts]`, paged the same way as sessions.
pub async fn fetch_alarms(
    api: &dyn ChargePointApi,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
) -> Result<Vec<RawAlarm>, ApiError> {
    let mut records = Vec::new();
    let mut start_record = 1;

    loop {
        let page = api
            .alarms(&AlarmQuery {
                start_ts,
                end_ts,
                start_record,
            })
            .await?;

        metrics::counter!("chargepoint_alarm_pages_total").increment(1);
        tracing::debug!(start_record, count = page.records.len(), "fetched alarm page");

        records.extend(page.records);
        if !page.more {
            break;
        }
        start_record += PAGE_SIZE;
    }

    Ok(records)
}

/// The station listing is a full snapshot in one call.
pub async fn fetch_stations(api: &dyn ChargePointApi) -> Result<Vec<RawStation>, ApiError> {
    let listing = api.stations(&StationQuery::default()).await?;
    metrics::counter!("chargepoint_station_listings_total").increment(1);
    Ok(listing.records)
}
