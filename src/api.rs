use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::Upstream;
use crate::data_structs::{HistoryBars, HuobiEnvelope, HuobiHistory};
use crate::error::UdfError;

/// Shared client for every upstream call. Certificate checks stay on.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("udf-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Kline request URL with every parameter percent-encoded.
pub fn kline_url(
    upstream: Upstream,
    base: &str,
    period: &str,
    size: i64,
    symbol: &str,
) -> Result<Url, UdfError> {
    let period_key = match upstream {
        Upstream::Zg => "type",
        Upstream::Huobi => "period",
    };

    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair(period_key, period)
        .append_pair("size", &size.to_string())
        .append_pair("symbol", symbol);
    Ok(url)
}

async fn fetch_body(client: &Client, url: Url) -> Result<String, UdfError> {
    tracing::debug!("upstream request: {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let text = response.text().await.map_err(UdfError::BodyRead)?;
    tracing::debug!("upstream response: {} bytes", text.len());
    Ok(text)
}

/// Fetch `[ts_ms, open, high, low, close, vol]` rows and re-project them into columns.
pub async fn get_zg_candles(client: &Client, url: Url) -> Result<HistoryBars, UdfError> {
    let text = fetch_body(client, url).await?;
    let rows: Vec<Vec<Value>> = serde_json::from_str(&text)?;
    zg_bars(&rows)
}

/// Fetch the nested daily-bar envelope; bars are handed back unchanged.
pub async fn get_huobi_candles(client: &Client, url: Url) -> Result<HuobiHistory, UdfError> {
    let text = fetch_body(client, url).await?;
    let envelope: HuobiEnvelope = serde_json::from_str(&text)?;
    huobi_history(envelope)
}

pub fn zg_bars(rows: &[Vec<Value>]) -> Result<HistoryBars, UdfError> {
    let mut bars = HistoryBars::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let malformed = |reason: String| UdfError::MalformedBar { index, reason };

        if row.len() < 6 {
            return Err(malformed(format!("expected 6 fields, got {}", row.len())));
        }

        let ts_ms = row[0]
            .as_i64()
            .or_else(|| row[0].as_f64().map(|f| f as i64))
            .ok_or_else(|| malformed(format!("timestamp {} is not a number", row[0])))?;

        bars.t.push(ts_ms / 1000);
        bars.o.push(field_f64(&row[1], "open").map_err(malformed)?);
        bars.h.push(field_f64(&row[2], "high").map_err(malformed)?);
        bars.l.push(field_f64(&row[3], "low").map_err(malformed)?);
        bars.c.push(field_f64(&row[4], "close").map_err(malformed)?);
        bars.v.push(field_f64(&row[5], "volume").map_err(malformed)?);
    }

    Ok(bars)
}

/// Prices come as decimal strings; bare numbers are accepted as well.
fn field_f64(value: &Value, name: &str) -> Result<f64, String> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{name} {s:?}: {e}")),
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{name} {n} out of range")),
        other => Err(format!("{name} {other} is not a number")),
    }
}

pub fn huobi_history(envelope: HuobiEnvelope) -> Result<HuobiHistory, UdfError> {
    if envelope.status != "ok" {
        return Err(UdfError::UpstreamStatus {
            code: envelope.err_code.unwrap_or_else(|| envelope.status.clone()),
            message: envelope.err_msg.unwrap_or_default(),
        });
    }

    Ok(HuobiHistory {
        s: "ok",
        ch: envelope.ch,
        ts: envelope.ts,
        data: envelope.data.unwrap_or_default(),
    })
}
