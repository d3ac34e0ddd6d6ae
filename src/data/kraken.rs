use anyhow::{anyhow, Result};
use chrono::{NaiveDateTime, TimeZone, Utc};
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::time::{timeout, Duration};

// Define a struct to hold the response from the Kraken API
#[derive(Deserialize, Debug)]
struct KrakenApiResponse {
    #[serde(default)]
    error: Vec<String>,
    result: Option<KrakenResult>,
}

#[derive(Deserialize, Debug)]
struct KrakenResult {
    #[serde(rename = "last", default)]
    _last: Value, // Pagination cursor, not needed here
    #[serde(flatten)]
    ohlc: HashMap<String, Vec<Vec<Value>>>,
}

/// Kraken OHLC interval in minutes for a timespan.
pub fn interval_minutes(timespan: &str) -> Result<u32> {
    match timespan {
        "minute" => Ok(1),
        "hour" => Ok(60),
        "day" => Ok(1440),
        _ => Err(anyhow!(
            "Unsupported timespan provided for Kraken data: {}",
            timespan
        )),
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

/// Parses a Kraken OHLC payload into `(timestamp, close)` bars in chronological order.
///
/// The pair key Kraken answers with can differ from the requested one
/// (`ETHUSD` comes back as `XETHZUSD`), so a lone series is accepted as well.
pub fn parse_ohlc(body: &str, pair: &str) -> Result<Vec<(NaiveDateTime, f64)>> {
    let response: KrakenApiResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Failed to deserialize Kraken response: {}", e))?;

    if !response.error.is_empty() {
        return Err(anyhow!(
            "Kraken returned errors: {}",
            response.error.join(", ")
        ));
    }

    let result = response
        .result
        .ok_or_else(|| anyhow!("Kraken response has no result"))?;

    let rows = result
        .ohlc
        .get(pair)
        .or_else(|| match result.ohlc.len() {
            1 => result.ohlc.values().next(),
            _ => None,
        })
        .ok_or_else(|| anyhow!("No OHLC data found for pair {}", pair))?;

    // Each row is [time, open, high, low, close, vwap, volume, count]
    let mut bars: Vec<(NaiveDateTime, f64)> = rows
        .iter()
        .filter_map(|row| {
            if row.len() < 5 {
                return None;
            }
            let timestamp = value_as_i64(&row[0])?;
            let datetime = Utc.timestamp_opt(timestamp, 0).single()?.naive_utc();
            let close = value_as_f64(&row[4])?;
            Some((datetime, close))
        })
        .collect();

    bars.sort_by_key(|&(datetime, _)| datetime);
    debug!("Parsed {} Kraken bars for {}", bars.len(), pair);

    Ok(bars)
}

/// Fetches OHLC bars for `pair` from the public Kraken endpoint.
pub async fn get_kraken_prices(
    pair: &str,
    timespan: &str,
    request_timeout: Duration,
) -> Result<Vec<(NaiveDateTime, f64)>> {
    let interval = interval_minutes(timespan)?;

    let url = format!(
        "https://api.kraken.com/0/public/OHLC?pair={}&interval={}",
        pair, interval
    );
    debug!("Constructed Kraken URL: {}", url);

    let client = Client::new();
    let response = timeout(request_timeout, client.get(&url).send()).await;

    match response {
        Ok(Ok(response)) => {
            if response.status() != StatusCode::OK {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                error!(
                    "Request failed with status: {} and body: {}",
                    status, error_text
                );
                return Err(anyhow!("Kraken request failed with status {}", status));
            }

            let body = response.text().await?;
            parse_ohlc(&body, pair)
        }
        Ok(Err(e)) => {
            error!("Error sending request to Kraken: {}", e);
            Err(anyhow!("Error sending request to Kraken: {}", e))
        }
        Err(_) => {
            error!("Timeout occurred while trying to fetch data from Kraken");
            Err(anyhow!(
                "Timeout occurred while trying to fetch data from Kraken"
            ))
        }
    }
}
