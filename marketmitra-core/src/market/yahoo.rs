//! Yahoo Finance price source.
//!
//! Fetches daily bars from Yahoo's v8 chart API with a blocking client.
//! Handles retries with exponential backoff for rate limits, server errors
//! and connect/timeout failures, and maps "no such symbol" to an empty series.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV and synthetic sources are the fallbacks when it is down.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::provider::{DataError, PriceBar, PriceSource};
use crate::coerce::parse_number;
use crate::window::DateWindow;

/// Connection settings for the Yahoo source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 500,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

/// Quote columns are kept loose: nulls, numbers and the occasional numeric
/// string all appear in the wild.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Value>,
    high: Vec<Value>,
    low: Vec<Value>,
    close: Vec<Value>,
}

/// Yahoo Finance price source.
#[derive(Debug)]
pub struct YahooSource {
    client: reqwest::blocking::Client,
    config: YahooConfig,
}

impl YahooSource {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Build the chart API URL for a symbol and window.
    ///
    /// `period2` is exclusive on Yahoo's side, so an inclusive window asks
    /// for one extra day; bars are filtered against the window afterwards.
    fn chart_url(&self, symbol: &str, window: &DateWindow) -> Result<reqwest::Url, DataError> {
        let mut url = reqwest::Url::parse(&self.config.base_url).map_err(|e| {
            DataError::Other(format!("invalid base URL '{}': {e}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other(format!("base URL '{}' cannot have a path", self.config.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        let period_end = if window.end_inclusive {
            window
                .end
                .checked_add_signed(ChronoDuration::days(1))
                .ok_or_else(|| DataError::InvalidWindow(window.label()))?
        } else {
            window.end
        };
        url.query_pairs_mut()
            .append_pair("period1", &midnight_utc(window.start).to_string())
            .append_pair("period2", &midnight_utc(period_end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }

    /// Parse the chart API response into bars inside the window.
    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
        window: &DateWindow,
    ) -> Result<Vec<PriceBar>, DataError> {
        let Some(results) = resp.chart.result else {
            return match resp.chart.error {
                Some(err) if err.code == "Not Found" => {
                    tracing::debug!(symbol, "yahoo reports symbol not found");
                    Ok(Vec::new())
                }
                Some(err) => Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                ))),
                None => Ok(Vec::new()),
            };
        };

        let Some(data) = results.into_iter().next() else {
            return Ok(Vec::new());
        };

        // No timestamps means no trading days in range.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp {ts} for {symbol}"))
                })?;

            // Holidays and halted sessions come back as nulls.
            let Some(close) = quote.close.get(i).and_then(parse_number) else {
                continue;
            };
            if !window.contains(date) {
                continue;
            }

            let pick = |series: &[Value]| series.get(i).and_then(parse_number).unwrap_or(close);
            bars.push(PriceBar {
                date,
                open: pick(&quote.open),
                high: pick(&quote.high),
                low: pick(&quote.low),
                close,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Execute the request, retrying transient failures.
    fn fetch_with_retry(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        let url = self.chart_url(symbol, window)?;
        let base_delay = Duration::from_millis(self.config.retry_base_delay_ms);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, "retrying yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(url.clone()).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        tracing::debug!(symbol, "yahoo returned 404");
                        return Ok(Vec::new());
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(DataError::HttpStatus {
                            symbol: symbol.to_string(),
                            status: status.as_u16(),
                        });
                        continue;
                    }

                    if !status.is_success() {
                        return Err(DataError::HttpStatus {
                            symbol: symbol.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;
                    return Self::parse_response(symbol, chart, window);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        if !window.is_valid() {
            return Err(DataError::InvalidWindow(window.label()));
        }
        self.fetch_with_retry(symbol, window)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn window() -> DateWindow {
        DateWindow::default_post_budget()
    }

    fn parse(json: &str) -> Result<Vec<PriceBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooSource::parse_response("^CNXIT", resp, &window())
    }

    #[test]
    fn chart_url_has_symbol_and_epoch_bounds() {
        let source = YahooSource::new(YahooConfig::default()).unwrap();
        let url = source.chart_url("^CNXIT", &window()).unwrap();
        assert!(url.path().starts_with("/v8/finance/chart/"));
        assert!(url.path().ends_with("CNXIT"));
        let query = url.query().unwrap();
        assert!(query.contains("period1=1704067200"));
        assert!(query.contains("period2=1719705600"));
        assert!(query.contains("interval=1d"));
    }

    #[test]
    fn inclusive_window_requests_one_more_day() {
        let source = YahooSource::new(YahooConfig::default()).unwrap();
        let mut w = window();
        w.end_inclusive = true;
        let url = source.chart_url("^CNXIT", &w).unwrap();
        assert!(url.query().unwrap().contains("period2=1719792000"));
    }

    #[test]
    fn parses_bars_and_skips_null_closes() {
        // 2024-01-02, 2024-01-03, 2024-01-04 at 09:15 IST
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":19800},
            "timestamp":[1704167100,1704253500,1704339900],
            "indicators":{"quote":[{
                "open":[100.0,null,103.0],
                "high":[101.0,null,104.0],
                "low":[99.0,null,102.0],
                "close":[100.5,null,103.5]
            }]}
        }],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[1].open, 103.0);
    }

    #[test]
    fn string_and_nan_quotes_are_coerced() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704167100,1704253500,1704339900],
            "indicators":{"quote":[{
                "open":["99.5",null,null],
                "close":["100.5","NaN",102.0]
            }]}
        }],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[0].open, 99.5);
        assert_eq!(bars[1].close, 102.0);
        assert_eq!(bars[1].open, 102.0);
    }

    #[test]
    fn not_found_is_an_empty_series() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn missing_timestamps_is_an_empty_series() {
        let json = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn other_api_errors_are_reported() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(parse(json), Err(DataError::ResponseFormatChanged(_))));
    }

    #[test]
    fn bars_outside_window_are_dropped() {
        // 2023-12-29 and 2024-01-02
        let json = r#"{"chart":{"result":[{
            "timestamp":[1703842200,1704186000],
            "indicators":{"quote":[{"close":[90.0,95.0]}]}
        }],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 95.0);
        assert_eq!(bars[0].open, 95.0);
    }

    #[test]
    fn invalid_window_is_rejected_before_any_request() {
        let source = YahooSource::new(YahooConfig::default()).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let w = DateWindow::new(d, d, false);
        assert!(matches!(
            source.fetch("^CNXIT", &w),
            Err(DataError::InvalidWindow(_))
        ));
    }

    #[test]
    fn window_ending_at_the_last_date_is_rejected() {
        let source = YahooSource::new(YahooConfig::default()).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let w = DateWindow::new(start, NaiveDate::MAX, true);
        assert!(matches!(
            source.chart_url("^CNXIT", &w),
            Err(DataError::InvalidWindow(_))
        ));
    }

    /// Serve one canned HTTP response per connection, in order. The handle
    /// yields the number of requests answered.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut served = 0;
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let reply = format!(
                    "HTTP/1.1 {status} Canned\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
                served += 1;
            }
            served
        });
        (format!("http://{addr}"), handle)
    }

    fn local_source(base_url: String) -> YahooSource {
        YahooSource::new(YahooConfig {
            base_url,
            timeout_secs: 5,
            max_retries: 2,
            retry_base_delay_ms: 1,
            ..YahooConfig::default()
        })
        .unwrap()
    }

    const CHART: &str = r#"{"chart":{"result":[{"timestamp":[1704167100,1704253500],"indicators":{"quote":[{"close":[100.0,110.0]}]}}],"error":null}}"#;

    #[test]
    fn http_404_is_an_empty_series() {
        let (url, server) = serve(vec![(404, "")]);
        let bars = local_source(url).fetch("^CNXIT", &window()).unwrap();
        assert!(bars.is_empty());
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn server_error_is_retried_until_success() {
        let (url, server) = serve(vec![(500, ""), (503, ""), (200, CHART)]);
        let bars = local_source(url).fetch("^CNXIT", &window()).unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![100.0, 110.0]);
        assert_eq!(server.join().unwrap(), 3);
    }

    #[test]
    fn persistent_server_error_gives_up_after_retries() {
        let (url, server) = serve(vec![(503, ""), (503, ""), (503, "")]);
        let err = local_source(url).fetch("^CNXIT", &window()).unwrap_err();
        assert!(matches!(err, DataError::HttpStatus { status: 503, .. }));
        assert_eq!(server.join().unwrap(), 3);
    }

    #[test]
    fn rate_limit_is_retried_then_reported() {
        let (url, server) = serve(vec![(429, ""), (429, ""), (429, "")]);
        let err = local_source(url).fetch("^CNXIT", &window()).unwrap_err();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 60 }));
        assert_eq!(server.join().unwrap(), 3);
    }

    #[test]
    fn client_error_is_not_retried() {
        let (url, server) = serve(vec![(400, "")]);
        let err = local_source(url).fetch("^CNXIT", &window()).unwrap_err();
        match err {
            DataError::HttpStatus { symbol, status } => {
                assert_eq!(symbol, "^CNXIT");
                assert_eq!(status, 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn garbled_body_is_a_format_change() {
        let (url, server) = serve(vec![(200, "<html>consent</html>")]);
        let err = local_source(url).fetch("^CNXIT", &window()).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
        assert_eq!(server.join().unwrap(), 1);
    }
}
