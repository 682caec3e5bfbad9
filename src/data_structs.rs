use serde::{Deserialize, Serialize};

use crate::config::Upstream;

/// First value of `key` in a decoded query string. Later repeats are ignored.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Query string of `/history`. Timestamps stay raw so parse failures can be
/// reported instead of silently becoming zero.
#[derive(Debug)]
pub struct HistoryQuery {
    pub symbol: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub resolution: String,
}

impl HistoryQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            symbol: first_value(pairs, "symbol").unwrap_or_default().to_string(),
            from: first_value(pairs, "from").map(str::to_string),
            to: first_value(pairs, "to").map(str::to_string),
            resolution: first_value(pairs, "resolution").unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct SymbolQuery {
    pub symbol: String,
}

impl SymbolQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            symbol: first_value(pairs, "symbol").unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UdfConfig {
    pub supports_search: bool,
    pub supports_group_request: bool,
    pub supports_marks: bool,
    pub supported_resolutions: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SymbolInfo {
    pub s: &'static str,
    pub name: String,
    pub timezone: &'static str,
    pub minmov: u32,
    pub pricescale: u32,
    pub pointvalue: u32,
    pub has_intraday: bool,
    pub has_daily: bool,
    #[serde(rename = "has-weekly-and-monthly")]
    pub has_weekly_and_monthly: bool,
    #[serde(rename = "has-no-volume")]
    pub has_no_volume: bool,
    pub ticker: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data_status: &'static str,
    #[serde(rename = "supported-resolutions")]
    pub supported_resolutions: &'static [&'static str],
    pub intraday_multipliers: &'static [&'static str],
    #[serde(rename = "session-regular")]
    pub session_regular: &'static str,
    #[serde(rename = "has-fractional-volume")]
    pub has_fractional_volume: bool,
}

/// Column-oriented OHLCV series; index `i` of every array is one bar.
#[derive(Debug, Serialize)]
pub struct HistoryBars {
    pub s: &'static str,
    pub t: Vec<i64>,
    pub c: Vec<f64>,
    pub o: Vec<f64>,
    pub h: Vec<f64>,
    pub l: Vec<f64>,
    pub v: Vec<f64>,
}

impl HistoryBars {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            s: "ok",
            t: Vec::with_capacity(n),
            c: Vec::with_capacity(n),
            o: Vec::with_capacity(n),
            h: Vec::with_capacity(n),
            l: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// One daily bar as the nested-JSON exchange reports it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HuobiKline {
    pub id: i64,
    pub amount: f64,
    pub count: i64,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    pub vol: f64,
}

#[derive(Debug, Deserialize)]
pub struct HuobiEnvelope {
    pub status: String,
    #[serde(default)]
    pub ch: Option<String>,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub data: Option<Vec<HuobiKline>>,
    #[serde(rename = "err-code", default)]
    pub err_code: Option<String>,
    #[serde(rename = "err-msg", default)]
    pub err_msg: Option<String>,
}

/// Upstream envelope passed back to the chart, bars unchanged.
#[derive(Debug, Serialize)]
pub struct HuobiHistory {
    pub s: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    pub data: Vec<HuobiKline>,
}

pub const ZG_CONFIG_RESOLUTIONS: [&str; 4] = ["30", "60", "240", "D"];
pub const ZG_SYMBOL_RESOLUTIONS: [&str; 9] = ["5", "10", "15", "30", "60", "120", "240", "D", "W"];
pub const ZG_INTRADAY_MULTIPLIERS: [&str; 7] = ["1", "5", "15", "30", "60", "D", "W"];
pub const DAILY_ONLY: [&str; 1] = ["D"];

pub fn udf_config(upstream: Upstream) -> UdfConfig {
    let supported_resolutions: &'static [&'static str] = match upstream {
        Upstream::Zg => &ZG_CONFIG_RESOLUTIONS,
        Upstream::Huobi => &DAILY_ONLY,
    };
    UdfConfig {
        supports_search: true,
        supports_group_request: false,
        supports_marks: false,
        supported_resolutions,
    }
}

/// Static metadata template with the requested symbol echoed into the name fields.
pub fn symbol_info(upstream: Upstream, symbol: &str) -> SymbolInfo {
    let (pricescale, has_intraday, supported_resolutions, intraday_multipliers): (
        u32,
        bool,
        &'static [&'static str],
        &'static [&'static str],
    ) = match upstream {
        Upstream::Zg => (1000, true, &ZG_SYMBOL_RESOLUTIONS, &ZG_INTRADAY_MULTIPLIERS),
        Upstream::Huobi => (100, false, &DAILY_ONLY, &DAILY_ONLY),
    };

    SymbolInfo {
        s: "ok",
        name: symbol.to_string(),
        timezone: "Asia/Shanghai",
        minmov: 1,
        pricescale,
        pointvalue: 1,
        has_intraday,
        has_daily: true,
        has_weekly_and_monthly: true,
        has_no_volume: false,
        ticker: symbol.to_string(),
        description: symbol.to_string(),
        kind: "bitcoin",
        data_status: "streaming",
        supported_resolutions,
        intraday_multipliers,
        session_regular: "24x7",
        has_fractional_volume: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_keys_take_the_first_value() {
        let q = HistoryQuery::from_pairs(&pairs(&[
            ("symbol", "A"),
            ("from", "10"),
            ("symbol", "B"),
            ("from", "20"),
            ("resolution", "D"),
        ]));
        assert_eq!(q.symbol, "A");
        assert_eq!(q.from.as_deref(), Some("10"));
        assert_eq!(q.to, None);
        assert_eq!(q.resolution, "D");

        let q = SymbolQuery::from_pairs(&pairs(&[("symbol", "A"), ("symbol", "B")]));
        assert_eq!(q.symbol, "A");

        let q = SymbolQuery::from_pairs(&[]);
        assert!(q.symbol.is_empty());
    }

    #[test]
    fn symbol_is_echoed_into_name_fields() {
        let info = serde_json::to_value(symbol_info(Upstream::Zg, "BTCUSD")).unwrap();
        assert_eq!(info["name"], "BTCUSD");
        assert_eq!(info["ticker"], "BTCUSD");
        assert_eq!(info["description"], "BTCUSD");
        assert_eq!(info["s"], "ok");
        assert_eq!(info["timezone"], "Asia/Shanghai");
        assert_eq!(info["pricescale"], 1000);
        assert_eq!(info["type"], "bitcoin");
        assert_eq!(info["session-regular"], "24x7");
        assert_eq!(info["has-weekly-and-monthly"], true);
        assert_eq!(info["intraday_multipliers"], json!(["1", "5", "15", "30", "60", "D", "W"]));
        assert_eq!(
            info["supported-resolutions"],
            json!(["5", "10", "15", "30", "60", "120", "240", "D", "W"])
        );
    }

    #[test]
    fn empty_symbol_gives_empty_names() {
        let info = symbol_info(Upstream::Huobi, "");
        assert!(info.name.is_empty());
        assert!(info.ticker.is_empty());
        assert!(info.description.is_empty());
        assert_eq!(info.supported_resolutions, &["D"]);
    }

    #[test]
    fn config_lists_resolutions_per_upstream() {
        let zg = serde_json::to_value(udf_config(Upstream::Zg)).unwrap();
        assert_eq!(
            zg,
            json!({
                "supports_search": true,
                "supports_group_request": false,
                "supports_marks": false,
                "supported_resolutions": ["30", "60", "240", "D"],
            })
        );

        let huobi = udf_config(Upstream::Huobi);
        assert_eq!(huobi.supported_resolutions, &["D"]);
    }

    #[test]
    fn huobi_error_envelope_decodes() {
        let body = r#"{"status":"error","err-code":"invalid-parameter","err-msg":"invalid symbol","data":null}"#;
        let env: HuobiEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.status, "error");
        assert_eq!(env.err_code.as_deref(), Some("invalid-parameter"));
        assert_eq!(env.err_msg.as_deref(), Some("invalid symbol"));
        assert!(env.data.is_none());
    }
}
