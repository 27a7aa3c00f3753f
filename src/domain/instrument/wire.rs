//! Wire types for the `/instruments` endpoint.

use super::InstrumentInfo;
use serde::Deserialize;

/// Providers either wrap the list or return it bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InstrumentsResponse {
    Wrapped { instruments: Vec<InstrumentInfo> },
    Bare(Vec<InstrumentInfo>),
}

impl InstrumentsResponse {
    pub fn into_instruments(self) -> Vec<InstrumentInfo> {
        match self {
            Self::Wrapped { instruments } | Self::Bare(instruments) => instruments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_shapes() {
        let wrapped: InstrumentsResponse = serde_json::from_str(
            r#"{"instruments":[{"symbol":"SPY","name":"S&P 500 ETF","category":"Traditional"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_instruments()[0].symbol, "SPY");

        let bare: InstrumentsResponse =
            serde_json::from_str(r#"[{"symbol":"QQQ","name":"Nasdaq ETF","category":"Traditional"}]"#).unwrap();
        assert_eq!(bare.into_instruments()[0].symbol, "QQQ");
    }
}
