//! Instruments sub-client.

use super::{catalog, InstrumentListing, ListingOrigin};
use crate::client::MarketDataClient;

pub struct Instruments<'a> {
    pub(crate) client: &'a MarketDataClient,
}

impl<'a> Instruments<'a> {
    /// Remote listing, or the static catalog with the failure attached.
    pub async fn list(&self) -> InstrumentListing {
        match self.client.http.get_instruments().await {
            Ok(resp) => InstrumentListing {
                instruments: resp.into_instruments(),
                origin: ListingOrigin::Remote,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Instrument listing unavailable, using catalog: {}", e);
                InstrumentListing {
                    instruments: catalog(),
                    origin: ListingOrigin::Catalog,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
