//! Market data sub-client.

use super::convert;
use super::{DailyRecord, QueryDescriptor, Retrieved};
use crate::client::MarketDataClient;
use crate::error::FetchError;

pub struct MarketData<'a> {
    pub(crate) client: &'a MarketDataClient,
}

impl<'a> MarketData<'a> {
    /// One `POST /market-data`, decoded and with derived fields filled in.
    /// A successful empty payload comes back as `Ok(vec![])`.
    pub async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<DailyRecord>, FetchError> {
        Ok(self.retrieve(query).await?.series)
    }

    /// As [`fetch`](Self::fetch), keeping the provider's message when it reported `success: false`.
    pub async fn retrieve(&self, query: &QueryDescriptor) -> Result<Retrieved, FetchError> {
        let resp = self.client.http.post_market_data(query).await?;
        let message = resp.message.filter(|_| resp.success == Some(false));
        if let Some(message) = &message {
            tracing::debug!(instrument = %query.instrument(), "Provider reported: {}", message);
        }
        Ok(Retrieved {
            series: convert::transform(&resp.data),
            message,
        })
    }
}
