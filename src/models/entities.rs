use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Buyer,
    Seller,
    Renter,
    Vendor,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntities {
    pub phone: Option<String>,
    pub price: Option<String>,
    pub address: Option<String>,
    pub time_ask: bool,
    pub source_type: SourceType,
    pub portal: Option<String>,
}

impl ExtractedEntities {
    /// True when any entity a genuine inquiry tends to carry was found.
    pub fn has_context(&self) -> bool {
        self.phone.is_some() || self.price.is_some() || self.address.is_some() || self.time_ask
    }
}
