//! Venue configuration.

use serde::Deserialize;

/// Settings of the venue the matcher trades on.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Market contract address, 0x-prefixed hex.
    #[serde(default)]
    pub market: String,
    /// Use the test network.
    #[serde(default)]
    pub testnet: bool,
    /// Path of a YAML snapshot served by the paper venue.
    pub snapshot: Option<String>,
}

impl VenueConfig {
    /// Length of a market address in bytes.
    pub const ADDRESS_LEN: usize = 20;

    /// Checks that `market` is a 0x-prefixed 20-byte hex address.
    pub fn validate_market(&self) -> Result<(), String> {
        let digits = self
            .market
            .strip_prefix("0x")
            .or_else(|| self.market.strip_prefix("0X"))
            .ok_or_else(|| format!("venue.market must start with 0x: {:?}", self.market))?;

        let bytes = hex::decode(digits).map_err(|e| format!("venue.market is not hex: {}", e))?;
        if bytes.len() != Self::ADDRESS_LEN {
            return Err(format!(
                "venue.market must be {} bytes, got {}",
                Self::ADDRESS_LEN,
                bytes.len()
            ));
        }

        Ok(())
    }
}
