//! Advertisement payload construction.

use amber_proto::{AlertRecord, MANUFACTURER_ID, SERVICE_UUID, pack_metadata};

/// The out-of-band advertisement registered with the peripheral host.
///
/// The manufacturer-data slot carries the 9-byte metadata summary; scanning
/// clients use it to detect freshness without connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Local device name shown to scanners.
    pub local_name: String,
    /// Advertised service UUIDs.
    pub service_uuids: Vec<String>,
    /// Manufacturer-data company identifier.
    pub manufacturer_id: u16,
    /// Packed metadata summary.
    pub manufacturer_data: Vec<u8>,
}

impl Advertisement {
    /// Build the advertisement for `record`.
    ///
    /// The metadata summary is recomputed on every call rather than cached:
    /// whatever record is current at registration time is what goes on the
    /// air.
    pub fn for_record(record: &AlertRecord, local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            service_uuids: vec![SERVICE_UUID.to_string()],
            manufacturer_id: MANUFACTURER_ID,
            manufacturer_data: pack_metadata(
                &record.alert_id,
                record.severity.as_str(),
                record.fetched_at,
            )
            .to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amber_proto::{METADATA_LEN, Severity, legacy_string_hash};

    fn record() -> AlertRecord {
        AlertRecord::builder()
            .alert_id("abc12345")
            .headline("Flood warning")
            .severity(Severity::Severe)
            .expires(1735689600)
            .instructions("Take shelter")
            .source_url("https://example.com")
            .verified(true)
            .fetched_at(1735680000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_advertisement_carries_packed_summary() {
        let adv = Advertisement::for_record(&record(), "Amber");
        assert_eq!(adv.local_name, "Amber");
        assert_eq!(adv.service_uuids, vec![SERVICE_UUID.to_string()]);
        assert_eq!(adv.manufacturer_id, MANUFACTURER_ID);
        assert_eq!(adv.manufacturer_data.len(), METADATA_LEN);
        assert_eq!(adv.manufacturer_data[0], 3);
        assert_eq!(
            adv.manufacturer_data[1..5],
            (legacy_string_hash("abc12345") as u32).to_le_bytes()
        );
    }

    #[test]
    fn test_advertisement_tracks_record_freshness() {
        let mut rec = record();
        let before = Advertisement::for_record(&rec, "Amber");
        rec.fetched_at += 60;
        let after = Advertisement::for_record(&rec, "Amber");
        assert_ne!(before.manufacturer_data, after.manufacturer_data);
    }
}
