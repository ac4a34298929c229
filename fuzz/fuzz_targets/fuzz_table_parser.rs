#![no_main]

use geo_feature_placer::table::{parse_bytes, ColumnLayout};
use geo_feature_placer::PlacementError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse_bytes(data, ColumnLayout::BUILDINGS) {
        Ok(records) => {
            for record in &records {
                assert!(record.offset_x.is_finite());
                assert!(record.offset_y.is_finite());
                assert!(record.height.is_finite());
            }
        }
        Err(PlacementError::Format { column, .. }) => {
            if let Some(column) = column {
                assert!(column < 3);
            }
        }
        Err(other) => panic!("unerwarteter Fehler: {other}"),
    }
});
