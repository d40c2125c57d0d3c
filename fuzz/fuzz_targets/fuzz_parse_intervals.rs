#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Any body must yield a table or a typed error, never a panic
    if let Ok(table) = energymuffin::forecast::parse_intervals(raw) {
        let rows = table.rows().count();
        assert_eq!(rows, table.len());
        let tariff = energymuffin::forecast::TariffSchedule::default();
        if let Ok(costs) = tariff.apply(&table) {
            assert_eq!(costs.len(), rows);
        }
    }
});
