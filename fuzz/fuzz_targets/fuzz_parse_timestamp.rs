#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // A canonical form that parses back must describe the same value
    if let Ok(parsed) = energymuffin::time::ApiDateTime::parse(raw) {
        let iso = parsed.to_iso();
        if let Ok(again) = energymuffin::time::ApiDateTime::parse(&iso) {
            assert_eq!(again, parsed);
        }
    }
});
