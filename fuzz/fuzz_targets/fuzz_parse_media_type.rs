#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio_formdata::media_type::{parse_disposition, parse_media_type};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_media_type(s);
        let _ = parse_disposition(s);
    }
});
