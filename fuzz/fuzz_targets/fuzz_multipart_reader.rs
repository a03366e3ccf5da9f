#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tokio::runtime::Builder;
use tokio_formdata::multipart::Reader;

fuzz_target!(|data: &[u8]| {
    let rt = Builder::new_current_thread().build().unwrap();

    rt.block_on(async {
        let mut reader = Reader::new(Cursor::new(data), "boundary");

        // bounded so malformed input cannot loop forever
        for _ in 0..100 {
            match reader.next_part().await {
                Ok(Some(part)) => {
                    let _ = part.form_name();
                    let _ = part.file_name();
                    let _ = part.content_type();
                }
                Ok(None) | Err(_) => break,
            }
        }
    });
});
