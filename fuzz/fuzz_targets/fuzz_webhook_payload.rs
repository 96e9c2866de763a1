#![no_main]

use libfuzzer_sys::fuzz_target;
use chatrelay::fuzz_api::decode_webhook_payload;

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = decode_webhook_payload(data) {
        let _ = payload.is_page();
        for event in payload.entry.iter().flat_map(|e| e.messaging.iter()) {
            if let Some(classified) = event.classify() {
                let _ = classified.placeholder();
            }
            let _ = event.sent_at();
        }
    }
});
