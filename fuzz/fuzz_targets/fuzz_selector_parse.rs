#![no_main]

use libfuzzer_sys::fuzz_target;
use trellis_core::dom::Document;
use trellis_core::selector::Selector;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(selector) = Selector::parse(input) else {
        return;
    };
    let mut doc = Document::new();
    let a = doc.build("div").class("a b").attr("data-x", "1").append_to_body();
    doc.build("a").attr("href", "#top").attr("id", "top").append_to(a);
    let body = doc.body();
    let _ = doc.select(body, &selector);
});
