// WASM API tests; run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use rhythm_tokenizer_wasm::api::{decode_tokens, encode_composition, encode_payload, RhythmSession};

wasm_bindgen_test_configure!(run_in_browser);

fn array_to_strings(array: js_sys::Array) -> Vec<String> {
    array.iter().filter_map(|v| v.as_string()).collect()
}

fn config_json(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

#[wasm_bindgen_test]
fn test_session_submit_clears_composition() {
    let mut session = RhythmSession::new(config_json(r#"{"nBeats": 1, "snap": "1/4"}"#)).unwrap();
    session.toggle_marker(0.0, "D").unwrap();
    session.toggle_marker(0.26, "PA2").unwrap();
    assert_eq!(session.append_cycle().unwrap(), 0);
    assert_eq!(session.cycle_count(), 1);

    let tokens = array_to_strings(session.submit().unwrap());
    assert_eq!(
        tokens.join(" "),
        "<SOC> <SOB> SUBD_4 POS_0 HIT_D POS_1 HIT_PA2 POS_2 HIT_S POS_3 HIT_S <EOB> <EOC>"
    );
    assert_eq!(session.cycle_count(), 0);
    assert!(session.submit().is_err());
}

#[wasm_bindgen_test]
fn test_session_rejects_unknown_sound() {
    let mut session = RhythmSession::new(JsValue::UNDEFINED).unwrap();
    assert_eq!(session.n_beats(), 4);
    assert!(session.toggle_marker(0.0, "cowbell").is_err());
}

#[wasm_bindgen_test]
fn test_append_without_markers_fails() {
    let mut session = RhythmSession::new(JsValue::NULL).unwrap();
    assert!(session.append_cycle().is_err());
}

#[wasm_bindgen_test]
fn test_encode_front_end_composition() {
    let composition = config_json(
        r#"[{"id": 0, "markers": [{"beat": "0", "sound": "Doom"}, {"beat": "3/2", "sound": "Pa2"}]}]"#,
    );
    let config = config_json(r#"{"nBeats": 2, "snap": "1/2"}"#);
    let tokens = array_to_strings(encode_composition(composition, config).unwrap());
    assert_eq!(tokens.first().map(String::as_str), Some("<SOC>"));
    assert!(tokens.join(" ").contains("<SOB> SUBD_2 POS_0 HIT_S POS_1 HIT_PA2 <EOB>"));
}

#[wasm_bindgen_test]
fn test_encode_payload_shape() {
    let composition = config_json(r#"[{"hits": [{"beat": 0, "sound": "Open Tak"}]}]"#);
    let payload = encode_payload(composition, config_json(r#"{"nBeats": 1}"#)).unwrap();
    assert!(payload.starts_with(r#"{"tokens":["<SOC>","<SOB>","SUBD_4","POS_0","HIT_OTA""#));
}

#[wasm_bindgen_test]
fn test_decode_rejects_unknown_token() {
    let tokens = config_json(r#"["<SOC>", "<SOB>", "SUBD_1", "POS_0", "HIT_Q", "<EOB>", "<EOC>"]"#);
    assert!(decode_tokens(tokens, 1).is_err());
}
