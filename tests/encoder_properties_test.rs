// Properties of the token emitter over whole compositions

use rhythm_tokenizer_wasm::models::{Beat, Composition, HitEvent, Sound, TokenizerConfig};
use rhythm_tokenizer_wasm::tokenizer::{encode, SubdivisionPolicy, Token};
use rhythm_tokenizer_wasm::TokenizerError;

/// Helper to build a hit from a fraction
fn hit(numer: i64, denom: i64, sound: Sound) -> HitEvent {
    HitEvent::new(Beat::new(numer, denom), sound)
}

/// Helper to build a composition from per-cycle hit lists
fn composition(cycles: Vec<Vec<HitEvent>>) -> Composition {
    let mut comp = Composition::new();
    for hits in cycles {
        comp.append_cycle(hits);
    }
    comp
}

/// Helper to encode with default snap and legacy policy
fn encode_str(n_beats: u32, comp: &Composition) -> String {
    let config = TokenizerConfig::new(n_beats, Beat::new(1, 4));
    encode(comp, &config).expect("encoding should succeed").to_string()
}

/// Split a single-cycle stream into per-beat token slices (between <SOB> and <EOB>)
fn beats(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut out = Vec::new();
    let mut current: Option<Vec<Token>> = None;
    for token in tokens {
        match token {
            Token::StartOfBeat => current = Some(Vec::new()),
            Token::EndOfBeat => out.extend(current.take()),
            other => {
                if let Some(beat) = current.as_mut() {
                    beat.push(*other);
                }
            }
        }
    }
    out
}

#[test]
fn test_encode_is_deterministic() {
    let comp = composition(vec![
        vec![hit(3, 2, Sound::Pa2), hit(0, 1, Sound::Doom), hit(1, 4, Sound::OpenTak)],
        vec![hit(5, 2, Sound::OpenTik)],
    ]);
    let config = TokenizerConfig::new(4, Beat::new(1, 4));

    let first = encode(&comp, &config).unwrap();
    let second = encode(&comp.clone(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_every_cycle_has_n_beats_with_leading_subdivision() {
    let comp = composition(vec![
        vec![hit(0, 1, Sound::Doom)],
        vec![],
        vec![hit(1, 8, Sound::Pa2), hit(11, 4, Sound::OpenTak)],
    ]);
    let config = TokenizerConfig::new(3, Beat::new(1, 8));
    let tokens = encode(&comp, &config).unwrap().into_inner();

    let cycles = tokens.iter().filter(|t| **t == Token::StartOfCycle).count();
    assert_eq!(cycles, 3);
    assert_eq!(tokens.iter().filter(|t| **t == Token::EndOfCycle).count(), 3);
    assert_eq!(tokens.iter().filter(|t| **t == Token::StartOfBeat).count(), 9);
    assert_eq!(tokens.iter().filter(|t| **t == Token::EndOfBeat).count(), 9);

    for (i, token) in tokens.iter().enumerate() {
        if *token == Token::StartOfBeat {
            assert!(
                matches!(tokens[i + 1], Token::Subdivision(_)),
                "token after <SOB> at {} is {}",
                i,
                tokens[i + 1]
            );
        }
    }
}

#[test]
fn test_positions_match_subdivision() {
    let comp = composition(vec![vec![
        hit(0, 1, Sound::Doom),
        hit(1, 8, Sound::OpenTik),
        hit(3, 2, Sound::Pa2),
    ]]);
    let config = TokenizerConfig::new(2, Beat::new(1, 8));
    let tokens = encode(&comp, &config).unwrap().into_inner();

    for beat in beats(&tokens) {
        let subdivision = match beat[0] {
            Token::Subdivision(n) => n,
            other => panic!("beat starts with {}", other),
        };
        let positions: Vec<u32> = beat
            .iter()
            .filter_map(|t| match t {
                Token::Position(l) => Some(*l),
                _ => None,
            })
            .collect();
        assert_eq!(positions, (0..subdivision).collect::<Vec<_>>());
    }
}

#[test]
fn test_empty_beats_are_four_silent_positions() {
    let comp = composition(vec![vec![]]);
    assert_eq!(
        encode_str(2, &comp),
        "<SOC> \
         <SOB> SUBD_4 POS_0 HIT_S POS_1 HIT_S POS_2 HIT_S POS_3 HIT_S <EOB> \
         <SOB> SUBD_4 POS_0 HIT_S POS_1 HIT_S POS_2 HIT_S POS_3 HIT_S <EOB> \
         <EOC>"
    );
}

#[test]
fn test_single_hit_at_half_beat() {
    let comp = composition(vec![vec![hit(5, 2, Sound::OpenTak)]]);
    let tokens = encode_str(4, &comp);
    assert!(
        tokens.contains("<SOB> SUBD_2 POS_0 HIT_S POS_1 HIT_OTA <EOB>"),
        "{}",
        tokens
    );
}

#[test]
fn test_two_hits_a_quarter_apart() {
    let comp = composition(vec![vec![hit(1, 4, Sound::Pa2), hit(0, 1, Sound::Doom)]]);
    assert_eq!(
        encode_str(1, &comp),
        "<SOC> <SOB> SUBD_4 POS_0 HIT_D POS_1 HIT_PA2 POS_2 HIT_S POS_3 HIT_S <EOB> <EOC>"
    );
}

#[test]
fn test_full_cycle_scenario() {
    // Beat 0: one hit on the downbeat → 4 positions
    // Beat 1: one hit at offset 1/2 → 2 positions
    let comp = composition(vec![vec![hit(0, 1, Sound::Doom), hit(3, 2, Sound::Pa2)]]);
    let config = TokenizerConfig::new(2, Beat::new(1, 2));
    let tokens = encode(&comp, &config).unwrap();
    assert_eq!(
        tokens.to_string(),
        "<SOC> \
         <SOB> SUBD_4 POS_0 HIT_D POS_1 HIT_S POS_2 HIT_S POS_3 HIT_S <EOB> \
         <SOB> SUBD_2 POS_0 HIT_S POS_1 HIT_PA2 <EOB> \
         <EOC>"
    );
}

#[test]
fn test_cycles_are_emitted_in_order() {
    let comp = composition(vec![vec![hit(0, 1, Sound::Doom)], vec![hit(0, 1, Sound::OpenTik)]]);
    let tokens = encode_str(1, &comp);
    let doom = tokens.find("HIT_D").unwrap();
    let tik = tokens.find("HIT_OTI").unwrap();
    assert!(doom < tik);
}

#[test]
fn test_empty_composition_fails() {
    let config = TokenizerConfig::default();
    assert_eq!(
        encode(&Composition::new(), &config),
        Err(TokenizerError::EmptyComposition)
    );
}

#[test]
fn test_hit_on_cycle_boundary_fails() {
    let comp = composition(vec![vec![hit(4, 1, Sound::Doom)]]);
    let config = TokenizerConfig::new(4, Beat::new(1, 4));
    assert_eq!(
        encode(&comp, &config),
        Err(TokenizerError::InvalidBeat {
            beat: Beat::from_integer(4),
            n_beats: 4
        })
    );
}

#[test]
fn test_negative_beat_fails() {
    let comp = composition(vec![vec![hit(-1, 4, Sound::Doom)]]);
    let config = TokenizerConfig::new(4, Beat::new(1, 4));
    assert!(matches!(
        encode(&comp, &config),
        Err(TokenizerError::InvalidBeat { .. })
    ));
}

#[test]
fn test_fine_json_beat_is_an_error_not_a_panic() {
    // A fraction just over one half with a 62-bit denominator, as a front-end could send it
    let json = r#"[{"id": 0, "hits": [{"beat": "2305843009213693952/4611686018427387903", "sound": "Doom"}]}]"#;
    let comp: Composition = serde_json::from_str(json).unwrap();

    let grid = TokenizerConfig::new(1, Beat::new(1, 4)).with_policy(SubdivisionPolicy::Grid);
    assert!(matches!(
        encode(&comp, &grid),
        Err(TokenizerError::Unrepresentable { beat_index: 0, .. })
    ));

    // Legacy truncates 1 / offset (just under 2) to a single position
    let legacy = TokenizerConfig::new(1, Beat::new(1, 4));
    assert_eq!(
        encode(&comp, &legacy).unwrap().to_string(),
        "<SOC> <SOB> SUBD_1 POS_0 HIT_S <EOB> <EOC>"
    );
}

#[test]
fn test_legacy_stream_length_is_bounded() {
    let comp = composition(vec![vec![hit(0, 1, Sound::Doom), hit(1, 1 << 31, Sound::Pa2)]]);
    assert!(matches!(
        encode(&comp, &TokenizerConfig::new(1, Beat::new(1, 4))),
        Err(TokenizerError::SubdivisionTooFine { required, .. }) if required == 1 << 31
    ));

    // The finest accepted beat: 64 positions
    let comp = composition(vec![vec![hit(0, 1, Sound::Doom), hit(1, 64, Sound::Pa2)]]);
    let tokens = encode(&comp, &TokenizerConfig::new(1, Beat::new(1, 4))).unwrap();
    assert_eq!(tokens.len(), 2 + 3 + 2 * 64);
}
