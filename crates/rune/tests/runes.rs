use proptest::prelude::*;
use strand_rope::{Env, Rope, RopeConfig};
use strand_rune::{RuneError, RuneExt};

const TEXT: &str = "我能吞zuo下da玻si璃而不伤身体";

fn env() -> Env {
    Env::new(RopeConfig::with_max_leaf_bytes(8)).unwrap()
}

#[test]
fn test_decode_mixed_text() {
    let rope = env().from_bytes(TEXT);
    let decoded: Vec<(char, usize)> = rope.runes(0).unwrap().map(|r| r.unwrap()).collect();
    let expected = vec![
        ('我', 3),
        ('能', 3),
        ('吞', 3),
        ('z', 1),
        ('u', 1),
        ('o', 1),
        ('下', 3),
        ('d', 1),
        ('a', 1),
        ('玻', 3),
        ('s', 1),
        ('i', 1),
        ('璃', 3),
        ('而', 3),
        ('不', 3),
        ('伤', 3),
        ('身', 3),
        ('体', 3),
    ];
    assert_eq!(decoded, expected);
}

#[test]
fn test_empty_rope_has_no_runes() {
    let rope = env().empty();
    assert!(rope.runes(0).unwrap().next().is_none());
    assert!(rope.runes(1).is_err());
}

#[test]
fn test_find_first_ascii_word() {
    let rope = env().from_bytes(TEXT);
    let mut runes = rope.runes(0).unwrap();

    let mut start = None;
    let mut end = rope.len();
    loop {
        let at = runes.offset();
        let Some(rune) = runes.next() else { break };
        let (c, _) = rune.unwrap();
        match (start, c.is_ascii_lowercase()) {
            (None, true) => start = Some(at),
            (Some(_), false) => {
                end = at;
                break;
            }
            _ => {}
        }
    }

    let start = start.unwrap();
    assert_eq!(rope.sub(start, end - start).unwrap(), b"zuo");
}

#[test]
fn test_start_mid_code_point() {
    let rope = env().from_bytes(TEXT);
    let mut runes = rope.runes(1).unwrap();
    assert_eq!(runes.next(), Some(Err(RuneError::Malformed { offset: 1, byte: 0x88 })));
    assert_eq!(runes.next(), Some(Err(RuneError::Malformed { offset: 2, byte: 0x91 })));
    assert_eq!(runes.next(), Some(Ok(('能', 3))));
}

#[test]
fn test_iter_rune_stops_early() {
    let rope = env().from_bytes(TEXT);
    let mut seen = String::new();
    rope.iter_rune(3, |c, _| {
        seen.push(c);
        seen.chars().count() < 4
    })
    .unwrap();
    assert_eq!(seen, "能吞zu");
}

#[test]
fn test_global_rope() {
    let rope = Rope::from("héllo");
    let widths: Vec<usize> = rope.runes(0).unwrap().map(|r| r.unwrap().1).collect();
    assert_eq!(widths, vec![1, 2, 1, 1, 1]);
}

proptest! {
    #[test]
    fn prop_valid_text_matches_chars(text in "\\PC{0,200}") {
        let rope = env().from_bytes(&text);
        let decoded: Vec<(char, usize)> = rope.runes(0).unwrap().map(|r| r.unwrap()).collect();
        let expected: Vec<(char, usize)> = text.chars().map(|c| (c, c.len_utf8())).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_widths_cover_all_bytes(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
        let rope = env().from_bytes(&bytes);
        let mut total = 0;
        rope.iter_rune(0, |_, n| {
            total += n;
            true
        }).unwrap();
        prop_assert_eq!(total, bytes.len());
    }
}
