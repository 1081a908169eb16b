use tagql::dialect::{Dialect, PrecedingMarker, Substitution};
use tagql::position::Location;
use tagql::template::{Chunk, Slot, Template};
use tagql::{InterpolationErrorKind, reconstruct};

/// Build a template from literal chunks, giving every slot `width` chars.
fn template(chunks: &[&str], width: usize) -> Template {
    let mut offset = 100;
    let slots = (0..chunks.len() - 1)
        .map(|_| {
            let slot = Slot::new(offset, offset + width, Location::new(1, offset));
            offset += width + 10;
            slot
        })
        .collect();
    let chunks = chunks
        .iter()
        .map(|c| Chunk {
            text: c.to_string(),
        })
        .collect();
    Template::new(chunks, slots).expect("well-formed template")
}

#[test]
fn relay_variable_after_colon() {
    let t = template(&["a(b: ", ") { c }"], 1);
    assert_eq!(reconstruct(&t, Dialect::Relay).unwrap(), "a(b: $xxx) { c }");
}

#[test]
fn relay_implicit_fragment_spread() {
    let t = template(&["fragment on User { id ", " }"], 4);
    assert_eq!(
        reconstruct(&t, Dialect::Relay).unwrap(),
        "fragment on User { id ...xxxx }"
    );
}

#[test]
fn lokka_typed_fragment_spread() {
    let t = template(&["{ viewer { ...", " } }"], 2);
    assert_eq!(
        reconstruct(&t, Dialect::Lokka).unwrap(),
        "{ viewer { ...xxxxx } }"
    );
}

#[test]
fn lokka_rejects_hole_without_ellipsis() {
    let t = template(&["{ viewer(id: ", ") { id } }"], 2);
    let err = reconstruct(&t, Dialect::Lokka).unwrap_err();
    assert_eq!(err.kind, InterpolationErrorKind::UnsupportedInterpolation);
    assert_eq!(err.slot, 0);
}

#[test]
fn literal_rejects_any_hole() {
    let t = template(&["query { a }\n", ""], 3);
    let err = reconstruct(&t, Dialect::Literal).unwrap_err();
    assert_eq!(err.kind, InterpolationErrorKind::UnsupportedInterpolation);
}

#[test]
fn apollo_elides_hole_outside_brackets() {
    let t = template(&["query { user { ...UserParts } }\n", "\n"], 9);
    assert_eq!(
        reconstruct(&t, Dialect::Apollo).unwrap(),
        "query { user { ...UserParts } }\n\n"
    );
}

#[test]
fn unmarked_hole_inside_brackets_is_imbalance() {
    let t = template(&["{ a ", " }"], 1);
    let err = reconstruct(&t, Dialect::Unmarked).unwrap_err();
    assert_eq!(err.kind, InterpolationErrorKind::BracketImbalance);
    assert_eq!(err.slot, 0);
}

#[test]
fn balance_gate_runs_before_substitution() {
    // The second hole would be unsupported for Apollo's neighbours, but the
    // first chunk already fails the gate.
    let t = template(&["query { a ", " b: ", " }"], 2);
    for dialect in [Dialect::Unmarked, Dialect::Apollo] {
        let err = reconstruct(&t, dialect).unwrap_err();
        assert_eq!(err.kind, InterpolationErrorKind::BracketImbalance);
        assert_eq!(err.slot, 0);
    }
}

#[test]
fn unbalanced_tail_chunk_is_reported_after_last_slot() {
    let t = template(&["query Q ", " { a "], 1);
    let err = reconstruct(&t, Dialect::Apollo).unwrap_err();
    assert_eq!(err.kind, InterpolationErrorKind::BracketImbalance);
    assert_eq!(err.slot, 1);
}

#[test]
fn relay_and_lokka_allow_holes_inside_brackets() {
    let t = template(&["{ a ", " }"], 1);
    assert!(reconstruct(&t, Dialect::Relay).is_ok());
    let t = template(&["{ a ...", " }"], 1);
    assert!(reconstruct(&t, Dialect::Lokka).is_ok());
}

#[test]
fn template_without_slots_is_unchanged() {
    let text = "query Viewer {\n  viewer { id name }\n}\n";
    for dialect in Dialect::ALL {
        let t = Template::literal(text);
        assert_eq!(reconstruct(&t, dialect).unwrap(), text, "{dialect}");
    }
}

#[test]
fn placeholder_width_is_preserved() {
    for width in [0, 1, 5, 17] {
        for (sub, prefix) in [
            (Substitution::Variable, "$"),
            (Substitution::TypedSpread, ""),
            (Substitution::ImplicitSpread, "..."),
        ] {
            let rendered = sub.render(width);
            assert_eq!(rendered.len(), prefix.len() + width + sub.extra_width());
            assert!(rendered.starts_with(prefix));
            assert!(rendered[prefix.len()..].chars().all(|c| c == Substitution::FILLER));
        }
        assert_eq!(Substitution::Elide.render(width), "");
    }
}

#[test]
fn every_dialect_and_marker_is_decided() {
    let cases = [
        ("{ a } x: ", PrecedingMarker::Colon),
        ("{ a } ...", PrecedingMarker::Ellipsis),
        ("{ a } ", PrecedingMarker::Neither),
    ];
    for dialect in Dialect::ALL {
        for (chunk, marker) in cases {
            assert_eq!(PrecedingMarker::of(chunk), marker);
            let t = template(&[chunk, ""], 3);
            match (dialect.substitution(marker), reconstruct(&t, dialect)) {
                (Some(sub), Ok(text)) => {
                    assert_eq!(text.len(), chunk.len() + sub.render(3).len());
                }
                (None, Err(err)) => {
                    assert_eq!(err.kind, InterpolationErrorKind::UnsupportedInterpolation);
                }
                (sub, result) => panic!("{dialect} / {marker:?}: {sub:?} vs {result:?}"),
            }
        }
    }
}

#[test]
fn preceding_marker_ignores_trailing_whitespace() {
    assert_eq!(PrecedingMarker::of("user(id:\n   "), PrecedingMarker::Colon);
    assert_eq!(PrecedingMarker::of("{ ...  \t"), PrecedingMarker::Ellipsis);
    assert_eq!(PrecedingMarker::of("{ a: b "), PrecedingMarker::Neither);
    assert_eq!(PrecedingMarker::of(""), PrecedingMarker::Neither);
}

#[test]
fn template_shape_is_checked() {
    let err = Template::new(
        vec![Chunk {
            text: "a".to_string(),
        }],
        vec![Slot::new(0, 1, Location::new(1, 0))],
    )
    .unwrap_err();
    assert_eq!(err.chunks, 1);
    assert_eq!(err.slots, 1);
}

#[test]
fn dialect_names_round_trip() {
    for dialect in Dialect::ALL {
        if let Some(name) = dialect.env_name() {
            assert_eq!(name.parse::<Dialect>().unwrap(), dialect);
        }
    }
    assert!("urql".parse::<Dialect>().is_err());
}
