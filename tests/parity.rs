use envfile::{EnvMap, ParseErrorKind, parse_str};

fn assert_fixture(map: &EnvMap, expected: &[(&str, &str)]) {
    assert_eq!(map.len(), expected.len(), "unexpected keys: {map:?}");
    for (key, value) in expected {
        assert_eq!(map.get(key), Some(*value), "value of {key}");
    }
}

#[test]
fn parses_plain_fixture() {
    let map = parse_str(include_str!("fixtures/plain.env")).expect("fixture should parse");

    assert_fixture(
        &map,
        &[
            ("OPTION_A", "1"),
            ("OPTION_B", "2"),
            ("OPTION_C", "3"),
            ("OPTION_D", "4"),
            ("OPTION_E", "5"),
            ("OPTION_F", ""),
            ("OPTION_G", ""),
        ],
    );
}

#[test]
fn parses_exported_fixture() {
    let map = parse_str(include_str!("fixtures/exported.env")).expect("fixture should parse");

    assert_fixture(&map, &[("OPTION_A", "2"), ("OPTION_B", "\\n")]);
}

#[test]
fn parses_equals_fixture() {
    let map = parse_str(include_str!("fixtures/equals.env")).expect("fixture should parse");

    assert_fixture(
        &map,
        &[(
            "OPTION_A",
            "postgres://localhost:5432/database?sslmode=disable",
        )],
    );
}

#[test]
fn parses_quoted_fixture() {
    let map = parse_str(include_str!("fixtures/quoted.env")).expect("fixture should parse");

    assert_fixture(
        &map,
        &[
            ("OPTION_A", "1"),
            ("OPTION_B", "2"),
            ("OPTION_C", ""),
            ("OPTION_D", "\\n"),
            ("OPTION_E", "1"),
            ("OPTION_F", "2"),
            ("OPTION_G", ""),
            ("OPTION_H", "\n"),
            ("OPTION_I", "echo 'asd'"),
        ],
    );
}

#[test]
fn parses_substitutions_fixture() {
    let map =
        parse_str(include_str!("fixtures/substitutions.env")).expect("fixture should parse");

    assert_fixture(
        &map,
        &[
            ("OPTION_A", "1"),
            ("OPTION_B", "1"),
            ("OPTION_C", "1"),
            ("OPTION_D", "11"),
            ("OPTION_E", ""),
        ],
    );
}

#[test]
fn parses_mixed_separator_fixture() {
    let map = parse_str(include_str!("fixtures/yaml.env")).expect("fixture should parse");

    assert_fixture(
        &map,
        &[
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("DB_URL", "postgres://localhost:5432/app"),
            ("GREETING", "hello # not a comment"),
            ("PRICE", "$5"),
        ],
    );
}

#[test]
fn rejects_invalid_fixture() {
    let err = parse_str(include_str!("fixtures/invalid1.env")).expect_err("expected parse error");

    assert_eq!(err.line, 1);
    assert_eq!(err.kind, ParseErrorKind::MissingSeparator);
    assert!(err.partial().is_empty());
}

#[test]
fn rendered_output_parses_back_to_the_same_map() {
    for fixture in [
        include_str!("fixtures/quoted.env"),
        include_str!("fixtures/substitutions.env"),
        include_str!("fixtures/yaml.env"),
    ] {
        let map = parse_str(fixture).expect("fixture should parse");
        let rendered = map.to_dotenv().expect("fixture values should render");
        let reparsed = parse_str(&rendered).expect("rendered output should parse");

        assert_eq!(reparsed, map, "rendered:\n{rendered}");
    }
}
