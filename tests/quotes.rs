use demographics::DemographicsExtractor;

fn strip(text: &str) -> String {
    DemographicsExtractor::shared().strip_quotes(text).into_owned()
}

#[test]
fn removes_straight_and_curly_quotes() {
    assert_eq!(strip("He said \"I'm a 40m\" to her"), "He said to her");
    assert_eq!(strip("she wrote “I am a guy” then left"), "she wrote then left");
    assert_eq!(strip("\"a\" and \"b\" and c"), " and and c");
}

#[test]
fn unbalanced_quote_is_kept() {
    assert_eq!(strip("5\" tall and I'm 23f"), "5\" tall and I'm 23f");
}

#[test]
fn collapses_space_runs() {
    assert_eq!(strip("a  b   c"), "a b c");
}

#[test]
fn idempotent_on_quote_free_text() {
    for text in ["a  b   c", "I'm a 23f, live in the city", "  leading", "", "tabs\t\tstay"] {
        let once = strip(text);
        assert_eq!(strip(&once), once, "not idempotent for {text:?}");
    }
}

#[test]
fn borrowed_when_nothing_changes() {
    let ex = DemographicsExtractor::shared();
    assert!(matches!(ex.strip_quotes("plain text"), std::borrow::Cow::Borrowed(_)));
}
