use demographics::{DemographicsExtractor, ExtractOptions, Gender};

fn ex() -> &'static DemographicsExtractor {
    DemographicsExtractor::shared()
}

#[test]
fn shorthand_after_self_term() {
    assert_eq!(ex().determine_gender("I'm a 23f, live in the city"), Some(Gender::Female));
    assert_eq!(ex().determine_gender("I'm 25f"), Some(Gender::Female));
    assert_eq!(ex().determine_gender("so me (m) 19 and her"), Some(Gender::Male));
}

#[test]
fn bracketed_shorthand_after_my() {
    assert_eq!(ex().determine_gender("My (25f) friend said hi"), Some(Gender::Female));
}

#[test]
fn shorthand_opening_the_text() {
    assert_eq!(ex().determine_gender("23M here, what do you guys think"), Some(Gender::Male));
    let m = ex().return_gender_match("[f23] looking for advice").unwrap();
    assert_eq!(m.label, Gender::Female);
    assert_eq!(m.rule, "female_leading_shorthand");
}

#[test]
fn numbers_opening_the_text_are_not_shorthand() {
    assert_eq!(ex().determine_gender("30 m away from the shore"), None);
    assert_eq!(ex().determine_gender("10 F outside today"), None);
    assert_eq!(ex().determine_gender("25 miles to the next town"), None);
    assert!(ex().return_gender_match("30 m away from the shore").is_none());
}

#[test]
fn noun_phrases_with_optional_filler() {
    assert_eq!(ex().determine_gender("I'm a cool guy"), Some(Gender::Male));
    assert_eq!(ex().determine_gender("I AM A GUY"), Some(Gender::Male));
    assert_eq!(ex().determine_gender("I am a woman in tech"), Some(Gender::Female));
    assert_eq!(ex().determine_gender("I’m a girl"), Some(Gender::Female));
    assert_eq!(ex().determine_gender("I'm a female"), Some(Gender::Female));
    assert_eq!(ex().determine_gender("I'm a 23-year-old woman"), Some(Gender::Female));
}

#[test]
fn hyphenated_noun_is_not_a_disclosure() {
    assert_eq!(ex().determine_gender("I'm a man-child"), None);
}

#[test]
fn no_self_reference_means_absent() {
    assert_eq!(ex().determine_gender("I am 30 years old and scared"), None);
    assert_eq!(ex().determine_gender("nothing to see"), None);
    assert_eq!(ex().determine_gender(""), None);
}

#[test]
fn noun_phrase_takes_priority_over_shorthand() {
    let m = ex().return_gender_match("I'm a guy, 25m").unwrap();
    assert_eq!(m.rule, "male_noun_phrase");
    assert_eq!(m.span.start, 0);
    assert!(m.text.starts_with("I'm a guy"));
}

#[test]
fn male_checked_before_female() {
    assert_eq!(ex().determine_gender("I'm a woman. Edit: I am a man"), Some(Gender::Male));
}

/// The not-hypothetical guard only applies to the age phrase.
#[test]
fn hypothetical_guard_does_not_apply_to_gender() {
    assert_eq!(ex().determine_gender("if I'm a man"), Some(Gender::Male));
}

#[test]
fn quoted_claim_is_ignored_unless_disabled() {
    let text = "He said \"I'm a 40m\" to her";
    assert_eq!(ex().determine_gender(text), None);

    let raw = DemographicsExtractor::with_options(ExtractOptions { strip_quotes: false }).unwrap();
    assert!(!raw.options().strip_quotes);
    assert!(ex().options().strip_quotes);
    assert_eq!(raw.determine_gender(text), Some(Gender::Male));
}

#[test]
fn gender_codes() {
    assert_eq!(Gender::Male.as_str(), "M");
    assert_eq!(Gender::Female.to_string(), "F");
    assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"F\"");
}
