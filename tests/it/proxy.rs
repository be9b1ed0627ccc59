use verimock::*;

use crate::fixtures::*;

fn writer_proxy() -> MockProxy<WriterMock> {
    MockProxy::new(Mock::new())
}

#[test]
fn expectation_with_count_fails_when_called_too_few_times() {
    let writer = writer_proxy();
    writer
        .expect(WriterMock::write(42).times(Times::exactly(2)))
        .returns(true);

    assert!(writer.object().write(42));

    let err = writer.verify().unwrap_err();
    assert!(err.to_string().contains(
        "Expected write(42) to match exactly 2 calls, but it actually matched 1 call."
    ));
}

#[test]
fn expectation_with_count_passes_when_met() {
    let writer = writer_proxy();
    writer
        .expect(WriterMock::write(42).times(Times::exactly(2)))
        .returns(true);

    writer.object().write(42);
    writer.object().write(42);

    assert!(writer.verify().is_ok());
}

#[test]
fn repeated_verification_does_not_consume_invocations() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(1));
    writer.object().write(1);

    assert!(writer.verify().is_ok());
    assert!(writer.verify().is_ok());
    assert!(writer.verify_all().is_ok());
}

#[test]
fn expectation_defaults_to_exactly_once() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(1));

    writer.object().write(1);
    writer.object().write(1);

    let err = writer.verify().unwrap_err();
    assert!(err.to_string().contains(
        "Expected write(1) to match exactly 1 call, but it actually matched 2 calls."
    ));
}

#[test]
fn fail_message_is_included_in_the_diagnostic() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(7).fail_message("X"));

    let err = writer.verify().unwrap_err();
    match &err {
        MockError::UnmetExpectation { fail_message, .. } => {
            assert_eq!(Some("X"), fail_message.as_deref())
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("X\n"));
}

#[test]
fn first_unmet_expectation_in_declaration_order_is_reported() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(1));
    writer.expect(WriterMock::write(2));

    writer.object().write(2);

    let err = writer.verify().unwrap_err();
    assert!(err.to_string().contains("Expected write(1)"));

    writer.object().write(1);
    assert!(writer.verify().is_ok());
}

#[test]
fn repeated_expectations_are_checked_independently() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(5).times(Times::at_least(2)));
    writer.expect(WriterMock::write(5).times(Times::at_most(3)));
    assert_eq!(2, writer.expectation_count());

    writer.object().write(5);
    assert!(writer
        .verify()
        .unwrap_err()
        .to_string()
        .contains("to match at least 2 calls"));

    writer.object().write(5);
    assert!(writer.verify().is_ok());

    writer.object().write(5);
    writer.object().write(5);
    assert!(writer
        .verify()
        .unwrap_err()
        .to_string()
        .contains("to match at most 3 calls, but it actually matched 4 calls"));
}

#[test]
fn never_expectation_is_not_reported_as_unmatched_setup() {
    let writer = writer_proxy();
    writer.expect(WriterMock::write(0).times(Times::never()));

    assert!(writer.verify().is_ok());
    assert!(writer.verify_all().is_ok());

    writer.object().write(0);
    assert!(writer.verify().is_err());
}

#[test]
fn verify_ignores_plain_setups_but_verify_all_does_not() {
    let comparable = MockProxy::new(Mock::<ComparableMock>::new());
    comparable.expect(ComparableMock::compare_to(42)).returns(1);
    comparable.setup(ComparableMock::compare_to(23)).returns(-1);

    assert_eq!(1, comparable.object().compare_to(42));
    assert_eq!(0, comparable.object().compare_to(24));

    assert!(comparable.verify().is_ok());

    let err = comparable.verify_all().unwrap_err();
    assert!(err.to_string().contains("compare_to(23)"));

    comparable.object().compare_to(23);
    assert!(comparable.verify_all().is_ok());
}

#[test]
fn verify_all_fails_whenever_verify_fails() {
    let writer = writer_proxy();
    writer.setup(WriterMock::write(3)).verifiable();
    writer.expect(WriterMock::write(4));

    assert!(writer.verify().is_err());
    assert!(writer.verify_all().is_err());

    writer.object().write(4);
    let verify = writer.verify().unwrap_err();
    let verify_all = writer.verify_all().unwrap_err();
    assert_eq!(verify.to_string(), verify_all.to_string());

    writer.object().write(3);
    assert!(writer.verify().is_ok());
    assert!(writer.verify_all().is_ok());
}

#[test]
fn property_expectations() {
    let named = MockProxy::new(Mock::<NamedMock>::with_behavior(MockBehavior::Strict));
    named.expect_get("name").returns("before".to_string());
    named.expect_set("name", it::eq("after".to_string()));

    let err = named.verify().unwrap_err();
    assert!(err.to_string().contains("Expected get name to match exactly 1 call"));

    let object = named.object();
    assert_eq!("before", object.name());
    object.set_name("after".to_string());

    assert!(named.verify().is_ok());
}

#[test]
#[should_panic(expected = "set name = \"other\": No setup matches this invocation on a strict mock.")]
fn unexpected_setter_value_on_strict_proxy_panics() {
    let named = MockProxy::new(Mock::<NamedMock>::with_behavior(MockBehavior::Strict));
    named.expect_set("name", it::eq("after".to_string()));

    named.object().set_name("other".to_string());
}

#[test]
fn verify_pattern_is_immediate() {
    let writer = writer_proxy();
    assert!(writer.verify_pattern(WriterMock::write(9)).is_err());

    writer.object().write(9);
    assert!(writer.verify_pattern(WriterMock::write(9)).is_ok());
    assert_eq!(0, writer.expectation_count());
}

#[test]
fn proxy_from_object_wraps_the_same_mock() {
    let mock = Mock::<WriterMock>::new();
    let proxy = MockProxy::get(&mock.object());

    assert_eq!(mock.id(), proxy.id());
    proxy.expect(WriterMock::write(1));
    mock.object().write(1);
    assert!(proxy.verify().is_ok());
}

#[test]
fn pass_through_configuration() {
    let named = MockProxy::new(Mock::<NamedMock>::new());
    named
        .setup_property("name", "stored".to_string())
        .setup_all_properties();
    named.set_returns_default("fallback".to_string());
    named
        .setup(NamedMock::greet(it::is("polite", |greeting: &String| {
            greeting.starts_with("Good")
        })))
        .returns_with(|args| format!("{}!", args[0]));

    let object = named.object();
    assert_eq!("stored", object.name());
    assert_eq!(0, object.length());
    assert_eq!("\"Good day\"!", object.greet("Good day"));
    assert_eq!("fallback", object.greet("hey"));
    assert_eq!(MockBehavior::Loose, named.behavior());
}

#[test]
fn clones_share_verification_actions() {
    let writer = writer_proxy();
    let clone = writer.clone();
    clone.expect(WriterMock::write(8));

    assert_eq!(1, writer.expectation_count());
    assert!(writer.verify().is_err());
}

#[test]
fn capability_views_share_verification_actions() {
    let writer = writer_proxy();
    let comparable = writer.as_capability::<ComparableMock>();
    comparable.expect(ComparableMock::compare_to(5)).returns(2);

    assert_eq!(writer.id(), comparable.id());
    assert_eq!(1, writer.expectation_count());
    assert!(writer.verify().is_err());

    assert_eq!(2, comparable.object().compare_to(5));
    assert!(writer.verify().is_ok());
    assert!(comparable.verify().is_ok());
}
