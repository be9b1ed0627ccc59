use std::cell::{Cell, RefCell};
use std::rc::Rc;

use verimock::*;

use crate::fixtures::*;

#[test]
fn loose_mock_answers_unmatched_calls_with_defaults() {
    let writer = Mock::<WriterMock>::new();

    assert!(!writer.object().write(1));
    writer.object().flush();
    assert_eq!(0, Mock::<ComparableMock>::new().object().compare_to(5));
    assert_eq!("", Mock::<CloneableMock>::new().object().clone_value());
}

#[test]
#[should_panic(expected = "write(1): No setup matches this invocation on a strict mock.")]
fn strict_mock_panics_at_call_time() {
    let writer = Mock::<WriterMock>::with_behavior(MockBehavior::Strict);
    writer.object().write(1);
}

#[test]
fn strict_mock_answers_matched_calls() {
    let writer = Mock::<WriterMock>::with_behavior(MockBehavior::Strict);
    writer.setup(WriterMock::write(1)).returns(true);

    assert!(writer.object().write(1));

    let err = writer
        .object()
        .try_invoke::<bool>(Invocation::call("write", values![2]))
        .unwrap_err();
    assert!(matches!(
        err,
        MockError::StrictMismatch { ref invocation, .. } if invocation == "write(2)"
    ));
}

#[test]
fn last_matching_setup_wins() {
    let writer = Mock::<WriterMock>::new();
    writer.setup(WriterMock::write(it::any())).returns(false);
    writer.setup(WriterMock::write(42)).returns(true);

    assert!(writer.object().write(42));
    assert!(!writer.object().write(1));

    writer.setup(WriterMock::write(it::any())).returns(true);
    assert!(writer.object().write(1));
}

#[test]
fn returns_with_computes_from_arguments() {
    let comparable = Mock::<ComparableMock>::new();
    comparable
        .setup(ComparableMock::compare_to(it::in_range(0..10)))
        .returns_with(|args| args[0].downcast_ref::<i32>().map_or(-1, |n| n * 2));

    assert_eq!(8, comparable.object().compare_to(4));
    assert_eq!(0, comparable.object().compare_to(10));
}

#[test]
fn callbacks_run_before_responding() {
    let seen = Rc::new(RefCell::new(vec![]));
    let writer = Mock::<WriterMock>::new();

    let log = seen.clone();
    writer
        .setup(WriterMock::write(it::any()))
        .callback(move |args| log.borrow_mut().push(args[0].to_string()))
        .returns(true);

    writer.object().write(1);
    writer.object().write(2);

    assert_eq!(vec!["1".to_string(), "2".to_string()], *seen.borrow());
}

#[test]
#[should_panic(expected = "write(42): Explicit panic from write(42): disk full")]
fn setup_can_panic() {
    let writer = Mock::<WriterMock>::new();
    writer.setup(WriterMock::write(42)).panics("disk full");
    writer.object().write(42);
}

#[test]
#[should_panic(expected = "is not of the expected return type bool")]
fn response_of_wrong_type_is_reported() {
    let writer = Mock::<WriterMock>::new();
    writer.setup(WriterMock::write(1)).returns("yes");
    writer.object().write(1);
}

#[test]
#[should_panic(expected = "No default value available for return type")]
fn loose_mock_without_default_for_return_type_panics() {
    let start = Mock::<StartProcessMock>::new();
    start.object().start(StartInfo::new("a", "b"));
}

#[test]
fn registered_default_value_is_used_by_loose_mock() {
    let start = Mock::<StartProcessMock>::new();
    start.set_returns_default(Process { id: 7 });

    assert_eq!(Process { id: 7 }, start.object().start(StartInfo::new("a", "b")));
}

#[test]
fn verify_pattern_defaults_to_at_least_once() {
    let writer = Mock::<WriterMock>::new();

    let err = writer.verify_pattern(WriterMock::write(42)).unwrap_err();
    assert!(err.to_string().ends_with(
        "Expected write(42) to match at least 1 call, but it actually matched no calls. No invocations were recorded."
    ));

    writer.object().write(42);
    writer.object().write(42);
    assert!(writer.verify_pattern(WriterMock::write(42)).is_ok());

    let err = writer
        .verify_pattern(WriterMock::write(42).times(Times::once()))
        .unwrap_err();
    assert!(err.to_string().contains(
        "Expected write(42) to match exactly 1 call, but it actually matched 2 calls.\nRecorded invocations:\n  - write(42)\n  - write(42)"
    ));
}

#[test]
fn verify_pattern_reports_fail_message_first() {
    let writer = Mock::<WriterMock>::new();

    let err = writer
        .verify_pattern(WriterMock::write(1).fail_message("write was skipped"))
        .unwrap_err();

    assert!(err.to_string().starts_with("write was skipped\n"));
}

#[test]
fn verify_checks_only_verifiable_setups() {
    let comparable = Mock::<ComparableMock>::new();
    comparable
        .setup(ComparableMock::compare_to(42))
        .returns(1)
        .verifiable();
    comparable.setup(ComparableMock::compare_to(23)).returns(-1);

    let err = comparable.verify().unwrap_err();
    assert!(err
        .to_string()
        .ends_with("The following setups were never matched:\n  - compare_to(42)"));

    comparable.object().compare_to(42);
    assert!(comparable.verify().is_ok());

    let err = comparable.verify_all().unwrap_err();
    assert!(err
        .to_string()
        .ends_with("The following setups were never matched:\n  - compare_to(23)"));

    comparable.object().compare_to(23);
    assert!(comparable.verify_all().is_ok());
}

#[test]
fn verifiable_with_reports_message() {
    let writer = Mock::<WriterMock>::new();
    writer
        .setup(WriterMock::write(3))
        .verifiable_with("third write missing");

    let err = writer.verify().unwrap_err();
    assert!(err.to_string().contains("write(3): third write missing"));
}

#[test]
fn backed_property_remembers_writes() {
    let named = Mock::<NamedMock>::with_behavior(MockBehavior::Strict);
    named.setup_property("name", "first".to_string());

    let object = named.object();
    assert_eq!("first", object.name());

    object.set_name("second".to_string());
    assert_eq!("second", object.name());
}

#[test]
fn all_properties_start_out_as_defaults() {
    let named = Mock::<NamedMock>::with_behavior(MockBehavior::Strict);
    named.setup_all_properties();

    let object = named.object();
    assert_eq!("", object.name());
    assert_eq!(0, object.length());

    object.set_name("written".to_string());
    assert_eq!("written", object.name());
}

#[test]
fn getter_setup_takes_precedence_over_backed_property() {
    let named = Mock::<NamedMock>::new();
    named.setup_property("name", "stored".to_string());
    named.setup_get("name").returns("configured".to_string());

    assert_eq!("configured", named.object().name());
}

#[test]
fn setter_setups_match_written_value() {
    let named = Mock::<NamedMock>::new();
    named
        .setup(NamedMock::set_name("expected"))
        .verifiable();

    named.object().set_name("other".to_string());
    assert!(named.verify().is_err());

    named.object().set_name("expected".to_string());
    assert!(named.verify().is_ok());
    assert!(named
        .verify_pattern(Pattern::setter("name", it::any::<String>()).times(Times::exactly(2)))
        .is_ok());
}

#[test]
fn conditional_setups_apply_while_condition_holds() {
    let enabled = Rc::new(Cell::new(false));
    let writer = Mock::<WriterMock>::new();

    let condition = enabled.clone();
    writer
        .when(move || condition.get())
        .setup(WriterMock::write(it::any()))
        .returns(true);

    assert!(!writer.object().write(1));
    enabled.set(true);
    assert!(writer.object().write(1));
}

#[test]
fn raised_events_reach_subscribers() {
    let received = Rc::new(RefCell::new(vec![]));
    let writer = Mock::<WriterMock>::new();

    let sink = received.clone();
    writer.object().subscribe("flushed", move |args| {
        sink.borrow_mut()
            .push(*args[0].downcast_ref::<usize>().unwrap());
    });

    writer.raise("flushed", values![3_usize]);
    writer.raise("unrelated", values![]);

    assert_eq!(vec![3], *received.borrow());
}

#[test]
fn borrowed_arguments_are_recorded_owned() {
    let parser = Mock::<ParserMock>::new();
    parser.setup(ParserMock::parse("abc")).returns(3);

    assert_eq!(3, parser.object().parse("abc"));
    assert_eq!(0, parser.object().parse("xyz"));
    assert_eq!(
        vec!["parse(\"abc\")".to_string(), "parse(\"xyz\")".to_string()],
        parser
            .invocations()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
}

#[test]
fn object_leads_back_to_its_mock() {
    let writer = Mock::<WriterMock>::new();
    let object = writer.object();

    assert_eq!(writer.id(), object.mock().id());
    object.write(5);
    assert_eq!(1, writer.invocations().len());
}

#[test]
fn capability_views_share_state() {
    let writer = Mock::<WriterMock>::new();
    let comparable = writer.as_capability::<ComparableMock>();
    comparable.setup(ComparableMock::compare_to(1)).returns(5);

    assert_eq!(5, comparable.object().compare_to(1));
    assert_eq!(writer.id(), comparable.id());
    assert_eq!(1, writer.invocations().len());
}

#[test]
fn constructor_arguments_are_part_of_the_name() {
    let parser = Mock::<ParserMock>::with_args(MockBehavior::Loose, values![42]);

    assert!(parser.name().starts_with("Parser#"));
    assert!(parser.name().ends_with("(42)"));
    assert_eq!(1, parser.ctor_args().len());
}

#[test]
fn repository_verifies_every_mock_in_creation_order() {
    let repository = MockRepository::new(MockBehavior::Loose);
    let first = repository.create::<WriterMock>();
    let second = repository.create::<ComparableMock>();
    let third = repository.create_with_behavior::<WriterMock>(MockBehavior::Strict);

    first.setup(WriterMock::write(1)).verifiable();
    third.setup(WriterMock::write(3)).verifiable();
    second.setup(ComparableMock::compare_to(2));

    assert_eq!(vec![first.id(), second.id(), third.id()], repository.mocks());
    assert_eq!(MockBehavior::Strict, third.behavior());

    let err = repository.verify().unwrap_err();
    assert_eq!(3, err.checked());
    assert_eq!(2, err.failures().len());
    assert!(err.first().to_string().starts_with(first.name()));
    assert!(err.to_string().starts_with("2 of 3 mocks failed verification:\n[1] "));

    let err = repository.verify_all().unwrap_err();
    assert_eq!(3, err.failures().len());
}
