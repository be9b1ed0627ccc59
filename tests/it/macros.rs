use verimock::*;

use crate::fixtures::*;

#[verimock]
trait Store {
    fn put(&mut self, key: &str, bytes: &[u8]) -> usize;
    fn clear(&self) -> ();

    fn put_empty(&mut self, key: &str) -> usize {
        self.put(key, &[])
    }
}

#[verimock(api = AccountMock, prefix = ::verimock)]
trait Account {
    #[verimock(get)]
    fn balance(&self) -> i64;

    #[verimock(set)]
    fn set_balance(&self, balance: i64);

    #[verimock(set)]
    fn owner(&self, owner: String);
}

#[test]
fn api_type_defaults_to_trait_name_with_mock_suffix() {
    assert_eq!("Store", <StoreMock as Capability>::NAME);
    assert!(<StoreMock as Capability>::PROPERTIES.is_empty());
    assert_eq!("Writer", <WriterMock as Capability>::NAME);
}

#[test]
fn property_names_are_collected_once() {
    assert_eq!(&["balance", "owner"], <AccountMock as Capability>::PROPERTIES);
    assert_eq!(&["name", "length"], <NamedMock as Capability>::PROPERTIES);
}

#[test]
fn pattern_constructors_render_like_invocations() {
    assert_eq!("put(\"k\", _)", StoreMock::put("k", it::any()).to_string());
    assert_eq!("clear()", StoreMock::clear().to_string());
    assert_eq!("get balance", AccountMock::balance().to_string());
    assert_eq!("set balance = 10", AccountMock::set_balance(10).to_string());
    assert_eq!(
        "set owner = is(non-empty)",
        AccountMock::owner(it::is("non-empty", |owner: &String| !owner.is_empty())).to_string()
    );
    assert_eq!(PatternKind::Setter, AccountMock::owner("me").kind());
    assert_eq!("owner", AccountMock::owner("me").member());
}

#[test]
fn mutable_receivers_and_slices() {
    let store = Mock::<StoreMock>::new();
    store
        .setup(StoreMock::put("k", vec![1_u8, 2]))
        .returns_with(|args| {
            args[1]
                .downcast_ref::<Vec<u8>>()
                .map_or(usize::MAX, Vec::len)
        });

    let mut object = store.object();
    assert_eq!(2, object.put("k", &[1, 2]));
    assert_eq!(0, object.put("k", &[3]));
    object.clear();

    assert!(store
        .verify_pattern(StoreMock::put(it::any(), it::any()).times(Times::exactly(2)))
        .is_ok());
}

#[test]
fn methods_with_default_bodies_are_mocked_too() {
    let store = Mock::<StoreMock>::new();
    store.setup(StoreMock::put_empty("empty")).returns(7_usize);

    assert_eq!(7, store.object().put_empty("empty"));
    assert!(store
        .verify_pattern(StoreMock::put(it::any(), it::any()).times(Times::never()))
        .is_ok());
}

#[test]
fn setter_without_set_prefix_writes_property_named_after_method() {
    let account = Mock::<AccountMock>::with_behavior(MockBehavior::Strict);
    account.setup_all_properties();

    let object = account.object();
    object.owner("someone".to_string());
    object.set_balance(5);

    assert_eq!(5, object.balance());
    assert!(account
        .verify_pattern(Pattern::setter("owner", it::eq("someone".to_string())))
        .is_ok());
}
