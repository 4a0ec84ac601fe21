use portico::split_target;

#[test]
fn no_query() {
    assert_eq!(split_target("/hello"), ("/hello", String::new()));
    assert_eq!(split_target("/"), ("/", String::new()));
    assert_eq!(split_target(""), ("", String::new()));
}

#[test]
fn single_parameter() {
    assert_eq!(split_target("/p?a=1"), ("/p", "&a=1".to_string()));
}

#[test]
fn sorts_parameters() {
    assert_eq!(
        split_target("/hello?x=456&b=8&a=123"),
        ("/hello", "&a=123&b=8&x=456".to_string()),
    );
}

#[test]
fn order_independent() {
    assert_eq!(split_target("/p?b=2&a=1"), split_target("/p?a=1&b=2"));
}

#[test]
fn duplicate_parameters_kept() {
    assert_eq!(split_target("/p?a=2&a=1"), ("/p", "&a=1&a=2".to_string()));
}

#[test]
fn empty_query() {
    assert_eq!(split_target("/p?"), ("/p", "&".to_string()));
}

#[test]
fn only_first_question_mark_separates() {
    assert_eq!(
        split_target("/p?b=1?x&a"),
        ("/p", "&a&b=1?x".to_string()),
    );
}

#[test]
fn valueless_parameters() {
    assert_eq!(split_target("/p?c&a&b"), ("/p", "&a&b&c".to_string()));
}
