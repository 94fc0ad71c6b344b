use super::common::*;
use crate::workflows::candidates::domain::{Candidate, CandidateId, NOT_AVAILABLE};
use crate::workflows::candidates::review::{
    derive_rows, matches_filter, ReviewTable, SortDirection, SortField, SortSpec,
};
use crate::workflows::candidates::store::KeyValueSlot;

fn amy_and_bob() -> Vec<Candidate> {
    vec![
        candidate(1, "amy", Some("Amy")),
        candidate(2, "bob", None),
    ]
}

#[test]
fn missing_names_sort_last_ascending_and_first_descending() {
    let saved = amy_and_bob();

    let ascending = derive_rows(&saved, "", &SortSpec::by(SortField::Name, SortDirection::Ascending));
    assert_eq!(logins(&ascending), vec!["amy", "bob"]);

    let descending =
        derive_rows(&saved, "", &SortSpec::by(SortField::Name, SortDirection::Descending));
    assert_eq!(logins(&descending), vec!["bob", "amy"]);
}

#[test]
fn descending_reverses_present_values() {
    let saved = vec![
        located(1, "c", None, Some("Oslo"), None),
        located(2, "a", None, Some("berlin"), None),
        located(3, "b", None, Some("Austin"), None),
    ];

    let ascending = derive_rows(
        &saved,
        "",
        &SortSpec::by(SortField::Location, SortDirection::Ascending),
    );
    assert_eq!(logins(&ascending), vec!["b", "a", "c"]);

    let descending = derive_rows(
        &saved,
        "",
        &SortSpec::by(SortField::Location, SortDirection::Descending),
    );
    assert_eq!(logins(&descending), vec!["c", "a", "b"]);
}

#[test]
fn case_only_differences_put_lowercase_first() {
    let saved = vec![
        candidate(1, "upper", Some("Zed")),
        candidate(2, "lower", Some("zed")),
    ];
    let rows = derive_rows(&saved, "", &SortSpec::by(SortField::Name, SortDirection::Ascending));
    assert_eq!(logins(&rows), vec!["lower", "upper"]);
}

#[test]
fn accented_names_sort_with_their_base_letter() {
    let saved = vec![
        candidate(1, "zoe", Some("Zoe")),
        candidate(2, "emile", Some("Émile")),
        candidate(3, "adam", Some("Adam")),
        candidate(4, "eve", Some("eve")),
    ];

    let rows = derive_rows(&saved, "", &SortSpec::by(SortField::Name, SortDirection::Ascending));
    assert_eq!(logins(&rows), vec!["adam", "emile", "eve", "zoe"]);

    let rows = derive_rows(&saved, "", &SortSpec::by(SortField::Name, SortDirection::Descending));
    assert_eq!(logins(&rows), vec!["zoe", "eve", "emile", "adam"]);
}

#[test]
fn accent_only_differences_put_unaccented_first() {
    let saved = vec![
        located(1, "accented", None, Some("Málaga"), None),
        located(2, "plain", None, Some("Malaga"), None),
    ];
    let rows = derive_rows(
        &saved,
        "",
        &SortSpec::by(SortField::Location, SortDirection::Ascending),
    );
    assert_eq!(logins(&rows), vec!["plain", "accented"]);
}

#[test]
fn equal_keys_keep_store_order() {
    let saved = vec![
        located(1, "first", None, None, Some("Acme")),
        located(2, "second", None, None, Some("Acme")),
        located(3, "third", None, None, None),
        located(4, "fourth", None, None, None),
    ];
    let rows = derive_rows(
        &saved,
        "",
        &SortSpec::by(SortField::Company, SortDirection::Ascending),
    );
    assert_eq!(logins(&rows), vec!["first", "second", "third", "fourth"]);
}

#[test]
fn id_sort_is_numeric() {
    let saved = vec![
        candidate(10, "ten", None),
        candidate(9, "nine", None),
        candidate(100, "hundred", None),
    ];
    let rows = derive_rows(&saved, "", &SortSpec::by(SortField::Id, SortDirection::Ascending));
    assert_eq!(logins(&rows), vec!["nine", "ten", "hundred"]);
}

#[test]
fn empty_needle_without_sort_keeps_input_order() {
    let saved = vec![
        candidate(3, "cy", None),
        candidate(1, "amy", None),
        candidate(2, "bob", None),
    ];
    let rows = derive_rows(&saved, "", &SortSpec::default());
    assert_eq!(logins(&rows), vec!["cy", "amy", "bob"]);
}

#[test]
fn filter_matches_any_text_column_ignoring_case() {
    let subject = located(1, "octo", Some("Mona Lisa"), Some("San Francisco"), Some("GitHub"));

    assert!(matches_filter(&subject, "LISA"));
    assert!(matches_filter(&subject, "oct"));
    assert!(matches_filter(&subject, "francisco"));
    assert!(matches_filter(&subject, "hub"));
    assert!(!matches_filter(&subject, "lisbon"));
}

#[test]
fn filter_does_not_search_email_or_bio() {
    let mut subject = candidate(1, "octo", None);
    subject.email = Some("octo@example.com".to_string());
    subject.bio = Some("rustacean".to_string());

    assert!(!matches_filter(&subject, "example.com"));
    assert!(!matches_filter(&subject, "rustacean"));
}

#[test]
fn needle_matching_nothing_yields_no_rows() {
    let saved = amy_and_bob();
    assert!(derive_rows(&saved, "zzz", &SortSpec::default()).is_empty());
}

#[test]
fn toggling_same_column_flips_and_new_column_resets() {
    let mut sort = SortSpec::default();
    assert_eq!(sort.field, None);

    sort.toggle(SortField::Name);
    assert_eq!(sort, SortSpec::by(SortField::Name, SortDirection::Ascending));
    sort.toggle(SortField::Name);
    assert_eq!(sort, SortSpec::by(SortField::Name, SortDirection::Descending));
    sort.toggle(SortField::Company);
    assert_eq!(sort, SortSpec::by(SortField::Company, SortDirection::Ascending));

    assert_eq!(sort.indicator(SortField::Company), Some("↑"));
    assert_eq!(sort.indicator(SortField::Name), None);
}

#[test]
fn sort_field_parses_column_aliases() {
    assert_eq!("Username".parse::<SortField>().ok(), Some(SortField::Login));
    assert_eq!(" company ".parse::<SortField>().ok(), Some(SortField::Company));
    assert!("email".parse::<SortField>().is_err());
}

#[test]
fn table_combines_filter_and_sort() {
    let store = seeded_store(&[
        located(1, "amy", Some("Amy"), Some("Lisbon"), None),
        located(2, "bob", None, Some("Lisbon"), None),
        located(3, "cy", Some("Cy"), Some("Porto"), None),
    ]);
    let mut table = ReviewTable::open(store).expect("open");

    table.set_filter("lisbon");
    table.toggle_sort(SortField::Name);
    table.toggle_sort(SortField::Name);

    assert_eq!(logins(&table.rows()), vec!["bob", "amy"]);

    let view = table.view();
    assert_eq!(view.total_saved, 3);
    assert_eq!(view.rows[0].name, NOT_AVAILABLE);
    assert_eq!(view.columns.len(), 4);
    assert_eq!(view.columns[0].indicator, Some("↓"));
    assert_eq!(view.columns[1].label, "Username");
}

#[test]
fn table_reloads_only_after_a_change_notification() {
    let store = memory_store();
    let mut table = ReviewTable::open(store.clone()).expect("open");
    assert!(table.snapshot().is_empty());

    // simulate another process writing the same slot behind the store's back
    store
        .slot()
        .write(&serde_json::to_string(&amy_and_bob()).expect("encode"))
        .expect("write");
    assert!(!table.sync().expect("sync"));
    assert!(table.snapshot().is_empty());

    store.notify_external();
    assert!(table.sync().expect("sync"));
    assert_eq!(table.snapshot().len(), 2);
}

#[test]
fn table_sees_writes_made_through_the_store() {
    let store = memory_store();
    let mut table = ReviewTable::open(store.clone()).expect("open");

    store.append(candidate(7, "gus", None)).expect("append");

    assert!(table.sync().expect("sync"));
    assert_eq!(logins(&table.rows()), vec!["gus"]);
}

#[test]
fn removing_a_row_updates_store_and_snapshot() {
    let store = seeded_store(&amy_and_bob());
    let mut table = ReviewTable::open(store.clone()).expect("open");

    assert!(table.remove(CandidateId(1)).expect("remove"));
    assert!(!table.remove(CandidateId(1)).expect("second remove"));

    assert_eq!(logins(&table.rows()), vec!["bob"]);
    assert_eq!(store.load_all().expect("load").len(), 1);
}
