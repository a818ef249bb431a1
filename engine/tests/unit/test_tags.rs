//! Release tag allocation tests

use chrono::NaiveDate;
use proptest::prelude::*;

use dresktop::deploy::tags::parse_tag_list;
use dresktop::deploy::{next_release_tag, ReleaseTag};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_git_output_with_foreign_tags() {
    let output = "v1.0.0\n2024-07-19.3\nrelease-candidate\n2024-07-21\n  2024-07-21.0  \n\n";
    let tags = parse_tag_list(output);
    assert_eq!(tags.len(), 3);
    assert_eq!(next_release_tag(&tags, date("2024-07-21")).to_string(), "2024-07-21.1");
}

#[test]
fn test_new_day_starts_bare() {
    let tags = parse_tag_list("2024-07-20\n2024-07-20.0\n2024-07-20.1");
    assert_eq!(next_release_tag(&tags, date("2024-07-21")).to_string(), "2024-07-21");
}

#[test]
fn test_no_release_tags_yet() {
    let tags = parse_tag_list("v1\nv2\n");
    assert!(tags.is_empty());
    assert_eq!(next_release_tag(&tags, date("2024-01-01")).to_string(), "2024-01-01");
}

#[test]
fn test_suffixes_compare_numerically() {
    let tags = parse_tag_list("2024-07-21.9\n2024-07-21.10\n2024-07-21.2");
    assert_eq!(next_release_tag(&tags, date("2024-07-21")).to_string(), "2024-07-21.11");
}

fn release_tags() -> impl Strategy<Value = Vec<ReleaseTag>> {
    let tag = (0i64..30, proptest::option::of(0u32..20)).prop_map(|(offset, suffix)| {
        ReleaseTag::new(date("2024-07-01") + chrono::Duration::days(offset), suffix)
    });
    proptest::collection::vec(tag, 0..12)
}

proptest! {
    #[test]
    fn test_allocation_ignores_listing_order(
        (tags, shuffled) in release_tags().prop_flat_map(|tags| {
            let shuffled = Just(tags.clone()).prop_shuffle();
            (Just(tags), shuffled)
        }),
        offset in 0i64..30,
    ) {
        let today = date("2024-07-01") + chrono::Duration::days(offset);
        prop_assert_eq!(next_release_tag(&tags, today), next_release_tag(&shuffled, today));
    }

    #[test]
    fn test_allocated_tag_is_new(tags in release_tags(), offset in 0i64..30) {
        let today = date("2024-07-01") + chrono::Duration::days(offset);
        let next = next_release_tag(&tags, today);
        prop_assert_eq!(next.date, today);
        // Tags from later days aside, the allocation never collides
        if tags.iter().all(|tag| tag.date <= today) {
            prop_assert!(!tags.contains(&next));
        }
    }
}
