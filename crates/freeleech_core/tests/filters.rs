use freeleech_core::{bytes_to_gb, CategoryFilter, SizeBounds, SizeDescriptor, SizeVerdict};

const GB: u64 = 1024 * 1024 * 1024;

#[test]
fn empty_category_filter_matches_everything() {
    let filter = CategoryFilter::new(Vec::<String>::new());
    assert!(!filter.is_active());
    assert!(filter.matches("Anything"));
}

#[test]
fn category_filter_is_case_insensitive_substring() {
    let filter = CategoryFilter::new(["pc-iso", "Episodes"]);
    assert!(filter.is_active());
    assert!(filter.matches("PC-ISO"));
    assert!(filter.matches("TV :: Episodes HD"));
    assert!(!filter.matches("Movies :: Bluray"));
    assert!(!filter.matches("Unknown"));
}

#[test]
fn blank_terms_are_dropped() {
    let filter = CategoryFilter::new(["  ", ""]);
    assert!(!filter.is_active());
    assert_eq!(filter.terms(), &[] as &[String]);
}

#[test]
fn single_item_size_is_its_length() {
    let size = SizeDescriptor::Single { length: 3 * GB };
    assert_eq!(size.total_bytes(), Some(3 * GB));
    assert_eq!(size.gigabytes(), Some(3.0));
}

#[test]
fn multi_item_size_is_the_sum() {
    let size = SizeDescriptor::Multi {
        lengths: vec![GB / 2, GB / 4, GB / 4],
    };
    assert_eq!(size.total_bytes(), Some(GB));
    assert_eq!(size.gigabytes(), Some(1.0));
    assert_eq!(SizeDescriptor::Multi { lengths: vec![] }.gigabytes(), Some(0.0));
    assert_eq!(bytes_to_gb(GB / 2), 0.5);
}

#[test]
fn overflowing_multi_item_size_has_no_total() {
    let size = SizeDescriptor::Multi {
        lengths: vec![u64::MAX, 1],
    };
    assert_eq!(size.total_bytes(), None);
    assert_eq!(size.gigabytes(), None);
}

#[test]
fn size_bounds_reject_outside_window() {
    let bounds = SizeBounds {
        min_gb: Some(1.0),
        max_gb: Some(10.0),
    };
    assert!(bounds.is_active());
    assert_eq!(
        bounds.judge(Some(0.5)),
        SizeVerdict::TooSmall {
            size_gb: 0.5,
            min_gb: 1.0
        }
    );
    assert_eq!(
        bounds.judge(Some(12.0)),
        SizeVerdict::TooLarge {
            size_gb: 12.0,
            max_gb: 10.0
        }
    );
    assert_eq!(bounds.judge(Some(1.0)), SizeVerdict::Accept { size_gb: 1.0 });
    assert_eq!(bounds.judge(Some(10.0)), SizeVerdict::Accept { size_gb: 10.0 });
}

#[test]
fn unknown_size_is_never_rejected() {
    let bounds = SizeBounds {
        min_gb: Some(1.0),
        max_gb: None,
    };
    let verdict = bounds.judge(None);
    assert_eq!(verdict, SizeVerdict::Unknown);
    assert!(!verdict.is_rejected());
    assert!(!SizeBounds::default().is_active());
}
