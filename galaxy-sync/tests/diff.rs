use galaxy_catalog::{DetailRecord, StarCatalog};
use galaxy_scraper::StarListing;
use galaxy_sync::plan_sync;

fn listing(names: &[Option<&str>]) -> StarListing {
    StarListing {
        names: names.iter().map(|n| n.map(str::to_string)).collect(),
        colors: names.iter().map(|_| "white".to_string()).collect(),
        creation_update: names.iter().map(|_| "1.1.0".to_string()).collect(),
        users: names.iter().map(|_| "someone".to_string()).collect(),
    }
}

fn catalog(entries: &[(Option<&str>, bool)]) -> StarCatalog {
    let mut catalog = StarCatalog::new();
    for (name, has_details) in entries {
        let slot = catalog.append_star(
            name.map(str::to_string),
            "white".to_string(),
            "1.1.0".to_string(),
            "someone".to_string(),
        );
        if *has_details {
            catalog.set_detail(
                slot,
                DetailRecord {
                    seed: Some("1".to_string()),
                    ..Default::default()
                },
            );
        }
    }
    catalog
}

#[test]
fn new_stars_come_before_pending_stars() {
    // Persisted: A (detailed), B (pending). Fresh: A, B, C.
    let catalog = catalog(&[(Some("A"), true), (Some("B"), false)]);
    let fresh = listing(&[Some("A"), Some("B"), Some("C")]);

    let plan = plan_sync(&catalog, &fresh);

    assert_eq!(plan.new_stars.len(), 1);
    assert_eq!(plan.new_stars[0].name.as_deref(), Some("C"));
    let work: Vec<(&str, usize)> = plan.work.iter().map(|w| (w.name.as_str(), w.slot)).collect();
    assert_eq!(work, vec![("C", 2), ("B", 1)]);
    assert_eq!(plan.pending, 1);
}

#[test]
fn identical_listing_yields_empty_plan() {
    let catalog = catalog(&[(Some("A"), true), (Some("B"), true)]);
    let fresh = listing(&[Some("A"), Some("B")]);

    let plan = plan_sync(&catalog, &fresh);
    assert!(plan.is_empty());
}

#[test]
fn new_star_slots_follow_append_order() {
    let catalog = catalog(&[(Some("A"), true)]);
    let fresh = listing(&[Some("B"), Some("C"), Some("A"), Some("D")]);

    let plan = plan_sync(&catalog, &fresh);

    let slots: Vec<usize> = plan.work.iter().map(|w| w.slot).collect();
    assert_eq!(slots, vec![1, 2, 3]);
    let names: Vec<&str> = plan.work.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C", "D"]);
}

#[test]
fn duplicate_fresh_names_are_kept_per_occurrence() {
    let catalog = catalog(&[]);
    let fresh = listing(&[Some("X"), Some("X")]);

    let plan = plan_sync(&catalog, &fresh);

    assert_eq!(plan.new_stars.len(), 2);
    assert_eq!(plan.work.len(), 2);
    assert_eq!(plan.work[0].slot, 0);
    assert_eq!(plan.work[1].slot, 1);
}

#[test]
fn unnamed_stars_are_appended_but_never_fetched() {
    let catalog = catalog(&[]);
    let fresh = listing(&[None, Some("A")]);

    let plan = plan_sync(&catalog, &fresh);

    assert_eq!(plan.new_stars.len(), 2);
    assert_eq!(plan.new_stars[0].name, None);
    assert_eq!(plan.work.len(), 1);
    assert_eq!(plan.work[0].name, "A");
    assert_eq!(plan.work[0].slot, 1);
}

#[test]
fn persisted_unnamed_star_matches_fresh_unnamed_entry() {
    let catalog = catalog(&[(None, false), (Some("A"), true)]);
    let fresh = listing(&[None, Some("A")]);

    let plan = plan_sync(&catalog, &fresh);
    // The unnamed persisted star is not pending (no name to fetch by) and
    // the unnamed fresh entry is not new.
    assert!(plan.is_empty());
}

#[test]
fn pending_stars_keep_persisted_order() {
    let catalog = catalog(&[
        (Some("A"), false),
        (Some("B"), true),
        (Some("C"), false),
    ]);
    let fresh = listing(&[Some("A"), Some("B"), Some("C")]);

    let plan = plan_sync(&catalog, &fresh);

    let work: Vec<(&str, usize)> = plan.work.iter().map(|w| (w.name.as_str(), w.slot)).collect();
    assert_eq!(work, vec![("A", 0), ("C", 2)]);
    assert_eq!(plan.pending, 2);
}
