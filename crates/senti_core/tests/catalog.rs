use pretty_assertions::assert_eq;
use senti_core::{
    build_catalog, suggest, AutocompleteEngine, Catalog, ProductDataset, ProductEntry,
    SUGGESTION_LIMIT,
};

const DATASET: &str = r#"{
    "Smartphones": [
        {"brand": "Apple", "products": ["IPhone 15", "IPhone 15 Pro", "IPhone 14"]},
        {"brand": "Samsung", "products": ["Galaxy S24", "Galaxy Z Flip 5"]}
    ],
    "Laptops": [
        {"brand": "Apple", "products": ["MacBook Air M3", "MacBook Pro 14"]},
        {"brand": "Dell", "products": ["XPS 13", "XPS 15", "Inspiron 14"]}
    ],
    "Headphones": [
        {"brand": "Sony", "products": ["WH-1000XM5"]}
    ]
}"#;

fn catalog() -> Catalog {
    let dataset = ProductDataset::from_json(DATASET).expect("dataset parses");
    build_catalog(dataset.entries())
}

#[test]
fn catalog_flattens_brand_and_product_in_dataset_order() {
    let catalog = catalog();
    assert_eq!(
        catalog.names(),
        &[
            "Apple IPhone 15",
            "Apple IPhone 15 Pro",
            "Apple IPhone 14",
            "Samsung Galaxy S24",
            "Samsung Galaxy Z Flip 5",
            "Apple MacBook Air M3",
            "Apple MacBook Pro 14",
            "Dell XPS 13",
            "Dell XPS 15",
            "Dell Inspiron 14",
            "Sony WH-1000XM5",
        ]
    );
}

#[test]
fn duplicate_products_are_kept() {
    let entries = vec![
        ProductEntry {
            brand: "Apple".to_string(),
            products: vec!["IPhone 15".to_string()],
        },
        ProductEntry {
            brand: "Apple".to_string(),
            products: vec!["IPhone 15".to_string()],
        },
    ];
    let catalog = build_catalog(&entries);
    assert_eq!(catalog.len(), 2);
    assert_eq!(suggest("iphone", &catalog).len(), 2);
}

#[test]
fn empty_input_has_no_suggestions() {
    assert!(suggest("", &catalog()).is_empty());
}

#[test]
fn matching_is_case_insensitive_substring() {
    let catalog = catalog();
    assert_eq!(
        suggest("xps", &catalog),
        vec!["Dell XPS 13".to_string(), "Dell XPS 15".to_string()]
    );
    // Not anchored at the start of the name.
    assert_eq!(
        suggest("1000xm", &catalog),
        vec!["Sony WH-1000XM5".to_string()]
    );
    assert!(suggest("pixel", &catalog).is_empty());
}

#[test]
fn suggestions_are_capped_in_catalog_order() {
    let catalog = catalog();
    let hits = suggest("a", &catalog);
    assert_eq!(hits.len(), SUGGESTION_LIMIT);
    assert_eq!(hits[0], "Apple IPhone 15");
    assert_eq!(hits[6], "Apple MacBook Pro 14");
}

#[test]
fn every_suggestion_contains_the_input() {
    let catalog = catalog();
    for input in ["a", "A", "14", "galaxy", " ", "Pro", "zzz", "-"] {
        let hits = suggest(input, &catalog);
        assert!(hits.len() <= SUGGESTION_LIMIT);
        for hit in hits {
            assert!(
                hit.to_lowercase().contains(&input.to_lowercase()),
                "{hit:?} does not contain {input:?}"
            );
        }
    }
}

#[test]
fn engine_is_idempotent() {
    let engine = AutocompleteEngine::from_dataset(
        &ProductDataset::from_json(DATASET).expect("dataset parses"),
    );
    assert_eq!(engine.suggest("mac"), engine.suggest("mac"));
    assert_eq!(engine.catalog().len(), 11);
}

#[test]
fn malformed_category_is_reported() {
    let err = ProductDataset::from_json(r#"{"Phones": {"brand": "Apple"}}"#).unwrap_err();
    assert!(err.to_string().contains("Phones"));
    assert!(ProductDataset::from_json("not json").is_err());
}
