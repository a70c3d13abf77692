//! Search and filter tests for the calculator list

use medcalc::calculator::{CalculatorForm, CalculatorRecord, Category};
use medcalc::error::FilterError;
use medcalc::listing::{ListFilter, ListView, filter_calculators, matches_search};
use medcalc::store::{CalculatorStore, MemoryStore};

fn record(id: &str, name: &str, short: &str, popular: bool, recent: bool) -> CalculatorRecord {
    CalculatorRecord {
        id: id.to_string(),
        form: CalculatorForm {
            name: name.to_string(),
            short_description: short.to_string(),
            category: Category {
                popular,
                recently_added: recent,
            },
            ..Default::default()
        },
    }
}

fn sample() -> Vec<CalculatorRecord> {
    vec![
        record("1", "BMI", "Body mass index", true, false),
        record("2", "eGFR", "Kidney function", false, true),
        record("3", "Anion Gap", "Acid-base status", true, true),
    ]
}

fn ids(records: Vec<&CalculatorRecord>) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_search_is_case_insensitive() {
    let records = sample();
    assert!(matches_search(&records[0], "bmi"));
    assert!(matches_search(&records[0], "MASS"));
    assert!(matches_search(&records[1], "kidney"));
    assert!(!matches_search(&records[1], "mass"));
    assert!(matches_search(&records[2], ""));
}

#[test]
fn test_empty_search_all_filter_returns_everything() {
    let records = sample();
    assert_eq!(ids(filter_calculators(&records, "", ListFilter::All)), vec!["1", "2", "3"]);
}

#[test]
fn test_popular_filter_without_search() {
    let records = sample();
    assert_eq!(ids(filter_calculators(&records, "", ListFilter::Popular)), vec!["1", "3"]);
    assert_eq!(ids(filter_calculators(&records, "", ListFilter::Recent)), vec!["2", "3"]);
}

#[test]
fn test_search_and_filter_intersect() {
    let records = sample();
    assert_eq!(ids(filter_calculators(&records, "a", ListFilter::Recent)), vec!["3"]);
    assert!(filter_calculators(&records, "kidney", ListFilter::Popular).is_empty());
}

#[test]
fn test_filter_parsing() {
    assert_eq!("".parse::<ListFilter>().unwrap(), ListFilter::All);
    assert_eq!("all".parse::<ListFilter>().unwrap(), ListFilter::All);
    assert_eq!("Popular".parse::<ListFilter>().unwrap(), ListFilter::Popular);
    assert_eq!("recent".parse::<ListFilter>().unwrap(), ListFilter::Recent);
    assert_eq!(
        "newest".parse::<ListFilter>(),
        Err(FilterError::Unknown("newest".to_string()))
    );
    assert_eq!(
        "Newest".parse::<ListFilter>().unwrap_err().to_string(),
        "Unknown filter 'newest'"
    );
    assert_eq!(ListFilter::Recent.label(), "Recently Added");
}

#[tokio::test]
async fn test_list_view_load_and_delete() {
    let store = MemoryStore::new();
    let bmi = store
        .create(record("", "BMI", "Body mass index", true, false).form.to_document())
        .await
        .unwrap();
    store
        .create(record("", "eGFR", "Kidney function", false, true).form.to_document())
        .await
        .unwrap();

    let mut view = ListView::load(&store).await.unwrap();
    assert_eq!(view.records.len(), 2);

    let popular = view.visible("", ListFilter::Popular);
    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0].name, "BMI");
    assert_eq!(popular[0].id, bmi);

    view.delete(&store, &bmi).await.unwrap();
    assert_eq!(view.records.len(), 1);
    assert!(store.get(&bmi).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_view_is_a_snapshot() {
    let store = MemoryStore::new();
    let view = ListView::load(&store).await.unwrap();
    store
        .create(record("", "BMI", "", false, false).form.to_document())
        .await
        .unwrap();
    assert!(view.visible("", ListFilter::All).is_empty());
}
