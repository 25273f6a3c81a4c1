// Integration tests for the catalog stores on a file-backed database

use lecatalogue::{
    refresh_alt_part_ids, refresh_category_counts, CategoryRecord, CategoryStore, LazyStorage,
    PartField, PartRecord, PartStore, Predicate, RelationshipKind, RelationshipRecord,
    RelationshipStore, Storage, StorageConfig,
};
use tempfile::NamedTempFile;

fn seed(storage: &Storage) {
    let categories = CategoryStore::new(storage);
    categories.upsert(&CategoryRecord::new("5", "Bricks", None)).unwrap();
    categories.upsert(&CategoryRecord::new("9", "Plates", None)).unwrap();
    categories.upsert(&CategoryRecord::new("9a", "Plates 2 wide", Some("9"))).unwrap();

    PartStore::new(storage)
        .batch_upsert(&[
            PartRecord::new("3001", "Brick 2 x 4").with_ba_category("5"),
            PartRecord::new("3001old", "Brick 2 x 4 early").with_ba_category("5"),
            PartRecord::new("3020", "Plate 2 x 4").with_ba_category("9a"),
            PartRecord::new("3795", "Plate 2 x 6").with_ba_category("9a"),
        ])
        .unwrap();

    RelationshipStore::new(storage)
        .batch_insert(&[
            RelationshipRecord::new(RelationshipKind::MoldVariant, "3001", "3001old"),
            RelationshipRecord::new(RelationshipKind::Alternate, "3020", "3795"),
        ])
        .unwrap();
}

#[test]
fn test_maintenance_then_filtered_read() {
    let temp_file = NamedTempFile::new().unwrap();
    let storage = Storage::open(temp_file.path()).unwrap();
    seed(&storage);

    refresh_alt_part_ids(&storage).unwrap();
    refresh_category_counts(&storage).unwrap();

    let parts = PartStore::new(&storage);
    let cross_referenced =
        parts.find(&Predicate::Contains(PartField::AltPartIds, "3001".to_string())).unwrap();
    let ids: Vec<&str> = cross_referenced.iter().map(|p| p.part.part_num.as_str()).collect();
    assert_eq!(ids, vec!["3001", "3001old"]);

    let plates = CategoryStore::new(&storage).get("9").unwrap().unwrap();
    assert_eq!(plates.parts_count, 2);
}

#[test]
fn test_lazy_storage_sees_seeded_file() {
    let temp_file = NamedTempFile::new().unwrap();
    {
        let storage = Storage::open(temp_file.path()).unwrap();
        seed(&storage);
    }

    let lazy = LazyStorage::new(StorageConfig {
        db_path: temp_file.path().to_string_lossy().into_owned(),
        ..StorageConfig::default()
    });
    let shared = lazy.get().unwrap();
    let storage = shared.lock().unwrap();

    let in_plates = Predicate::In(PartField::BaCategory, vec!["9".to_string(), "9a".to_string()]);
    assert_eq!(PartStore::new(&storage).count(&in_plates).unwrap(), 2);
}

#[test]
fn test_predicate_matches_agrees_with_sql() {
    let storage = Storage::open_in_memory().unwrap();
    seed(&storage);
    let parts = PartStore::new(&storage);

    let filters = [
        Predicate::StartsWith(PartField::PartNum, "30".to_string()),
        Predicate::all([
            Predicate::Contains(PartField::Name, "2 X 4".to_string()),
            Predicate::NotEquals(PartField::PartNum, "3001".to_string()),
        ]),
        Predicate::negate(Predicate::Contains(PartField::BaName, "anything".to_string())),
        Predicate::any([
            Predicate::Equals(PartField::BaCategory, "5".to_string()),
            Predicate::In(PartField::BaCategory, vec![]),
        ]),
    ];

    let everything = parts.find(&Predicate::And(vec![])).unwrap();
    for filter in &filters {
        let via_sql: Vec<String> = parts
            .find(filter)
            .unwrap()
            .into_iter()
            .map(|p| p.part.part_num)
            .collect();
        let in_memory: Vec<String> = everything
            .iter()
            .filter(|p| filter.matches(&p.part))
            .map(|p| p.part.part_num.clone())
            .collect();
        assert_eq!(via_sql, in_memory, "disagreement for {:?}", filter);
    }
}
