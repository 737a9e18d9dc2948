use anyhow::Result as AnyResult;
use dfs_domain::entity::{Entity, EntityKey, EntityRef, same_identity};
use dfs_domain::specification::{Criteria, Specification};
use dfs_macros::{aggregate_root, entity, event};
use uuid::Uuid;

#[event]
enum StorageEvent {
    Uploaded { bytes: u64 },
    Purged,
}

#[aggregate_root(event = StorageEvent, id = Uuid)]
struct Bucket {
    quota: u64,
}

#[entity(event = StorageEvent, id = Uuid)]
struct Blob {
    bytes: u64,
}

#[test]
fn equality_follows_type_and_id() -> AnyResult<()> {
    let id = Uuid::new_v4();
    let mut a = Bucket::new(id);
    a.quota = 10;
    let mut b = Bucket::new(id);
    b.quota = 20;

    assert_eq!(a, b);
    assert_ne!(a, Bucket::new(Uuid::new_v4()));

    let blob = Blob::new(id);
    assert!(!same_identity(&a, &blob));
    assert_ne!(a.key(), blob.key());
    assert_eq!(a.key(), EntityKey::of::<Bucket>(&id));
    assert_eq!(a.key().to_string(), format!("Bucket#{id}"));
    Ok(())
}

#[test]
fn outbox_is_skipped_by_serde() -> AnyResult<()> {
    let bucket = EntityRef::new(Bucket::new(Uuid::new_v4()));
    bucket.raise(StorageEvent::Uploaded { bytes: 3 });
    bucket.raise(StorageEvent::Purged);

    let json = serde_json::to_value(&*bucket.borrow())?;
    assert!(json.get("events").is_none());

    let restored: Bucket = serde_json::from_value(json)?;
    assert_eq!(restored.id(), &bucket.id());
    assert!(restored.events().is_empty());
    assert_eq!(bucket.borrow().events().len(), 2);
    Ok(())
}

#[test]
fn specifications_compose() {
    let large = Criteria::new(|b: &Blob| b.bytes > 1024);
    let empty = Criteria::new(|b: &Blob| b.bytes == 0);
    let keep = large.or(empty).not();

    let mut blob = Blob::new(Uuid::new_v4());
    blob.bytes = 12;
    assert!(keep.is_satisfied_by(&blob));

    blob.bytes = 0;
    assert!(!keep.is_satisfied_by(&blob));
}
