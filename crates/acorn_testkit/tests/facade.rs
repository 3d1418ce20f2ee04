//! Cross-crate integration tests for the bucket facade.

use acorn_core::{CoreError, CursorEntry, Entry};
use acorn_testkit::{with_temp_db, TestDatabase};
use serde_json::{json, Value};

#[test]
fn ensure_put_view_roundtrip() {
    with_temp_db(|db| {
        db.ensure_bucket("users").unwrap();

        db.update(|tx| {
            let users = tx.bucket("users")?.unwrap();
            users.put("u1", &json!({"name": "Ada"}))
        })
        .unwrap();

        let found = db
            .view(|tx| tx.bucket("users")?.unwrap().get::<Value>("u1"))
            .unwrap();
        assert_eq!(found, Entry::Value(json!({"name": "Ada"})));
    });
}

#[test]
fn cursor_walks_keys_in_byte_order() {
    with_temp_db(|db| {
        db.ensure_bucket("b").unwrap();
        db.update(|tx| {
            let b = tx.bucket("b")?.unwrap();
            for key in ["delta", "alpha", "echo", "bravo", "charlie"] {
                b.put(key, &json!(key))?;
            }
            Ok(())
        })
        .unwrap();

        db.view(|tx| {
            let b = tx.bucket("b")?.unwrap();
            let mut cursor = b.cursor();
            let mut keys = Vec::new();
            let mut entry = cursor.first::<Value>()?;
            while let Some(e) = entry {
                keys.push(e.key().to_string());
                entry = cursor.next::<Value>()?;
            }
            assert_eq!(keys, ["alpha", "bravo", "charlie", "delta", "echo"]);

            // Backward traversal is the exact reverse.
            let mut back = Vec::new();
            let mut entry = cursor.last::<Value>()?;
            while let Some(e) = entry {
                back.push(e.key().to_string());
                entry = cursor.prev::<Value>()?;
            }
            keys.reverse();
            assert_eq!(back, keys);
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn cursor_surfaces_nested_bucket() {
    with_temp_db(|db| {
        db.update(|tx| {
            let b = tx.create_bucket_if_absent("b")?;
            b.put("a", &json!(1))?;
            b.create_bucket_if_absent("c")?;
            Ok(())
        })
        .unwrap();

        db.view(|tx| {
            let b = tx.bucket("b")?.unwrap();
            let mut cursor = b.cursor();

            let first = cursor.first::<Value>()?.unwrap();
            assert_eq!(
                first,
                CursorEntry::Value {
                    key: "a".to_string(),
                    value: json!(1)
                }
            );

            let second = cursor.next::<Value>()?.unwrap();
            assert_eq!(
                second,
                CursorEntry::Bucket {
                    key: "c".to_string()
                }
            );

            // Traversal can continue past the bucket marker.
            assert!(cursor.next::<Value>()?.is_none());
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn fresh_cursor_steps_from_the_extrema() {
    with_temp_db(|db| {
        db.ensure_bucket("b").unwrap();
        db.update(|tx| {
            let b = tx.bucket("b")?.unwrap();
            b.put("alpha", &json!(1))?;
            b.put("omega", &json!(2))
        })
        .unwrap();

        db.view(|tx| {
            let b = tx.bucket("b")?.unwrap();

            // next() without prior positioning starts at the first entry.
            let mut cursor = b.cursor();
            let entry = cursor.next::<Value>()?.unwrap();
            assert_eq!(entry.key(), "alpha");

            // prev() without prior positioning starts at the last entry.
            let mut cursor = b.cursor();
            let entry = cursor.prev::<Value>()?.unwrap();
            assert_eq!(entry.key(), "omega");

            // The empty key precedes every key, so seeking it also lands
            // on the first entry.
            let mut cursor = b.cursor();
            let entry = cursor.seek::<Value>("")?.unwrap();
            assert_eq!(entry.key(), "alpha");
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn seek_lands_on_successor() {
    with_temp_db(|db| {
        db.ensure_bucket("b").unwrap();
        db.update(|tx| {
            let b = tx.bucket("b")?.unwrap();
            b.put("a", &json!("a"))?;
            b.put("c", &json!("c"))
        })
        .unwrap();

        db.view(|tx| {
            let b = tx.bucket("b")?.unwrap();
            let mut cursor = b.cursor();

            let hit = cursor.seek::<Value>("b")?.unwrap();
            assert_eq!(hit.key(), "c");

            // Exact hit lands on the key itself.
            let hit = cursor.seek::<Value>("a")?.unwrap();
            assert_eq!(hit.key(), "a");

            // Nothing at or after the target.
            assert!(cursor.seek::<Value>("zzz")?.is_none());
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn seek_can_land_on_bucket_and_continue() {
    with_temp_db(|db| {
        db.update(|tx| {
            let b = tx.create_bucket_if_absent("b")?;
            b.create_bucket_if_absent("m")?;
            b.put("z", &json!("z"))?;
            Ok(())
        })
        .unwrap();

        db.view(|tx| {
            let b = tx.bucket("b")?.unwrap();
            let mut cursor = b.cursor();

            let hit = cursor.seek::<Value>("k")?.unwrap();
            assert_eq!(
                hit,
                CursorEntry::Bucket {
                    key: "m".to_string()
                }
            );

            // The returned key lets traversal skip the bucket.
            let hit = cursor.next::<Value>()?.unwrap();
            assert_eq!(hit.key(), "z");
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn cursor_delete_removes_current_entry() {
    with_temp_db(|db| {
        db.ensure_bucket("b").unwrap();
        db.update(|tx| {
            let b = tx.bucket("b")?.unwrap();
            b.put("a", &json!(1))?;
            b.put("b", &json!(2))?;
            b.put("c", &json!(3))?;

            let mut cursor = b.cursor();
            cursor.first::<Value>()?;
            let entry = cursor.next::<Value>()?.unwrap();
            assert_eq!(entry.key(), "b");
            cursor.delete()?;

            // Relative movement from the deleted key's position.
            let entry = cursor.next::<Value>()?.unwrap();
            assert_eq!(entry.key(), "c");
            Ok(())
        })
        .unwrap();

        let found = db
            .view(|tx| tx.bucket("b")?.unwrap().get::<Value>("b"))
            .unwrap();
        assert_eq!(found, Entry::Absent);
    });
}

#[test]
fn cursor_delete_requires_position_and_write_mode() {
    with_temp_db(|db| {
        db.ensure_bucket("b").unwrap();
        db.update(|tx| {
            let b = tx.bucket("b")?.unwrap();
            b.put("a", &json!(1))?;

            let mut cursor = b.cursor();
            let err = cursor.delete().unwrap_err();
            assert!(matches!(err, CoreError::CursorNotPositioned));

            // Deleting twice: the second call finds the entry gone.
            cursor.first::<Value>()?;
            cursor.delete()?;
            let err = cursor.delete().unwrap_err();
            assert!(matches!(err, CoreError::CursorNotPositioned));
            Ok(())
        })
        .unwrap();

        db.update(|tx| {
            tx.bucket("b")?.unwrap().put("a", &json!(1))
        })
        .unwrap();

        let err = db
            .view(|tx| {
                let mut cursor = tx.bucket("b")?.unwrap().cursor();
                cursor.first::<Value>()?;
                cursor.delete()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::ReadOnlyTransaction));
    });
}

#[test]
fn cursor_delete_rejects_bucket_marker() {
    with_temp_db(|db| {
        db.update(|tx| {
            let b = tx.create_bucket_if_absent("b")?;
            b.create_bucket_if_absent("child")?;

            let mut cursor = b.cursor();
            cursor.first::<Value>()?;
            let err = cursor.delete().unwrap_err();
            assert!(matches!(err, CoreError::KeyHoldsBucket { .. }));
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn nested_buckets_are_independent_namespaces() {
    with_temp_db(|db| {
        db.update(|tx| {
            let outer = tx.create_bucket_if_absent("outer")?;
            let inner = outer.create_bucket_if_absent("inner")?;
            outer.put("k", &json!("outer value"))?;
            inner.put("k", &json!("inner value"))?;
            Ok(())
        })
        .unwrap();

        db.view(|tx| {
            let outer = tx.bucket("outer")?.unwrap();
            let inner = outer.bucket("inner")?.unwrap();
            assert_eq!(
                outer.get::<Value>("k")?,
                Entry::Value(json!("outer value"))
            );
            assert_eq!(
                inner.get::<Value>("k")?,
                Entry::Value(json!("inner value"))
            );
            Ok(())
        })
        .unwrap();
    });
}

#[test]
fn sequence_survives_reopen() {
    let test_db = TestDatabase::new();
    test_db.ensure_bucket("jobs").unwrap();

    let mut issued: Vec<u64> = Vec::new();
    for _ in 0..3 {
        let token = test_db
            .update(|tx| tx.bucket("jobs")?.unwrap().next_id())
            .unwrap();
        issued.push(u64::from_str_radix(&token, 32).unwrap());
    }

    let test_db = test_db.reopen();
    for _ in 0..3 {
        let token = test_db
            .update(|tx| tx.bucket("jobs")?.unwrap().next_id())
            .unwrap();
        issued.push(u64::from_str_radix(&token, 32).unwrap());
    }

    assert!(issued.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn sequences_are_per_bucket() {
    with_temp_db(|db| {
        db.ensure_bucket("a").unwrap();
        db.ensure_bucket("b").unwrap();

        let (a1, b1, a2) = db
            .update(|tx| {
                let a = tx.bucket("a")?.unwrap();
                let b = tx.bucket("b")?.unwrap();
                Ok((a.next_id()?, b.next_id()?, a.next_id()?))
            })
            .unwrap();

        assert_eq!(a1, "1");
        assert_eq!(b1, "1"); // independent counter
        assert_eq!(a2, "2");
    });
}

#[test]
fn readers_observe_a_snapshot() {
    with_temp_db(|db| {
        db.ensure_bucket("users").unwrap();

        db.view(|tx| {
            let users = tx.bucket("users")?.unwrap();
            assert_eq!(users.get::<Value>("u1")?, Entry::Absent);

            // Commit a write while the read transaction is open.
            db.update(|wtx| {
                wtx.bucket("users")?.unwrap().put("u1", &json!({"name": "Ada"}))
            })?;

            // The snapshot predates the commit.
            assert_eq!(users.get::<Value>("u1")?, Entry::Absent);
            Ok(())
        })
        .unwrap();

        // A fresh read transaction sees the committed write.
        let found = db
            .view(|tx| tx.bucket("users")?.unwrap().get::<Value>("u1"))
            .unwrap();
        assert_eq!(found, Entry::Value(json!({"name": "Ada"})));
    });
}

#[test]
fn committed_data_survives_reopen() {
    let test_db = TestDatabase::new();
    test_db.ensure_bucket("users").unwrap();
    test_db
        .update(|tx| tx.bucket("users")?.unwrap().put("u1", &json!({"name": "Ada"})))
        .unwrap();

    let test_db = test_db.reopen();
    let found = test_db
        .view(|tx| tx.bucket("users")?.unwrap().get::<Value>("u1"))
        .unwrap();
    assert_eq!(found, Entry::Value(json!({"name": "Ada"})));
}

#[test]
fn bucket_ids_survive_reopen() {
    let test_db = TestDatabase::new();
    test_db
        .update(|tx| {
            tx.create_bucket_if_absent("first")?;
            Ok(())
        })
        .unwrap();

    // New buckets created after reopen must not collide with old ones.
    let test_db = test_db.reopen();
    test_db
        .update(|tx| {
            tx.create_bucket_if_absent("second")?;
            let first = tx.bucket("first")?.unwrap();
            let second = tx.bucket("second")?.unwrap();
            first.put("k", &json!("first"))?;
            second.put("k", &json!("second"))?;
            Ok(())
        })
        .unwrap();

    test_db
        .view(|tx| {
            let first = tx.bucket("first")?.unwrap();
            let second = tx.bucket("second")?.unwrap();
            assert_eq!(first.get::<Value>("k")?, Entry::Value(json!("first")));
            assert_eq!(second.get::<Value>("k")?, Entry::Value(json!("second")));
            Ok(())
        })
        .unwrap();
}
