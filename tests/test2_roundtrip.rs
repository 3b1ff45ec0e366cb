use db_storage::DbStorageError;
use db_storage::prelude::*;
use tempfile::tempdir;

fn unique_db_location(prefix: &str) -> LogicalLocation {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    std::mem::forget(dir);
    LogicalLocation::new(format!("sqlite://{}", path.display()))
}

fn engine_with_table(prefix: &str, ddl: &str) -> StorageEngine {
    let loc = unique_db_location(prefix);
    let mut engine = StorageEngine::default();
    engine.set_persist_location(&loc).expect("location");
    engine.start_transaction().expect("begin");
    engine.execute_sql(ddl).expect("create table");
    engine.end_transaction().expect("commit");
    engine
}

#[test]
fn scalar_round_trip_per_type() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "roundtrip",
        "CREATE TABLE samples (id INTEGER, weight REAL, label TEXT)",
    );

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 7i64)?;
    engine.set_column("weight", 0.125f64)?;
    engine.set_column("label", String::from("bar"))?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 7i64)?;
    engine.set_query_where("id = :id")?;
    engine.out_column("id")?;
    engine.out_column("weight")?;
    engine.out_column("label")?;
    engine.query()?;

    assert!(engine.next()?);
    assert!(!engine.column_is_null(0)?);
    assert!(!engine.column_is_null(1)?);
    assert!(!engine.column_is_null(2)?);
    assert_eq!(engine.get_column_by_pos::<i64>(0)?, 7);
    assert_eq!(engine.get_column_by_pos::<f64>(1)?, 0.125);
    assert_eq!(engine.get_column_by_pos::<String>(2)?, "bar");
    assert!(!engine.next()?);
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn null_round_trip_regardless_of_declared_type() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "null_roundtrip",
        "CREATE TABLE samples (id INTEGER, weight REAL, label TEXT)",
    );

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 1i64)?;
    engine.set_column_to_null("weight")?;
    engine.set_column_to_null("label")?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 1i64)?;
    engine.set_query_where("id = :id")?;
    engine.out_column("weight")?;
    engine.out_column("label")?;
    engine.query()?;

    assert!(engine.next()?);
    assert!(engine.column_is_null(0)?);
    assert!(engine.column_is_null(1)?);
    // NULL reads back as the default value; callers check the flag first.
    assert_eq!(engine.get_column_by_pos::<f64>(0)?, 0.0);
    assert_eq!(engine.get_column_by_pos::<String>(1)?, "");
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn read_modes_are_equivalent() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "read_modes",
        "CREATE TABLE samples (id INTEGER, weight REAL, label TEXT)",
    );

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 3i64)?;
    engine.set_column("weight", 1.5f64)?;
    engine.set_column_to_null("label")?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 3i64)?;
    engine.set_query_where("id = :id")?;
    engine.out_column("id")?;
    engine.out_column("weight")?;
    engine.out_column("label")?;
    engine.query()?;
    assert!(engine.next()?);
    let positional = (
        engine.get_column_by_pos::<i64>(0)?,
        engine.get_column_by_pos::<f64>(1)?,
        engine.column_is_null(2)?,
    );
    assert!(!engine.next()?);
    engine.finish_query()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 3i64)?;
    engine.set_query_where("id = :id")?;
    let id = OutSlot::<i64>::new();
    let weight = OutSlot::<f64>::new();
    let label = OutSlot::<String>::new();
    engine.out_param("id", &id)?;
    engine.out_param("weight", &weight)?;
    engine.out_param("label", &label)?;
    engine.query()?;
    assert!(engine.next()?);
    assert_eq!(id.value(), positional.0);
    assert_eq!(weight.value(), positional.1);
    assert_eq!(label.is_null(), positional.2);
    assert_eq!(engine.column_is_null(2)?, positional.2);
    assert!(!engine.next()?);
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn exhausted_cursor_keeps_bound_destinations() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "exhaustion",
        "CREATE TABLE samples (id INTEGER, weight REAL)",
    );

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 9i64)?;
    engine.set_column("weight", 2.25f64)?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 9i64)?;
    engine.set_query_where("id = :id")?;
    let weight = OutSlot::<f64>::new();
    engine.out_param("weight", &weight)?;
    engine.query()?;

    assert!(engine.next()?);
    assert_eq!(weight.value(), 2.25);
    assert!(!engine.next()?);
    assert_eq!(weight.value(), 2.25, "exhaustion must not clobber the slot");
    assert!(!engine.next()?, "cursor stays exhausted");
    assert_eq!(weight.value(), 2.25);

    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn last_column_write_wins() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table("last_write", "CREATE TABLE samples (id INTEGER)");

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 1i64)?;
    engine.set_column("id", 2i64)?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.out_column("id")?;
    engine.query()?;
    assert!(engine.next()?);
    assert_eq!(engine.get_column_by_pos::<i64>(0)?, 2);
    assert!(!engine.next()?);
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn type_mismatch_on_read_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table("mismatch", "CREATE TABLE samples (id INTEGER)");

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 5i64)?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.out_column("id")?;
    engine.query()?;
    assert!(engine.next()?);
    let err = engine.get_column_by_pos::<String>(0).unwrap_err();
    assert!(matches!(err, DbStorageError::TypeMismatch { .. }));
    // The row is still current; a correctly-typed read succeeds.
    assert_eq!(engine.get_column_by_pos::<i64>(0)?, 5);
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn execute_sql_is_visible_within_the_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "execute_sql",
        "CREATE TABLE samples (id INTEGER, label TEXT)",
    );

    engine.start_transaction()?;
    engine.set_table_for_insert("samples")?;
    engine.set_column("id", 11i64)?;
    engine.set_column("label", String::from("bar"))?;
    engine.insert_row()?;
    engine.execute_sql("UPDATE samples SET label = 'foo' WHERE id = 11")?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_query("samples")?;
    engine.cond_param("id", 11i64)?;
    engine.set_query_where("id = :id")?;
    engine.out_column("label")?;
    engine.query()?;
    assert!(engine.next()?);
    assert_eq!(engine.get_column_by_pos::<String>(0)?, "foo");
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}

#[test]
fn multi_table_query_joins_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = engine_with_table(
        "multi_table",
        "CREATE TABLE obs (id INTEGER, visit INTEGER)",
    );

    engine.start_transaction()?;
    engine.execute_sql("CREATE TABLE visits (visit INTEGER, filter TEXT)")?;
    engine.execute_sql("INSERT INTO visits (visit, filter) VALUES (100, 'r')")?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_for_insert("obs")?;
    engine.set_column("id", 1i64)?;
    engine.set_column("visit", 100i64)?;
    engine.insert_row()?;
    engine.end_transaction()?;

    engine.start_transaction()?;
    engine.set_table_list_for_query(&["obs", "visits"])?;
    engine.cond_param("id", 1i64)?;
    engine.set_query_where("obs.id = :id AND obs.visit = visits.visit")?;
    engine.out_column("obs.id")?;
    engine.out_column("visits.filter")?;
    engine.query()?;
    assert!(engine.next()?);
    assert_eq!(engine.get_column_by_pos::<i64>(0)?, 1);
    assert_eq!(engine.get_column_by_pos::<String>(1)?, "r");
    assert!(!engine.next()?);
    engine.finish_query()?;
    engine.end_transaction()?;
    Ok(())
}
