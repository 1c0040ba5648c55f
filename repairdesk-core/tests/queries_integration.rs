//! Reports and maintenance statements against the seeded SQLite fixture.

#![cfg(feature = "sqlite")]

mod common;

use common::{count, fixture_adapter, query, reflect};
use repairdesk_core::queries;
use repairdesk_core::{DatabaseAdapter, Result};
use serde_json::json;

#[tokio::test]
async fn test_device_reports() -> Result<()> {
    let adapter = fixture_adapter(true).await;
    let schema = reflect(&adapter).await;
    let mut session = adapter.begin().await?;

    let private = session
        .fetch_all(&queries::devices_of_private_customer(&schema, "Mario", "Rossi")?)
        .await?;
    assert_eq!(private.len(), 1);
    assert_eq!(
        private[0].to_string(),
        "{idDispositivo: 1, marca: Samsung, modello: Galaxy S21}"
    );

    let business = session
        .fetch_all(&queries::devices_of_business_customer(&schema, "Bianchi Srl")?)
        .await?;
    assert_eq!(business.len(), 1);
    assert_eq!(business[0].get("modello"), Some(&json!("ThinkPad T14")));

    let nobody = session
        .fetch_all(&queries::devices_of_business_customer(&schema, "Nessuno Spa")?)
        .await?;
    assert!(nobody.is_empty());

    session.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_appointment_reports_are_ordered_by_date() -> Result<()> {
    let adapter = fixture_adapter(true).await;
    let schema = reflect(&adapter).await;
    let mut session = adapter.begin().await?;

    let dates = session
        .fetch_all(&queries::appointments_of_private_customer(&schema, "Mario", "Rossi")?)
        .await?;
    let dates: Vec<_> = dates.iter().filter_map(|r| r.get("dataOra")).collect();
    assert_eq!(
        dates,
        vec![&json!("2024-01-15 10:30:00"), &json!("2024-01-16 10:00:00")]
    );

    let business = session
        .fetch_all(&queries::appointments_of_business_customer(&schema, "Bianchi Srl")?)
        .await?;
    assert!(business.is_empty());

    let joined = session
        .fetch_all(&queries::repairs_with_appointment(&schema)?)
        .await?;
    assert_eq!(joined.len(), 2);
    assert_eq!(
        joined[0].to_string(),
        "{nome: Mario, cognome: Rossi, marca: Samsung, modello: Galaxy S21, \
         idRiparazione: 1, stato: Aperta, dataOra: 2024-01-15 10:30:00}"
    );

    let with_exists = session
        .fetch_all(&queries::repairs_with_appointment_exists(&schema)?)
        .await?;
    assert_eq!(with_exists.len(), 1);
    assert_eq!(with_exists[0].get("idRiparazione"), Some(&json!(1)));
    assert_eq!(with_exists[0].len(), 5);

    session.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_update_repair_status() -> Result<()> {
    let adapter = fixture_adapter(true).await;
    let schema = reflect(&adapter).await;

    let mut session = adapter.begin().await?;
    let updated = session
        .execute(&queries::update_repair_status(&schema, 2, "Completata")?)
        .await?;
    let missing = session
        .execute(&queries::update_repair_status(&schema, 99, "Completata")?)
        .await?;
    session.commit().await?;

    assert_eq!(updated.rows_affected, 1);
    assert_eq!(missing.rows_affected, 0);

    let rows = query(&adapter, "SELECT stato FROM Riparazione WHERE idRiparazione = 2").await;
    assert_eq!(rows[0].get("stato"), Some(&json!("Completata")));
    Ok(())
}

#[tokio::test]
async fn test_delete_repair_removes_its_appointments() -> Result<()> {
    let adapter = fixture_adapter(true).await;
    let schema = reflect(&adapter).await;
    let (appointments, repair) = queries::delete_repair(&schema, 1)?;

    let mut session = adapter.begin().await?;
    let removed_appointments = session.execute(&appointments).await?;
    let removed_repairs = session.execute(&repair).await?;
    session.commit().await?;

    assert_eq!(removed_appointments.rows_affected, 2);
    assert_eq!(removed_repairs.rows_affected, 1);
    assert_eq!(count(&adapter, "Appuntamento").await, 0);
    assert_eq!(count(&adapter, "Riparazione").await, 1);
    Ok(())
}
