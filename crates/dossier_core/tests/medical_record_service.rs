mod common;

use common::{day, seed_patient, seed_user};
use dossier_core::db::open_db_in_memory;
use dossier_core::{
    medical_record_service, CreateMedicalRecord, EntityId, EntityKind, MedicalRecordChanges,
    ServiceError,
};

fn record(
    patient_id: EntityId,
    created_by: EntityId,
    category: &str,
    date: (i32, u32, u32),
) -> CreateMedicalRecord {
    CreateMedicalRecord {
        patient_id,
        category: category.to_string(),
        date: day(date.0, date.1, date.2),
        details: Some("Routine follow-up".to_string()),
        created_by,
    }
}

#[test]
fn records_list_by_date_then_filter_by_category() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let doctor = seed_user(&conn, "dr.alaoui");
    let service = medical_record_service(&conn);

    let january = service
        .create(&record(patient.id, doctor.id, "consultation", (2024, 1, 10)))
        .unwrap();
    let march = service
        .create(&record(patient.id, doctor.id, " bilan ", (2024, 3, 5)))
        .unwrap();
    let february = service
        .create(&record(patient.id, doctor.id, "consultation", (2024, 2, 20)))
        .unwrap();

    assert_eq!(march.category, "bilan");
    let all: Vec<EntityId> = service
        .get_by_patient_id(patient.id)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(all, vec![march.id, february.id, january.id]);

    let consultations = service
        .get_by_patient_and_category(patient.id, "consultation")
        .unwrap();
    assert_eq!(consultations, vec![february, january]);
}

#[test]
fn both_listings_check_the_patient() {
    let conn = open_db_in_memory().unwrap();
    let service = medical_record_service(&conn);

    for err in [
        service.get_by_patient_id(31).unwrap_err(),
        service.get_by_patient_and_category(31, "bilan").unwrap_err(),
    ] {
        assert!(matches!(
            err,
            ServiceError::NotFound {
                entity: EntityKind::Patient,
                id: 31
            }
        ));
    }
}

#[test]
fn blank_details_are_stored_as_absent_and_can_be_cleared() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let doctor = seed_user(&conn, "dr.alaoui");
    let service = medical_record_service(&conn);

    let mut command = record(patient.id, doctor.id, "consultation", (2024, 1, 10));
    command.details = Some("   ".to_string());
    let created = service.create(&command).unwrap();
    assert_eq!(created.details, None);

    let detailed = service
        .update(
            created.id,
            &MedicalRecordChanges {
                details: Some(Some("BP 12/8".to_string())),
                date: Some(day(2024, 1, 11)),
                ..MedicalRecordChanges::default()
            },
        )
        .unwrap();
    assert_eq!(detailed.details.as_deref(), Some("BP 12/8"));
    assert_eq!(detailed.date, day(2024, 1, 11));

    let cleared = service
        .update(
            created.id,
            &MedicalRecordChanges {
                details: Some(None),
                ..MedicalRecordChanges::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.details, None);
    assert_eq!(cleared.category, "consultation");
}

#[test]
fn blank_category_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let doctor = seed_user(&conn, "dr.alaoui");
    let service = medical_record_service(&conn);

    let err = service
        .create(&record(patient.id, doctor.id, " ", (2024, 1, 10)))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { field: "category", .. }));

    let err = service
        .update(
            999,
            &MedicalRecordChanges {
                category: Some(" ".to_string()),
                ..MedicalRecordChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::MedicalRecord,
            id: 999
        }
    ));
}

#[test]
fn delete_and_bulk_delete() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let doctor = seed_user(&conn, "dr.alaoui");
    let service = medical_record_service(&conn);
    let first = service
        .create(&record(patient.id, doctor.id, "consultation", (2024, 1, 10)))
        .unwrap();
    service
        .create(&record(patient.id, doctor.id, "bilan", (2024, 1, 12)))
        .unwrap();

    service.delete(first.id).unwrap();
    assert!(matches!(
        service.delete(first.id).unwrap_err(),
        ServiceError::NotFound {
            entity: EntityKind::MedicalRecord,
            ..
        }
    ));
    assert_eq!(service.delete_all_for_patient(patient.id).unwrap(), 1);
    assert_eq!(service.delete_all_for_patient(patient.id).unwrap(), 0);
}
