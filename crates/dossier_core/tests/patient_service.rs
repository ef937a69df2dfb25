mod common;

use common::{count_rows, day, new_patient, seed_user};
use dossier_core::db::open_db_in_memory;
use dossier_core::{
    antecedent_service, medical_record_service, patient_service, BloodGroup, CreateAntecedent,
    CreateMedicalRecord, EndReason, EntityKind, PatientChanges, PatientDeletion, PatientRepository,
    ServiceError, SqlitePatientRepository,
};

#[test]
fn create_normalizes_identity_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);

    let created = service
        .create(&new_patient("  Amina Benali ", " ab100 "))
        .unwrap();

    assert_eq!(created.full_name, "Amina Benali");
    assert_eq!(created.cin, "AB100");
    assert_eq!(service.get_by_id(created.id).unwrap(), created);
}

#[test]
fn duplicate_cin_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);
    service.create(&new_patient("Amina Benali", "AB100")).unwrap();

    let err = service
        .create(&new_patient("Someone Else", "ab100"))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(count_rows(&conn, "patients"), 1);
}

#[test]
fn required_identity_fields_are_validated() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);

    let mut blank_cnss = new_patient("Amina Benali", "AB100");
    blank_cnss.cnss_number = String::new();
    let mut foreign_blood_group = new_patient("Amina Benali", "AB100");
    foreign_blood_group.blood_group = BloodGroup::Other("C+".to_string());

    for (patient, expected_field) in [
        (new_patient(" ", "AB100"), "nom_complet"),
        (new_patient("Amina Benali", ""), "cin"),
        (blank_cnss, "ass_cnss"),
        (foreign_blood_group, "groupe_sanguin"),
    ] {
        match service.create(&patient).unwrap_err() {
            ServiceError::Validation { field, .. } => assert_eq!(field, expected_field),
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(count_rows(&conn, "patients"), 0);
}

#[test]
fn care_end_before_start_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);
    let mut patient = new_patient("Amina Benali", "AB100");
    patient.care_end = Some(day(2023, 12, 31));

    let err = service.create(&patient).unwrap_err();
    assert!(matches!(err, ServiceError::Validation { field: "date_fin", .. }));

    let created = service.create(&new_patient("Amina Benali", "AB100")).unwrap();
    let err = service
        .update(
            created.id,
            &PatientChanges {
                care_end: Some(Some(day(2023, 1, 1))),
                ..PatientChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { field: "date_fin", .. }));
}

#[test]
fn update_closes_care_period() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);
    let created = service.create(&new_patient("Amina Benali", "AB100")).unwrap();

    let updated = service
        .update(
            created.id,
            &PatientChanges {
                care_end: Some(Some(day(2024, 5, 2))),
                end_reason: Some(Some(EndReason::Recovery)),
                ..PatientChanges::default()
            },
        )
        .unwrap();

    assert_eq!(updated.care_end, Some(day(2024, 5, 2)));
    assert_eq!(updated.end_reason, Some(EndReason::Recovery));
    assert_eq!(updated.cin, created.cin);
}

#[test]
fn update_to_another_patients_cin_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);
    let first = service.create(&new_patient("Amina Benali", "AB100")).unwrap();
    let second = service.create(&new_patient("Karim Tazi", "KT200")).unwrap();

    let err = service
        .update(
            second.id,
            &PatientChanges {
                cin: Some(first.cin.clone()),
                ..PatientChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let same = service
        .update(
            first.id,
            &PatientChanges {
                cin: Some("ab100".to_string()),
                ..PatientChanges::default()
            },
        )
        .unwrap();
    assert_eq!(same.cin, "AB100");
}

#[test]
fn search_matches_name_fragments_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = patient_service(&conn);
    service.create(&new_patient("Amina Benali", "AB100")).unwrap();
    service.create(&new_patient("Karim Tazi", "KT200")).unwrap();
    service.create(&new_patient("Salma Benjelloun", "SB300")).unwrap();

    let names: Vec<String> = service
        .search("ben")
        .unwrap()
        .into_iter()
        .map(|patient| patient.full_name)
        .collect();
    assert_eq!(names, vec!["Amina Benali", "Salma Benjelloun"]);

    assert!(service.search("100%").unwrap().is_empty());
    assert_eq!(service.search("  ").unwrap().len(), 3);
}

#[test]
fn delete_removes_dependents_then_patient() {
    let conn = open_db_in_memory().unwrap();
    let doctor = seed_user(&conn, "dr.alaoui");
    let service = patient_service(&conn);
    let patient = service.create(&new_patient("Amina Benali", "AB100")).unwrap();
    let bystander = service.create(&new_patient("Karim Tazi", "KT200")).unwrap();

    let antecedents = antecedent_service(&conn);
    for target in [patient.id, patient.id, bystander.id] {
        antecedents
            .create(&CreateAntecedent {
                patient_id: target,
                kind: "medical".to_string(),
                content: "Asthma".to_string(),
                created_by: doctor.id,
            })
            .unwrap();
    }
    medical_record_service(&conn)
        .create(&CreateMedicalRecord {
            patient_id: patient.id,
            category: "consultation".to_string(),
            date: day(2024, 2, 1),
            details: None,
            created_by: doctor.id,
        })
        .unwrap();

    let deletion = service.delete(patient.id).unwrap();

    assert_eq!(
        deletion,
        PatientDeletion {
            patient_id: patient.id,
            antecedents_removed: 2,
            medical_records_removed: 1,
        }
    );
    assert_eq!(count_rows(&conn, "patients"), 1);
    assert_eq!(count_rows(&conn, "antecedents"), 1);
    assert_eq!(count_rows(&conn, "medical_records"), 0);
    assert!(matches!(
        service.delete(patient.id).unwrap_err(),
        ServiceError::NotFound {
            entity: EntityKind::Patient,
            ..
        }
    ));
}

#[test]
fn store_refuses_patient_delete_while_dependents_remain() {
    let conn = open_db_in_memory().unwrap();
    let doctor = seed_user(&conn, "dr.alaoui");
    let patient = patient_service(&conn)
        .create(&new_patient("Amina Benali", "AB100"))
        .unwrap();
    antecedent_service(&conn)
        .create(&CreateAntecedent {
            patient_id: patient.id,
            kind: "allergy".to_string(),
            content: "Latex".to_string(),
            created_by: doctor.id,
        })
        .unwrap();

    let err = SqlitePatientRepository::new(&conn)
        .delete(patient.id)
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert_eq!(count_rows(&conn, "patients"), 1);
}
