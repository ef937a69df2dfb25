mod common;

use common::{new_patient, seed_patient, RecordingExecutor};
use dossier_core::db::open_db_in_memory;
use dossier_core::{
    antecedent_service, Antecedent, AntecedentChanges, AntecedentType, CrudRepository, NewAntecedent, Patient,
    PatientChanges, RepoError, RowMapError,
};
use rusqlite::Connection;

#[test]
fn create_returns_store_assigned_id_and_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    let first = crud.create(&new_patient("Amina Benali", "AB100")).unwrap();
    let second = crud.create(&new_patient("Karim Tazi", "KT200")).unwrap();

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(crud.find_by_id(first.id).unwrap(), Some(first));
}

#[test]
fn find_by_id_returns_none_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    assert_eq!(crud.find_by_id(9999).unwrap(), None);
}

#[test]
fn update_touches_only_supplied_columns() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    let updated = crud
        .update(
            patient.id,
            &PatientChanges {
                profession: Some(Some("Enseignante".to_string())),
                phone: Some(None),
                ..PatientChanges::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.profession.as_deref(), Some("Enseignante"));
    assert_eq!(updated.phone, None);
    assert_eq!(updated.full_name, patient.full_name);
    assert_eq!(updated.cin, patient.cin);
    assert_eq!(updated.created_at, patient.created_at);
    assert!(updated.updated_at >= patient.updated_at);
}

#[test]
fn update_of_missing_row_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    let result = crud
        .update(
            42,
            &PatientChanges {
                full_name: Some("Nobody".to_string()),
                ..PatientChanges::default()
            },
        )
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn empty_update_issues_only_a_lookup() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let executor = RecordingExecutor::new(&conn);
    let crud: CrudRepository<Patient, RecordingExecutor> = CrudRepository::new(&executor);

    let unchanged = crud
        .update(patient.id, &PatientChanges::default())
        .unwrap()
        .unwrap();

    assert_eq!(unchanged, patient);
    assert_eq!(executor.statement_count(), 1);
    assert!(executor.last_statement().starts_with("SELECT"));
}

#[test]
fn delete_reports_whether_a_row_matched() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    assert!(crud.delete(patient.id).unwrap());
    assert!(!crud.delete(patient.id).unwrap());
    assert_eq!(crud.find_by_id(patient.id).unwrap(), None);
}

#[test]
fn malformed_stored_date_surfaces_as_mapping_error() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    conn.execute(
        "UPDATE patients SET date_naissance = '12/04/1985' WHERE id = ?1;",
        [patient.id],
    )
    .unwrap();
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    let err = crud.find_by_id(patient.id).unwrap_err();
    match err {
        RepoError::Mapping(RowMapError::MalformedDate { column, value }) => {
            assert_eq!(column, "date_naissance");
            assert_eq!(value, "12/04/1985");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unrecognised_stored_type_passes_through_listing() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let user = common::seed_user(&conn, "dr.alaoui");
    let crud: CrudRepository<Antecedent, Connection> = CrudRepository::new(&conn);
    let known = crud
        .create(&NewAntecedent {
            patient_id: patient.id,
            kind: AntecedentType::Allergy,
            content: "Penicillin".to_string(),
            created_by: user.id,
        })
        .unwrap();
    conn.execute(
        "INSERT INTO antecedents (patient_id, type, content, created_by)
         VALUES (?1, 'Dentaire', 'Extraction 2019', ?2);",
        [patient.id, user.id],
    )
    .unwrap();

    let listed = antecedent_service(&conn).get_by_patient_id(patient.id).unwrap();

    assert_eq!(listed.len(), 2);
    let foreign = listed.iter().find(|item| item.id != known.id).unwrap();
    assert_eq!(foreign.kind, AntecedentType::Other("Dentaire".to_string()));
    assert_eq!(foreign.content, "Extraction 2019");
    assert!(listed.contains(&known));

    let rewritten = crud
        .update(
            foreign.id,
            &AntecedentChanges {
                kind: None,
                content: Some("Extraction 2019, no complication".to_string()),
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(rewritten.kind.as_str(), "Dentaire");
}

#[test]
fn injection_text_is_stored_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let patient = seed_patient(&conn, "Amina Benali", "AB100");
    let user = common::seed_user(&conn, "dr.alaoui");
    let crud: CrudRepository<Antecedent, Connection> = CrudRepository::new(&conn);
    let payload = "'); DROP TABLE antecedents; --";

    let created = crud
        .create(&NewAntecedent {
            patient_id: patient.id,
            kind: AntecedentType::Medical,
            content: payload.to_string(),
            created_by: user.id,
        })
        .unwrap();

    assert_eq!(created.content, payload);
    let updated = crud
        .update(
            created.id,
            &AntecedentChanges {
                content: Some(format!("{payload} again")),
                ..AntecedentChanges::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.content, format!("{payload} again"));
    assert_eq!(common::count_rows(&conn, "antecedents"), 1);
}

#[test]
fn constraint_violations_are_recognizable() {
    let conn = open_db_in_memory().unwrap();
    seed_patient(&conn, "Amina Benali", "AB100");
    let crud: CrudRepository<Patient, Connection> = CrudRepository::new(&conn);

    let err = crud.create(&new_patient("Other", "AB100")).unwrap_err();
    assert!(err.is_constraint_violation());
}
