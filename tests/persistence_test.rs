mod common;

use common::spawn_app;
use reporting_api::models::{attachment, report, user};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, Set};

async fn insert_user(db: &sea_orm::DatabaseConnection) -> user::Model {
    user::ActiveModel {
        is_anonymous: Set(false),
        role: Set("citizen".to_string()),
        email: Set(Some(format!("{}@example.com", uuid::Uuid::new_v4()))),
        ..user::ActiveModel::new()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

async fn insert_report(db: &sea_orm::DatabaseConnection, user_id: Option<String>) -> report::Model {
    report::ActiveModel {
        title: Set("Broken streetlight".to_string()),
        description_text: Set("The light on the corner has been out for a week".to_string()),
        latitude: Set(24.7136),
        longitude: Set(46.6753),
        status: Set("Submitted".to_string()),
        category_id: Set("infrastructure".to_string()),
        user_id: Set(user_id),
        ..report::ActiveModel::new()
    }
    .insert(db)
    .await
    .expect("Failed to insert report")
}

async fn insert_attachment(
    db: &sea_orm::DatabaseConnection,
    report_id: &str,
) -> attachment::Model {
    attachment::ActiveModel {
        report_id: Set(report_id.to_string()),
        blob_storage_uri: Set("https://storage.example/report-attachments/photo.jpg".to_string()),
        mime_type: Set("image/jpeg".to_string()),
        file_type: Set("photo".to_string()),
        file_size_bytes: Set(204_800),
        ..attachment::ActiveModel::new()
    }
    .insert(db)
    .await
    .expect("Failed to insert attachment")
}

#[tokio::test]
async fn schema_defaults_fill_timestamps_and_status() {
    let app = spawn_app().await;

    let user = insert_user(&app.db).await;
    assert_eq!(user.role, "citizen");

    let report = insert_report(&app.db, Some(user.id.clone())).await;
    assert_eq!(report.status, "Submitted");
    assert!(report.ai_confidence.is_none());
    assert_eq!(report.created_at, report.updated_at);
}

#[tokio::test]
async fn deleting_report_cascades_to_attachments() {
    let app = spawn_app().await;

    let user = insert_user(&app.db).await;
    let report = insert_report(&app.db, Some(user.id.clone())).await;
    let att = insert_attachment(&app.db, &report.id).await;

    report::Entity::delete_by_id(report.id.clone())
        .exec(&app.db)
        .await
        .unwrap();

    let remaining = attachment::Entity::find_by_id(att.id.clone())
        .one(&app.db)
        .await
        .unwrap();
    assert!(remaining.is_none());
}

#[tokio::test]
async fn deleting_user_nulls_report_reference() {
    let app = spawn_app().await;

    let user = insert_user(&app.db).await;
    let report = insert_report(&app.db, Some(user.id.clone())).await;

    user::Entity::delete_by_id(user.id.clone())
        .exec(&app.db)
        .await
        .unwrap();

    let orphaned = report::Entity::find_by_id(report.id.clone())
        .one(&app.db)
        .await
        .unwrap()
        .expect("report should survive user deletion");
    assert!(orphaned.user_id.is_none());
}

#[tokio::test]
async fn anonymous_user_needs_no_contact_fields() {
    let app = spawn_app().await;

    let user = user::ActiveModel {
        is_anonymous: Set(true),
        role: Set("citizen".to_string()),
        ..user::ActiveModel::new()
    }
    .insert(&app.db)
    .await
    .expect("Failed to insert anonymous user");

    assert!(user.email.is_none());
    assert!(user.phone_number.is_none());
    assert!(user.hashed_device_id.is_none());
}
