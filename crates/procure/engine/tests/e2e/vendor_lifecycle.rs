//! E2E: a vendor walks the procurement pipeline through the public service.

use procure_engine::*;
use procure_storage::QueryWindow;
use procure_types::*;

fn project() -> ProjectId {
    ProjectId::new("rfp-2026-crm")
}

async fn service() -> EvaluationService {
    EvaluationService::from_config(&EngineConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn illegal_jump_is_rejected_and_leaves_status_untouched() {
    let service = service().await;
    let pipeline = service.pipeline();
    let actor = UserId::new("buyer-1");

    let v1 = pipeline
        .register(
            &project(),
            NewVendor::named("Northwind CRM").with_id(VendorId::new("V1")),
            &actor,
        )
        .await
        .unwrap();
    assert_eq!(v1.status, VendorStatus::Identified);

    let moved = pipeline
        .transition(&project(), &v1.id, VendorStatus::LongList, &actor, None)
        .await
        .unwrap();
    assert_eq!(moved.status, VendorStatus::LongList);

    let err = pipeline
        .transition(&project(), &v1.id, VendorStatus::RfpIssued, &actor, None)
        .await
        .unwrap_err();
    match err {
        EvaluationError::InvalidTransition(t) => {
            assert_eq!(t.from, VendorStatus::LongList);
            assert_eq!(t.to, VendorStatus::RfpIssued);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let current = pipeline.get(&project(), &v1.id).await.unwrap();
    assert_eq!(current.status, VendorStatus::LongList);
    assert_eq!(current.status_history.len(), 1);
}

#[tokio::test]
async fn full_pipeline_to_selection_with_audit_trail() {
    let service = service().await;
    let pipeline = service.pipeline();
    let mut events = service.subscribe();
    let actor = UserId::new("buyer-1");

    let vendor = pipeline
        .register(&project(), NewVendor::named("Contoso"), &actor)
        .await
        .unwrap();

    let path = [
        VendorStatus::LongList,
        VendorStatus::ShortList,
        VendorStatus::RfpIssued,
        VendorStatus::ResponseReceived,
        VendorStatus::UnderEvaluation,
        VendorStatus::Selected,
    ];
    for (i, to) in path.iter().enumerate() {
        pipeline
            .transition(&project(), &vendor.id, *to, &actor, Some(&format!("step {i}")))
            .await
            .unwrap();
    }

    let selected = pipeline.get(&project(), &vendor.id).await.unwrap();
    assert!(selected.status.is_terminal());
    assert_eq!(selected.status_history.len(), path.len());
    assert_eq!(selected.notes.lines().count(), path.len());
    assert!(pipeline
        .valid_transitions(&project(), &vendor.id)
        .await
        .unwrap()
        .is_empty());

    assert!(matches!(
        events.recv().await.unwrap(),
        EvaluationEvent::VendorRegistered { .. }
    ));
    let mut changes = 0;
    while let Ok(event) = events.try_recv() {
        if let EvaluationEvent::StatusChanged { .. } = event {
            changes += 1;
        }
    }
    assert_eq!(changes, path.len());
}

#[tokio::test]
async fn archive_removes_vendor_from_default_views() {
    let service = service().await;
    let pipeline = service.pipeline();
    let actor = UserId::new("buyer-1");

    let keep = pipeline
        .register(&project(), NewVendor::named("Alpha"), &actor)
        .await
        .unwrap();
    let gone = pipeline
        .register(&project(), NewVendor::named("Beta"), &actor)
        .await
        .unwrap();

    let archived = pipeline.archive(&project(), &gone.id, &actor).await.unwrap();
    assert_eq!(archived.deleted_by.as_ref(), Some(&actor));

    let listed = pipeline.list(&project(), QueryWindow::all()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);

    assert!(matches!(
        pipeline.archive(&project(), &gone.id, &actor).await,
        Err(EvaluationError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_details_never_touches_status() {
    let service = service().await;
    let pipeline = service.pipeline();
    let actor = UserId::new("buyer-1");

    let vendor = pipeline
        .register(&project(), NewVendor::named("Gamma"), &actor)
        .await
        .unwrap();
    pipeline
        .transition(&project(), &vendor.id, VendorStatus::LongList, &actor, None)
        .await
        .unwrap();

    let updated = pipeline
        .update_details(
            &project(),
            &vendor.id,
            VendorDetails {
                website: Some("https://gamma.example".to_string()),
                ..VendorDetails::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, VendorStatus::LongList);
    assert_eq!(updated.name, "Gamma");
    assert_eq!(updated.website.as_deref(), Some("https://gamma.example"));
}
