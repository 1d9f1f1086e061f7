//! Property tests: no sequence of requested transitions can put a vendor in
//! a state the transition table does not reach.

use procure_engine::*;
use procure_types::*;
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = VendorStatus> {
    prop::sample::select(VendorStatus::ALL.to_vec())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn requested_walks_only_follow_legal_edges(requests in prop::collection::vec(arb_status(), 1..24)) {
        let rt = runtime();
        let (history, final_status) = rt.block_on(async {
            let service = EvaluationService::from_config(&EngineConfig::default()).await.unwrap();
            let pipeline = service.pipeline();
            let project = ProjectId::new("p1");
            let actor = UserId::new("u1");
            let vendor = pipeline
                .register(&project, NewVendor::named("Acme"), &actor)
                .await
                .unwrap();

            let mut expected = VendorStatus::Identified;
            for to in &requests {
                let result = pipeline
                    .transition(&project, &vendor.id, *to, &actor, None)
                    .await;
                if expected.can_transition_to(*to) {
                    assert_eq!(result.unwrap().status, *to);
                    expected = *to;
                } else {
                    assert!(matches!(result, Err(EvaluationError::InvalidTransition(_))));
                }
            }

            let stored = pipeline.get(&project, &vendor.id).await.unwrap();
            assert_eq!(stored.status, expected);
            (stored.status_history, stored.status)
        });

        let mut at = VendorStatus::Identified;
        for change in &history {
            prop_assert_eq!(change.from, at);
            prop_assert!(change.from.can_transition_to(change.to));
            at = change.to;
        }
        prop_assert_eq!(at, final_status);
    }
}
