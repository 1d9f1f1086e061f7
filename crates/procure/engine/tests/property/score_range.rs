//! Property tests: no stored score ever holds a value outside 1..=5, and a
//! rejected save never changes what is stored.

use procure_engine::*;
use procure_types::*;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_values_stay_in_range(values in prop::collection::vec(-10i64..16, 1..20)) {
        let rt = runtime();
        let stored = rt.block_on(async {
            let service = EvaluationService::from_config(&EngineConfig::default()).await.unwrap();
            let project = ProjectId::new("p1");
            let vendor = service
                .pipeline()
                .register(&project, NewVendor::named("Acme"), &UserId::new("u1"))
                .await
                .unwrap();
            let criterion = service
                .criteria()
                .define(&project, NewCriterion::new("Technical", "Security", 1.0))
                .await
                .unwrap();

            let mut last_good: Option<i64> = None;
            for value in &values {
                let before = service
                    .scores()
                    .get_by_vendor(&project, &vendor.id, ScoreFilter::default())
                    .await
                    .unwrap();
                let result = service
                    .scores()
                    .save_score(
                        &project,
                        ScoreInput::new(
                            vendor.id.clone(),
                            criterion.id.clone(),
                            UserId::new("e1"),
                            *value,
                        ),
                    )
                    .await;
                if (1..=5).contains(value) {
                    assert!(result.is_ok());
                    last_good = Some(*value);
                } else {
                    assert!(matches!(result, Err(EvaluationError::InvalidScoreValue(_))));
                    let after = service
                        .scores()
                        .get_by_vendor(&project, &vendor.id, ScoreFilter::default())
                        .await
                        .unwrap();
                    assert_eq!(before, after);
                }
            }

            let scores = service
                .scores()
                .get_by_vendor(&project, &vendor.id, ScoreFilter::default())
                .await
                .unwrap();
            (scores, last_good)
        });

        let (scores, last_good) = stored;
        prop_assert!(scores.len() <= 1);
        for score in &scores {
            prop_assert!((1..=5).contains(&score.value.get()));
        }
        prop_assert_eq!(scores.first().map(|s| i64::from(s.value.get())), last_good);
    }
}
