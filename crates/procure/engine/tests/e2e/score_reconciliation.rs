//! E2E: evaluators score a vendor, the panel compares and records consensus.

use procure_engine::*;
use procure_types::*;

fn project() -> ProjectId {
    ProjectId::new("rfp-2026-crm")
}

struct Panel {
    service: EvaluationService,
    vendor: VendorId,
    security: CriterionId,
    price: CriterionId,
}

async fn panel(config: EngineConfig) -> Panel {
    let service = EvaluationService::from_config(&config).await.unwrap();
    let lead = UserId::new("lead");

    let vendor = service
        .pipeline()
        .register(&project(), NewVendor::named("Northwind CRM"), &lead)
        .await
        .unwrap()
        .id;
    let security = service
        .criteria()
        .define(&project(), NewCriterion::new("Technical", "Security", 3.0))
        .await
        .unwrap()
        .id;
    let price = service
        .criteria()
        .define(&project(), NewCriterion::new("Commercial", "Price", 1.0))
        .await
        .unwrap()
        .id;

    Panel {
        service,
        vendor,
        security,
        price,
    }
}

impl Panel {
    async fn score(&self, criterion: &CriterionId, evaluator: &str, value: i64) -> Score {
        self.service
            .scores()
            .save_score(
                &project(),
                ScoreInput::new(
                    self.vendor.clone(),
                    criterion.clone(),
                    UserId::new(evaluator),
                    value,
                )
                .with_rationale(format!("{evaluator} rated {value}")),
            )
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn disagreement_is_surfaced_then_reconciled() {
    let p = panel(EngineConfig::default()).await;
    let a = p.score(&p.security, "alice", 2).await;
    let b = p.score(&p.security, "bob", 3).await;
    let c = p.score(&p.security, "carol", 5).await;

    let comparison = p
        .service
        .aggregator()
        .compare(&project(), &p.vendor, &p.security)
        .await
        .unwrap();
    let stats = comparison.scored().expect("scores present");
    assert_eq!(stats.count, 3);
    assert!((stats.average - 3.333).abs() < 0.001);
    assert_eq!(stats.variance, 3.0);
    assert_eq!(stats.tier, VarianceTier::High);

    let consensus = p
        .service
        .reconciler()
        .save_consensus(
            &project(),
            ConsensusInput::new(
                p.vendor.clone(),
                p.security.clone(),
                3,
                "Pen test findings outweigh the feature list",
                UserId::new("lead"),
            ),
        )
        .await
        .unwrap();

    let mut sources = consensus.source_score_ids.clone();
    sources.sort();
    let mut expected = vec![a.id, b.id, c.id];
    expected.sort();
    assert_eq!(sources, expected);
}

#[tokio::test]
async fn unscored_pair_is_not_yet_comparable() {
    let p = panel(EngineConfig::default()).await;
    let comparison = p
        .service
        .aggregator()
        .compare(&project(), &p.vendor, &p.price)
        .await
        .unwrap();
    assert_eq!(comparison, Comparison::NoScores);
    assert_eq!(comparison.count(), 0);
}

#[tokio::test]
async fn consensus_stays_unique_per_pair() {
    let p = panel(EngineConfig::default()).await;
    p.score(&p.price, "alice", 4).await;
    p.score(&p.price, "bob", 4).await;

    let reconciler = p.service.reconciler();
    let mut events = p.service.subscribe();
    for value in [4, 5, 4] {
        reconciler
            .save_consensus(
                &project(),
                ConsensusInput::new(
                    p.vendor.clone(),
                    p.price.clone(),
                    value,
                    "pricing review",
                    UserId::new("lead"),
                ),
            )
            .await
            .unwrap();
    }

    let all = reconciler.list_for_vendor(&project(), &p.vendor).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].consensus_value.get(), 4);

    let mut revised = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EvaluationEvent::ConsensusRecorded { revised: r, .. } = event {
            revised.push(r);
        }
    }
    assert_eq!(revised, vec![false, true, true]);
}

#[tokio::test]
async fn resaving_a_score_is_idempotent_in_count() {
    let p = panel(EngineConfig::default()).await;
    let first = p.score(&p.security, "alice", 4).await;
    let second = p.score(&p.security, "alice", 4).await;
    assert_eq!(first.id, second.id);

    let scores = p
        .service
        .scores()
        .get_by_vendor(&project(), &p.vendor, ScoreFilter::default())
        .await
        .unwrap();
    assert_eq!(scores.len(), 1);
}

#[tokio::test]
async fn scorecard_weights_consensus_over_average() {
    let p = panel(EngineConfig::default()).await;
    p.score(&p.security, "alice", 2).await;
    p.score(&p.security, "bob", 4).await;
    p.score(&p.price, "alice", 5).await;

    p.service
        .reconciler()
        .save_consensus(
            &project(),
            ConsensusInput::new(
                p.vendor.clone(),
                p.security.clone(),
                4,
                "panel agreed",
                UserId::new("lead"),
            ),
        )
        .await
        .unwrap();

    let card = p
        .service
        .aggregator()
        .scorecard(&project(), &p.vendor)
        .await
        .unwrap();
    assert_eq!(card.rows.len(), 2);
    assert_eq!(card.scored_criteria, 2);
    let expected = (4.0 * 3.0 + 5.0 * 1.0) / 4.0;
    assert!((card.weighted_total.unwrap() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn submitted_only_policy_hides_drafts() {
    let mut config = EngineConfig::default();
    config.scoring.submitted_only = true;
    let p = panel(config).await;

    p.score(&p.security, "alice", 5).await;
    p.score(&p.security, "bob", 1).await;
    let submitted = p
        .service
        .scores()
        .submit_all(&project(), &p.vendor, &UserId::new("alice"))
        .await
        .unwrap();
    assert_eq!(submitted, 1);

    let comparison = p
        .service
        .aggregator()
        .compare(&project(), &p.vendor, &p.security)
        .await
        .unwrap();
    let stats = comparison.scored().unwrap();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.tier, VarianceTier::Low);
}
