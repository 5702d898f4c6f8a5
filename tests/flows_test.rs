//! End-to-end flow tests over the library's public API.
//!
//! Exercises the questionnaire and donation flows the way the dispatcher
//! does, without any Telegram traffic: handlers only ever see the action
//! lists these types produce.

use teloxide::types::{ChatId, UserId};
use tokio::time::Duration;

use anketka::onboarding::{
    AbuseGuard, CompletionRegistry, ConversationEngine, EngineConfig, GuardPolicy, Outbound,
    SessionStore,
};
use anketka::payments::{
    DonationAction, DonationConfig, DonationFlow, TransactionLedger, TransactionStatus,
};

fn test_engine() -> ConversationEngine {
    ConversationEngine::new(
        SessionStore::new(),
        CompletionRegistry::new(),
        AbuseGuard::new(GuardPolicy {
            block_duration: Duration::from_secs(3600),
            max_attempts: 6,
        }),
        EngineConfig {
            reveal_block: false,
            channel_url: String::new(),
        },
    )
}

fn test_flow() -> (DonationFlow, TransactionLedger) {
    let ledger = TransactionLedger::new();
    let flow = DonationFlow::new(
        ledger.clone(),
        DonationConfig {
            amounts: vec![10, 50, 100, 500],
            min_custom: 1,
            max_custom: 100_000,
        },
    );
    (flow, ledger)
}

#[tokio::test]
async fn test_questionnaire_happy_path_is_one_shot() {
    let engine = test_engine();
    let user = ChatId(100);

    let prompts = engine.start(user).await;
    assert_eq!(prompts.len(), 1);

    engine.answer(user, "Оля").await;
    engine.answer(user, "31").await;
    let done = engine.answer(user, "дизайн").await;

    // Summary for the user plus the admin event; CHANNEL_URL is unset so
    // there is no invite.
    assert_eq!(done.len(), 2);
    assert!(matches!(&done[0], Outbound::Text(t) if t.contains("Оля")));
    assert!(matches!(&done[1], Outbound::AdminNotify(_)));

    // The repeat /start never reopens the questionnaire.
    let again = engine.start(user).await;
    assert!(matches!(&again[0], Outbound::Text(t) if t.contains("уже")));
}

#[tokio::test]
async fn test_questionnaire_and_donation_flows_are_independent() {
    let engine = test_engine();
    let (flow, _) = test_flow();
    let chat = ChatId(200);
    let user = UserId(200);

    engine.start(chat).await;
    engine.answer(chat, "Ваня").await;

    // Mid-questionnaire the user opens the donation menu and picks an
    // amount; the session must stay on the age question.
    let out = flow.on_callback(user, "donate:amt:charity:50").await;
    assert!(matches!(&out[0], DonationAction::Invoice { amount: 50, .. }));

    let next = engine.answer(chat, "40").await;
    assert!(matches!(&next[0], Outbound::TextWithButtons { .. }));
}

#[tokio::test]
async fn test_donation_lifecycle_open_settle_refund() {
    let (flow, ledger) = test_flow();
    let user = UserId(300);

    let out = flow.on_callback(user, "donate:amt:privilege:100").await;
    let DonationAction::Invoice { payload, .. } = &out[0] else {
        panic!("expected invoice, got {:?}", out[0]);
    };

    let receipts = flow.on_successful_payment(user, payload, 100, "charge_e2e");
    assert_eq!(receipts.len(), 2);
    assert_eq!(ledger.lookup(payload).unwrap().status, TransactionStatus::Settled);

    let refunded = ledger.refund(payload).unwrap();
    assert_eq!(refunded.amount, 100);
    assert_eq!(refunded.user, user);
    assert!(ledger.lookup(payload).is_none());
}

#[tokio::test]
async fn test_custom_amount_capture_does_not_leak_into_questionnaire() {
    let engine = test_engine();
    let (flow, ledger) = test_flow();
    let chat = ChatId(400);
    let user = UserId(400);

    flow.on_callback(user, "donate:custom:charity").await;

    // While the flag is set, a number goes to the donation flow, exactly
    // how the dispatcher routes free text.
    let text = "77";
    let actions = flow.on_text(user, text).await.expect("flag should be set");
    assert!(matches!(&actions[0], DonationAction::Invoice { amount: 77, .. }));
    assert_eq!(ledger.lookup(&payload_of(&actions)).unwrap().amount, 77);

    // Flag cleared: the same text now falls through to the engine.
    assert!(flow.on_text(user, text).await.is_none());
    let hint = engine.answer(chat, text).await;
    assert!(matches!(&hint[0], Outbound::Text(t) if t.contains("/start")));
}

fn payload_of(actions: &[DonationAction]) -> String {
    match &actions[0] {
        DonationAction::Invoice { payload, .. } => payload.clone(),
        other => panic!("expected invoice, got {:?}", other),
    }
}
