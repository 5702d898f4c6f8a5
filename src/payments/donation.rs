//! Donation flow: a button-driven menu that turns a chosen amount into a
//! Stars invoice and reacts to the payment callbacks.
//!
//! Independent of the questionnaire. Like the conversation engine, the flow
//! only produces [`DonationAction`]s; the Telegram layer does the sending.

use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::payments::ledger::TransactionLedger;

/// What the donation is for. Picked on the root menu, carried through the
/// amount selection and into the invoice title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationKind {
    Charity,
    Privilege,
}

impl DonationKind {
    pub fn title(&self) -> &'static str {
        match self {
            DonationKind::Charity => "Донат на развитие",
            DonationKind::Privilege => "Поддержка с привилегиями",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DonationKind::Charity => "Добровольная поддержка проекта в Stars",
            DonationKind::Privilege => "Поддержка проекта с плюшками для донатеров",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            DonationKind::Charity => "charity",
            DonationKind::Privilege => "privilege",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "charity" => Some(DonationKind::Charity),
            "privilege" => Some(DonationKind::Privilege),
            _ => None,
        }
    }
}

/// Outbound action produced by the flow, rendered by the gateway layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationAction {
    /// Message with inline buttons: rows of (label, callback data).
    Menu {
        text: String,
        buttons: Vec<Vec<(String, String)>>,
    },
    /// Plain message to the user.
    Text(String),
    /// Stars invoice. The payload is the ledger transaction id.
    Invoice {
        title: String,
        description: String,
        payload: String,
        amount: u32,
    },
    /// Fire-and-forget event for the admin sink.
    AdminNotify(String),
}

/// Amount policy, injected so tests never read process configuration.
#[derive(Debug, Clone)]
pub struct DonationConfig {
    /// Fixed denomination menu, in Stars.
    pub amounts: Vec<u32>,
    pub min_custom: u32,
    pub max_custom: u32,
}

#[derive(Clone)]
pub struct DonationFlow {
    ledger: TransactionLedger,
    /// Users currently expected to type a custom amount, and for which
    /// donation kind. Sticky until a valid amount arrives or the user
    /// navigates the menu again.
    awaiting_custom: Arc<Mutex<HashMap<UserId, DonationKind>>>,
    config: DonationConfig,
}

impl DonationFlow {
    pub fn new(ledger: TransactionLedger, config: DonationConfig) -> Self {
        Self {
            ledger,
            awaiting_custom: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Root menu, sent on /donate.
    pub fn root_menu(&self) -> DonationAction {
        DonationAction::Menu {
            text: "Поддержать проект в Telegram Stars ⭐\nВыбери вариант:".to_string(),
            buttons: vec![
                vec![(
                    DonationKind::Charity.title().to_string(),
                    "donate:cat:charity".to_string(),
                )],
                vec![(
                    DonationKind::Privilege.title().to_string(),
                    "donate:cat:privilege".to_string(),
                )],
            ],
        }
    }

    /// Handles an inline-button press. Unknown callback data is ignored.
    pub async fn on_callback(&self, user: UserId, data: &str) -> Vec<DonationAction> {
        let parts: Vec<&str> = data.split(':').collect();
        match parts.as_slice() {
            ["donate", "menu"] => {
                self.awaiting_custom.lock().await.remove(&user);
                vec![self.root_menu()]
            }
            ["donate", "cat", tag] => match DonationKind::from_tag(tag) {
                Some(kind) => {
                    // Navigating the menu cancels a pending custom-amount
                    // prompt.
                    self.awaiting_custom.lock().await.remove(&user);
                    vec![self.amount_menu(kind)]
                }
                None => Vec::new(),
            },
            ["donate", "amt", tag, raw_amount] => {
                match (DonationKind::from_tag(tag), raw_amount.parse::<u32>()) {
                    (Some(kind), Ok(amount)) => {
                        self.awaiting_custom.lock().await.remove(&user);
                        vec![self.invoice_for(user, kind, amount)]
                    }
                    _ => Vec::new(),
                }
            }
            ["donate", "custom", tag] => match DonationKind::from_tag(tag) {
                Some(kind) => {
                    self.awaiting_custom.lock().await.insert(user, kind);
                    vec![DonationAction::Text(format!(
                        "Введи сумму в Stars (от {} до {}):",
                        self.config.min_custom, self.config.max_custom
                    ))]
                }
                None => Vec::new(),
            },
            _ => {
                log::debug!("Ignoring unknown donation callback: {}", data);
                Vec::new()
            }
        }
    }

    /// Handles free text while the custom-amount flag may be set.
    ///
    /// Returns `None` when the user is not in custom-amount capture, so the
    /// caller can route the text to the questionnaire instead. Invalid input
    /// re-prompts and keeps the flag set.
    pub async fn on_text(&self, user: UserId, text: &str) -> Option<Vec<DonationAction>> {
        let kind = {
            let awaiting = self.awaiting_custom.lock().await;
            *awaiting.get(&user)?
        };

        let amount = match text.trim().parse::<u32>() {
            Ok(a) if a >= self.config.min_custom && a <= self.config.max_custom => a,
            _ => {
                return Some(vec![DonationAction::Text(format!(
                    "Нужно целое число от {} до {}. Попробуй ещё раз:",
                    self.config.min_custom, self.config.max_custom
                ))]);
            }
        };

        self.awaiting_custom.lock().await.remove(&user);
        Some(vec![self.invoice_for(user, kind, amount)])
    }

    /// Handles the successful-payment callback: settles the ledger entry and
    /// emits the receipts. An unknown payload still thanks the payer; the
    /// ledger is process-lifetime only and a payment can outlive a restart.
    pub fn on_successful_payment(
        &self,
        user: UserId,
        payload: &str,
        amount: u32,
        charge_id: &str,
    ) -> Vec<DonationAction> {
        match self.ledger.settle(payload, charge_id) {
            Ok(tx) => {
                log::info!("Settled donation {} ({} ⭐) from user {}", tx.id, tx.amount, user.0);
                vec![
                    DonationAction::Text(format!(
                        "Спасибо за поддержку! Донат {} ⭐ получен.\nНомер транзакции: {}",
                        tx.amount, tx.id
                    )),
                    DonationAction::AdminNotify(format!(
                        "Донат {} ⭐ от user {}\n{}\ntx: {}",
                        tx.amount,
                        user.0,
                        tx.title,
                        tx.id
                    )),
                ]
            }
            Err(e) => {
                log::warn!("Payment with unmatched payload {} from user {}: {}", payload, user.0, e);
                vec![
                    DonationAction::Text(format!("Спасибо за поддержку! Донат {} ⭐ получен.", amount)),
                    DonationAction::AdminNotify(format!(
                        "Донат {} ⭐ от user {} с неизвестным payload {}",
                        amount, user.0, payload
                    )),
                ]
            }
        }
    }

    fn amount_menu(&self, kind: DonationKind) -> DonationAction {
        let mut buttons: Vec<Vec<(String, String)>> = self
            .config
            .amounts
            .iter()
            .map(|amount| {
                vec![(
                    format!("{} ⭐", amount),
                    format!("donate:amt:{}:{}", kind.tag(), amount),
                )]
            })
            .collect();
        buttons.push(vec![(
            "Своя сумма".to_string(),
            format!("donate:custom:{}", kind.tag()),
        )]);
        buttons.push(vec![("« Назад".to_string(), "donate:menu".to_string())]);

        DonationAction::Menu {
            text: format!("{}\nСколько Stars отправить?", kind.title()),
            buttons,
        }
    }

    fn invoice_for(&self, user: UserId, kind: DonationKind, amount: u32) -> DonationAction {
        let tx = self.ledger.open(user, amount, kind.title());
        log::info!("Opened donation {} ({} ⭐) for user {}", tx.id, amount, user.0);
        DonationAction::Invoice {
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            payload: tx.id,
            amount,
        }
    }
}
