#![allow(dead_code)]

use kitchen_orders::builder::NewOrder;
use kitchen_orders::config::{BotConfig, ChannelId};
use kitchen_orders::interaction::{ContinueChoice, Interaction, InteractionHub, Outbound, Prompt, PromptKind, Reply};
use kitchen_orders::lifecycle::KitchenSystem;
use kitchen_orders::model::{Location, Menu, Order, PromoRegistry, UserId};
use kitchen_orders::notify::MemorySink;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub const CASHIER: UserId = UserId(1001);
pub const COOK_A: UserId = UserId(2001);
pub const COOK_B: UserId = UserId(2002);

/// What the scripted front end does with the next prompt.
#[derive(Debug, Clone)]
pub enum Answer {
    Reply(Reply),
    /// Leave the prompt unanswered so it times out.
    Silence,
}

pub fn select(value: &str) -> Answer {
    Answer::Reply(Reply::Select(value.to_string()))
}

pub fn quantity(n: u32) -> Answer {
    Answer::Reply(Reply::Quantity(n))
}

pub fn next(choice: ContinueChoice) -> Answer {
    Answer::Reply(Reply::Continue(choice))
}

pub fn text(value: &str) -> Answer {
    Answer::Reply(Reply::Text(value.to_string()))
}

#[derive(Default)]
struct Script {
    answers: VecDeque<Answer>,
    prompts: Vec<Prompt>,
    notices: Vec<(UserId, String)>,
}

/// Plays the front end: answers prompts from a queue and records notices.
pub struct Customer {
    script: Arc<Mutex<Script>>,
    _task: JoinHandle<()>,
}

impl Customer {
    fn spawn(hub: Arc<InteractionHub>, mut outbound: tokio::sync::mpsc::Receiver<Outbound>) -> Self {
        let script = Arc::new(Mutex::new(Script::default()));
        let shared = script.clone();
        let task = tokio::spawn(async move {
            while let Some(message) = outbound.recv().await {
                match message {
                    Outbound::Prompt(prompt) => {
                        let answer = {
                            let mut script = shared.lock().unwrap();
                            script.prompts.push(prompt.clone());
                            script.answers.pop_front()
                        };
                        if let Some(Answer::Reply(reply)) = answer {
                            hub.deliver(Interaction {
                                id: prompt.id,
                                user: prompt.user,
                                reply,
                            });
                        }
                    }
                    Outbound::Notice { user, text } => {
                        shared.lock().unwrap().notices.push((user, text));
                    }
                }
            }
        });
        Self { script, _task: task }
    }

    pub fn enqueue(&self, answers: impl IntoIterator<Item = Answer>) {
        self.script.lock().unwrap().answers.extend(answers);
    }

    /// Lets the front-end task drain everything already sent.
    pub async fn settle(&self) {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    pub async fn notices(&self) -> Vec<(UserId, String)> {
        self.settle().await;
        self.script.lock().unwrap().notices.clone()
    }

    pub async fn prompt_kinds(&self) -> Vec<PromptKind> {
        self.settle().await;
        self.script.lock().unwrap().prompts.iter().map(|p| p.kind.clone()).collect()
    }

    pub fn unused_answers(&self) -> usize {
        self.script.lock().unwrap().answers.len()
    }
}

pub struct Harness {
    pub system: KitchenSystem,
    pub sink: Arc<MemorySink>,
    pub hub: Arc<InteractionHub>,
    pub customer: Customer,
    pub kitchen: ChannelId,
    pub log: ChannelId,
}

pub fn kitchen_channel() -> ChannelId {
    "100000000000000001".parse().unwrap()
}

pub fn log_channel() -> ChannelId {
    "100000000000000002".parse().unwrap()
}

pub fn start() -> Harness {
    start_with_menu(Menu::standard())
}

pub fn start_with_menu(menu: Menu) -> Harness {
    let mut config = BotConfig::default();
    config.channels.kitchen = Some(kitchen_channel());
    config.channels.log = Some(log_channel());

    let promos = PromoRegistry::new();
    promos.upsert("SAVE10", 10).unwrap();

    let sink = Arc::new(MemorySink::new());
    let (hub, outbound) = InteractionHub::new(256);
    let system = KitchenSystem::with_menu(&config, menu, promos, sink.clone(), hub.clone()).unwrap();
    let customer = Customer::spawn(hub.clone(), outbound);

    Harness {
        system,
        sink,
        hub,
        customer,
        kitchen: kitchen_channel(),
        log: log_channel(),
    }
}

pub fn indoor(customer: &str) -> NewOrder {
    NewOrder {
        customer: customer.to_string(),
        location: Location::Indoor,
        promo_code: None,
    }
}

/// The standard two-line order used across scenarios.
pub fn ada_answers() -> Vec<Answer> {
    vec![
        select("entrees"),
        select("Chick-Fil-A Chicken Sandwich Entree"),
        quantity(2),
        next(ContinueChoice::AddMore),
        select("sides"),
        select("Waffle Potato Fries"),
        quantity(1),
        next(ContinueChoice::Finish),
    ]
}

/// Places a one-item indoor order and returns it finalized and published.
pub async fn place_simple_order(h: &Harness, customer: &str) -> Order {
    h.customer.enqueue([
        select("sides"),
        select("Fruit Cup"),
        quantity(1),
        next(ContinueChoice::Finish),
    ]);
    h.system
        .builder
        .create_order(indoor(customer), &CASHIER)
        .await
        .unwrap()
}
