// File: ./src/notify.rs
use crate::model::ReminderTrigger;
use anyhow::Result;
use chrono::{DateTime, Utc};
use notify_rust::Notification;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, sleep_until};

/// A registration known to the notification service.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNotification {
    pub id: String,
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub payload: Option<serde_json::Value>,
}

impl From<&ReminderTrigger> for NotificationContent {
    fn from(trigger: &ReminderTrigger) -> Self {
        Self {
            title: trigger.title.clone(),
            body: trigger.body.clone(),
            payload: serde_json::to_value(&trigger.payload).ok(),
        }
    }
}

/// The host notification service boundary.
///
/// Scheduling with an id that is already registered replaces that
/// registration; cancelling an unknown id succeeds. Delivery once a
/// trigger is registered is the platform's responsibility.
pub trait NotificationService {
    async fn schedule(
        &self,
        id: &str,
        content: NotificationContent,
        fire_at: DateTime<Utc>,
    ) -> Result<()>;
    async fn cancel(&self, id: &str) -> Result<()>;
    async fn pending(&self) -> Result<Vec<PendingNotification>>;
}

enum NotifierCommand {
    Schedule {
        id: String,
        content: NotificationContent,
        fire_at: DateTime<Utc>,
    },
    Cancel {
        id: String,
    },
    List {
        reply: oneshot::Sender<Vec<PendingNotification>>,
    },
}

/// Desktop backend: an in-process actor that sleeps until the earliest
/// registration and shows an OS notification when it fires.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<NotifierCommand>,
}

pub fn spawn_notifier() -> Notifier {
    let (tx, mut rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut registered: HashMap<String, (NotificationContent, DateTime<Utc>)> = HashMap::new();

        loop {
            let now = Utc::now();

            let due_ids: Vec<String> = registered
                .iter()
                .filter(|(_, (_, fire_at))| *fire_at <= now)
                .map(|(id, _)| id.clone())
                .collect();
            for id in due_ids {
                if let Some((content, _)) = registered.remove(&id) {
                    log::debug!("Firing notification {}", id);
                    // show() can block on the desktop bus
                    std::thread::spawn(move || {
                        let _ = Notification::new()
                            .summary(&content.title)
                            .body(&content.body)
                            .appname("Braindump")
                            .show();
                    });
                }
            }

            let next_wake = registered.values().map(|(_, fire_at)| *fire_at).min();

            if let Some(target) = next_wake {
                let millis = (target - now).num_milliseconds().max(0);
                let deadline = Instant::now() + Duration::from_millis(millis as u64);
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        // Woke for the earliest registration; loop fires it
                    }
                    cmd = rx.recv() => match cmd {
                        Some(cmd) => apply_command(&mut registered, cmd),
                        None => break,
                    }
                }
            } else if let Some(cmd) = rx.recv().await {
                apply_command(&mut registered, cmd);
            } else {
                // Channel closed, exit actor
                break;
            }
        }
    });

    Notifier { tx }
}

fn apply_command(
    registered: &mut HashMap<String, (NotificationContent, DateTime<Utc>)>,
    cmd: NotifierCommand,
) {
    match cmd {
        NotifierCommand::Schedule {
            id,
            content,
            fire_at,
        } => {
            registered.insert(id, (content, fire_at));
        }
        NotifierCommand::Cancel { id } => {
            // Absent ids are fine
            registered.remove(&id);
        }
        NotifierCommand::List { reply } => {
            let mut list: Vec<PendingNotification> = registered
                .iter()
                .map(|(id, (_, fire_at))| PendingNotification {
                    id: id.clone(),
                    fire_at: *fire_at,
                })
                .collect();
            list.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
            let _ = reply.send(list);
        }
    }
}

impl NotificationService for Notifier {
    async fn schedule(
        &self,
        id: &str,
        content: NotificationContent,
        fire_at: DateTime<Utc>,
    ) -> Result<()> {
        self.tx
            .send(NotifierCommand::Schedule {
                id: id.to_string(),
                content,
                fire_at,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Notifier actor is gone"))
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.tx
            .send(NotifierCommand::Cancel { id: id.to_string() })
            .await
            .map_err(|_| anyhow::anyhow!("Notifier actor is gone"))
    }

    async fn pending(&self) -> Result<Vec<PendingNotification>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(NotifierCommand::List { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Notifier actor is gone"))?;
        Ok(rx.await?)
    }
}
