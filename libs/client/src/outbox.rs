//! Ordered log of cart and like mutations waiting for the server
//!
//! Mutations made while signed out or offline are appended here and replayed
//! in order by [`Outbox::sync`]. Replays are idempotent on the server:
//!
//! - likes are sent as "set liked = true/false", never as a toggle
//! - cart adds carry a `mutationId` the server remembers
//! - cart sets and removes are absolute
//!
//! An entry leaves the log once the server acknowledged it or rejected it for
//! good (a 4xx such as a product deleted since). Any other failure (offline,
//! 5xx) stops the replay and keeps that entry and everything after it.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{CartMutation, LikeState, ServerCart};
use crate::store::{LocalStoreExt, OUTBOX_KEY, SharedStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    #[serde(rename_all = "camelCase")]
    CartAdd {
        product_id: Uuid,
        quantity: u32,
        mutation_id: String,
    },
    #[serde(rename_all = "camelCase")]
    CartSet { product_id: Uuid, quantity: u32 },
    #[serde(rename_all = "camelCase")]
    CartRemove { product_id: Uuid },
    #[serde(rename_all = "camelCase")]
    LikeSet { product_id: Uuid, liked: bool },
}

impl Mutation {
    pub fn cart_add(product_id: Uuid, quantity: u32) -> Self {
        Mutation::CartAdd {
            product_id,
            quantity,
            mutation_id: Uuid::now_v7().to_string(),
        }
    }

    pub fn product_id(&self) -> Uuid {
        match self {
            Mutation::CartAdd { product_id, .. }
            | Mutation::CartSet { product_id, .. }
            | Mutation::CartRemove { product_id }
            | Mutation::LikeSet { product_id, .. } => *product_id,
        }
    }

    fn is_cart(&self) -> bool {
        !matches!(self, Mutation::LikeSet { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub seq: u64,
    pub mutation: Mutation,
    /// Set once a replay has sent the entry; such an entry may already be
    /// applied server side and is never merged into
    #[serde(default)]
    pub attempted: bool,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub applied: usize,
    pub remaining: usize,
    /// Entries the server refused; they are no longer queued
    pub rejected: Vec<(Entry, ClientError)>,
    /// Error that stopped the replay, if any
    pub error: Option<ClientError>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.remaining == 0
    }
}

#[derive(Clone)]
pub struct Outbox {
    store: SharedStore,
}

impl Outbox {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn entries(&self) -> Vec<Entry> {
        self.store.get_list(OUTBOX_KEY).await
    }

    pub async fn len(&self) -> usize {
        self.entries().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn save(&self, entries: &[Entry]) -> ClientResult<()> {
        if entries.is_empty() {
            self.store.remove(OUTBOX_KEY).await
        } else {
            self.store.set_json(OUTBOX_KEY, &entries).await
        }
    }

    /// Append a mutation, compacting it with pending entries for the same product
    pub async fn push(&self, mutation: Mutation) -> ClientResult<()> {
        let mut entries = self.entries().await;
        compact(&mut entries, mutation);
        self.save(&entries).await
    }

    /// Queue a mutation whose request may already have reached the server.
    ///
    /// The entry keeps its identity (a cart add keeps its `mutationId`) and is
    /// never merged with later adds.
    pub async fn push_attempted(&self, mutation: Mutation) -> ClientResult<()> {
        let mut entries = self.entries().await;
        let seq = next_seq(&entries);
        entries.push(Entry {
            seq,
            mutation,
            attempted: true,
        });
        self.save(&entries).await
    }

    /// Replay every entry in order
    pub async fn sync(&self, api: &ApiClient) -> ClientResult<SyncReport> {
        let mut entries = self.entries().await;
        let mut report = SyncReport::default();

        while let Some(entry) = entries.first_mut() {
            if !entry.attempted {
                entry.attempted = true;
                self.save(&entries).await?;
            }
            let mutation = entries[0].mutation.clone();

            match send(api, &mutation).await {
                Ok(()) => {
                    entries.remove(0);
                    self.save(&entries).await?;
                    report.applied += 1;
                }
                Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                Err(e) if e.is_rejected() => {
                    tracing::warn!(error = %e, ?mutation, "Queued mutation rejected, dropping it");
                    let entry = entries.remove(0);
                    self.save(&entries).await?;
                    report.rejected.push((entry, e));
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?mutation, "Outbox replay stopped");
                    report.error = Some(e);
                    break;
                }
            }
        }

        report.remaining = entries.len();
        tracing::info!(
            applied = report.applied,
            rejected = report.rejected.len(),
            remaining = report.remaining,
            "Outbox replay finished"
        );
        Ok(report)
    }
}

fn next_seq(entries: &[Entry]) -> u64 {
    entries.iter().map(|e| e.seq).max().map_or(1, |s| s + 1)
}

fn compact(entries: &mut Vec<Entry>, mutation: Mutation) {
    let product_id = mutation.product_id();

    let mutation = match mutation {
        Mutation::LikeSet { .. } => {
            entries.retain(|e| {
                !(matches!(e.mutation, Mutation::LikeSet { .. })
                    && e.mutation.product_id() == product_id)
            });
            mutation
        }
        Mutation::CartSet { quantity: 0, .. } | Mutation::CartRemove { .. } => {
            drop_cart_entries(entries, product_id);
            Mutation::CartRemove { product_id }
        }
        Mutation::CartSet { .. } => {
            drop_cart_entries(entries, product_id);
            mutation
        }
        Mutation::CartAdd { quantity, .. } => {
            let last = entries
                .iter_mut()
                .rev()
                .find(|e| e.mutation.is_cart() && e.mutation.product_id() == product_id);
            match last {
                Some(Entry {
                    mutation: Mutation::CartSet { quantity: q, .. },
                    ..
                }) => {
                    *q = q.saturating_add(quantity);
                    return;
                }
                Some(entry @ Entry {
                    mutation: Mutation::CartRemove { .. },
                    ..
                }) => {
                    entry.mutation = Mutation::CartSet {
                        product_id,
                        quantity,
                    };
                    return;
                }
                Some(Entry {
                    mutation: Mutation::CartAdd { quantity: q, .. },
                    attempted: false,
                    ..
                }) => {
                    *q = q.saturating_add(quantity);
                    return;
                }
                _ => mutation,
            }
        }
    };

    let seq = next_seq(entries);
    entries.push(Entry {
        seq,
        mutation,
        attempted: false,
    });
}

fn drop_cart_entries(entries: &mut Vec<Entry>, product_id: Uuid) {
    entries.retain(|e| !(e.mutation.is_cart() && e.mutation.product_id() == product_id));
}

async fn send(api: &ApiClient, mutation: &Mutation) -> ClientResult<()> {
    match mutation {
        Mutation::CartAdd {
            product_id,
            quantity,
            mutation_id,
        } => {
            let response: CartMutation = api
                .post(
                    "/cart",
                    &json!({
                        "productId": product_id,
                        "quantity": quantity,
                        "mutationId": mutation_id,
                    }),
                )
                .await?;
            if !response.applied {
                tracing::debug!(%mutation_id, "Server had already applied cart add");
            }
        }
        Mutation::CartSet {
            product_id,
            quantity,
        } => {
            let _: ServerCart = api
                .put(
                    "/cart",
                    &json!({ "productId": product_id, "quantity": quantity }),
                )
                .await?;
        }
        Mutation::CartRemove { product_id } => {
            let _: ServerCart = api.delete(&format!("/cart/{}", product_id)).await?;
        }
        Mutation::LikeSet { product_id, liked } => {
            let _: LikeState = api
                .post("/likes", &json!({ "productId": product_id, "liked": liked }))
                .await?;
        }
    }
    Ok(())
}
