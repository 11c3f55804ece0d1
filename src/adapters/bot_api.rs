//! `TelegramApi` over a Bot-API-compatible HTTP endpoint.
//!
//! Every lookup ends up as a `getChat` call; the peer shape only changes how
//! `chat_id` is encoded and whether it travels in the query string or in a
//! JSON body.

use crate::domain::model::{ChannelRef, Entity, EntityKind, FullUser, PeerRef};
use crate::domain::ports::TelegramApi;
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatInfo {
    id: i64,
    #[serde(rename = "type")]
    chat_type: String,
    title: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    bio: Option<String>,
    linked_chat_id: Option<i64>,
    personal_chat: Option<Box<ChatInfo>>,
}

impl ChatInfo {
    fn kind(&self) -> EntityKind {
        match self.chat_type.as_str() {
            "channel" => EntityKind::Channel { broadcast: true },
            "supergroup" => EntityKind::Channel { broadcast: false },
            "group" => EntityKind::Chat,
            _ => EntityKind::User,
        }
    }

    fn to_entity(&self) -> Result<Entity> {
        let kind = self.kind();
        Ok(Entity {
            id: unmark_chat_id(self.id, kind)?,
            kind,
            username: self.username.clone(),
            title: self.title.clone().or_else(|| self.first_name.clone()),
        })
    }
}

fn id_out_of_range(id: i64) -> ScanError {
    ScanError::ProcessingError {
        message: format!("chat id {} is out of range", id),
    }
}

/// Bot API chat ids carry the peer type in their sign and prefix.
pub fn mark_peer(peer: &PeerRef) -> Result<String> {
    let (id, marked) = match peer {
        PeerRef::Username(name) => return Ok(format!("@{}", name.trim_start_matches('@'))),
        PeerRef::User(id) | PeerRef::InputUser { user_id: id, .. } => (*id, Some(*id)),
        PeerRef::Channel(id) | PeerRef::InputChannel { channel_id: id, .. } => {
            if *id < 0 {
                (*id, Some(*id))
            } else {
                (*id, (-CHANNEL_ID_OFFSET).checked_sub(*id))
            }
        }
        PeerRef::Chat(id) => {
            if *id < 0 {
                (*id, Some(*id))
            } else {
                (*id, id.checked_neg())
            }
        }
    };

    marked
        .map(|marked| marked.to_string())
        .ok_or_else(|| id_out_of_range(id))
}

pub fn unmark_chat_id(id: i64, kind: EntityKind) -> Result<i64> {
    let unmarked = match kind {
        EntityKind::Channel { .. } if id <= -CHANNEL_ID_OFFSET => id
            .checked_neg()
            .and_then(|v| v.checked_sub(CHANNEL_ID_OFFSET)),
        EntityKind::Chat if id < 0 => id.checked_neg(),
        _ => Some(id),
    };
    unmarked.ok_or_else(|| id_out_of_range(id))
}

/// Linked chat ids come back marked; guess the kind from the prefix.
fn unmark_any(id: i64) -> Result<i64> {
    let unmarked = if id <= -CHANNEL_ID_OFFSET {
        id.checked_neg().and_then(|v| v.checked_sub(CHANNEL_ID_OFFSET))
    } else {
        id.checked_abs()
    };
    unmarked.ok_or_else(|| id_out_of_range(id))
}

/// reqwest errors print the request URL, which carries the bot token.
fn transport_error(e: reqwest::Error) -> ScanError {
    ScanError::ApiError(e.without_url())
}

pub struct BotApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl BotApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn get_chat_query(&self, chat_id: &str) -> Result<ChatInfo> {
        tracing::debug!("GET getChat chat_id={}", chat_id);
        let response = self
            .client
            .get(self.method_url("getChat"))
            .query(&[("chat_id", chat_id)])
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode("getChat", response).await
    }

    async fn get_chat_json(&self, chat_id: &str) -> Result<ChatInfo> {
        tracing::debug!("POST getChat chat_id={}", chat_id);
        let response = self
            .client
            .post(self.method_url("getChat"))
            .json(&serde_json::json!({ "chat_id": chat_id }))
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode("getChat", response).await
    }

    async fn decode(method: &str, response: reqwest::Response) -> Result<ChatInfo> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        let envelope: ApiResponse<ChatInfo> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(ScanError::Telegram {
                    method: method.to_string(),
                    code: i64::from(status.as_u16()),
                    description: status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_string(),
                })
            }
        };

        if !envelope.ok {
            return Err(ScanError::Telegram {
                method: method.to_string(),
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope.result.ok_or_else(|| ScanError::Telegram {
            method: method.to_string(),
            code: i64::from(status.as_u16()),
            description: "response has no result".to_string(),
        })
    }
}

#[async_trait]
impl TelegramApi for BotApiClient {
    async fn get_entity(&self, peer: &PeerRef) -> Result<Entity> {
        let chat = self.get_chat_query(&mark_peer(peer)?).await?;
        chat.to_entity()
    }

    async fn get_full_user(&self, user: &Entity) -> Result<FullUser> {
        let chat = self.get_chat_json(&mark_peer(&user.as_peer())?).await?;

        let mut full_user = FullUser::new(chat.to_entity()?);
        full_user.about = chat.bio.clone();
        full_user.linked_chat_id = chat.linked_chat_id.map(unmark_any).transpose()?;

        if let Some(personal) = chat.personal_chat.as_deref() {
            let entity = personal.to_entity()?;
            full_user.channel_refs.push(ChannelRef {
                field: "personal_chat".to_string(),
                id: entity.id,
            });
            full_user.chats.push(entity);
        }

        Ok(full_user)
    }

    async fn get_channels(&self, peers: &[PeerRef]) -> Result<Vec<Entity>> {
        let mut chats = Vec::new();
        let mut last_error = None;

        for peer in peers {
            let lookup = match mark_peer(peer) {
                Ok(chat_id) => self.get_chat_json(&chat_id).await,
                Err(e) => Err(e),
            };
            match lookup.and_then(|chat| chat.to_entity()) {
                Ok(entity) => chats.push(entity),
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) if chats.is_empty() => Err(e),
            _ => Ok(chats),
        }
    }

    async fn get_full_channel(&self, channel: &Entity) -> Result<Vec<Entity>> {
        let chat = self.get_chat_json(&mark_peer(&channel.as_peer())?).await?;
        Ok(vec![chat.to_entity()?])
    }

    async fn resolve_username(&self, username: &str) -> Result<PeerRef> {
        let chat = self
            .get_chat_query(&mark_peer(&PeerRef::Username(username.to_string()))?)
            .await?;
        Ok(chat.to_entity()?.as_peer())
    }
}
