//! Fallback lookup strategies.
//!
//! Every strategy treats a failed client call as "try the next shape": the
//! error is logged at debug level and never propagated.

use crate::core::extract::extract_channels_from_text;
use crate::domain::model::{AccountScan, DiscoverySource, Entity, PeerRef};
use crate::domain::ports::TelegramApi;
use crate::utils::error::{Result, ScanError};

pub const DEFAULT_NAME_VARIATIONS: [&str; 5] =
    ["{}", "{}_channel", "{}channel", "channel_{}", "ch_{}"];

const LINK_PREFIXES: [&str; 9] = [
    "https://t.me/",
    "http://t.me/",
    "https://telegram.me/",
    "http://telegram.me/",
    "https://telegram.dog/",
    "http://telegram.dog/",
    "t.me/",
    "telegram.me/",
    "telegram.dog/",
];

pub fn default_name_variations() -> Vec<String> {
    DEFAULT_NAME_VARIATIONS.iter().map(|s| s.to_string()).collect()
}

/// 把連結或 @ 開頭的輸入整理成純 username 或數字 ID
pub fn normalize_account(input: &str) -> String {
    let trimmed = input.trim();

    if let Some(rest) = LINK_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
    {
        return rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .last()
            .unwrap_or_default()
            .to_string();
    }

    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

/// `None` for usernames; all-digit input that does not fit an id is an error.
fn parse_numeric_id(account: &str) -> Option<Result<i64>> {
    if account.is_empty() || !account.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(account.parse().map_err(|_| ScanError::ProcessingError {
        message: format!("numeric id {} is out of range", account),
    }))
}

pub struct ChannelLookup<'a, A: TelegramApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: TelegramApi + ?Sized> ChannelLookup<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    async fn entity(&self, peer: &PeerRef) -> Option<Entity> {
        match self.api.get_entity(peer).await {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::debug!("{} lookup failed: {}", peer, e);
                None
            }
        }
    }

    async fn is_channel_username(&self, username: &str) -> bool {
        self.entity(&PeerRef::Username(username.to_string()))
            .await
            .is_some_and(|entity| entity.is_channel())
    }

    /// Tries the channel id as a plain peer, as an input peer and through a
    /// batch channel request, in that order.
    pub async fn channel_username_by_id(&self, channel_id: i64) -> Option<String> {
        for peer in [PeerRef::Channel(channel_id), PeerRef::input_channel(channel_id)] {
            if let Some(username) = self
                .entity(&peer)
                .await
                .and_then(|entity| entity.handle().map(str::to_string))
            {
                tracing::debug!("Found channel username by {}: {}", peer, username);
                return Some(username);
            }
        }

        match self
            .api
            .get_channels(&[PeerRef::input_channel(channel_id)])
            .await
        {
            Ok(chats) => {
                if let Some(username) = chats.iter().find_map(|chat| chat.handle()) {
                    tracing::debug!("Found channel username by batch request: {}", username);
                    return Some(username.to_string());
                }
            }
            Err(e) => tracing::debug!("Batch channel request failed for {}: {}", channel_id, e),
        }

        tracing::debug!(
            "Channel found but couldn't get username for ID: {}",
            channel_id
        );
        None
    }

    pub async fn linked_channel_from_chat_id(&self, chat_id: i64) -> Option<String> {
        let mut resolved = None;
        for peer in [
            PeerRef::Channel(chat_id),
            PeerRef::Chat(chat_id),
            PeerRef::User(chat_id),
        ] {
            resolved = self.entity(&peer).await;
            if resolved.is_some() {
                break;
            }
        }

        let Some(entity) = resolved else {
            tracing::debug!("Failed to get entity for linked chat {}", chat_id);
            return None;
        };

        if let Some(username) = entity.handle() {
            tracing::debug!("Found linked channel username: {}", username);
            return Some(username.to_string());
        }

        if entity.is_channel() {
            match self.api.get_full_channel(&entity).await {
                Ok(chats) => {
                    if let Some(username) = chats.first().and_then(|chat| chat.handle()) {
                        tracing::debug!(
                            "Found linked channel username from full details: {}",
                            username
                        );
                        return Some(username.to_string());
                    }
                }
                Err(e) => tracing::debug!("Failed to get full channel details: {}", e),
            }
        }

        None
    }

    async fn resolve_account(&self, account: &str) -> Result<Entity> {
        match parse_numeric_id(account) {
            Some(Err(e)) => Err(e),
            Some(Ok(user_id)) => match self.api.get_entity(&PeerRef::input_user(user_id)).await {
                Ok(user) => Ok(user),
                Err(e) => {
                    tracing::debug!("InputPeerUser lookup failed for {}: {}", user_id, e);
                    self.api.get_entity(&PeerRef::User(user_id)).await
                }
            },
            None => {
                self.api
                    .get_entity(&PeerRef::Username(account.to_string()))
                    .await
            }
        }
    }

    /// Runs every profile-based strategy for one input line.
    pub async fn process_user(&self, input: &str) -> AccountScan {
        let mut scan = AccountScan::new(input);
        let account = normalize_account(input);

        let user = match self.resolve_account(&account).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Error processing user {}: {}", account, e);
                scan.error = Some(e.to_string());
                return scan;
            }
        };

        let full_user = match self.api.get_full_user(&user).await {
            Ok(full_user) => full_user,
            Err(e) => {
                tracing::error!("Error processing user {}: {}", account, e);
                scan.error = Some(e.to_string());
                return scan;
            }
        };

        tracing::debug!(
            "User info for {}: about={}, linked_chat_id={:?}, channel refs={}, chats={}, users={}",
            account,
            full_user.about.is_some(),
            full_user.linked_chat_id,
            full_user.channel_refs.len(),
            full_user.chats.len(),
            full_user.users.len()
        );

        if let Some(linked_chat_id) = full_user.linked_chat_id {
            if let Some(username) = self.linked_channel_from_chat_id(linked_chat_id).await {
                tracing::debug!("Added linked channel: {}", username);
                scan.add(username, DiscoverySource::LinkedChat);
            }
        }

        for channel_ref in &full_user.channel_refs {
            if let Some(username) = self.channel_username_by_id(channel_ref.id).await {
                tracing::debug!("Added channel from {}: {}", channel_ref.field, username);
                scan.add(username, DiscoverySource::ChannelRef(channel_ref.field.clone()));
            }
        }

        let bio_channels = extract_channels_from_text(full_user.about.as_deref());
        if !bio_channels.is_empty() {
            tracing::debug!("Channels from bio: {:?}", bio_channels);
        }
        for channel in bio_channels {
            scan.add(channel, DiscoverySource::Bio);
        }

        if let Some(username) = user.handle() {
            if self.is_channel_username(username).await {
                tracing::debug!("Added user's username as channel: {}", username);
                scan.add(username, DiscoverySource::OwnUsername);
            }

            match self.api.resolve_username(username).await {
                Ok(peer) if peer.is_channel() => {
                    tracing::debug!("Added user's username as channel via resolve: {}", username);
                    scan.add(username, DiscoverySource::ResolvedUsername);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Resolve username failed: {}", e),
            }
        }

        for chat in &full_user.chats {
            if let Some(username) = chat.handle() {
                tracing::debug!("Added channel from chats array: {}", username);
                scan.add(username, DiscoverySource::Chats);
            }
        }

        for other in &full_user.users {
            if let Some(username) = other.handle() {
                tracing::debug!("Checking additional user: {}", username);
                if self.is_channel_username(username).await {
                    tracing::debug!("Added channel from users array: {}", username);
                    scan.add(username, DiscoverySource::Users);
                }
            }
        }

        tracing::debug!("Final channels found for {}: {:?}", account, scan.handles());
        scan
    }

    /// Last resort for `@name` inputs: the name itself and common channel
    /// spellings derived from it.
    pub async fn try_direct_fetch_user_channel(
        &self,
        username: &str,
        variations: &[String],
        scan: &mut AccountScan,
    ) {
        if self.is_channel_username(username).await {
            tracing::debug!("Direct check found channel: {}", username);
            scan.add(username, DiscoverySource::Direct);
        }

        for template in variations {
            let candidate = template.replace("{}", username);
            if let Some(found) = self
                .entity(&PeerRef::Username(candidate))
                .await
                .and_then(|entity| entity.handle().map(str::to_string))
            {
                tracing::debug!("Found channel via name variation: {}", found);
                scan.add(found, DiscoverySource::NameVariation);
            }
        }
    }
}
