use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Parameter shapes used to ask the client for an entity.
///
/// Fallback lookups use an access hash of `0`, which some servers accept for
/// peers they have already seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeerRef {
    Username(String),
    User(i64),
    InputUser { user_id: i64, access_hash: i64 },
    Channel(i64),
    InputChannel { channel_id: i64, access_hash: i64 },
    Chat(i64),
}

impl PeerRef {
    pub fn input_user(user_id: i64) -> Self {
        PeerRef::InputUser {
            user_id,
            access_hash: 0,
        }
    }

    pub fn input_channel(channel_id: i64) -> Self {
        PeerRef::InputChannel {
            channel_id,
            access_hash: 0,
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, PeerRef::Channel(_) | PeerRef::InputChannel { .. })
    }
}

impl fmt::Display for PeerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerRef::Username(name) => write!(f, "@{}", name),
            PeerRef::User(id) => write!(f, "PeerUser({})", id),
            PeerRef::InputUser { user_id, .. } => write!(f, "InputPeerUser({})", user_id),
            PeerRef::Channel(id) => write!(f, "PeerChannel({})", id),
            PeerRef::InputChannel { channel_id, .. } => {
                write!(f, "InputPeerChannel({})", channel_id)
            }
            PeerRef::Chat(id) => write!(f, "PeerChat({})", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Chat,
    /// Broadcast channels and supergroups alike.
    Channel { broadcast: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub kind: EntityKind,
    pub username: Option<String>,
    pub title: Option<String>,
}

impl Entity {
    pub fn is_channel(&self) -> bool {
        matches!(self.kind, EntityKind::Channel { .. })
    }

    /// Username, if the entity has a non-empty one.
    pub fn handle(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }

    pub fn as_peer(&self) -> PeerRef {
        match self.kind {
            EntityKind::User => PeerRef::User(self.id),
            EntityKind::Chat => PeerRef::Chat(self.id),
            EntityKind::Channel { .. } => PeerRef::Channel(self.id),
        }
    }
}

/// A numeric field on the full user that may point at a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub field: String,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullUser {
    pub user: Entity,
    pub about: Option<String>,
    pub linked_chat_id: Option<i64>,
    pub channel_refs: Vec<ChannelRef>,
    pub chats: Vec<Entity>,
    pub users: Vec<Entity>,
}

impl FullUser {
    pub fn new(user: Entity) -> Self {
        Self {
            user,
            about: None,
            linked_chat_id: None,
            channel_refs: Vec::new(),
            chats: Vec::new(),
            users: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscoverySource {
    LinkedChat,
    ChannelRef(String),
    Bio,
    OwnUsername,
    ResolvedUsername,
    Chats,
    Users,
    Direct,
    NameVariation,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverySource::LinkedChat => f.write_str("linked_chat"),
            DiscoverySource::ChannelRef(field) => write!(f, "channel_ref:{}", field),
            DiscoverySource::Bio => f.write_str("bio"),
            DiscoverySource::OwnUsername => f.write_str("own_username"),
            DiscoverySource::ResolvedUsername => f.write_str("resolved_username"),
            DiscoverySource::Chats => f.write_str("chats"),
            DiscoverySource::Users => f.write_str("users"),
            DiscoverySource::Direct => f.write_str("direct"),
            DiscoverySource::NameVariation => f.write_str("name_variation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub handle: String,
    pub source: DiscoverySource,
}

/// Everything found for a single input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountScan {
    pub account: String,
    pub discoveries: Vec<Discovery>,
    pub error: Option<String>,
}

impl AccountScan {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Default::default()
        }
    }

    /// Records a handle unless this account already produced it.
    pub fn add(&mut self, handle: impl Into<String>, source: DiscoverySource) -> bool {
        let handle = handle.into();
        if self.discoveries.iter().any(|d| d.handle == handle) {
            return false;
        }
        self.discoveries.push(Discovery { handle, source });
        true
    }

    pub fn handles(&self) -> BTreeSet<String> {
        self.discoveries.iter().map(|d| d.handle.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.discoveries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub accounts: Vec<AccountScan>,
    pub channels: BTreeSet<String>,
}

impl ScanResult {
    pub fn push(&mut self, scan: AccountScan) {
        self.channels.extend(scan.handles());
        self.accounts.push(scan);
    }

    /// Output file body: sorted handles, one per line.
    pub fn channel_list(&self) -> String {
        self.channels
            .iter()
            .map(|channel| format!("{}\n", channel))
            .collect()
    }
}
