use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatParticipant, ChatThreadItem};

/// One page of a listing plus the continuation link for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedCollection<T> {
    #[serde(rename = "value", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> PagedCollection<T> {
    /// Continuation link, ignoring the empty string some responses carry.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }

    pub fn has_next_page(&self) -> bool {
        self.next_link().is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for PagedCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

pub type ChatMessagesCollection = PagedCollection<ChatMessage>;
pub type ChatThreadsCollection = PagedCollection<ChatThreadItem>;
pub type ChatParticipantsCollection = PagedCollection<ChatParticipant>;
