use crate::model::discord::{ADMINISTRATOR, MANAGE_NICKNAMES};
use serde::{Deserialize, Serialize};

/// The chat user who issued a command, as forwarded by the chat front end.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
pub struct CommandUser {
    pub user_id: u64,
    #[serde(default)]
    pub permissions: u64,
}

impl CommandUser {
    pub fn can_manage_nicknames(&self) -> bool {
        self.permissions & (MANAGE_NICKNAMES | ADMINISTRATOR) != 0
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct AddPointsRequest {
    pub invoker: CommandUser,
    pub amount: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct InvokerRequest {
    pub invoker: CommandUser,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl CommandReply {
    pub fn text<S: Into<String>>(content: S) -> Self {
        CommandReply {
            content: content.into(),
            attachment: None,
        }
    }

    pub fn with_attachment<S: Into<String>>(content: S, attachment: Attachment) -> Self {
        CommandReply {
            content: content.into(),
            attachment: Some(attachment),
        }
    }
}
