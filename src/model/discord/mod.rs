use serde::{Deserialize, Serialize};

pub const MANAGE_NICKNAMES: u64 = 1 << 27;
pub const ADMINISTRATOR: u64 = 1 << 3;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct GuildMember {
    pub user: DiscordUser,
    #[serde(default)]
    pub nick: Option<String>,
}

impl GuildMember {
    pub fn display_name(&self) -> &str {
        match self.nick.as_deref() {
            Some(nick) if !nick.is_empty() => nick,
            _ => &self.user.username,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.user.bot.unwrap_or_default()
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user.id)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NicknameEditRequest {
    pub nick: String,
}
